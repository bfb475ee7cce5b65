#![allow(missing_docs, dead_code)]

//! Raw BSON fixture builder. Documents are assembled byte-by-byte so tests
//! can express malformed inputs as easily as valid ones.

/// Builds one BSON document (or array — the wire shape is identical).
#[derive(Debug, Default, Clone)]
pub struct Doc {
    elements: Vec<u8>,
}

impl Doc {
    pub fn new() -> Self {
        Self::default()
    }

    fn header(mut self, type_byte: u8, name: &str) -> Self {
        self.elements.push(type_byte);
        self.elements.extend_from_slice(name.as_bytes());
        self.elements.push(0);
        self
    }

    pub fn double(self, name: &str, v: f64) -> Self {
        let mut doc = self.header(0x01, name);
        doc.elements.extend_from_slice(&v.to_le_bytes());
        doc
    }

    pub fn string(self, name: &str, v: &str) -> Self {
        let mut doc = self.header(0x02, name);
        doc.elements
            .extend_from_slice(&(v.len() as i32 + 1).to_le_bytes());
        doc.elements.extend_from_slice(v.as_bytes());
        doc.elements.push(0);
        doc
    }

    /// A string element with an explicit declared length and raw payload;
    /// for malformed fixtures.
    pub fn string_raw(self, name: &str, declared: i32, payload: &[u8]) -> Self {
        let mut doc = self.header(0x02, name);
        doc.elements.extend_from_slice(&declared.to_le_bytes());
        doc.elements.extend_from_slice(payload);
        doc
    }

    pub fn document(self, name: &str, inner: Doc) -> Self {
        let mut doc = self.header(0x03, name);
        doc.elements.extend_from_slice(&inner.build());
        doc
    }

    pub fn array(self, name: &str, inner: Doc) -> Self {
        let mut doc = self.header(0x04, name);
        doc.elements.extend_from_slice(&inner.build());
        doc
    }

    pub fn undefined(self, name: &str) -> Self {
        self.header(0x06, name)
    }

    pub fn oid(self, name: &str, bytes: [u8; 12]) -> Self {
        let mut doc = self.header(0x07, name);
        doc.elements.extend_from_slice(&bytes);
        doc
    }

    pub fn boolean(self, name: &str, v: bool) -> Self {
        let mut doc = self.header(0x08, name);
        doc.elements.push(u8::from(v));
        doc
    }

    pub fn date(self, name: &str, ms: i64) -> Self {
        let mut doc = self.header(0x09, name);
        doc.elements.extend_from_slice(&ms.to_le_bytes());
        doc
    }

    pub fn null(self, name: &str) -> Self {
        self.header(0x0a, name)
    }

    pub fn int32(self, name: &str, v: i32) -> Self {
        let mut doc = self.header(0x10, name);
        doc.elements.extend_from_slice(&v.to_le_bytes());
        doc
    }

    pub fn int64(self, name: &str, v: i64) -> Self {
        let mut doc = self.header(0x12, name);
        doc.elements.extend_from_slice(&v.to_le_bytes());
        doc
    }

    /// An element with an arbitrary type byte and raw payload.
    pub fn raw(self, type_byte: u8, name: &str, payload: &[u8]) -> Self {
        let mut doc = self.header(type_byte, name);
        doc.elements.extend_from_slice(payload);
        doc
    }

    /// Serialises with the correct length prefix and terminator.
    pub fn build(self) -> Vec<u8> {
        let size = 4 + self.elements.len() as i32 + 1;
        let mut out = Vec::with_capacity(size as usize);
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&self.elements);
        out.push(0);
        out
    }

    /// Serialises with a forged size field.
    pub fn build_with_size(self, size: i32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&self.elements);
        out.push(0);
        out
    }
}

/// An array document: elements get their decimal index as name.
pub fn array_of(values: impl IntoIterator<Item = ArrayValue>) -> Doc {
    let mut doc = Doc::new();
    for (i, v) in values.into_iter().enumerate() {
        let name = i.to_string();
        doc = match v {
            ArrayValue::Double(x) => doc.double(&name, x),
            ArrayValue::Str(s) => doc.string(&name, s),
            ArrayValue::Bool(b) => doc.boolean(&name, b),
            ArrayValue::Null => doc.null(&name),
            ArrayValue::Int32(x) => doc.int32(&name, x),
            ArrayValue::Int64(x) => doc.int64(&name, x),
            ArrayValue::Oid(bytes) => doc.oid(&name, bytes),
        };
    }
    doc
}

#[derive(Debug, Clone)]
pub enum ArrayValue {
    Double(f64),
    Str(&'static str),
    Bool(bool),
    Null,
    Int32(i32),
    Int64(i64),
    Oid([u8; 12]),
}
