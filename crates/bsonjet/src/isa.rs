//! Instruction-set tier selection.
//!
//! The escape and ObjectId writers are specialised per tier. A tier is
//! selected once, when a run is configured, and never changes within a call;
//! every tier produces byte-identical output, so the choice is purely a
//! throughput matter.

/// An x86-64 SIMD capability level.
///
/// On other architectures all tiers behave as [`IsaTier::Scalar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsaTier {
    /// Portable byte-at-a-time implementation.
    Scalar,
    /// 16-byte blocks via SSE2 compares.
    Sse2,
    /// 16-byte blocks via SSE4.2 string compares.
    Sse42,
    /// 32-byte blocks via AVX2.
    Avx2,
}

impl IsaTier {
    /// Detects the best tier the host CPU supports.
    #[must_use]
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if std::arch::is_x86_feature_detected!("avx2") {
                return IsaTier::Avx2;
            }
            if std::arch::is_x86_feature_detected!("sse4.2") {
                return IsaTier::Sse42;
            }
            if std::arch::is_x86_feature_detected!("sse2") {
                return IsaTier::Sse2;
            }
        }
        IsaTier::Scalar
    }

    /// The tier's display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            IsaTier::Scalar => "Baseline",
            IsaTier::Sse2 => "SSE2",
            IsaTier::Sse42 => "SSE4.2",
            IsaTier::Avx2 => "AVX2",
        }
    }

    /// Whether the host CPU can run this tier.
    #[must_use]
    pub fn is_supported(self) -> bool {
        #[cfg(target_arch = "x86_64")]
        {
            match self {
                IsaTier::Scalar => true,
                IsaTier::Sse2 => std::arch::is_x86_feature_detected!("sse2"),
                IsaTier::Sse42 => std::arch::is_x86_feature_detected!("sse4.2"),
                IsaTier::Avx2 => std::arch::is_x86_feature_detected!("avx2"),
            }
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            self == IsaTier::Scalar
        }
    }

    /// Resolves a configured override against what the host supports.
    pub(crate) fn effective(requested: Option<IsaTier>) -> IsaTier {
        match requested {
            Some(tier) if tier.is_supported() => tier,
            _ => IsaTier::detect(),
        }
    }
}
