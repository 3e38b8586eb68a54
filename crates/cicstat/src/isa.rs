//! Translate instruction set names into a count kernel.
//!
//! The instruction set is purely a performance hint. It only selects the
//! lane width of the count kernel (wider lanes for wider vector registers);
//! the kernels rely on auto-vectorization rather than explicit intrinsics.
//! Every kernel produces identical counts, so the choice never changes the
//! result.

use crate::Error;
use cicstat_nostd_internal::KernelChoice;
use std::str::FromStr;

/// Names an instruction set
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Isa {
    /// use the widest kernel supported by the current machine
    #[default]
    Fastest,
    Avx,
    Sse42,
    Fallback,
}

impl Isa {
    const NAMES: [&'static str; 4] = ["fastest", "avx", "sse42", "fallback"];

    pub fn name(&self) -> &'static str {
        match self {
            Isa::Fastest => "fastest",
            Isa::Avx => "avx",
            Isa::Sse42 => "sse42",
            Isa::Fallback => "fallback",
        }
    }

    /// Pick the kernel for this instruction set.
    ///
    /// An instruction set that isn't supported by the current machine
    /// silently falls back to the scalar kernel.
    pub fn resolve(&self) -> KernelChoice {
        let choice = match self {
            Isa::Fastest => {
                if avx_available() {
                    KernelChoice::Lanes8
                } else if sse42_available() {
                    KernelChoice::Lanes4
                } else {
                    KernelChoice::Scalar
                }
            }
            Isa::Avx if avx_available() => KernelChoice::Lanes8,
            Isa::Sse42 if sse42_available() => KernelChoice::Lanes4,
            Isa::Fallback => KernelChoice::Scalar,
            Isa::Avx | Isa::Sse42 => {
                log::debug!(
                    "the {} instruction set isn't available, falling back to the scalar kernel",
                    self.name()
                );
                KernelChoice::Scalar
            }
        };
        log::debug!("instruction set \"{}\" resolved to {choice:?}", self.name());
        choice
    }
}

impl FromStr for Isa {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fastest" => Ok(Isa::Fastest),
            "avx" => Ok(Isa::Avx),
            "sse42" => Ok(Isa::Sse42),
            "fallback" => Ok(Isa::Fallback),
            _ => Err(Error::isa_name(s, &Isa::NAMES)),
        }
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn avx_available() -> bool {
    std::arch::is_x86_feature_detected!("avx")
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn avx_available() -> bool {
    false
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn sse42_available() -> bool {
    std::arch::is_x86_feature_detected!("sse4.2")
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn sse42_available() -> bool {
    false
}
