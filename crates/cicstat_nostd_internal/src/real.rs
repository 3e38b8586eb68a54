//! Defines the [`Real`] trait, which lets the kernels operate on particle
//! positions stored as either `f32` or `f64`.
//!
//! The calculation is always carried out in the same precision as the
//! positions. That includes the uniform draws used to place sphere centers,
//! so that comparisons near the edge of the domain don't mix precisions.
//!
//! We only expose the handful of operations that the kernels actually need.
//! Things like `sqrt` or `powi` aren't available in `core` anyway, so we
//! structure all distance logic around squared distances.

use core::ops::{Add, Mul, Neg, Sub};
use rand::Rng;

/// The essential floating point operations used by this crate
pub trait Real:
    Copy
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    const ZERO: Self;
    const HALF: Self;

    /// a short name used in diagnostic messages
    const NAME: &'static str;

    fn from_f64(val: f64) -> Self;

    fn to_f64(self) -> f64;

    fn is_finite(self) -> bool;

    /// draw a value uniformly from `[0, 1)` in this precision
    fn sample_unit<G: Rng + ?Sized>(rng: &mut G) -> Self;
}

impl Real for f64 {
    const ZERO: Self = 0.0;
    const HALF: Self = 0.5;
    const NAME: &'static str = "f64";

    #[inline(always)]
    fn from_f64(val: f64) -> Self {
        val
    }

    #[inline(always)]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline(always)]
    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }

    #[inline(always)]
    fn sample_unit<G: Rng + ?Sized>(rng: &mut G) -> Self {
        rng.random::<f64>()
    }
}

impl Real for f32 {
    const ZERO: Self = 0.0;
    const HALF: Self = 0.5;
    const NAME: &'static str = "f32";

    #[inline(always)]
    fn from_f64(val: f64) -> Self {
        val as f32
    }

    #[inline(always)]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline(always)]
    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }

    #[inline(always)]
    fn sample_unit<G: Rng + ?Sized>(rng: &mut G) -> Self {
        rng.random::<f32>()
    }
}
