//! Mathematical utility functions for the render path.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//!
//! # Panning
//!
//! - [`constant_power_pan`] - Split a pan position into left/right multipliers
//!
//! # Waveshaping
//!
//! - [`soft_clip`] - Smooth saturation used by the master soft clipper and the
//!   overdrive effect

use core::f32::consts::FRAC_PI_2;
use libm::{cosf, expf, logf, sinf, tanhf};

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use tinyrack_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// Values at or below zero are floored at -120 dB.
///
/// # Example
/// ```rust
/// use tinyrack_core::linear_to_db;
///
/// assert!((linear_to_db(1.0) - 0.0).abs() < 0.001);
/// assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    if linear <= 1e-6 {
        return -120.0;
    }
    logf(linear) * FACTOR
}

/// Soft clipping using tanh.
///
/// Output is bounded to (-1, 1) and nearly linear for small inputs.
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    tanhf(x)
}

/// Flush denormal numbers to zero.
///
/// Feedback paths (delay, reverb, filters) decay toward zero and can land in
/// the denormal range, which is slow on most FPUs.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Convert milliseconds to samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// Constant-power pan law.
///
/// `pan` is clamped to [0, 1]: 0 is hard left, 0.5 is center, 1 is hard
/// right. Returns `(left, right)` multipliers with `left² + right² == 1`.
///
/// ```rust
/// use tinyrack_core::constant_power_pan;
///
/// let (l, r) = constant_power_pan(0.5);
/// assert!((l - r).abs() < 1e-6);
/// assert_eq!(constant_power_pan(0.0), (1.0, 0.0));
/// ```
#[inline]
pub fn constant_power_pan(pan: f32) -> (f32, f32) {
    let p = pan.clamp(0.0, 1.0);
    if p == 0.0 {
        return (1.0, 0.0);
    }
    if p == 1.0 {
        return (0.0, 1.0);
    }
    let angle = p * FRAC_PI_2;
    (cosf(angle), sinf(angle))
}
