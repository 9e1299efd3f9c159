// Coordinate transformations between the three-phase stationary frame (uvw)
// and the rotating dq frame. Clarke/Park use the amplitude-invariant form:
// a balanced uvw vector of peak 1.0 maps to a dq vector of magnitude 1.0.

use core::f32::consts::{PI, TAU};
use libm::sqrtf;

const SQRT3_DIV_2: f32 = 0.866_025_4; // sqrt(3) / 2
const FRAC_1_SQRT3: f32 = 0.577_350_3; // 1 / sqrt(3)

/// Three-phase stationary frame quantity (voltage or current)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UvwVector {
    pub u: f32,
    pub v: f32,
    pub w: f32,
}

/// Rotating frame quantity: d = flux axis, q = torque axis
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DqVector {
    pub d: f32,
    pub q: f32,
}

impl UvwVector {
    pub const fn new(u: f32, v: f32, w: f32) -> Self {
        Self { u, v, w }
    }

    /// UVW → dq (Clarke, then Park rotation by `-theta`)
    ///
    /// The zero-sequence component `(u + v + w) / 3` has no dq representation
    /// and is dropped.
    pub fn to_dq(&self, theta: f32) -> DqVector {
        let (alpha, beta) = clarke(self.u, self.v, self.w);
        let (d, q) = park(alpha, beta, theta);
        DqVector { d, q }
    }
}

impl DqVector {
    pub const fn new(d: f32, q: f32) -> Self {
        Self { d, q }
    }

    /// dq → UVW (inverse Park rotation by `+theta`, then inverse Clarke)
    pub fn to_uvw(&self, theta: f32) -> UvwVector {
        let (alpha, beta) = inverse_park(self.d, self.q, theta);
        let (u, v, w) = inverse_clarke(alpha, beta);
        UvwVector { u, v, w }
    }

    /// Vector magnitude
    pub fn magnitude(&self) -> f32 {
        sqrtf(self.d * self.d + self.q * self.q)
    }
}

/// Clarke transformation (uvw → αβ)
///
/// α = (2u − v − w) / 3, β = (v − w) / √3
pub fn clarke(u: f32, v: f32, w: f32) -> (f32, f32) {
    let alpha = (2.0 * u - v - w) / 3.0;
    let beta = (v - w) * FRAC_1_SQRT3;
    (alpha, beta)
}

/// Inverse Clarke transformation (αβ → uvw)
///
/// # Returns
/// Tuple of (u, v, w); the result is always balanced (u + v + w = 0)
pub fn inverse_clarke(alpha: f32, beta: f32) -> (f32, f32, f32) {
    const ONE_DIV_2: f32 = 0.5;

    let u = alpha;
    let v = -ONE_DIV_2 * alpha + SQRT3_DIV_2 * beta;
    let w = -ONE_DIV_2 * alpha - SQRT3_DIV_2 * beta;

    (u, v, w)
}

/// Park transformation (αβ → dq)
///
/// Rotates the stationary vector by `-theta` into the rotor frame.
pub fn park(alpha: f32, beta: f32, theta: f32) -> (f32, f32) {
    let (cos_theta, sin_theta) = cos_sin(theta);

    let d = alpha * cos_theta + beta * sin_theta;
    let q = -alpha * sin_theta + beta * cos_theta;

    (d, q)
}

/// Inverse Park transformation (dq → αβ)
///
/// # Arguments
/// * `vd` - d-axis component (aligned with rotor flux)
/// * `vq` - q-axis component (perpendicular to rotor flux, produces torque)
/// * `theta` - Electrical angle in radians
///
/// # Returns
/// Tuple of (alpha, beta) in the stationary frame
pub fn inverse_park(vd: f32, vq: f32, theta: f32) -> (f32, f32) {
    let (cos_theta, sin_theta) = cos_sin(theta);

    let alpha = vd * cos_theta - vq * sin_theta;
    let beta = vd * sin_theta + vq * cos_theta;

    (alpha, beta)
}

/// `(cos θ, sin θ)` via libm, or idsp::cossin() with the `fast-trig` feature
#[cfg(not(feature = "fast-trig"))]
#[inline]
fn cos_sin(theta: f32) -> (f32, f32) {
    (libm::cosf(theta), libm::sinf(theta))
}

/// `(cos θ, sin θ)` via idsp::cossin() (~40 cycles on Cortex-M vs ~100-200 for libm)
#[cfg(feature = "fast-trig")]
#[inline]
fn cos_sin(theta: f32) -> (f32, f32) {
    // idsp phase format: i32 full scale represents [-π, π)
    const SCALE: f32 = 2147483648.0 / PI; // 2^31 / π
    const I32_TO_F32: f32 = 1.0 / 2147483648.0; // 1 / 2^31

    let phase = (wrap_angle(theta) * SCALE) as i32;
    let (cos_i32, sin_i32) = idsp::cossin(phase);

    (cos_i32 as f32 * I32_TO_F32, sin_i32 as f32 * I32_TO_F32)
}

/// Limit voltage vector to maximum magnitude
///
/// Applies circular limiting in the dq frame; both components are scaled
/// proportionally so the vector direction is kept.
pub fn limit_voltage(vd: f32, vq: f32, max_voltage: f32) -> (f32, f32) {
    let magnitude = sqrtf(vd * vd + vq * vq);

    if magnitude > max_voltage {
        let scale = max_voltage / magnitude;
        (vd * scale, vq * scale)
    } else {
        (vd, vq)
    }
}

/// Normalize angle to range [0, 2π)
pub fn normalize_angle(angle: f32) -> f32 {
    let mut normalized = angle % TAU;
    if normalized < 0.0 {
        normalized += TAU;
    }
    // -tiny % TAU + TAU rounds up to TAU
    if normalized >= TAU {
        normalized -= TAU;
    }
    normalized
}

/// Wrap angle to range (-π, π]
pub fn wrap_angle(angle: f32) -> f32 {
    let normalized = normalize_angle(angle);
    if normalized > PI {
        normalized - TAU
    } else {
        normalized
    }
}
