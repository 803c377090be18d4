//! Wet/dry blending and stereo balance.

/*
Wet/Dry and Balance
===================

Every effect in this crate ends the same way: the processed signal (wet) is
crossfaded against the untouched input (dry).

    output = dry × (1 - mix) + wet × mix

    mix = 0.0  →  input passes untouched (bit-exact)
    mix = 1.0  →  only the effect is heard

The weights sum to 1.0, so a full-scale dry and a full-scale wet never sum
past full scale.


Constant-Power Balance
----------------------

The pan stage splits one balance control (0.0 = hard left, 0.5 = centre,
1.0 = hard right) into two gains on a quarter circle:

    left  = cos(balance × π/2) × √½
    right = sin(balance × π/2) × √½

    balance   left     right
    0.0       0.707    0.000
    0.5       0.500    0.500     (-3 dB each side at centre)
    1.0       0.000    0.707

left² + right² stays at ½ for every position, so the perceived loudness
does not dip while sweeping across the field.
*/

use std::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_2};

/// Blend dry and wet samples using linear crossfade (single sample version).
///
/// output = (dry × (1-mix)) + (wet × mix)
#[inline]
pub fn blend_dry_wet(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

/// Left/right gains for a balance position in `[0, 1]`.
#[inline]
pub fn pan_gains(balance: f32) -> (f32, f32) {
    let angle = clamp_param(balance, 0.0, 1.0) * FRAC_PI_2;
    (angle.cos() * FRAC_1_SQRT_2, angle.sin() * FRAC_1_SQRT_2)
}

/// Clamp a control value into `[min, max]`, mapping NaN to the bound nearest zero.
///
/// `f32::clamp` passes NaN through, which would poison recursive state.
#[inline]
pub fn clamp_param(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        0.0f32.clamp(min, max)
    } else {
        value.clamp(min, max)
    }
}
