//! Opaque RGB color with channels on the 0-255 scale.

use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

use crate::Interval;

/// Opaque color with `red`, `green`, `blue` in `[0, 255]`.
///
/// Channels are kept as `f64` so shading and sample accumulation stay
/// exact until the final conversion to bytes. Alpha is always 255.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const RED: Rgb = Rgb::new(255.0, 0.0, 0.0);
    pub const GREEN: Rgb = Rgb::new(0.0, 255.0, 0.0);
    pub const BLUE: Rgb = Rgb::new(0.0, 0.0, 255.0);

    /// Alpha of every color; the renderer only produces opaque pixels.
    pub const ALPHA: u8 = 255;

    #[inline]
    pub const fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    /// Scale every channel by `factor` clamped to `[0, 1]`.
    ///
    /// This is the only place light power is clamped, so summed
    /// contributions from several lights may cancel before clamping.
    pub fn shade(self, factor: f64) -> Self {
        self * Interval::UNIT.clamp(factor)
    }

    /// Convert to RGBA bytes, clamping each channel to `[0, 255]` and
    /// truncating the fraction.
    pub fn to_rgba(self) -> [u8; 4] {
        let channel = Interval::new(0.0, 255.0);
        [
            channel.clamp(self.red) as u8,
            channel.clamp(self.green) as u8,
            channel.clamp(self.blue) as u8,
            Self::ALPHA,
        ]
    }
}

impl Add for Rgb {
    type Output = Rgb;

    fn add(self, rhs: Rgb) -> Rgb {
        Rgb::new(self.red + rhs.red, self.green + rhs.green, self.blue + rhs.blue)
    }
}

impl Mul<f64> for Rgb {
    type Output = Rgb;

    fn mul(self, k: f64) -> Rgb {
        Rgb::new(self.red * k, self.green * k, self.blue * k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shade_scales_channels() {
        let c = Rgb::new(200.0, 100.0, 50.0).shade(0.5);
        assert_eq!(c, Rgb::new(100.0, 50.0, 25.0));
    }

    #[test]
    fn test_shade_clamps_factor() {
        assert_eq!(Rgb::RED.shade(7.0), Rgb::RED);
        assert_eq!(Rgb::RED.shade(-2.0), Rgb::BLACK);
    }

    #[test]
    fn test_to_rgba_truncates_and_clamps() {
        assert_eq!(Rgb::new(12.9, 300.0, -4.0).to_rgba(), [12, 255, 0, 255]);
        assert_eq!(Rgb::BLUE.to_rgba(), [0, 0, 255, 255]);
    }

    #[test]
    fn test_accumulate() {
        let sum = Rgb::RED * 0.25 + Rgb::GREEN * 0.75;
        assert_eq!(sum, Rgb::new(63.75, 191.25, 0.0));
    }
}
