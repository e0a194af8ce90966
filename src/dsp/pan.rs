//! Constant-power stereo panner.

use core::f32::consts::FRAC_PI_4;

/// Splits a mono signal into left/right with equal total power at every position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panner {
    pos: f32,
    left: f32,
    right: f32,
}

impl Panner {
    /// `pos` runs from -1 (hard left) through 0 (center) to 1 (hard right).
    pub fn new(pos: f32) -> Self {
        let mut p = Self {
            pos: 0.0,
            left: 0.0,
            right: 0.0,
        };
        p.set_pos(pos);
        p
    }

    pub fn set_pos(&mut self, pos: f32) {
        let pos = if pos.is_finite() { pos.clamp(-1.0, 1.0) } else { 0.0 };
        let angle = (pos + 1.0) * FRAC_PI_4;
        self.pos = pos;
        self.left = angle.cos();
        self.right = angle.sin();
    }

    #[inline]
    pub fn pos(&self) -> f32 {
        self.pos
    }

    #[inline]
    pub fn gains(&self) -> (f32, f32) {
        (self.left, self.right)
    }

    #[inline]
    pub fn pan(&self, x: f32) -> (f32, f32) {
        (x * self.left, x * self.right)
    }
}

impl Default for Panner {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_is_equal_power() {
        let (l, r) = Panner::new(0.0).gains();
        assert!((l - r).abs() < 1e-6);
        assert!((l * l + r * r - 1.0).abs() < 1e-6);
    }

    #[test]
    fn extremes_are_hard_panned() {
        let (l, r) = Panner::new(-1.0).gains();
        assert!((l - 1.0).abs() < 1e-6 && r.abs() < 1e-6);
        let (l, r) = Panner::new(1.0).gains();
        assert!(l.abs() < 1e-6 && (r - 1.0).abs() < 1e-6);
    }

    #[test]
    fn power_is_constant_across_positions() {
        for i in 0..=20 {
            let (l, r) = Panner::new(-1.0 + i as f32 * 0.1).gains();
            assert!((l * l + r * r - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn out_of_range_is_clamped() {
        assert_eq!(Panner::new(7.0).pos(), 1.0);
        assert_eq!(Panner::new(f32::NAN).pos(), 0.0);
    }
}
