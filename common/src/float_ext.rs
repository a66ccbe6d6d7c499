pub trait FloatExt {
    fn approximately_eq(self, other: Self) -> bool;

    /// Equality within `tolerance` relative to the larger magnitude, falling
    /// back to an absolute comparison near zero.
    fn relative_eq(self, other: Self, tolerance: Self) -> bool;
}

impl FloatExt for f32 {
    fn approximately_eq(self, other: Self) -> bool {
        (self - other).abs() < crate::EPSILON as f32
    }

    fn relative_eq(self, other: Self, tolerance: Self) -> bool {
        let scale = self.abs().max(other.abs()).max(1.0);
        (self - other).abs() <= tolerance * scale
    }
}

impl FloatExt for f64 {
    fn approximately_eq(self, other: Self) -> bool {
        (self - other).abs() < crate::EPSILON
    }

    fn relative_eq(self, other: Self, tolerance: Self) -> bool {
        let scale = self.abs().max(other.abs()).max(1.0);
        (self - other).abs() <= tolerance * scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f64_approximately_eq() {
        assert!(1.0_f64.approximately_eq(1.0));
        assert!((0.1_f64 + 0.2_f64).approximately_eq(0.3));
        assert!(!1.0_f64.approximately_eq(1.0001));
    }

    #[test]
    fn relative_eq_scales_with_magnitude() {
        assert!(1.0e6_f64.relative_eq(1.0e6 + 0.5, 1e-6));
        assert!(!1.0e6_f64.relative_eq(1.0e6 + 5.0, 1e-6));
        assert!(1e-12_f64.relative_eq(0.0, 1e-9));
    }

    #[test]
    fn nan_is_never_equal() {
        assert!(!f64::NAN.approximately_eq(f64::NAN));
        assert!(!f64::NAN.relative_eq(f64::NAN, 1.0));
    }
}
