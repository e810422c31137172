// ==========================================
// Roofline Engine - Currency Rounding
// ==========================================
// Rule: every currency value is rounded to cents at the point of
// computation, not only at final output, so repeated aggregation
// never accumulates floating-point drift.
// ==========================================

/// Round a currency or quantity value to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2_half_up() {
        assert_eq!(round2(1.005_000_1), 1.01);
        assert_eq!(round2(1.004), 1.0);
        assert_eq!(round2(-2.675), -2.68);
    }

    #[test]
    fn test_round2_already_rounded() {
        assert_eq!(round2(330.0), 330.0);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_round2_repeated_aggregation_is_stable() {
        // Summing many rounded values and re-rounding must not drift.
        let mut total = 0.0;
        for _ in 0..1000 {
            total = round2(total + round2(0.1));
        }
        assert_eq!(total, 100.0);
    }
}
