/// Average the bass-region scale samples into one surface zoom factor.
/// Each sample is clamped to >= 1, so the result never shrinks the surface.
pub fn estimate(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 1.0;
    }
    let sum: f32 = samples.iter().map(|&s| s.max(1.0)).sum();
    sum / samples.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_samples_leave_the_surface_alone() {
        assert_eq!(estimate(&[]), 1.0);
    }

    #[test]
    fn factor_is_the_mean_of_the_samples() {
        assert!((estimate(&[1.0, 1.2, 1.4, 1.6, 1.8]) - 1.4).abs() < 1e-6);
    }

    #[test]
    fn factor_never_drops_below_one() {
        assert_eq!(estimate(&[0.0, 0.5, 0.9]), 1.0);
        assert!(estimate(&[0.2, 2.0]) >= 1.0);
    }
}
