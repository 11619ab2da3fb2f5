use rand::Rng;

/// Inverse-CDF sample of the stretch factor for a uniform draw `u` in `[0, 1)`.
///
/// The result follows `g(z) ∝ 1/√z` on `[1/a, a]`.
pub fn sample_z(scale: f64, u: f64) -> f64 {
    let root = (scale - 1.0) * u + 1.0;
    root * root / scale
}

/// Draws a stretch factor using `rng` as the uniform source.
pub fn draw_z<R: Rng + ?Sized>(scale: f64, rng: &mut R) -> f64 {
    sample_z(scale, rng.gen::<f64>())
}

/// Cumulative distribution of the stretch factor, clamped outside `[1/a, a]`.
pub fn z_cdf(scale: f64, z: f64) -> f64 {
    if z <= 1.0 / scale {
        0.0
    } else if z >= scale {
        1.0
    } else {
        ((scale * z).sqrt() - 1.0) / (scale - 1.0)
    }
}

/// Normalized density of the stretch factor; zero outside `[1/a, a]`.
pub fn z_density(scale: f64, z: f64) -> f64 {
    if z < 1.0 / scale || z > scale {
        0.0
    } else {
        scale.sqrt() / (2.0 * (scale - 1.0) * z.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use stretch_core::RngHandle;

    #[test]
    fn endpoints_map_to_support_bounds() {
        assert!((sample_z(2.0, 0.0) - 0.5).abs() < 1e-15);
        assert!((sample_z(3.0, 0.0) - 1.0 / 3.0).abs() < 1e-15);
        assert!((sample_z(2.0, 1.0) - 2.0).abs() < 1e-15);
    }

    #[test]
    fn cdf_inverts_sampler() {
        for &scale in &[1.5, 2.0, 4.0] {
            for step in 0..10 {
                let u = step as f64 / 10.0;
                let z = sample_z(scale, u);
                assert!((z_cdf(scale, z) - u).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn empirical_histogram_matches_density() {
        const DRAWS: usize = 200_000;
        const BINS: usize = 20;
        for &scale in &[1.5f64, 2.0, 3.5] {
            let mut rng = RngHandle::from_seed(0x5EED ^ scale.to_bits());
            let lower = 1.0 / scale;
            let width = (scale - lower) / BINS as f64;
            let mut counts = [0usize; BINS];
            for _ in 0..DRAWS {
                let z = draw_z(scale, &mut rng);
                let bin = (((z - lower) / width) as usize).min(BINS - 1);
                counts[bin] += 1;
            }
            for (bin, &count) in counts.iter().enumerate() {
                let lo = lower + bin as f64 * width;
                let hi = lo + width;
                let expected = z_cdf(scale, hi) - z_cdf(scale, lo);
                let observed = count as f64 / DRAWS as f64;
                assert!(
                    (observed - expected).abs() < 0.004,
                    "a={scale} bin {bin}: observed {observed}, expected {expected}"
                );
                // Midpoint rule against the density itself.
                let mid = 0.5 * (lo + hi);
                let approx = z_density(scale, mid) * width;
                assert!((approx - expected).abs() < 0.01);
            }
        }
    }

    proptest! {
        #[test]
        fn samples_stay_in_support(scale in 1.0001f64..10.0, u in 0.0f64..1.0) {
            let z = sample_z(scale, u);
            prop_assert!(z >= 1.0 / scale - 1e-12);
            prop_assert!(z <= scale + 1e-12);
        }
    }
}
