//! Property-based tests for the FFT engine.
//!
//! Checks agreement with the brute-force DFT and the algebraic identities a
//! Fourier transform must satisfy, using proptest for randomized input
//! generation.

use proptest::prelude::*;
use tonogram_core::{FftEngine, reference_dft};

/// Random signal of a random power-of-two length.
fn signal_strategy() -> impl Strategy<Value = Vec<f32>> {
    prop::sample::select(vec![32usize, 64, 128, 256])
        .prop_flat_map(|n| prop::collection::vec(-1.0f32..=1.0f32, n))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// For any signal, the engine agrees with the double-precision DFT
    /// within 2% per bin (plus a small absolute floor for near-empty bins).
    #[test]
    fn fft_matches_dft(window in signal_strategy()) {
        let mut engine = FftEngine::new(window.len()).unwrap();
        let spectrum = engine.transform(&window).unwrap();
        let reference = reference_dft(&window);

        for (k, (a, b)) in spectrum.iter().zip(reference.iter()).enumerate() {
            let err = (a - b).norm();
            let tol = 0.02 * b.norm() + 1e-2;
            prop_assert!(
                err <= tol,
                "size {} bin {}: engine {} vs dft {} (err {} > tol {})",
                window.len(), k, a, b, err, tol
            );
        }
    }

    /// The transform is linear: fft(a*x + b*y) = a*fft(x) + b*fft(y).
    #[test]
    fn fft_is_linear(
        x in prop::collection::vec(-1.0f32..=1.0f32, 128),
        y in prop::collection::vec(-1.0f32..=1.0f32, 128),
        a in -4.0f32..4.0f32,
        b in -4.0f32..4.0f32,
    ) {
        let mut engine = FftEngine::new(128).unwrap();

        let combined: Vec<f32> = x
            .iter()
            .zip(y.iter())
            .map(|(&xi, &yi)| a * xi + b * yi)
            .collect();

        let lhs = engine.transform(&combined).unwrap();
        let fx = engine.transform(&x).unwrap();
        let fy = engine.transform(&y).unwrap();

        for (k, bin) in lhs.iter().enumerate() {
            let rhs = a * fx[k] + b * fy[k];
            let err = (bin - rhs).norm();
            let tol = 1e-2 + 1e-3 * rhs.norm();
            prop_assert!(
                err <= tol,
                "bin {}: {} vs {} (err {} > tol {})",
                k, bin, rhs, err, tol
            );
        }
    }

    /// A constant signal carries all its energy in bin 0.
    #[test]
    fn dc_lands_in_bin_zero(level in -1.0f32..=1.0f32) {
        let mut engine = FftEngine::new(64).unwrap();
        let spectrum = engine.transform(&[level; 64]).unwrap();

        prop_assert!((spectrum[0].re - 64.0 * level).abs() < 1e-3);
        for bin in &spectrum[1..] {
            prop_assert!(bin.norm() < 1e-3, "nonzero bin {} for dc {}", bin, level);
        }
    }
}
