//! # Distribution Quality Tests
//!
//! Verifies that best-candidate output is actually blue noise: evenly
//! spread, with a larger typical nearest-neighbour spacing than plain
//! uniform random points.

use meadow_procedural::BestCandidateSampler;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Average nearest-neighbour distance of a point set.
fn average_nearest_neighbour(points: &[[f32; 2]]) -> f64 {
    let mut total = 0.0f64;
    for (i, p) in points.iter().enumerate() {
        let mut nearest = f32::INFINITY;
        for (j, q) in points.iter().enumerate() {
            if i == j {
                continue;
            }
            let dx = p[0] - q[0];
            let dy = p[1] - q[1];
            let d = dx * dx + dy * dy;
            if d < nearest {
                nearest = d;
            }
        }
        total += f64::from(nearest.sqrt());
    }
    total / points.len() as f64
}

/// Test: best-candidate spacing beats uniform random spacing.
#[test]
fn test_blue_noise_spacing_beats_uniform() {
    const COUNT: usize = 512;

    let blue = BestCandidateSampler::new(Some(42))
        .generate(COUNT, 20)
        .unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let uniform: Vec<[f32; 2]> = (0..COUNT)
        .map(|_| [rng.gen::<f32>(), rng.gen::<f32>()])
        .collect();

    let blue_nn = average_nearest_neighbour(&blue);
    let uniform_nn = average_nearest_neighbour(&uniform);

    println!("blue-noise avg NN:     {blue_nn:.5}");
    println!("uniform-random avg NN: {uniform_nn:.5}");

    assert!(
        blue_nn > uniform_nn * 1.2,
        "best-candidate spacing ({blue_nn:.5}) should clearly exceed \
         uniform-random spacing ({uniform_nn:.5})"
    );
}

/// Test: no point starves - the minimum pairwise gap stays reasonable.
#[test]
fn test_minimum_gap_not_degenerate() {
    const COUNT: usize = 256;

    let points = BestCandidateSampler::new(Some(7))
        .generate(COUNT, 20)
        .unwrap();

    let mut min_gap = f32::INFINITY;
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            let dx = points[i][0] - points[j][0];
            let dy = points[i][1] - points[j][1];
            min_gap = min_gap.min((dx * dx + dy * dy).sqrt());
        }
    }

    println!("minimum pairwise gap: {min_gap:.5}");

    // Uniform random points of this count routinely collide at ~1/n
    // spacing; blue noise should stay well above that.
    let threshold = 0.15 / (COUNT as f32).sqrt();
    assert!(
        min_gap > threshold,
        "minimum gap {min_gap:.5} below blue-noise threshold {threshold:.5}"
    );
}
