#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skyfeed::{HandleId, Scene, SceneId, SkyPosition};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Fixed clock for tests.
pub fn test_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Positions uniformly distributed over the sky.
pub fn random_sky_positions(n: usize, seed: u64) -> Vec<SkyPosition> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    random_sky_positions_with_rng(n, &mut rng)
}

pub fn random_sky_positions_with_rng<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<SkyPosition> {
    (0..n)
        .map(|_| {
            let z: f64 = rng.gen_range(-1.0..1.0);
            let ra: f64 = rng.gen_range(0.0..TAU);
            SkyPosition::new(ra, z.asin())
        })
        .collect()
}

/// Fibonacci-lattice positions (more uniform than random), with optional
/// jitter in radians.
pub fn fibonacci_sky_positions(n: usize, jitter: f64, seed: u64) -> Vec<SkyPosition> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let golden_angle = PI * (3.0 - 5.0f64.sqrt());

    (0..n)
        .map(|i| {
            let z = 1.0 - (2.0 * i as f64 + 1.0) / n as f64;
            let mut ra = golden_angle * i as f64;
            let mut dec = z.asin();

            if jitter > 0.0 {
                ra += rng.gen_range(-jitter..jitter);
                dec = (dec + rng.gen_range(-jitter..jitter)).clamp(-FRAC_PI_2, FRAC_PI_2);
            }

            SkyPosition::new(ra, dec).normalized()
        })
        .collect()
}

/// Positions on the celestial equator; every site is coplanar.
pub fn equator_positions(n: usize) -> Vec<SkyPosition> {
    (0..n)
        .map(|i| SkyPosition::new(TAU * i as f64 / n as f64, 0.0))
        .collect()
}

/// Positions clustered within `cap_radius` of the north celestial pole,
/// plus five anchors on the other coordinate axes.
pub fn clustered_cap_positions(n: usize, cap_radius: f64, seed: u64) -> Vec<SkyPosition> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n_anchors = 5;

    let mut positions = vec![
        SkyPosition::new(0.0, 0.0),
        SkyPosition::new(FRAC_PI_2, 0.0),
        SkyPosition::new(PI, 0.0),
        SkyPosition::new(3.0 * FRAC_PI_2, 0.0),
        SkyPosition::new(0.0, -FRAC_PI_2),
    ];

    for _ in 0..n.saturating_sub(n_anchors) {
        let u: f64 = rng.gen();
        let cos_max = cap_radius.cos();
        let cos_theta = 1.0 - u * (1.0 - cos_max);
        let ra: f64 = rng.gen_range(0.0..TAU);
        positions.push(SkyPosition::new(ra, FRAC_PI_2 - cos_theta.acos()));
    }
    positions
}

/// One scene per position, with ids `s0`, `s1`, ... and `handles` handles
/// assigned round-robin. Counters and ages (up to 60 days) are random.
pub fn scenes_at(positions: &[SkyPosition], handles: usize, seed: u64) -> Vec<Scene> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let now = test_now();
    positions
        .iter()
        .enumerate()
        .map(|(i, &place)| Scene {
            id: SceneId::new(format!("s{i}")),
            handle_id: HandleId::new(format!("h{}", i % handles.max(1))),
            place,
            creation_date: now - Duration::minutes(rng.gen_range(0..60 * 24 * 60)),
            likes: rng.gen_range(0..200),
            impressions: rng.gen_range(0..5_000),
        })
        .collect()
}

/// Brute-force nearest point index, first index on ties.
pub fn brute_force_nearest(points: &[SkyPosition], target: SkyPosition) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &p) in points.iter().enumerate() {
        let d = skyfeed::geometry::great_circle_distance(p, target);
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}
