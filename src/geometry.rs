//! Great-circle geometry on the celestial sphere.

use crate::SkyPosition;

/// Angular distance in radians between two sky positions.
///
/// Haversine form; the intermediate is clamped to `[0, 1]` so coincident and
/// antipodal inputs never produce NaN.
pub fn great_circle_distance(a: SkyPosition, b: SkyPosition) -> f64 {
    let half_ddec = 0.5 * (b.dec - a.dec);
    let half_dra = 0.5 * (b.ra - a.ra);
    let h = half_ddec.sin().powi(2) + a.dec.cos() * b.dec.cos() * half_dra.sin().powi(2);
    2.0 * h.clamp(0.0, 1.0).sqrt().asin()
}
