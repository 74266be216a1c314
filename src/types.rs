//! Core value types: sky positions, identifiers and scene snapshots.

use chrono::{DateTime, Utc};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::fmt;

/// A position on the celestial sphere in radians.
///
/// Right ascension is expected in `[0, 2π)` and declination in `[-π/2, π/2]`.
/// Constructors do not normalize; use [`SkyPosition::normalized`] for that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyPosition {
    pub ra: f64,
    pub dec: f64,
}

impl SkyPosition {
    #[inline]
    pub const fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }

    /// Wrap right ascension into `[0, 2π)` and clamp declination to the poles.
    pub fn normalized(self) -> Self {
        let ra = wrap_ra(self.ra);
        let dec = self.dec.clamp(-PI / 2.0, PI / 2.0);
        Self { ra, dec }
    }

    /// Unit vector with +Z at the north celestial pole and +X at RA = 0.
    #[inline]
    pub fn to_unit_vector(self) -> DVec3 {
        let (sin_dec, cos_dec) = self.dec.sin_cos();
        let (sin_ra, cos_ra) = self.ra.sin_cos();
        DVec3::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec)
    }

    /// Inverse of [`to_unit_vector`](Self::to_unit_vector). The input is normalized first.
    pub fn from_unit_vector(v: DVec3) -> Self {
        let v = v.normalize_or_zero();
        let dec = v.z.clamp(-1.0, 1.0).asin();
        let ra = wrap_ra(v.y.atan2(v.x));
        Self { ra, dec }
    }

    /// Geographic-style coordinates in degrees, right ascension remapped to
    /// longitude in `(-180, 180]`.
    pub fn to_lon_lat(self) -> LonLat {
        let mut lon = self.ra.to_degrees().rem_euclid(360.0);
        if lon > 180.0 {
            lon -= 360.0;
        }
        LonLat {
            lon,
            lat: self.dec.to_degrees(),
        }
    }

    /// Inverse of [`to_lon_lat`](Self::to_lon_lat): negative longitudes map back to `[π, 2π)`.
    pub fn from_lon_lat(p: LonLat) -> Self {
        let mut lon = p.lon;
        if lon < 0.0 {
            lon += 360.0;
        }
        Self {
            ra: wrap_ra(lon.to_radians()),
            dec: p.lat.to_radians(),
        }
    }
}

/// `rem_euclid` can round up to exactly `2π`; fold that back to zero.
#[inline]
fn wrap_ra(ra: f64) -> f64 {
    let r = ra.rem_euclid(TAU);
    if r >= TAU {
        0.0
    } else {
        r
    }
}

/// Longitude/latitude pair in degrees, the input convention of the Voronoi backends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    #[inline]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    #[inline]
    pub fn to_unit_vector(self) -> DVec3 {
        SkyPosition::new(self.lon.to_radians(), self.lat.to_radians()).to_unit_vector()
    }

    pub fn from_unit_vector(v: DVec3) -> Self {
        SkyPosition::from_unit_vector(v).to_lon_lat()
    }
}

/// Unique id of a published scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(pub String);

impl SceneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SceneId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Id of the publishing handle that owns a scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandleId(pub String);

impl HandleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HandleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Read-only snapshot of a published scene, as far as ranking and
/// tessellation are concerned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    pub handle_id: HandleId,
    pub place: SkyPosition,
    pub creation_date: DateTime<Utc>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub impressions: u64,
}

impl Scene {
    /// Raw popularity before pool normalization: likes count double.
    #[inline]
    pub fn popularity(&self) -> f64 {
        2.0 * self.likes as f64 + self.impressions as f64
    }
}
