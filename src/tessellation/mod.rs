//! Named tessellations of scene positions.
//!
//! A [`Tessellation`] stores one Voronoi cell per participating scene as
//! parallel arrays. It is rebuilt wholesale and never patched in place.

pub mod query;

use crate::geometry::great_circle_distance;
use crate::voronoi::{VoronoiBackend, VoronoiCells};
use crate::{validation, Error, LonLat, Result, Scene, SceneId, SkyPosition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use query::{find_nearest_cell, find_nearest_cell_within, nearby_scene_ids};

/// Name of the tessellation covering the whole sky.
pub const GLOBAL_TESSELLATION: &str = "global";

/// A spherical Voronoi decomposition of scene positions.
///
/// `points`, `scene_ids`, `neighbors` and `polygons` are index-aligned: entry
/// `i` of each describes the cell of scene `scene_ids[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tessellation {
    pub name: String,
    pub points: Vec<SkyPosition>,
    pub scene_ids: Vec<SceneId>,
    pub neighbors: Vec<Vec<usize>>,
    /// Closed rings of cell vertices.
    pub polygons: Vec<Vec<SkyPosition>>,
    pub last_updated: DateTime<Utc>,
}

impl Tessellation {
    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Cell index of a scene, if it takes part in this tessellation.
    pub fn cell_of(&self, scene_id: &SceneId) -> Option<usize> {
        self.scene_ids.iter().position(|id| id == scene_id)
    }

    /// Check the structural invariants; see [`validation::inspect`].
    pub fn validate(&self) -> Result<()> {
        let report = validation::inspect(self);
        if report.is_valid() {
            Ok(())
        } else {
            Err(Error::InconsistentTessellation(format!(
                "`{}`: {}",
                self.name,
                report.summary()
            )))
        }
    }
}

/// Settings for the global tessellation rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TessellationConfig {
    pub name: String,
    /// Minimum angular separation in radians between accepted scenes.
    pub min_separation: f64,
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self {
            name: GLOBAL_TESSELLATION.to_string(),
            min_separation: 0.02,
        }
    }
}

impl TessellationConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.min_separation.is_finite() || self.min_separation < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "min_separation must be a finite non-negative angle, got {}",
                self.min_separation
            )));
        }
        if self.name.is_empty() {
            return Err(Error::InvalidConfig("tessellation name is empty".into()));
        }
        Ok(())
    }
}

/// Build a tessellation over `scenes` using `backend`.
///
/// Fails with [`Error::DegenerateInput`] if the backend drops or collapses a
/// cell, which happens when positions coincide. The record is never returned
/// with mismatched arrays.
pub fn build_tessellation<B>(
    scenes: &[&Scene],
    name: &str,
    backend: &B,
    now: DateTime<Utc>,
) -> Result<Tessellation>
where
    B: VoronoiBackend + ?Sized,
{
    let sites: Vec<LonLat> = scenes.iter().map(|s| s.place.to_lon_lat()).collect();
    let cells = backend.compute(&sites)?;
    check_cells(&cells, sites.len())?;

    let tessellation = Tessellation {
        name: name.to_string(),
        points: cells
            .cell_points
            .iter()
            .map(|&p| SkyPosition::from_lon_lat(p))
            .collect(),
        scene_ids: scenes.iter().map(|s| s.id.clone()).collect(),
        neighbors: cells.neighbors,
        polygons: cells
            .polygons
            .iter()
            .map(|ring| ring.iter().map(|&v| SkyPosition::from_lon_lat(v)).collect())
            .collect(),
        last_updated: now,
    };
    tessellation.validate()?;

    debug!(name, cells = tessellation.len(), "built tessellation");
    Ok(tessellation)
}

fn check_cells(cells: &VoronoiCells, expected: usize) -> Result<()> {
    for (what, len) in [
        ("polygons", cells.polygons.len()),
        ("neighbors", cells.neighbors.len()),
        ("cell points", cells.cell_points.len()),
    ] {
        if len != expected {
            return Err(Error::DegenerateInput {
                cell: len.min(expected),
                message: format!("backend returned {len} {what} for {expected} sites"),
            });
        }
    }

    if expected >= 2 {
        let dropped = cells.dropped_cells();
        if let Some(&cell) = dropped.first() {
            return Err(Error::DegenerateInput {
                cell,
                message: format!(
                    "backend dropped cells {dropped:?}; the input likely has coincident positions"
                ),
            });
        }
    }

    if expected >= 3 {
        // closed ring: at least three corners plus the repeated first vertex
        if let Some((cell, ring)) = cells.polygons.iter().enumerate().find(|(_, r)| r.len() < 4) {
            return Err(Error::DegenerateInput {
                cell,
                message: format!(
                    "cell ring has {} vertices; the input likely has coincident positions",
                    ring.len()
                ),
            });
        }
    }
    Ok(())
}

/// Scenes in priority order, keeping each only if it is farther than
/// `min_separation` radians from every scene kept before it.
pub fn select_well_separated<'a, I>(scenes: I, min_separation: f64) -> Vec<&'a Scene>
where
    I: IntoIterator<Item = &'a Scene>,
{
    let mut accepted: Vec<&'a Scene> = Vec::new();
    for scene in scenes {
        let clear = accepted
            .iter()
            .all(|kept| great_circle_distance(kept.place, scene.place) > min_separation);
        if clear {
            accepted.push(scene);
        }
    }
    accepted
}

/// Filter `scenes` (most favored first) for separation and build the
/// tessellation named in `config`.
pub fn build_global_tessellation<B>(
    scenes: &[&Scene],
    config: &TessellationConfig,
    backend: &B,
    now: DateTime<Utc>,
) -> Result<Tessellation>
where
    B: VoronoiBackend + ?Sized,
{
    config.validate()?;
    let accepted = select_well_separated(scenes.iter().copied(), config.min_separation);
    info!(
        name = %config.name,
        candidates = scenes.len(),
        accepted = accepted.len(),
        min_separation = config.min_separation,
        "selected scenes for tessellation"
    );
    build_tessellation(&accepted, &config.name, backend, now)
}
