//! Spherical Voronoi construction as a pluggable capability.
//!
//! The tessellation build only needs polygons, adjacency and the cell sites,
//! so any backend that can produce those from lon/lat degrees will do.

mod hull;

pub use hull::{ConvexHull, ConvexHullVoronoi};

use crate::{LonLat, Result};

/// Output of a Voronoi backend, index-aligned with the input sites.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoronoiCells {
    /// Closed ring of vertices per cell (first vertex repeated last).
    /// Empty when the backend dropped the site.
    pub polygons: Vec<Vec<LonLat>>,
    /// Indices of the Voronoi-adjacent sites per cell, ascending.
    pub neighbors: Vec<Vec<usize>>,
    /// The site each cell was built around.
    pub cell_points: Vec<LonLat>,
}

impl VoronoiCells {
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.cell_points.len()
    }

    /// Indices of cells the backend could not build a polygon for.
    pub fn dropped_cells(&self) -> Vec<usize> {
        self.polygons
            .iter()
            .enumerate()
            .filter(|(_, ring)| ring.is_empty())
            .map(|(i, _)| i)
            .collect()
    }
}

/// Computes a spherical Voronoi diagram over sites given as lon/lat degrees,
/// longitude in `(-180, 180]`.
pub trait VoronoiBackend {
    fn compute(&self, sites: &[LonLat]) -> Result<VoronoiCells>;
}
