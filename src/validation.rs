//! Structural validation for tessellations.
//!
//! A tessellation read back from storage, or built by a custom backend, is
//! checked here before any query indexes into it.

use crate::Tessellation;
use rustc_hash::FxHashSet;

/// Detailed report of structural problems in a [`Tessellation`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TessellationReport {
    /// Number of cells (length of `points`).
    pub num_cells: usize,
    /// Lengths of `scene_ids`, `neighbors`, `polygons` when they differ from `num_cells`.
    pub length_mismatches: Vec<(&'static str, usize)>,

    /// Neighbor entries pointing past the last cell.
    pub out_of_range_neighbors: usize,
    /// Cells listing themselves as a neighbor.
    pub self_neighbors: usize,
    /// Directed adjacency entries `i -> j` without a matching `j -> i`.
    pub asymmetric_neighbors: usize,

    /// Rings whose last vertex is not the first.
    pub open_rings: usize,
    /// Rings with fewer than three distinct corners (only counted for 3+ cells).
    pub degenerate_rings: usize,

    /// Scene ids that occur in more than one cell.
    pub duplicate_scene_ids: usize,
}

impl TessellationReport {
    pub fn is_valid(&self) -> bool {
        self.length_mismatches.is_empty()
            && self.out_of_range_neighbors == 0
            && self.self_neighbors == 0
            && self.asymmetric_neighbors == 0
            && self.open_rings == 0
            && self.degenerate_rings == 0
            && self.duplicate_scene_ids == 0
    }

    pub fn summary(&self) -> String {
        let mut issues = Vec::new();

        for (field, len) in &self.length_mismatches {
            issues.push(format!("{field} has {len} entries (expected {})", self.num_cells));
        }
        if self.out_of_range_neighbors > 0 {
            issues.push(format!("{} out-of-range neighbors", self.out_of_range_neighbors));
        }
        if self.self_neighbors > 0 {
            issues.push(format!("{} self neighbors", self.self_neighbors));
        }
        if self.asymmetric_neighbors > 0 {
            issues.push(format!("{} one-way adjacencies", self.asymmetric_neighbors));
        }
        if self.open_rings > 0 {
            issues.push(format!("{} open rings", self.open_rings));
        }
        if self.degenerate_rings > 0 {
            issues.push(format!("{} degenerate rings", self.degenerate_rings));
        }
        if self.duplicate_scene_ids > 0 {
            issues.push(format!("{} duplicate scene ids", self.duplicate_scene_ids));
        }

        if issues.is_empty() {
            "Valid".to_string()
        } else {
            issues.join(", ")
        }
    }
}

impl std::fmt::Display for TessellationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TessellationReport {{ cells={}, {} }}",
            self.num_cells,
            self.summary()
        )
    }
}

/// Inspect a tessellation for parallel-array, adjacency and ring problems.
pub fn inspect(tessellation: &Tessellation) -> TessellationReport {
    let num_cells = tessellation.points.len();
    let mut report = TessellationReport {
        num_cells,
        ..Default::default()
    };

    for (field, len) in [
        ("scene_ids", tessellation.scene_ids.len()),
        ("neighbors", tessellation.neighbors.len()),
        ("polygons", tessellation.polygons.len()),
    ] {
        if len != num_cells {
            report.length_mismatches.push((field, len));
        }
    }

    let mut edges: FxHashSet<(usize, usize)> = FxHashSet::default();
    for (i, adj) in tessellation.neighbors.iter().enumerate() {
        for &j in adj {
            if j >= num_cells {
                report.out_of_range_neighbors += 1;
            } else if j == i {
                report.self_neighbors += 1;
            } else {
                edges.insert((i, j));
            }
        }
    }
    report.asymmetric_neighbors = edges
        .iter()
        .filter(|&&(i, j)| !edges.contains(&(j, i)))
        .count();

    for ring in &tessellation.polygons {
        if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
            if first != last {
                report.open_rings += 1;
            }
        }
        if num_cells >= 3 && ring.len() < 4 {
            report.degenerate_rings += 1;
        }
    }

    let mut ids = FxHashSet::default();
    report.duplicate_scene_ids = tessellation
        .scene_ids
        .iter()
        .filter(|id| !ids.insert(*id))
        .count();

    report
}
