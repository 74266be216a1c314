//! Point location and neighborhood traversal over a built tessellation.
//!
//! All queries are read-only and may run concurrently against a shared
//! [`Tessellation`].

use super::Tessellation;
use crate::geometry::great_circle_distance;
use crate::{SceneId, SkyPosition};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Index of the cell whose point is nearest `target`, by greedy descent.
///
/// Starts at `hint` (or cell 0 when absent or out of range) and repeatedly
/// moves to the closest neighbor while that neighbor is strictly closer than
/// the current cell. On a proper Voronoi adjacency a local minimum is the
/// global one; for malformed adjacency the result is only a local minimum.
/// Returns `None` for an empty tessellation.
pub fn find_nearest_cell(
    tessellation: &Tessellation,
    target: SkyPosition,
    hint: Option<usize>,
) -> Option<usize> {
    if tessellation.is_empty() {
        return None;
    }

    let mut current = hint.filter(|&h| h < tessellation.len()).unwrap_or(0);
    let mut current_dist = great_circle_distance(tessellation.points[current], target);

    loop {
        let mut best = current;
        let mut best_dist = current_dist;
        for &j in tessellation.neighbors.get(current).into_iter().flatten() {
            let Some(&p) = tessellation.points.get(j) else {
                continue;
            };
            let d = great_circle_distance(p, target);
            if d < best_dist {
                best = j;
                best_dist = d;
            }
        }

        if best == current {
            return Some(current);
        }
        current = best;
        current_dist = best_dist;
    }
}

/// Like [`find_nearest_cell`], but `None` when the winning cell's point is
/// farther than `radius` radians from `target`.
pub fn find_nearest_cell_within(
    tessellation: &Tessellation,
    target: SkyPosition,
    radius: f64,
    hint: Option<usize>,
) -> Option<usize> {
    let cell = find_nearest_cell(tessellation, target, hint)?;
    (great_circle_distance(tessellation.points[cell], target) <= radius).then_some(cell)
}

/// Up to `count` scene ids around `scene_id` in breadth-first order over the
/// cell adjacency, starting with `scene_id` itself.
///
/// A scene outside the tessellation yields just itself.
pub fn nearby_scene_ids(
    scene_id: &SceneId,
    tessellation: &Tessellation,
    count: usize,
) -> Vec<SceneId> {
    if count == 0 {
        return Vec::new();
    }
    let Some(start) = tessellation.cell_of(scene_id) else {
        return vec![scene_id.clone()];
    };

    let mut out: Vec<SceneId> = Vec::with_capacity(count.min(tessellation.len()));
    let mut emitted: FxHashSet<&SceneId> = FxHashSet::default();
    let mut visited = vec![false; tessellation.len()];
    let mut queue = VecDeque::from([start]);
    visited[start] = true;

    while let Some(cell) = queue.pop_front() {
        let id = &tessellation.scene_ids[cell];
        if emitted.insert(id) {
            out.push(id.clone());
            if out.len() == count {
                break;
            }
        }
        for &next in tessellation.neighbors.get(cell).into_iter().flatten() {
            if next < visited.len() && !visited[next] {
                visited[next] = true;
                queue.push_back(next);
            }
        }
    }
    out
}
