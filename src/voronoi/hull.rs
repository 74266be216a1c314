//! Spherical Voronoi diagrams via convex hull duality.
//!
//! For sites on the unit sphere every facet of their 3D convex hull is a
//! Delaunay triangle, and its outward normal is the Voronoi vertex shared by
//! the three cells. Site sets that do not span a volume (two sites, or all
//! sites on a single plane) are handled separately.

use super::{VoronoiBackend, VoronoiCells};
use crate::{LonLat, Result};
use glam::DVec3;
use rustc_hash::FxHashSet;
use std::f64::consts::TAU;
use tracing::debug;

/// Signed distances below this count as lying on a facet plane.
const PLANE_EPS: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
struct Facet {
    indices: [usize; 3],
    normal: DVec3,
    offset: f64,
    alive: bool,
}

impl Facet {
    fn new(points: &[DVec3], indices: [usize; 3]) -> Self {
        let [a, b, c] = indices.map(|i| points[i]);
        let normal = (b - a).cross(c - a).normalize_or_zero();
        Self {
            indices,
            normal,
            offset: normal.dot(a),
            alive: true,
        }
    }

    #[inline]
    fn height(&self, p: DVec3) -> f64 {
        self.normal.dot(p) - self.offset
    }

    #[inline]
    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.indices;
        [(a, b), (b, c), (c, a)]
    }
}

/// A triangulated 3D convex hull, facets wound counter-clockwise seen from outside.
#[derive(Debug, Clone)]
pub struct ConvexHull {
    pub facets: Vec<[usize; 3]>,
    /// Outward unit normal per facet.
    pub normals: Vec<DVec3>,
}

impl ConvexHull {
    /// Incremental hull of `points`, inserted in index order.
    ///
    /// Returns `None` when the points do not span a volume (fewer than four,
    /// or all on one plane). A point inside or on the hull built so far is
    /// skipped and ends up on no facet.
    pub fn compute(points: &[DVec3]) -> Option<Self> {
        let simplex = initial_simplex(points)?;
        let interior = simplex.iter().map(|&i| points[i]).sum::<DVec3>() / 4.0;

        let mut facets: Vec<Facet> = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]]
            .into_iter()
            .map(|tri| {
                let mut indices = tri.map(|k| simplex[k]);
                if Facet::new(points, indices).height(interior) > 0.0 {
                    indices.swap(1, 2);
                }
                Facet::new(points, indices)
            })
            .collect();

        let mut visible_edges: FxHashSet<(usize, usize)> = FxHashSet::default();
        let mut horizon: Vec<(usize, usize)> = Vec::new();

        for (i, &p) in points.iter().enumerate() {
            if simplex.contains(&i) {
                continue;
            }

            visible_edges.clear();
            for facet in facets.iter_mut() {
                if facet.height(p) > PLANE_EPS {
                    facet.alive = false;
                    visible_edges.extend(facet.edges());
                }
            }
            if visible_edges.is_empty() {
                continue;
            }

            horizon.clear();
            horizon.extend(
                visible_edges
                    .iter()
                    .filter(|&&(a, b)| !visible_edges.contains(&(b, a)))
                    .copied(),
            );
            horizon.sort_unstable();

            facets.retain(|f| f.alive);
            for &(a, b) in &horizon {
                facets.push(Facet::new(points, [a, b, i]));
            }
        }

        Some(Self {
            facets: facets.iter().map(|f| f.indices).collect(),
            normals: facets.iter().map(|f| f.normal).collect(),
        })
    }
}

/// Four points spanning a tetrahedron, starting from point 0.
fn initial_simplex(points: &[DVec3]) -> Option<[usize; 4]> {
    if points.len() < 4 {
        return None;
    }
    let p0 = points[0];
    let i1 = argmax(points, PLANE_EPS * PLANE_EPS, |p| (p - p0).length_squared())?;
    let dir = (points[i1] - p0).normalize();
    let i2 = argmax(points, PLANE_EPS * PLANE_EPS, |p| {
        (p - p0).cross(dir).length_squared()
    })?;
    let normal = (points[i1] - p0).cross(points[i2] - p0).normalize();
    let i3 = argmax(points, PLANE_EPS, |p| normal.dot(p - p0).abs())?;
    Some([0, i1, i2, i3])
}

fn argmax(points: &[DVec3], min: f64, f: impl Fn(DVec3) -> f64) -> Option<usize> {
    let mut best = None;
    let mut best_value = min;
    for (i, &p) in points.iter().enumerate() {
        let v = f(p);
        if v > best_value {
            best_value = v;
            best = Some(i);
        }
    }
    best
}

/// Angle of `point` in the tangent plane at `generator`, increasing
/// counter-clockwise when viewed from outside the sphere.
fn angle_in_tangent_plane(generator: DVec3, point: DVec3) -> f64 {
    let up = if generator.y.abs() < 0.9 {
        DVec3::Y
    } else {
        DVec3::X
    };

    let tangent_x = generator.cross(up).normalize();
    let tangent_y = generator.cross(tangent_x).normalize();

    let to_point = point - generator * generator.dot(point);
    to_point.dot(tangent_y).atan2(to_point.dot(tangent_x))
}

fn order_ccw(generator: DVec3, ring: &mut [DVec3]) {
    ring.sort_by(|a, b| {
        angle_in_tangent_plane(generator, *a).total_cmp(&angle_in_tangent_plane(generator, *b))
    });
}

/// Drop consecutive vertices closer than `tolerance` (chord length), including
/// the wrap from last to first. Co-circular sites produce such repeats.
fn merge_close(ring: &mut Vec<DVec3>, tolerance: f64) {
    let tol_sq = tolerance * tolerance;
    ring.dedup_by(|b, a| (*a - *b).length_squared() < tol_sq);
    while ring.len() > 1 && (ring[0] - ring[ring.len() - 1]).length_squared() < tol_sq {
        ring.pop();
    }
}

/// Voronoi backend built on [`ConvexHull`].
#[derive(Debug, Clone, Copy)]
pub struct ConvexHullVoronoi {
    /// Sites whose unit vectors are closer than this chord length are
    /// coincident; only the first of them gets a cell.
    pub coincident_tolerance: f64,
}

impl Default for ConvexHullVoronoi {
    fn default() -> Self {
        Self {
            coincident_tolerance: 1e-9,
        }
    }
}

impl ConvexHullVoronoi {
    fn unique_sites(&self, points: &[DVec3]) -> Vec<usize> {
        let tol_sq = self.coincident_tolerance * self.coincident_tolerance;
        let mut kept: Vec<usize> = Vec::with_capacity(points.len());
        for (i, &p) in points.iter().enumerate() {
            if kept
                .iter()
                .all(|&k| (points[k] - p).length_squared() >= tol_sq)
            {
                kept.push(i);
            }
        }
        kept
    }

    fn hull_cells(
        &self,
        points: &[DVec3],
        hull: &ConvexHull,
    ) -> (Vec<Vec<DVec3>>, Vec<Vec<usize>>) {
        let n = points.len();
        let mut rings: Vec<Vec<DVec3>> = vec![Vec::new(); n];
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];

        for (facet, tri) in hull.facets.iter().enumerate() {
            for k in 0..3 {
                let i = tri[k];
                rings[i].push(hull.normals[facet]);
                adjacency[i].push(tri[(k + 1) % 3]);
                adjacency[i].push(tri[(k + 2) % 3]);
            }
        }

        for (i, ring) in rings.iter_mut().enumerate() {
            order_ccw(points[i], ring);
            merge_close(ring, self.coincident_tolerance);
        }
        for adj in adjacency.iter_mut() {
            adj.sort_unstable();
            adj.dedup();
        }
        (rings, adjacency)
    }

    /// Sites on one plane: every cell is a lune between the two poles of the
    /// plane, bounded by the bisectors with its circular neighbors.
    fn planar_cells(&self, points: &[DVec3]) -> (Vec<Vec<DVec3>>, Vec<Vec<usize>>) {
        let n = points.len();
        let a = points[0];
        let far = argmax(points, 0.0, |p| (p - a).length_squared()).unwrap_or(0);
        let dir = points[far] - a;
        let mut normal = points
            .iter()
            .map(|&p| dir.cross(p - a))
            .max_by(|x, y| x.length_squared().total_cmp(&y.length_squared()))
            .unwrap_or(DVec3::Z)
            .normalize_or_zero();
        if normal == DVec3::ZERO {
            normal = DVec3::Z;
        }
        if normal.dot(a) < 0.0 {
            normal = -normal;
        }

        let center = normal * normal.dot(a);
        let radius = (a - center).length();
        let tangent_x = (a - center).normalize();
        let tangent_y = normal.cross(tangent_x);
        let theta: Vec<f64> = points
            .iter()
            .map(|&p| {
                let d = p - center;
                d.dot(tangent_y).atan2(d.dot(tangent_x)).rem_euclid(TAU)
            })
            .collect();

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&x, &y| theta[x].total_cmp(&theta[y]));

        let on_circle = |phi: f64| {
            (center + radius * (phi.cos() * tangent_x + phi.sin() * tangent_y)).normalize()
        };
        let midpoint = |from: usize, to: usize| {
            let gap = (theta[to] - theta[from]).rem_euclid(TAU);
            on_circle(theta[from] + 0.5 * gap)
        };

        let mut rings = vec![Vec::new(); n];
        let mut adjacency = vec![Vec::new(); n];
        for k in 0..n {
            let i = order[k];
            let next = order[(k + 1) % n];
            let prev = order[(k + n - 1) % n];

            let mut ring = vec![normal, midpoint(i, next), -normal, midpoint(prev, i)];
            order_ccw(points[i], &mut ring);
            rings[i] = ring;

            let mut adj = vec![prev, next];
            adj.sort_unstable();
            adj.dedup();
            adjacency[i] = adj;
        }
        (rings, adjacency)
    }
}

/// Two sites split the sphere into hemispheres along their bisector.
fn hemisphere_cells(p0: DVec3, p1: DVec3) -> [Vec<DVec3>; 2] {
    let axis = (p0 - p1).normalize();
    let up = if axis.x.abs() < 0.9 {
        DVec3::X
    } else {
        DVec3::Y
    };
    let u = axis.cross(up).normalize();
    let w = axis.cross(u);

    let mut r0 = vec![u, w, -u, -w];
    let mut r1 = r0.clone();
    order_ccw(p0, &mut r0);
    order_ccw(p1, &mut r1);
    [r0, r1]
}

fn to_closed_lon_lat(ring: &[DVec3]) -> Vec<LonLat> {
    let mut out: Vec<LonLat> = ring.iter().map(|&v| LonLat::from_unit_vector(v)).collect();
    if let Some(&first) = out.first() {
        out.push(first);
    }
    out
}

impl VoronoiBackend for ConvexHullVoronoi {
    fn compute(&self, sites: &[LonLat]) -> Result<VoronoiCells> {
        let n = sites.len();
        let points: Vec<DVec3> = sites.iter().map(|s| s.to_unit_vector()).collect();
        let unique = self.unique_sites(&points);

        let mut rings: Vec<Vec<DVec3>> = vec![Vec::new(); n];
        let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n];

        match unique.len() {
            0 | 1 => {}
            2 => {
                let (i, j) = (unique[0], unique[1]);
                let [r0, r1] = hemisphere_cells(points[i], points[j]);
                rings[i] = r0;
                rings[j] = r1;
                neighbors[i] = vec![j];
                neighbors[j] = vec![i];
            }
            _ => {
                let kept: Vec<DVec3> = unique.iter().map(|&i| points[i]).collect();
                let (kept_rings, kept_adjacency) = match ConvexHull::compute(&kept) {
                    Some(hull) => self.hull_cells(&kept, &hull),
                    None => {
                        debug!(sites = kept.len(), "sites are coplanar; building lune cells");
                        self.planar_cells(&kept)
                    }
                };
                // `unique` is ascending, so mapped neighbor lists stay sorted
                for (k, &i) in unique.iter().enumerate() {
                    rings[i] = kept_rings[k].clone();
                    neighbors[i] = kept_adjacency[k].iter().map(|&j| unique[j]).collect();
                }
            }
        }

        if unique.len() < n {
            debug!(
                sites = n,
                coincident = n - unique.len(),
                "coincident sites dropped from the diagram"
            );
        }

        Ok(VoronoiCells {
            polygons: rings.iter().map(|r| to_closed_lon_lat(r)).collect(),
            neighbors,
            cell_points: sites.to_vec(),
        })
    }
}
