//! Home-feed ranking and sky tessellation for a scene-sharing service.
//!
//! Two batch jobs keep derived data fresh:
//!
//! - [`jobs::rebuild_home_feed`] greedily orders all scenes by popularity,
//!   recency, sky distance from the previous pick and per-handle variety.
//! - [`jobs::rebuild_global_tessellation`] picks well-separated scenes and
//!   computes a spherical Voronoi tessellation of their positions, used for
//!   "what's near this point" lookups and spatially local feeds.
//!
//! # Example
//!
//! ```
//! use skyfeed::tessellation::{build_tessellation, find_nearest_cell};
//! use skyfeed::voronoi::ConvexHullVoronoi;
//! use skyfeed::{HandleId, Scene, SceneId, SkyPosition};
//! use chrono::Utc;
//!
//! let scene = |id: &str, ra: f64, dec: f64| Scene {
//!     id: SceneId::new(id),
//!     handle_id: HandleId::new("h"),
//!     place: SkyPosition::new(ra, dec),
//!     creation_date: Utc::now(),
//!     likes: 0,
//!     impressions: 0,
//! };
//! let scenes = [scene("a", 0.0, 0.0), scene("b", 1.0, 0.0), scene("c", 0.0, 1.0)];
//! let refs: Vec<&Scene> = scenes.iter().collect();
//!
//! let tess = build_tessellation(&refs, "demo", &ConvexHullVoronoi::default(), Utc::now())?;
//! assert_eq!(find_nearest_cell(&tess, SkyPosition::new(0.001, 0.001), None), Some(0));
//! # Ok::<(), skyfeed::Error>(())
//! ```

pub mod config;
mod error;
pub mod feed;
pub mod geometry;
pub mod jobs;
pub mod store;
pub mod tessellation;
mod types;
pub mod validation;
pub mod voronoi;

pub use config::Config;
pub use error::{Error, Result};
pub use feed::{construct_feed, FeedConfig};
pub use tessellation::{Tessellation, TessellationConfig};
pub use types::{HandleId, LonLat, Scene, SceneId, SkyPosition};
