//! Scheduled rebuilds and store-backed lookups.
//!
//! A scheduler calls the two `rebuild_*` jobs on a fixed cadence, one at a
//! time; read paths only use the lookups, which never write.

use crate::feed::{construct_feed, FeedConfig};
use crate::store::{FeedStore, SceneSource, TessellationStore};
use crate::tessellation::{
    build_global_tessellation, find_nearest_cell, find_nearest_cell_within, nearby_scene_ids,
    Tessellation, TessellationConfig,
};
use crate::voronoi::VoronoiBackend;
use crate::{Error, Result, Scene, SceneId, SkyPosition};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use std::cmp::Reverse;
use tracing::{info, warn};

/// Recompute the home feed and replace the stored order.
///
/// `seed` pins a scene (e.g. the day's featured scene) to the top. An id not
/// in the store is logged and ignored.
pub fn rebuild_home_feed<S>(
    store: &mut S,
    seed: Option<&SceneId>,
    config: &FeedConfig,
    now: DateTime<Utc>,
) -> Result<Vec<SceneId>>
where
    S: SceneSource + FeedStore + ?Sized,
{
    config.validate()?;
    let scenes = store.load_scenes()?;

    let seed_scene = seed.and_then(|id| {
        let found = scenes.iter().find(|s| &s.id == id);
        if found.is_none() {
            warn!(seed = %id, "seed scene not found; building unseeded feed");
        }
        found
    });

    let feed = construct_feed(&scenes, seed_scene, config, now);
    let order: Vec<SceneId> = feed.iter().map(|s| s.id.clone()).collect();
    store.replace_feed_order(&order)?;

    info!(
        scenes = scenes.len(),
        feed_len = order.len(),
        seeded = seed_scene.is_some(),
        "rebuilt home feed"
    );
    Ok(order)
}

/// Rebuild the tessellation named in `config` and replace it in the store.
///
/// Scenes are prioritized by their current feed position, then (for scenes
/// outside the feed) newest first, so better-placed scenes win the
/// minimum-separation filter.
pub fn rebuild_global_tessellation<S, B>(
    store: &mut S,
    config: &TessellationConfig,
    backend: &B,
    now: DateTime<Utc>,
) -> Result<Tessellation>
where
    S: SceneSource + FeedStore + TessellationStore + ?Sized,
    B: VoronoiBackend + ?Sized,
{
    let scenes = store.load_scenes()?;
    let order = store.feed_order()?;
    let prioritized = by_feed_priority(&scenes, &order);

    let tessellation = build_global_tessellation(&prioritized, config, backend, now)?;
    store.replace_tessellation(&tessellation)?;

    info!(
        name = %tessellation.name,
        cells = tessellation.len(),
        "rebuilt tessellation"
    );
    Ok(tessellation)
}

fn by_feed_priority<'a>(scenes: &'a [Scene], order: &[SceneId]) -> Vec<&'a Scene> {
    let position: FxHashMap<&SceneId, usize> =
        order.iter().enumerate().map(|(i, id)| (id, i)).collect();

    let key = |s: &'a Scene| {
        (
            position.get(&s.id).copied().unwrap_or(usize::MAX),
            Reverse(s.creation_date),
            &s.id,
        )
    };

    let mut prioritized: Vec<&'a Scene> = scenes.iter().collect();
    prioritized.sort_by(|x, y| key(*x).cmp(&key(*y)));
    prioritized
}

fn load_required<S>(store: &S, name: &str) -> Result<Tessellation>
where
    S: TessellationStore + ?Sized,
{
    let tessellation = store
        .load_tessellation(name)?
        .ok_or_else(|| Error::TessellationNotFound(name.to_string()))?;
    tessellation.validate()?;
    Ok(tessellation)
}

/// Scene whose cell is nearest `target` in the named tessellation.
///
/// With a `radius`, a nearest cell farther than that is no match.
pub fn lookup_nearest_scene<S>(
    store: &S,
    name: &str,
    target: SkyPosition,
    radius: Option<f64>,
) -> Result<Option<SceneId>>
where
    S: TessellationStore + ?Sized,
{
    let tessellation = load_required(store, name)?;
    let cell = match radius {
        Some(r) => find_nearest_cell_within(&tessellation, target, r, None),
        None => find_nearest_cell(&tessellation, target, None),
    };
    Ok(cell.map(|i| tessellation.scene_ids[i].clone()))
}

/// Spatially local feed around `scene_id` in the named tessellation.
pub fn nearby_feed<S>(
    store: &S,
    name: &str,
    scene_id: &SceneId,
    count: usize,
) -> Result<Vec<SceneId>>
where
    S: TessellationStore + ?Sized,
{
    let tessellation = load_required(store, name)?;
    Ok(nearby_scene_ids(scene_id, &tessellation, count))
}
