//! Greedy feed construction.
//!
//! The feed is built one scene at a time. Each step rescores the remaining
//! pool against the last placed scene and the per-handle counts so far, then
//! takes the best candidate. Inside the leading diversity window only handles
//! not yet in the feed are eligible; if none remain the feed ends there.

pub mod scoring;

use crate::geometry::great_circle_distance;
use crate::{HandleId, Scene};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use scoring::{ScoreWeights, TimeDecay};

/// Parameters for [`construct_feed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub weights: ScoreWeights,
    /// Leading positions that must each come from a handle not yet in the feed.
    pub first_n_distinct_handles: usize,
    /// Maximum feed length. `None` means the whole pool.
    pub size: Option<usize>,
    pub time_decay: TimeDecay,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            first_n_distinct_handles: 5,
            size: None,
            time_decay: TimeDecay::default(),
        }
    }
}

impl FeedConfig {
    pub fn validate(&self) -> crate::Result<()> {
        self.weights.validate()?;
        self.time_decay.validate()
    }
}

/// Per-candidate working record for one [`construct_feed`] call.
#[derive(Debug, Clone, Copy)]
pub struct FeedSortingItem<'a> {
    pub scene: &'a Scene,
    pub popularity: f64,
    pub time: f64,
    pub distance: f64,
    pub variety: f64,
}

impl<'a> FeedSortingItem<'a> {
    fn new(scene: &'a Scene, popularity: f64, time: f64) -> Self {
        Self {
            scene,
            popularity,
            time,
            distance: 0.0,
            variety: 0.0,
        }
    }

    /// Popularity and time only; used to pick the first scene.
    #[inline]
    pub fn intrinsic_score(&self, w: &ScoreWeights) -> f64 {
        w.popularity * self.popularity + w.time * self.time
    }

    #[inline]
    pub fn score(&self, w: &ScoreWeights) -> f64 {
        self.intrinsic_score(w) + w.distance * self.distance + w.variety * self.variety
    }
}

/// Order `scenes` into a feed.
///
/// If `initial` is given it takes position 0 and any scene with the same id
/// is removed from the pool. Returns an empty feed for an empty pool (or
/// `size == Some(0)`). The result may be shorter than `size` when the
/// diversity window runs out of unrepresented handles.
pub fn construct_feed<'a>(
    scenes: &'a [Scene],
    initial: Option<&'a Scene>,
    config: &FeedConfig,
    now: DateTime<Utc>,
) -> Vec<&'a Scene> {
    let limit = config.size.unwrap_or(usize::MAX);
    let weights = &config.weights;

    let candidates: Vec<&Scene> = scenes
        .iter()
        .filter(|s| initial.map_or(true, |seed| seed.id != s.id))
        .collect();
    let popularity = scoring::popularity_components(&candidates);
    let mut pool: Vec<FeedSortingItem<'a>> = candidates
        .iter()
        .zip(popularity)
        .map(|(&scene, pop)| {
            let time = config.time_decay.score_at(scene.creation_date, now);
            FeedSortingItem::new(scene, pop, time)
        })
        .collect();

    let mut feed: Vec<&'a Scene> = Vec::with_capacity(pool.len() + 1);
    let mut handle_counts: FxHashMap<&'a HandleId, usize> = FxHashMap::default();

    if limit == 0 {
        return feed;
    }

    match initial {
        Some(seed) => {
            feed.push(seed);
            *handle_counts.entry(&seed.handle_id).or_default() += 1;
        }
        None => {
            let Some(first) = best_intrinsic(&pool, weights) else {
                return feed;
            };
            let item = pool.remove(first);
            feed.push(item.scene);
            *handle_counts.entry(&item.scene.handle_id).or_default() += 1;
        }
    }

    while !pool.is_empty() && feed.len() < limit {
        let last = feed[feed.len() - 1].place;
        for item in pool.iter_mut() {
            let d = great_circle_distance(last, item.scene.place);
            item.distance = scoring::distance_component(d);
            let seen = handle_counts.get(&item.scene.handle_id).copied().unwrap_or(0);
            item.variety = scoring::variety_component(seen);
        }

        // stable sort keeps ties in a deterministic order
        pool.sort_by(|a, b| b.score(weights).total_cmp(&a.score(weights)));

        let pick = if feed.len() < config.first_n_distinct_handles {
            pool.iter()
                .position(|item| !handle_counts.contains_key(&item.scene.handle_id))
        } else {
            Some(0)
        };

        let Some(pick) = pick else {
            debug!(
                feed_len = feed.len(),
                remaining = pool.len(),
                "no unrepresented handle left inside the diversity window; ending feed"
            );
            break;
        };

        let item = pool.remove(pick);
        feed.push(item.scene);
        *handle_counts.entry(&item.scene.handle_id).or_default() += 1;
    }

    debug!(
        candidates = candidates.len(),
        feed_len = feed.len(),
        handles = handle_counts.len(),
        "constructed feed"
    );
    feed
}

/// Index of the highest intrinsic score; the earliest wins ties.
fn best_intrinsic(pool: &[FeedSortingItem<'_>], weights: &ScoreWeights) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, item) in pool.iter().enumerate() {
        let s = item.intrinsic_score(weights);
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SceneId, SkyPosition};
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn scene(id: &str, handle: &str, ra: f64, likes: u64, impressions: u64) -> Scene {
        Scene {
            id: SceneId::new(id),
            handle_id: HandleId::new(handle),
            place: SkyPosition::new(ra, 0.0),
            creation_date: now(),
            likes,
            impressions,
        }
    }

    fn ids(feed: &[&Scene]) -> Vec<String> {
        feed.iter().map(|s| s.id.to_string()).collect()
    }

    #[test]
    fn test_empty_pool() {
        let feed = construct_feed(&[], None, &FeedConfig::default(), now());
        assert!(feed.is_empty());
    }

    #[test]
    fn test_popular_scene_first() {
        let scenes = vec![scene("A", "ha", 0.0, 0, 0), scene("B", "hb", 0.0, 100, 50)];
        let feed = construct_feed(&scenes, None, &FeedConfig::default(), now());
        assert_eq!(ids(&feed), vec!["B", "A"]);
    }

    #[test]
    fn test_newer_scene_first_when_popularity_equal() {
        let mut old = scene("old", "h1", 0.0, 5, 5);
        old.creation_date = now() - Duration::days(10);
        let new = scene("new", "h2", 0.0, 5, 5);
        let scenes = vec![old, new];
        let feed = construct_feed(&scenes, None, &FeedConfig::default(), now());
        assert_eq!(feed[0].id.as_str(), "new");
    }

    #[test]
    fn test_seed_is_first_and_not_repeated() {
        let scenes = vec![
            scene("A", "ha", 0.0, 10, 0),
            scene("B", "hb", 0.3, 0, 0),
            scene("C", "hc", 0.6, 3, 0),
        ];
        let feed = construct_feed(&scenes, Some(&scenes[1]), &FeedConfig::default(), now());
        assert_eq!(feed.len(), 3);
        assert_eq!(feed[0].id.as_str(), "B");
        assert_eq!(feed.iter().filter(|s| s.id.as_str() == "B").count(), 1);
    }

    #[test]
    fn test_seed_counts_toward_handle_diversity() {
        let scenes = vec![scene("A", "ha", 0.0, 10, 0), scene("B", "ha", 0.2, 0, 0)];
        let feed = construct_feed(&scenes, Some(&scenes[1]), &FeedConfig::default(), now());
        // A shares the seed's handle and the window is still open
        assert_eq!(ids(&feed), vec!["B"]);
    }

    #[test]
    fn test_diversity_window_ends_feed_early() {
        let scenes = vec![
            scene("a1", "ha", 0.0, 10, 0),
            scene("a2", "ha", 0.2, 9, 0),
            scene("b1", "hb", 0.4, 1, 0),
        ];
        let feed = construct_feed(&scenes, None, &FeedConfig::default(), now());
        assert_eq!(ids(&feed), vec!["a1", "b1"]);
    }

    #[test]
    fn test_repeat_handles_allowed_after_window() {
        let scenes = vec![
            scene("a1", "ha", 0.0, 10, 0),
            scene("a2", "ha", 0.2, 9, 0),
            scene("b1", "hb", 0.4, 1, 0),
        ];
        let config = FeedConfig {
            first_n_distinct_handles: 2,
            ..Default::default()
        };
        let feed = construct_feed(&scenes, None, &config, now());
        assert_eq!(ids(&feed), vec!["a1", "b1", "a2"]);
    }

    #[test]
    fn test_size_bound() {
        let scenes: Vec<Scene> = (0..10)
            .map(|i| scene(&format!("s{i}"), &format!("h{i}"), i as f64 * 0.1, i, 0))
            .collect();
        let config = FeedConfig {
            size: Some(4),
            ..Default::default()
        };
        assert_eq!(construct_feed(&scenes, None, &config, now()).len(), 4);

        let config = FeedConfig {
            size: Some(0),
            ..Default::default()
        };
        assert!(construct_feed(&scenes, Some(&scenes[0]), &config, now()).is_empty());
    }

    #[test]
    fn test_distance_weight_prefers_moderate_separation() {
        let sweet_spot = (1.0 + 2f64.sqrt()) / 10.0;
        let scenes = vec![
            scene("seed", "h0", 0.0, 0, 0),
            scene("near", "h1", 0.001, 0, 0),
            scene("mid", "h2", sweet_spot, 0, 0),
            scene("far", "h3", 2.0, 0, 0),
        ];
        let config = FeedConfig {
            weights: ScoreWeights {
                time: 0.0,
                popularity: 0.0,
                distance: 1.0,
                variety: 0.0,
            },
            ..Default::default()
        };
        let feed = construct_feed(&scenes, Some(&scenes[0]), &config, now());
        assert_eq!(feed[1].id.as_str(), "mid");
    }

    #[test]
    fn test_best_intrinsic_first_wins_ties() {
        let a = scene("a", "h", 0.0, 0, 0);
        let b = scene("b", "h", 0.0, 0, 0);
        let pool = vec![
            FeedSortingItem::new(&a, 0.5, 0.5),
            FeedSortingItem::new(&b, 0.5, 0.5),
        ];
        assert_eq!(best_intrinsic(&pool, &ScoreWeights::default()), Some(0));
        assert_eq!(best_intrinsic(&[], &ScoreWeights::default()), None);
    }
}
