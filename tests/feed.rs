mod support;

use rustc_hash::FxHashSet;
use skyfeed::{construct_feed, FeedConfig, HandleId, Scene, SceneId, SkyPosition};
use support::points::{fibonacci_sky_positions, random_sky_positions, scenes_at, test_now};

fn ids(feed: &[&Scene]) -> Vec<String> {
    feed.iter().map(|s| s.id.to_string()).collect()
}

#[test]
fn test_feed_is_deterministic() {
    let scenes = scenes_at(&random_sky_positions(120, 7), 12, 7);
    let config = FeedConfig::default();

    let a = construct_feed(&scenes, None, &config, test_now());
    let b = construct_feed(&scenes, None, &config, test_now());
    assert_eq!(ids(&a), ids(&b));
}

#[test]
fn test_feed_is_a_permutation_without_size() {
    let scenes = scenes_at(&fibonacci_sky_positions(200, 0.01, 3), 20, 3);
    let feed = construct_feed(&scenes, None, &FeedConfig::default(), test_now());

    assert_eq!(feed.len(), scenes.len());
    let unique: FxHashSet<&SceneId> = feed.iter().map(|s| &s.id).collect();
    assert_eq!(unique.len(), scenes.len());
}

#[test]
fn test_first_handles_are_distinct() {
    let scenes = scenes_at(&random_sky_positions(150, 11), 9, 11);
    let config = FeedConfig::default();
    let feed = construct_feed(&scenes, None, &config, test_now());

    let window = &feed[..config.first_n_distinct_handles];
    let handles: FxHashSet<&HandleId> = window.iter().map(|s| &s.handle_id).collect();
    assert_eq!(handles.len(), window.len());
}

#[test]
fn test_too_few_handles_ends_inside_window() {
    let scenes = scenes_at(&random_sky_positions(40, 5), 3, 5);
    let feed = construct_feed(&scenes, None, &FeedConfig::default(), test_now());
    assert_eq!(feed.len(), 3);
}

#[test]
fn test_size_bounds_feed() {
    let scenes = scenes_at(&random_sky_positions(80, 9), 10, 9);
    for size in [0, 1, 5, 17, 1000] {
        let config = FeedConfig {
            size: Some(size),
            ..Default::default()
        };
        let feed = construct_feed(&scenes, None, &config, test_now());
        assert_eq!(feed.len(), size.min(scenes.len()), "size {size}");
    }
}

#[test]
fn test_size_prefix_matches_unbounded_feed() {
    let scenes = scenes_at(&random_sky_positions(60, 21), 8, 21);
    let full = construct_feed(&scenes, None, &FeedConfig::default(), test_now());
    let config = FeedConfig {
        size: Some(25),
        ..Default::default()
    };
    let short = construct_feed(&scenes, None, &config, test_now());
    assert_eq!(ids(&short), ids(&full[..25]));
}

#[test]
fn test_seed_leads_and_is_not_repeated() {
    let scenes = scenes_at(&random_sky_positions(50, 13), 10, 13);
    let seed = scenes[17].clone();
    let feed = construct_feed(&scenes, Some(&seed), &FeedConfig::default(), test_now());

    assert_eq!(feed[0].id, seed.id);
    assert_eq!(feed.iter().filter(|s| s.id == seed.id).count(), 1);
    assert_eq!(feed.len(), scenes.len());
}

#[test]
fn test_seed_outside_pool_is_prepended() {
    let scenes = scenes_at(&random_sky_positions(20, 2), 5, 2);
    let featured = Scene {
        id: SceneId::new("featured"),
        handle_id: HandleId::new("editors"),
        place: SkyPosition::new(1.0, 0.2),
        creation_date: test_now(),
        likes: 0,
        impressions: 0,
    };
    let feed = construct_feed(&scenes, Some(&featured), &FeedConfig::default(), test_now());
    assert_eq!(feed[0].id.as_str(), "featured");
    assert_eq!(feed.len(), scenes.len() + 1);
}

#[test]
fn test_popular_scene_leads() {
    let scenes = vec![
        Scene {
            id: SceneId::new("A"),
            handle_id: HandleId::new("h1"),
            place: SkyPosition::new(0.0, 0.0),
            creation_date: test_now(),
            likes: 0,
            impressions: 0,
        },
        Scene {
            id: SceneId::new("B"),
            handle_id: HandleId::new("h2"),
            place: SkyPosition::new(0.0, 0.0),
            creation_date: test_now(),
            likes: 100,
            impressions: 50,
        },
    ];
    let feed = construct_feed(&scenes, None, &FeedConfig::default(), test_now());
    assert_eq!(ids(&feed), vec!["B", "A"]);
}
