use std::path::PathBuf;
use std::time::Duration;

use enemy_content::ContentFactory;
use enemy_core::{OpponentSnapshot, Vec3};

fn shipped() -> ContentFactory {
    ContentFactory::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data"))
}

/// Every shipped file parses and validates on its own.
#[test]
fn shipped_files_load() {
    let factory = shipped();

    let config = factory.load_config().expect("config.toml should load");
    assert!(config.flee_speed > config.chase_speed);

    let personalities = factory
        .load_personalities()
        .expect("personalities.ron should load");
    for tag in ["aggressive", "defensive", "tactical", "berserker"] {
        assert!(personalities.contains(tag), "missing personality {tag}");
    }

    let behaviors = factory.load_behaviors().expect("behaviors.ron should load");
    assert_eq!(behaviors.len(), 8);
    assert_eq!(behaviors.fallback().name.as_ref(), "patrol");

    let roster = factory.load_enemies().expect("enemies.ron should load");
    assert_eq!(roster.len(), 4);

    let markers = factory
        .load_markers()
        .expect("markers.ron should load")
        .expect("markers.ron is shipped");
    assert_eq!(markers.len(), 4);
}

/// The shipped roster idles on patrol and reacts once the player walks in.
/// The scout may hunt or take the nearby ambush point.
#[test]
fn shipped_engine_runs() {
    let mut engine = shipped().build_engine().expect("engine should build");
    assert_eq!(engine.len(), 4);

    let tick = Duration::from_millis(100);
    let far = Vec3::new(500.0, 0.0, 500.0);
    engine.update(tick, far, &OpponentSnapshot::idle());
    for agent in engine.agents() {
        assert_eq!(agent.behavior(), "patrol", "{} should patrol", agent.id);
    }

    let near_scout = Vec3::new(0.0, 0.0, 15.0);
    engine.update(tick, near_scout, &OpponentSnapshot::idle());
    let scout = engine
        .enemy_behavior("goblin_scout")
        .expect("scout exists");
    assert_ne!(scout, "patrol");
    assert!(!engine.drain_requests().is_empty());
}
