//! Content directory resolution

use std::path::PathBuf;

/// Environment variable that overrides the default content directory.
pub const DATA_DIR_ENV: &str = "ENEMY_DATA_DIR";

/// Resolve the content directory to load.
///
/// Order of precedence:
/// - the `--data-dir` argument
/// - `$ENEMY_DATA_DIR`
/// - the data shipped with `enemy-content`
pub fn content_dir(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }
    match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => shipped_content_dir(),
    }
}

fn shipped_content_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("enemy")
        .join("content")
        .join("data")
}
