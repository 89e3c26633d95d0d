//! Validate a content directory
//!
//! Loads every content file on its own, reports each result, then builds a
//! full engine to catch cross-file problems (e.g. an enemy referencing a
//! personality that is not defined).

use anyhow::Result;
use clap::Parser;
use console::style;
use std::path::PathBuf;

use enemy_content::ContentFactory;

use crate::dirs;

/// Load and validate every file in a content directory
#[derive(Parser, Debug)]
pub struct Validate {
    /// Content directory (defaults to $ENEMY_DATA_DIR, then the shipped data)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

impl Validate {
    pub fn execute(self) -> Result<()> {
        let data_dir = dirs::content_dir(self.data_dir);
        if !data_dir.is_dir() {
            anyhow::bail!("Content directory not found: {}", data_dir.display());
        }

        println!(
            "{} {}",
            style("Content Directory:").bold().cyan(),
            data_dir.display()
        );
        println!();

        let factory = ContentFactory::new(&data_dir);
        let mut failures = 0;

        failures += report("config.toml", factory.load_config().map(|_| String::new()));
        failures += report(
            "personalities.ron",
            factory
                .load_personalities()
                .map(|table| format!("{} personalities", table.len())),
        );
        failures += report(
            "behaviors.ron",
            factory
                .load_behaviors()
                .map(|registry| format!("{} behaviors", registry.len())),
        );
        failures += report(
            "enemies.ron",
            factory
                .load_enemies()
                .map(|roster| format!("{} enemies", roster.len())),
        );
        failures += report(
            "markers.ron",
            factory.load_markers().map(|markers| match markers {
                Some(grid) => format!("{} markers", grid.len()),
                None => "absent, using no markers".to_string(),
            }),
        );

        if failures == 0 {
            failures += report(
                "engine",
                factory
                    .build_engine()
                    .map(|engine| format!("{} enemies spawned", engine.len())),
            );
        }

        println!();
        if failures > 0 {
            anyhow::bail!("{} content check(s) failed", failures);
        }
        println!("{}", style("All content is valid").bold().green());
        Ok(())
    }
}

/// Prints one check result; returns 1 on failure.
fn report(name: &str, result: Result<String>) -> usize {
    match result {
        Ok(detail) if detail.is_empty() => {
            println!("  {} {}", style("✓").green().bold(), name);
            0
        }
        Ok(detail) => {
            println!(
                "  {} {} {}",
                style("✓").green().bold(),
                name,
                style(format!("({})", detail)).dim()
            );
            0
        }
        Err(e) => {
            println!("  {} {}", style("✗").red().bold(), name);
            println!("      {}", style(format!("{:#}", e)).red());
            1
        }
    }
}
