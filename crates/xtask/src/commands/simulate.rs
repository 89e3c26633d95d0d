//! Headless simulation over a content directory
//!
//! Builds an engine from a content directory, walks a scripted opponent along
//! a straight line and reports what the enemies decided each tick.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use enemy_content::ContentFactory;
use enemy_core::{
    ActionRequest, DodgeDirection, EnemyEngine, EnemyId, OpponentSnapshot, SkillId, Vec3,
};

use crate::dirs;

/// Run a content directory headless against a scripted opponent
#[derive(Parser, Debug)]
pub struct Simulate {
    /// Content directory (defaults to $ENEMY_DATA_DIR, then the shipped data)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 100)]
    ticks: u32,

    /// Tick length in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 100)]
    tick_ms: u64,

    /// Opponent position at the first tick, as `x,y,z`
    #[arg(long, value_name = "X,Y,Z", value_parser = parse_vec3, default_value = "0,0,40")]
    from: Vec3,

    /// Opponent position at the last tick, as `x,y,z`
    #[arg(long, value_name = "X,Y,Z", value_parser = parse_vec3, default_value = "0,0,0")]
    to: Vec3,

    /// Direction the opponent dodges on scripted ticks
    #[arg(long, value_name = "DIR", value_parser = parse_dodge)]
    dodge: Option<DodgeDirection>,

    /// Skill the opponent uses on scripted ticks
    #[arg(long, value_name = "SKILL")]
    skill: Option<String>,

    /// Scripted opponent events fire every N ticks
    #[arg(long, value_name = "N", default_value_t = 10)]
    every: u32,

    /// Hostile combatants engaging the enemies
    #[arg(long, default_value_t = 0)]
    threats: u32,

    /// Set an enemy's health before the first tick, as `ID=HP` (repeatable)
    #[arg(long, value_name = "ID=HP", value_parser = parse_wound)]
    wound: Vec<(String, f32)>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum OutputFormat {
    /// Behavior transitions, request counts and final state
    Summary,
    /// Every tick's behaviors and requests as JSON
    Json,
}

#[derive(Serialize)]
struct TickRecord {
    tick: u32,
    time_ms: u64,
    player: Vec3,
    behaviors: BTreeMap<EnemyId, String>,
    requests: Vec<ActionRequest>,
}

#[derive(Default)]
struct RequestCounts {
    moves: usize,
    attacks: usize,
    casts: usize,
    coordinated: usize,
}

impl Simulate {
    pub fn execute(self) -> Result<()> {
        if self.tick_ms == 0 {
            anyhow::bail!("--tick-ms must be positive");
        }
        let data_dir = dirs::content_dir(self.data_dir.clone());
        let mut engine = ContentFactory::new(&data_dir)
            .build_engine()
            .with_context(|| format!("Failed to load content from {}", data_dir.display()))?;

        for (id, health) in &self.wound {
            if !engine.sync_health(id, *health) {
                anyhow::bail!("Cannot wound unknown enemy '{}'", id);
            }
        }

        let records = self.run(&mut engine);

        match self.format {
            OutputFormat::Summary => print_summary(&engine, &records),
            OutputFormat::Json => print_json(&records)?,
        }
        Ok(())
    }

    fn run(&self, engine: &mut EnemyEngine) -> Vec<TickRecord> {
        let delta = Duration::from_millis(self.tick_ms);
        let mut records = Vec::with_capacity(self.ticks as usize);

        for tick in 0..self.ticks {
            let player = self.player_at(tick);
            let snapshot = self.opponent_at(tick);
            engine.update(delta, player, &snapshot);

            records.push(TickRecord {
                tick,
                time_ms: engine.now().as_millis(),
                player,
                behaviors: engine
                    .agents()
                    .map(|agent| (agent.id.clone(), agent.behavior().to_string()))
                    .collect(),
                requests: engine.drain_requests(),
            });
        }
        records
    }

    fn player_at(&self, tick: u32) -> Vec3 {
        if self.ticks <= 1 {
            return self.from;
        }
        let t = tick as f32 / (self.ticks - 1) as f32;
        self.from.lerp(self.to, t)
    }

    fn opponent_at(&self, tick: u32) -> OpponentSnapshot {
        let scripted = self.every > 0 && tick % self.every == self.every - 1;
        OpponentSnapshot {
            just_dodged: self.dodge.filter(|_| scripted),
            just_attacked: None,
            skill_used: self
                .skill
                .as_deref()
                .filter(|_| scripted)
                .map(SkillId::from),
            threat_count: self.threats,
        }
    }
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z but got '{}'", s));
    };
    let parse = |v: &str| {
        v.parse::<f32>()
            .map_err(|e| format!("invalid coordinate '{}': {}", v, e))
    };
    Ok(Vec3::new(parse(x)?, parse(y)?, parse(z)?))
}

fn parse_dodge(s: &str) -> Result<DodgeDirection, String> {
    s.trim()
        .parse::<DodgeDirection>()
        .map_err(|_| format!("expected left, right, forward or back but got '{}'", s))
}

fn parse_wound(s: &str) -> Result<(String, f32), String> {
    let (id, hp) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=HP but got '{}'", s))?;
    let hp = hp
        .trim()
        .parse::<f32>()
        .map_err(|e| format!("invalid health '{}': {}", hp, e))?;
    Ok((id.trim().to_string(), hp))
}

fn print_summary(engine: &EnemyEngine, records: &[TickRecord]) {
    println!("{}", style("=== Behavior Transitions ===").bold().green());
    let mut previous: BTreeMap<&EnemyId, &str> = BTreeMap::new();
    for record in records {
        for (id, behavior) in &record.behaviors {
            let changed = previous
                .get(id)
                .is_none_or(|before| *before != behavior.as_str());
            if changed {
                let from = previous.get(id).copied().unwrap_or("-");
                println!(
                    "  [{:>7}ms] {}: {} -> {}",
                    record.time_ms,
                    style(id).cyan(),
                    style(from).dim(),
                    style(behavior).yellow()
                );
                previous.insert(id, behavior.as_str());
            }
        }
    }
    println!();

    println!("{}", style("=== Requests ===").bold().green());
    let mut counts: BTreeMap<&EnemyId, RequestCounts> = BTreeMap::new();
    for request in records.iter().flat_map(|r| &r.requests) {
        let entry = counts.entry(request.enemy()).or_default();
        match request {
            ActionRequest::Move(_) => entry.moves += 1,
            ActionRequest::Attack(_) => entry.attacks += 1,
            ActionRequest::SkillCast(_) => entry.casts += 1,
            ActionRequest::CoordinatedAttack(_) => entry.coordinated += 1,
        }
    }
    if counts.is_empty() {
        println!("  {}", style("(none)").dim());
    }
    for (id, c) in &counts {
        println!(
            "  {:<20} moves {:>4}  attacks {:>3}  casts {:>3}  coordinated {:>3}",
            id.as_str(),
            c.moves,
            c.attacks,
            c.casts,
            c.coordinated
        );
    }
    println!();

    println!("{}", style("=== Final State ===").bold().green());
    for agent in engine.agents() {
        println!(
            "  {:<20} {:<16} hp {:>6.1}/{:<6.1} at ({:.1}, {:.1}, {:.1})",
            agent.id.as_str(),
            agent.behavior(),
            agent.health,
            agent.max_health,
            agent.position.x,
            agent.position.y,
            agent.position.z
        );
        if let Some(favorite) = agent.learning.favorite_skill() {
            println!("  {:<20} favorite opponent skill: {}", "", favorite);
        }
    }
    println!();

    println!("{}", style("=== Packs ===").bold().green());
    if engine.packs().is_empty() {
        println!("  {}", style("(none)").dim());
    }
    for pack in engine.packs().iter() {
        println!(
            "  {} leader {} formation {} next attack at {}ms",
            style(&pack.key).cyan(),
            pack.leader,
            pack.formation,
            pack.next_coordinated_attack.as_millis()
        );
    }
}

fn print_json(records: &[TickRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records).context("Failed to serialize ticks")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinates() {
        assert_eq!(parse_vec3("1, 2.5,-3").unwrap(), Vec3::new(1.0, 2.5, -3.0));
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("a,b,c").is_err());
    }

    #[test]
    fn parses_dodge_directions() {
        assert_eq!(parse_dodge("left").unwrap(), DodgeDirection::Left);
        assert_eq!(parse_dodge("Back").unwrap(), DodgeDirection::Back);
        assert!(parse_dodge("up").is_err());

        let sim = Simulate::parse_from(["simulate", "--dodge", "right"]);
        assert_eq!(sim.dodge, Some(DodgeDirection::Right));
    }

    #[test]
    fn parses_wounds() {
        assert_eq!(parse_wound("orc=12.5").unwrap(), ("orc".to_string(), 12.5));
        assert!(parse_wound("orc").is_err());
    }

    #[test]
    fn scripted_events_fire_on_the_last_tick_of_each_period() {
        let sim = Simulate::parse_from(["simulate", "--dodge", "left", "--every", "3"]);
        let fired: Vec<u32> = (0..9)
            .filter(|&tick| sim.opponent_at(tick).just_dodged.is_some())
            .collect();
        assert_eq!(fired, vec![2, 5, 8]);
    }

    #[test]
    fn player_walks_from_start_to_end() {
        let sim = Simulate::parse_from([
            "simulate", "--ticks", "5", "--from", "0,0,8", "--to", "0,0,0",
        ]);
        assert_eq!(sim.player_at(0), Vec3::new(0.0, 0.0, 8.0));
        assert_eq!(sim.player_at(2), Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(sim.player_at(4), Vec3::ZERO);
    }
}
