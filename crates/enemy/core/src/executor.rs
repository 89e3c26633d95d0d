//! Action execution.
//!
//! Once a behavior is chosen its actions run in order with no further
//! condition checks. Each action reports `Success` when it had an effect and
//! `Failure` when it degraded to a no-op (cooldown active, no waypoint, no
//! pack). A no-op is never an error.
//!
//! Actions never resolve combat. Attacks, skill casts, coordinated strikes
//! and movement are emitted as [`ActionRequest`]s for the host to apply.

use behavior_tree::{Behavior, Status};
use glam::Vec3;

use crate::agent::{AgentFlags, EnemyAgent, PackMembership};
use crate::behavior::ActionKind;
use crate::config::EngineConfig;
use crate::learning::DodgeDirection;
use crate::pack::{CoordinatedAttackRequest, PackCoordinator};
use crate::types::{EnemyId, SkillId, Timestamp};

/// How an attack is delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum AttackStyle {
    Melee,
    Ranged,
}

/// An attack for the combat resolver.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackRequest {
    pub enemy: EnemyId,
    pub damage: f32,
    pub style: AttackStyle,
    /// Where the opponent is expected to dodge (melee only).
    pub predicted_dodge: Option<DodgeDirection>,
    /// Projectile travel time in seconds (ranged only).
    pub lead_time_secs: Option<f32>,
    pub target: Vec3,
}

/// A skill cast for the combat resolver.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillCastRequest {
    pub enemy: EnemyId,
    pub ability: SkillId,
    pub target: Vec3,
}

/// A positional advance already applied to the agent, reported so the host
/// can mirror it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveRequest {
    pub enemy: EnemyId,
    /// Unit vector.
    pub direction: Vec3,
    /// Units per second.
    pub speed: f32,
}

/// Output of a tick, collected in processing order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionRequest {
    Move(MoveRequest),
    Attack(AttackRequest),
    SkillCast(SkillCastRequest),
    CoordinatedAttack(CoordinatedAttackRequest),
}

impl ActionRequest {
    /// The agent that issued the request; the pack leader for coordinated
    /// attacks.
    pub fn enemy(&self) -> &EnemyId {
        match self {
            ActionRequest::Move(request) => &request.enemy,
            ActionRequest::Attack(request) => &request.enemy,
            ActionRequest::SkillCast(request) => &request.enemy,
            ActionRequest::CoordinatedAttack(request) => &request.leader,
        }
    }
}

/// Everything an action may read or change while one agent acts.
pub struct ActionContext<'a> {
    pub agent: &'a mut EnemyAgent,
    /// Opponent position this tick.
    pub opponent: Vec3,
    pub now: Timestamp,
    /// Seconds elapsed this tick.
    pub delta_secs: f32,
    pub config: &'a EngineConfig,
    pub packs: &'a mut PackCoordinator,
    pub requests: &'a mut Vec<ActionRequest>,
}

impl ActionContext<'_> {
    /// Moves the agent toward `goal`, stopping `stop_within` short of it.
    ///
    /// Returns `false` if the agent is already close enough.
    fn step_toward(&mut self, goal: Vec3, speed: f32, stop_within: f32) -> bool {
        let offset = goal - self.agent.position;
        let remaining = offset.length() - stop_within;
        if remaining <= f32::EPSILON {
            return false;
        }
        let direction = offset.normalize_or_zero();
        self.advance(direction, (speed * self.delta_secs).min(remaining), speed)
    }

    /// Moves the agent directly away from `threat`.
    fn step_away(&mut self, threat: Vec3, speed: f32) -> bool {
        let direction = (self.agent.position - threat).normalize_or_zero();
        self.advance(direction, speed * self.delta_secs, speed)
    }

    fn advance(&mut self, direction: Vec3, distance: f32, speed: f32) -> bool {
        if direction == Vec3::ZERO || distance <= 0.0 {
            return false;
        }
        self.agent.position += direction * distance;
        self.requests.push(ActionRequest::Move(MoveRequest {
            enemy: self.agent.id.clone(),
            direction,
            speed,
        }));
        true
    }

    fn distance_to_opponent(&self) -> f32 {
        self.agent.distance_to(self.opponent)
    }
}

/// Runs `actions` in order, unconditionally.
///
/// Returns how many of them had an effect.
pub fn run(actions: &[ActionKind], ctx: &mut ActionContext<'_>) -> usize {
    actions
        .iter()
        .filter(|action| action.tick(ctx).is_success())
        .count()
}

impl Behavior<ActionContext<'_>> for ActionKind {
    fn tick(&self, ctx: &mut ActionContext<'_>) -> Status {
        let done = match self {
            ActionKind::PatrolMove => patrol_move(ctx),
            ActionKind::LookAround => look_around(ctx),
            ActionKind::MoveTowardTarget => move_toward_target(ctx),
            ActionKind::PrepareAttack => set_flag(ctx, AgentFlags::PREPARING_ATTACK),
            ActionKind::MoveToHidingSpot => move_to_hiding_spot(ctx),
            ActionKind::WaitInAmbush => set_flag(ctx, AgentFlags::IN_AMBUSH),
            ActionKind::Retreat => retreat(ctx),
            ActionKind::CallForHelp => set_flag(ctx, AgentFlags::CALLING_FOR_HELP),
            ActionKind::MeleeAttack => melee_attack(ctx),
            ActionKind::FindRangedPosition => find_ranged_position(ctx),
            ActionKind::RangedAttack => ranged_attack(ctx),
            ActionKind::SelectBestSkill => select_best_skill(ctx),
            ActionKind::PositionForSkill => position_for_skill(ctx),
            ActionKind::CastSkill => cast_skill(ctx),
            ActionKind::SynchronizeWithAllies => synchronize_with_allies(ctx),
            ActionKind::FormationMove => formation_move(ctx),
            ActionKind::ComboSkill => combo_skill(ctx),
        };
        if !done && self.is_pack_action() && ctx.agent.pack.is_none() {
            tracing::trace!("{} {} skipped outside a pack", ctx.agent.id, self);
        } else if !done {
            tracing::trace!("{} {} was a no-op", ctx.agent.id, self);
        }
        Status::from_bool(done)
    }
}

fn set_flag(ctx: &mut ActionContext<'_>, flag: AgentFlags) -> bool {
    ctx.agent.flags.insert(flag);
    true
}

fn patrol_move(ctx: &mut ActionContext<'_>) -> bool {
    let Some(waypoint) = ctx.agent.patrol.current() else {
        return false;
    };
    let speed = ctx.config.patrol_speed;
    ctx.step_toward(waypoint, speed, 0.0);
    if ctx.agent.distance_to(waypoint) < ctx.config.waypoint_arrival_distance {
        ctx.agent.patrol.advance();
    }
    true
}

/// Scans for the opponent; drops aggro once it is well out of range.
fn look_around(ctx: &mut ActionContext<'_>) -> bool {
    ctx.agent.flags.insert(AgentFlags::LOOKING_AROUND);
    let lost_at = ctx.agent.ranges.aggro * ctx.config.player_nearby_factor;
    if ctx.agent.is_aggro() && ctx.distance_to_opponent() > lost_at {
        tracing::debug!("{} lost track of its target", ctx.agent.id);
        ctx.agent.flags.remove(AgentFlags::AGGRO);
        ctx.agent.target = None;
    }
    true
}

fn move_toward_target(ctx: &mut ActionContext<'_>) -> bool {
    ctx.agent.flags.insert(AgentFlags::AGGRO);
    ctx.agent.target = Some(ctx.opponent);
    let (goal, speed, stop) = (ctx.opponent, ctx.config.chase_speed, ctx.agent.ranges.melee);
    ctx.step_toward(goal, speed, stop);
    true
}

fn move_to_hiding_spot(ctx: &mut ActionContext<'_>) -> bool {
    let Some(spot) = ctx.agent.awareness.nearest_ambush else {
        return false;
    };
    ctx.agent.flags.insert(AgentFlags::HIDING);
    let speed = ctx.config.chase_speed;
    ctx.step_toward(spot, speed, 0.0);
    true
}

fn retreat(ctx: &mut ActionContext<'_>) -> bool {
    ctx.agent.flags.insert(AgentFlags::FLEEING);
    let (threat, speed) = (ctx.opponent, ctx.config.flee_speed);
    ctx.step_away(threat, speed);
    true
}

fn melee_attack(ctx: &mut ActionContext<'_>) -> bool {
    if !ctx.agent.can_attack(ctx.now) {
        return false;
    }
    ctx.agent.last_attack = Some(ctx.now);
    ctx.requests.push(ActionRequest::Attack(AttackRequest {
        enemy: ctx.agent.id.clone(),
        damage: ctx.agent.damage,
        style: AttackStyle::Melee,
        predicted_dodge: ctx.agent.learning.predict_dodge(),
        lead_time_secs: None,
        target: ctx.opponent,
    }));
    true
}

/// Falls back toward cover that still keeps the opponent in range.
fn find_ranged_position(ctx: &mut ActionContext<'_>) -> bool {
    let Some(cover) = ctx.agent.awareness.nearest_cover else {
        return false;
    };
    if cover.distance(ctx.opponent) >= ctx.agent.ranges.ranged {
        return false;
    }
    let speed = ctx.config.chase_speed;
    ctx.step_toward(cover, speed, 0.0)
}

fn ranged_attack(ctx: &mut ActionContext<'_>) -> bool {
    if !ctx.agent.can_attack(ctx.now) {
        return false;
    }
    let lead_time = ctx.distance_to_opponent() / ctx.config.projectile_speed;
    ctx.agent.last_attack = Some(ctx.now);
    ctx.requests.push(ActionRequest::Attack(AttackRequest {
        enemy: ctx.agent.id.clone(),
        damage: ctx.agent.damage * ctx.config.ranged_damage_factor,
        style: AttackStyle::Ranged,
        predicted_dodge: None,
        lead_time_secs: Some(lead_time),
        target: ctx.opponent,
    }));
    true
}

/// Picks a ready ability, preferring one that counters the opponent's
/// favorite skill.
fn select_best_skill(ctx: &mut ActionContext<'_>) -> bool {
    let agent = &mut *ctx.agent;
    let ready: Vec<usize> = agent.ready_abilities(ctx.now).collect();
    let counter = agent.learning.favorite_skill().and_then(|favorite| {
        ready
            .iter()
            .copied()
            .find(|&index| agent.abilities[index].counter_for.as_ref() == Some(favorite))
    });

    let chosen = counter.or(ready.first().copied());
    agent.selected_ability = chosen;
    chosen.is_some()
}

/// Closes in until the opponent is inside ranged range.
fn position_for_skill(ctx: &mut ActionContext<'_>) -> bool {
    let (goal, speed) = (ctx.opponent, ctx.config.chase_speed);
    let stop = ctx.agent.ranges.ranged.max(ctx.agent.ranges.melee);
    ctx.step_toward(goal, speed, stop)
}

fn cast_skill(ctx: &mut ActionContext<'_>) -> bool {
    let Some(index) = ctx.agent.selected_ability.take() else {
        tracing::warn!("{} tried to cast with no ability selected", ctx.agent.id);
        return false;
    };
    let now = ctx.now;
    let agent = &mut *ctx.agent;
    let Some(ability) = agent.abilities.get_mut(index) else {
        tracing::warn!("{} selected missing ability #{}", agent.id, index);
        return false;
    };
    ability.last_used = Some(now);
    let ability_id = ability.id.clone();

    let countered = ability
        .counter_for
        .as_ref()
        .is_some_and(|skill| agent.learning.favorite_skill() == Some(skill));
    if countered {
        agent.learning.record_successful_counter(ability_id.clone());
    }

    ctx.requests.push(ActionRequest::SkillCast(SkillCastRequest {
        enemy: agent.id.clone(),
        ability: ability_id,
        target: ctx.opponent,
    }));
    true
}

fn synchronize_with_allies(ctx: &mut ActionContext<'_>) -> bool {
    let Some(pack) = ctx.packs.find_pack_of(&ctx.agent.id) else {
        return false;
    };
    ctx.agent.pack = Some(PackMembership {
        pack: pack.key.clone(),
        is_leader: pack.is_leader(&ctx.agent.id),
    });
    true
}

fn formation_move(ctx: &mut ActionContext<'_>) -> bool {
    let Some(slot) = ctx
        .packs
        .find_pack_of(&ctx.agent.id)
        .and_then(|pack| pack.formation_slot(&ctx.agent.id))
    else {
        return false;
    };
    ctx.agent.flags.insert(AgentFlags::IN_FORMATION);
    let speed = ctx.config.chase_speed;
    ctx.step_toward(slot, speed, 0.0);
    true
}

fn combo_skill(ctx: &mut ActionContext<'_>) -> bool {
    let delay = ctx.config.pack_attack_delay_ms;
    let Some(request) = ctx.packs.trigger_combo(&ctx.agent.id, ctx.now, delay) else {
        return false;
    };
    tracing::debug!("Pack {} launches a coordinated attack", request.pack);
    ctx.requests.push(ActionRequest::CoordinatedAttack(request));
    true
}
