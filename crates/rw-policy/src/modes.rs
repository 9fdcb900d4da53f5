//! Per-mode decision logic.
//!
//! Every mode shares one legality test ([`is_legal`]) and falls back to
//! [`random_adjacent`] when its own preferred move is unavailable.  An agent
//! standing in a room on its own avoid-list escapes before any mode runs.

use rw_core::{AgentRng, RoomId};

use crate::{MoveContext, MoveDecision, MovePolicyConfig, PolicyError, PolicyMode, PolicyResult};

/// Home-bias return probability cap for chances below 1.
const HOME_RETURN_CAP: f64 = 0.8;

/// Decide where the agent in `ctx` goes next under `cfg`.
pub fn decide(
    ctx: &MoveContext<'_>,
    cfg: &MovePolicyConfig,
    rng: &mut AgentRng,
) -> PolicyResult<MoveDecision> {
    validate(ctx)?;

    if ctx.avoid_rooms.contains(&ctx.current_room) {
        if let Some(escape) = escape(ctx, cfg) {
            return Ok(escape);
        }
    }

    Ok(match &cfg.mode {
        PolicyMode::RandomAdjacent => random_adjacent(ctx, cfg, rng, None),
        PolicyMode::Patrol { route } => patrol(ctx, cfg, rng, route),
        PolicyMode::PlayerSeek { seek_chance } => player_seek(ctx, cfg, rng, *seek_chance),
        PolicyMode::PlayerAvoid { avoid_distance } => player_avoid(ctx, cfg, rng, *avoid_distance),
        PolicyMode::HomeBias { home_return_chance } => home_bias(ctx, cfg, rng, *home_return_chance),
    })
}

fn validate(ctx: &MoveContext<'_>) -> PolicyResult<()> {
    if !ctx.agent.is_valid() {
        return Err(PolicyError::InvalidContext("agent id is empty"));
    }
    if !ctx.current_room.is_valid() {
        return Err(PolicyError::InvalidContext("current room is empty"));
    }
    Ok(())
}

// ── Legality ──────────────────────────────────────────────────────────────────

/// Whether `room` may be entered at all, ignoring adjacency.
pub fn is_legal(ctx: &MoveContext<'_>, cfg: &MovePolicyConfig, room: RoomId) -> bool {
    room != ctx.current_room
        && !ctx.avoid_rooms.contains(&room)
        && !(cfg.respect_capacity && ctx.load.is_full(room))
        && ctx.access.is_passable(room)
        && within_roam(ctx, room)
}

fn within_roam(ctx: &MoveContext<'_>, room: RoomId) -> bool {
    match (ctx.home_room, ctx.roam_radius) {
        (Some(home), Some(radius)) => ctx.dist(home, room) <= radius,
        _ => true,
    }
}

fn legal_adjacent(ctx: &MoveContext<'_>, cfg: &MovePolicyConfig) -> Vec<RoomId> {
    ctx.allowed_adjacent
        .iter()
        .copied()
        .filter(|&r| is_legal(ctx, cfg, r))
        .collect()
}

fn is_adjacent(ctx: &MoveContext<'_>, room: RoomId) -> bool {
    ctx.allowed_adjacent.contains(&room)
}

/// The legal neighbor that gets closest to `target`, if it strictly
/// improves on standing still.  Ties keep adjacency order.
fn step_toward(ctx: &MoveContext<'_>, cfg: &MovePolicyConfig, target: RoomId) -> Option<RoomId> {
    let here = ctx.dist(ctx.current_room, target);
    legal_adjacent(ctx, cfg)
        .into_iter()
        .map(|r| (r, ctx.dist(r, target)))
        .filter(|&(_, d)| d < here)
        .min_by_key(|&(_, d)| d)
        .map(|(r, _)| r)
}

/// Reach `target` directly if adjacent, else one step closer, else by
/// teleport when the policy allows it.
fn approach(
    ctx:        &MoveContext<'_>,
    cfg:        &MovePolicyConfig,
    target:     RoomId,
    confidence: f32,
    reason:     String,
) -> Option<MoveDecision> {
    if !is_legal(ctx, cfg, target) {
        return None;
    }
    if is_adjacent(ctx, target) {
        return Some(MoveDecision::move_to(target, confidence, reason));
    }
    if let Some(step) = step_toward(ctx, cfg, target) {
        return Some(MoveDecision::move_to(step, confidence, reason));
    }
    cfg.allow_teleport_fallback
        .then(|| MoveDecision::teleport_to(target, confidence, reason))
}

// ── Escape ────────────────────────────────────────────────────────────────────

fn escape(ctx: &MoveContext<'_>, cfg: &MovePolicyConfig) -> Option<MoveDecision> {
    let target = legal_adjacent(ctx, cfg)
        .first()
        .copied()
        .or_else(|| ctx.home_room.filter(|&h| is_legal(ctx, cfg, h)))
        .or_else(|| ctx.prefer_rooms.iter().copied().find(|&r| is_legal(ctx, cfg, r)))?;
    Some(MoveDecision::teleport_to(target, 1.0, "Escape from avoided room"))
}

// ── random-adjacent ───────────────────────────────────────────────────────────

/// Uniform choice among legal neighbors (minus `exclude`), preferred rooms
/// winning whenever any of them is legal.
pub fn random_adjacent(
    ctx:     &MoveContext<'_>,
    cfg:     &MovePolicyConfig,
    rng:     &mut AgentRng,
    exclude: Option<RoomId>,
) -> MoveDecision {
    let legal: Vec<RoomId> = legal_adjacent(ctx, cfg)
        .into_iter()
        .filter(|&r| Some(r) != exclude)
        .collect();

    let preferred: Vec<RoomId> = legal
        .iter()
        .copied()
        .filter(|r| ctx.prefer_rooms.contains(r))
        .collect();

    let (pool, confidence, reason) = if preferred.is_empty() {
        (legal, 0.4, "Random adjacent move")
    } else {
        (preferred, 0.6, "Random move to preferred room")
    };

    match rng.choose(&pool) {
        Some(&room) => MoveDecision::move_to(room, confidence, reason),
        None => teleport_fallback(ctx, cfg)
            .unwrap_or_else(|| MoveDecision::no_legal_move("No legal adjacent rooms")),
    }
}

fn teleport_fallback(ctx: &MoveContext<'_>, cfg: &MovePolicyConfig) -> Option<MoveDecision> {
    if !cfg.allow_teleport_fallback {
        return None;
    }
    if let Some(home) = ctx.home_room.filter(|&h| is_legal(ctx, cfg, h)) {
        return Some(MoveDecision::teleport_to(home, 0.3, "Teleport home: no legal adjacent rooms"));
    }
    ctx.prefer_rooms
        .iter()
        .copied()
        .find(|&r| is_legal(ctx, cfg, r))
        .map(|r| MoveDecision::teleport_to(r, 0.3, "Teleport to preferred room: no legal adjacent rooms"))
}

// ── patrol ────────────────────────────────────────────────────────────────────

fn patrol(
    ctx:   &MoveContext<'_>,
    cfg:   &MovePolicyConfig,
    rng:   &mut AgentRng,
    route: &[RoomId],
) -> MoveDecision {
    let len = route.len();
    if len == 0 {
        return random_adjacent(ctx, cfg, rng, None);
    }

    let planned = match route.iter().position(|&r| r == ctx.current_room) {
        Some(i) => {
            let next = (i + 1) % len;
            approach(ctx, cfg, route[next], 0.9, format!("Patrol to route point {}/{}", next + 1, len))
        }
        // min_by_key keeps the first of equally near route rooms.
        None => route
            .iter()
            .enumerate()
            .min_by_key(|&(_, &r)| ctx.dist(ctx.current_room, r))
            .and_then(|(i, &nearest)| {
                approach(ctx, cfg, nearest, 0.8, format!("Rejoin patrol route at point {}/{}", i + 1, len))
            }),
    };

    planned.unwrap_or_else(|| random_adjacent(ctx, cfg, rng, None))
}

// ── player-seek ───────────────────────────────────────────────────────────────

fn player_seek(
    ctx:         &MoveContext<'_>,
    cfg:         &MovePolicyConfig,
    rng:         &mut AgentRng,
    seek_chance: f64,
) -> MoveDecision {
    let Some(player) = ctx.player_room else {
        return random_adjacent(ctx, cfg, rng, None);
    };
    if !rng.gen_bool(seek_chance) {
        // Not seeking this time: wander, but never into the player's room.
        return random_adjacent(ctx, cfg, rng, Some(player));
    }
    if player == ctx.current_room {
        return MoveDecision::stay(0.6, "Staying with player");
    }
    if is_adjacent(ctx, player) && is_legal(ctx, cfg, player) {
        return MoveDecision::move_to(player, 0.6, "Seek player in adjacent room");
    }
    match step_toward(ctx, cfg, player) {
        Some(step) => MoveDecision::move_to(step, 0.5, "Step toward player"),
        None => random_adjacent(ctx, cfg, rng, None),
    }
}

// ── player-avoid ──────────────────────────────────────────────────────────────

fn player_avoid(
    ctx:            &MoveContext<'_>,
    cfg:            &MovePolicyConfig,
    rng:            &mut AgentRng,
    avoid_distance: u32,
) -> MoveDecision {
    let Some(player) = ctx.player_room else {
        return random_adjacent(ctx, cfg, rng, None);
    };
    let here = ctx.dist(ctx.current_room, player);
    if here >= avoid_distance {
        return random_adjacent(ctx, cfg, rng, None);
    }

    let farther: Vec<(RoomId, u32)> = legal_adjacent(ctx, cfg)
        .into_iter()
        .map(|r| (r, ctx.dist(r, player)))
        .filter(|&(_, d)| d > here)
        .collect();
    let Some(best) = farther.iter().map(|&(_, d)| d).max() else {
        return MoveDecision::stay(0.2, "No adjacent room increases distance from player");
    };
    let candidates: Vec<RoomId> = farther
        .into_iter()
        .filter(|&(_, d)| d == best)
        .map(|(r, _)| r)
        .collect();

    match rng.choose(&candidates) {
        Some(&room) => MoveDecision::move_to(room, 0.8, "Avoid player"),
        None => MoveDecision::stay(0.2, "No adjacent room increases distance from player"),
    }
}

// ── home-bias ─────────────────────────────────────────────────────────────────

fn home_bias(
    ctx:                &MoveContext<'_>,
    cfg:                &MovePolicyConfig,
    rng:                &mut AgentRng,
    home_return_chance: f64,
) -> MoveDecision {
    let Some(home) = ctx.home_room else {
        return random_adjacent(ctx, cfg, rng, None);
    };
    let distance = ctx.dist(ctx.current_room, home);
    if distance == 0 {
        return random_adjacent(ctx, cfg, rng, None);
    }

    if rng.gen_bool(home_return_probability(home_return_chance, distance)) {
        if is_adjacent(ctx, home) && is_legal(ctx, cfg, home) {
            return MoveDecision::move_to(home, 0.7, "Return to home");
        }
        if let Some(step) = step_toward(ctx, cfg, home) {
            return MoveDecision::move_to(step, 0.7, "Return to home (step toward)");
        }
    }
    random_adjacent(ctx, cfg, rng, None)
}

/// `min(chance × (distance + 1), 0.8)`, except that a chance of 1 or more
/// always returns.
pub fn home_return_probability(chance: f64, distance: u32) -> f64 {
    if chance >= 1.0 {
        1.0
    } else {
        (chance * (distance as f64 + 1.0)).min(HOME_RETURN_CAP)
    }
}
