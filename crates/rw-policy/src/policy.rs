//! The `MovePolicy` trait: the extension point for agent movement choices.

use rw_core::AgentRng;

use crate::{modes, MoveContext, MoveDecision, MovePolicyConfig, PolicyResult};

/// Pluggable movement choice.
///
/// Implementations must be pure with respect to the world: read only from
/// `ctx`, draw randomness only from `rng`, and leave execution of the
/// returned decision to the caller.
pub trait MovePolicy: Send + Sync {
    fn decide(&self, ctx: &MoveContext<'_>, rng: &mut AgentRng) -> PolicyResult<MoveDecision>;

    /// Short label for logs.
    fn name(&self) -> &str;
}

impl MovePolicy for MovePolicyConfig {
    fn decide(&self, ctx: &MoveContext<'_>, rng: &mut AgentRng) -> PolicyResult<MoveDecision> {
        modes::decide(ctx, self, rng)
    }

    fn name(&self) -> &str {
        self.mode.name()
    }
}

/// A policy that never moves.  Useful for stationary agents (shopkeepers)
/// that still need presence tracking.
pub struct StayPut;

impl MovePolicy for StayPut {
    fn decide(&self, _ctx: &MoveContext<'_>, _rng: &mut AgentRng) -> PolicyResult<MoveDecision> {
        Ok(MoveDecision::stay(1.0, "Stationary agent"))
    }

    fn name(&self) -> &str {
        "stay-put"
    }
}
