//! The value a policy returns.

use rw_core::RoomId;

/// One decision for one agent on one tick.  Consumed immediately; never
/// stored.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveDecision {
    /// Where to go; `None` means stay put.
    pub target:            Option<RoomId>,
    /// Human-readable explanation, surfaced in logs and statistics.
    pub reason:            String,
    /// How strongly the policy stands behind this choice, in `[0, 1]`.
    pub confidence:        f32,
    /// `false` when the policy found nowhere legal to go.
    pub is_legal:          bool,
    /// The target is not adjacent and must be reached by a jump.
    pub requires_teleport: bool,
}

impl MoveDecision {
    pub fn move_to(room: RoomId, confidence: f32, reason: impl Into<String>) -> Self {
        Self {
            target: Some(room),
            reason: reason.into(),
            confidence,
            is_legal: true,
            requires_teleport: false,
        }
    }

    pub fn teleport_to(room: RoomId, confidence: f32, reason: impl Into<String>) -> Self {
        Self { requires_teleport: true, ..Self::move_to(room, confidence, reason) }
    }

    /// Staying is a legal choice, just a low-value one.
    pub fn stay(confidence: f32, reason: impl Into<String>) -> Self {
        Self {
            target: None,
            reason: reason.into(),
            confidence,
            is_legal: true,
            requires_teleport: false,
        }
    }

    pub fn no_legal_move(reason: impl Into<String>) -> Self {
        Self {
            target: None,
            reason: reason.into(),
            confidence: 0.0,
            is_legal: false,
            requires_teleport: false,
        }
    }

    pub fn is_move(&self) -> bool {
        self.target.is_some()
    }
}
