//! Policy configuration: the mode plus shared flags.

use rw_core::RoomId;

use crate::{PolicyError, PolicyResult};

/// Which movement behavior an agent follows.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "mode", rename_all = "kebab-case"))]
pub enum PolicyMode {
    /// Uniform choice among legal neighbors, preferred rooms first.
    #[default]
    RandomAdjacent,

    /// Walk an ordered route, wrapping at the end.
    Patrol { route: Vec<RoomId> },

    /// Head for the player's room with probability `seek_chance` per decision.
    PlayerSeek { seek_chance: f64 },

    /// Keep at least `avoid_distance` between the agent and the player.
    PlayerAvoid { avoid_distance: u32 },

    /// Drift back home, more urgently the farther away the agent is.
    HomeBias { home_return_chance: f64 },
}

impl PolicyMode {
    pub fn name(&self) -> &'static str {
        match self {
            PolicyMode::RandomAdjacent   => "random-adjacent",
            PolicyMode::Patrol { .. }     => "patrol",
            PolicyMode::PlayerSeek { .. } => "player-seek",
            PolicyMode::PlayerAvoid { .. } => "player-avoid",
            PolicyMode::HomeBias { .. }   => "home-bias",
        }
    }
}

/// A complete policy: mode plus the flags every mode honors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovePolicyConfig {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub mode: PolicyMode,

    /// Treat full rooms as illegal destinations.  Default: `true`.
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub respect_capacity: bool,

    /// Allow a non-adjacent jump to home/preferred rooms when nothing
    /// adjacent is legal.  Default: `false`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub allow_teleport_fallback: bool,
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

impl Default for MovePolicyConfig {
    fn default() -> Self {
        Self::new(PolicyMode::RandomAdjacent)
    }
}

impl MovePolicyConfig {
    pub fn new(mode: PolicyMode) -> Self {
        Self { mode, respect_capacity: true, allow_teleport_fallback: false }
    }

    pub fn random_adjacent() -> Self {
        Self::new(PolicyMode::RandomAdjacent)
    }

    pub fn patrol(route: Vec<RoomId>) -> Self {
        Self::new(PolicyMode::Patrol { route })
    }

    pub fn player_seek(seek_chance: f64) -> Self {
        Self::new(PolicyMode::PlayerSeek { seek_chance })
    }

    pub fn player_avoid(avoid_distance: u32) -> Self {
        Self::new(PolicyMode::PlayerAvoid { avoid_distance })
    }

    pub fn home_bias(home_return_chance: f64) -> Self {
        Self::new(PolicyMode::HomeBias { home_return_chance })
    }

    pub fn with_teleport_fallback(mut self, allow: bool) -> Self {
        self.allow_teleport_fallback = allow;
        self
    }

    pub fn with_capacity_check(mut self, respect: bool) -> Self {
        self.respect_capacity = respect;
        self
    }

    /// Reject probabilities outside `[0, 1]` (NaN included).  A home-return
    /// chance above 1 is allowed; anything `>= 1` forces the return.
    pub fn validate(&self) -> PolicyResult<()> {
        match &self.mode {
            PolicyMode::PlayerSeek { seek_chance } if !(0.0..=1.0).contains(seek_chance) => {
                Err(PolicyError::Config(format!("seek_chance {seek_chance} is outside [0, 1]")))
            }
            PolicyMode::HomeBias { home_return_chance }
                if home_return_chance.is_nan() || *home_return_chance < 0.0 =>
            {
                Err(PolicyError::Config(format!(
                    "home_return_chance {home_return_chance} must be non-negative"
                )))
            }
            _ => Ok(()),
        }
    }
}
