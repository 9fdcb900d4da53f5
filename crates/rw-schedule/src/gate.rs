//! The `ActivationGate`: pauses all movement while the world says so.
//!
//! The host pushes a [`WorldSnapshot`] whenever something changes.  A
//! significant change arms a short debounce; [`ActivationGate::poll`] then
//! evaluates the latest snapshot once the debounce has passed and, only if
//! the outcome flipped, pauses or resumes the scheduler through a dedicated
//! global scope.

use rw_core::RoomId;
use tracing::info;

use crate::{PauseScope, TickScheduler};

/// Reason string of the gate's own pause scope.
const GATE_SCOPE: &str = "activation-gate";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum GamePhase {
    Title,
    #[default]
    Exploration,
    Dialogue,
    Combat,
    Menu,
    Loading,
}

/// Reserved world flags that stop all movement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldFlags {
    pub movement_frozen: bool,
    pub story_lockdown:  bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldSnapshot {
    pub phase:             GamePhase,
    pub current_room:      Option<RoomId>,
    pub in_cutscene:       bool,
    pub overlay_active:    bool,
    pub reduced_motion:    bool,
    pub takeover_active:   bool,
    pub reset_in_progress: bool,
    pub flags:             WorldFlags,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GateConfig {
    pub allowed_phases:         Vec<GamePhase>,
    pub disabled_rooms:         Vec<RoomId>,
    pub respect_reduced_motion: bool,
    pub debounce_ms:            u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            allowed_phases:         vec![GamePhase::Exploration],
            disabled_rooms:         Vec::new(),
            respect_reduced_motion: true,
            debounce_ms:            250,
        }
    }
}

impl GateConfig {
    /// `Err(reason)` if `snapshot` should stop movement.
    pub fn evaluate(&self, snapshot: &WorldSnapshot) -> Result<(), &'static str> {
        if self.respect_reduced_motion && snapshot.reduced_motion {
            return Err("Reduced motion preference");
        }
        if !self.allowed_phases.contains(&snapshot.phase) {
            return Err("Game phase does not allow movement");
        }
        if snapshot.in_cutscene {
            return Err("Cutscene in progress");
        }
        if snapshot.overlay_active {
            return Err("Overlay active");
        }
        if snapshot.takeover_active {
            return Err("Takeover active");
        }
        if snapshot.reset_in_progress {
            return Err("Reset in progress");
        }
        if snapshot.current_room.is_some_and(|r| self.disabled_rooms.contains(&r)) {
            return Err("Movement disabled in current room");
        }
        if snapshot.flags.movement_frozen {
            return Err("World flag movement_frozen set");
        }
        if snapshot.flags.story_lockdown {
            return Err("World flag story_lockdown set");
        }
        Ok(())
    }
}

/// Debounced world-state gate in front of a [`TickScheduler`].
pub struct ActivationGate {
    config:     GateConfig,
    snapshot:   WorldSnapshot,
    pending_at: Option<u64>,
    active:     bool,
    reason:     String,
    scope:      PauseScope,
}

impl ActivationGate {
    /// Starts active with a default snapshot.
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            snapshot:   WorldSnapshot::default(),
            pending_at: None,
            active:     true,
            reason:     "Movement active".to_owned(),
            scope:      PauseScope::global(GATE_SCOPE),
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Take a new snapshot.  Unchanged snapshots are ignored; any change
    /// (re)arms the debounce so rapid updates coalesce into one evaluation.
    pub fn update(&mut self, snapshot: WorldSnapshot, now_ms: u64) {
        if snapshot == self.snapshot {
            return;
        }
        self.snapshot = snapshot;
        self.pending_at = Some(now_ms.saturating_add(self.config.debounce_ms));
    }

    pub fn has_pending(&self) -> bool {
        self.pending_at.is_some()
    }

    /// Apply a due evaluation.  Returns `Some(active)` when the gate flipped.
    pub fn poll(&mut self, now_ms: u64, scheduler: &mut TickScheduler) -> Option<bool> {
        match self.pending_at {
            Some(due) if now_ms >= due => {
                self.pending_at = None;
                self.apply(scheduler)
            }
            _ => None,
        }
    }

    /// Evaluate immediately, ignoring the debounce.
    pub fn flush(&mut self, scheduler: &mut TickScheduler) -> Option<bool> {
        self.pending_at = None;
        self.apply(scheduler)
    }

    fn apply(&mut self, scheduler: &mut TickScheduler) -> Option<bool> {
        let verdict = self.config.evaluate(&self.snapshot);
        let should_be_active = verdict.is_ok();
        self.reason = match verdict {
            Ok(()) => "Movement active".to_owned(),
            Err(reason) => reason.to_owned(),
        };
        if should_be_active == self.active {
            return None;
        }

        self.active = should_be_active;
        if should_be_active {
            scheduler.resume(&self.scope);
        } else {
            scheduler.pause(self.scope.clone());
        }
        info!(active = should_be_active, reason = %self.reason, "activation gate changed");
        Some(should_be_active)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Why movement is currently on or off.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn snapshot(&self) -> &WorldSnapshot {
        &self.snapshot
    }
}
