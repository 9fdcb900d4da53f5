//! Presence events and listeners.

use rw_core::{AgentId, RoomId};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PresenceEventKind {
    /// A move started; `room` is the destination.
    Moving,
    /// The agent is now an occupant of `room`.
    Entered,
    /// The agent is no longer an occupant of `room`.
    Left,
    /// An in-flight move was abandoned; `room` is where the agent remains.
    Stopped,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PresenceEvent {
    pub kind:          PresenceEventKind,
    pub agent:         AgentId,
    pub room:          RoomId,
    /// For `Moving` and `Entered`: the room the agent is coming from.
    pub previous_room: Option<RoomId>,
    pub timestamp_ms:  u64,
}

/// Handle returned by [`PresenceTracker::add_listener`][crate::PresenceTracker::add_listener].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u32);

/// Receives every presence event, synchronously and in emission order.
pub trait PresenceListener: Send {
    fn on_event(&mut self, event: &PresenceEvent);
}

impl<F> PresenceListener for F
where
    F: FnMut(&PresenceEvent) + Send,
{
    fn on_event(&mut self, event: &PresenceEvent) {
        self(event)
    }
}
