//! Notification session: a two-state machine over the shared snapshot, not
//! per connection. One non-empty increase set arms it; the next empty tick
//! disarms it, so a change pulses for exactly one polling interval unless
//! totals keep climbing.

use serde::{Deserialize, Serialize};

use crate::detect::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyState {
    Idle,
    Active,
}

impl NotifyState {
    pub fn from_flag(active: bool) -> Self {
        if active {
            NotifyState::Active
        } else {
            NotifyState::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, NotifyState::Active)
    }
}

/// Pure transition function driven by the tick's increase set.
pub fn transition(state: NotifyState, any_increase: bool) -> NotifyState {
    match (state, any_increase) {
        (NotifyState::Idle, true) => NotifyState::Active,
        (NotifyState::Active, false) => NotifyState::Idle,
        (s, _) => s,
    }
}

/// What the presentation layer consumes once per tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationView {
    pub active: bool,
    pub message: String,
}

impl NotificationView {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            active: snapshot.notification_active,
            message: snapshot.message.clone(),
        }
    }

    pub fn idle() -> Self {
        Self {
            active: false,
            message: String::new(),
        }
    }
}
