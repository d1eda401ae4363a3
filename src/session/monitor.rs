// src/session/monitor.rs

use serde::{Deserialize, Serialize};

/// External attention signals reported by the client while a quiz is open.
/// Two binary sources: page visibility and window focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionSignal {
    PageHidden,
    PageVisible,
    WindowBlurred,
    WindowFocused,
}

/// What the client should do after a signal: drive the looping alarm and
/// optionally show a one-time warning notification.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AttentionUpdate {
    pub alarm_on: bool,
    pub warn: bool,
}

/// Anti-cheat monitor for one session.
///
/// Pure observer: turns the alarm on when attention leaves the quiz
/// (page hidden or window blurred) and off when it returns, emitting a
/// warning on each return. Signals have no effect unless the session is
/// in progress, and the alarm is forced off when the session leaves the
/// in-progress state.
#[derive(Debug, Default)]
pub struct AttentionMonitor {
    alarm_on: bool,
    warnings_issued: u32,
}

impl AttentionMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alarm_on(&self) -> bool {
        self.alarm_on
    }

    pub fn warnings_issued(&self) -> u32 {
        self.warnings_issued
    }

    /// Applies one attention signal. `in_progress` reflects the session
    /// state at the moment of the signal; outside of it nothing changes.
    pub fn observe(&mut self, signal: AttentionSignal, in_progress: bool) -> AttentionUpdate {
        if !in_progress {
            return AttentionUpdate {
                alarm_on: self.alarm_on,
                warn: false,
            };
        }

        let mut warn = false;
        match signal {
            AttentionSignal::PageHidden | AttentionSignal::WindowBlurred => {
                self.alarm_on = true;
            }
            AttentionSignal::PageVisible => {
                self.alarm_on = false;
                warn = true;
            }
            AttentionSignal::WindowFocused => {
                // Focus only clears an active alarm; a focus event with no
                // alarm running carries no information.
                if self.alarm_on {
                    self.alarm_on = false;
                    warn = true;
                }
            }
        }

        if warn {
            self.warnings_issued += 1;
        }

        AttentionUpdate {
            alarm_on: self.alarm_on,
            warn,
        }
    }

    /// Cleanup guarantee: the alarm never keeps sounding after the quiz
    /// ends. Called when the session leaves the in-progress state.
    pub fn force_off(&mut self) {
        self.alarm_on = false;
    }
}
