//! Pomodoro timer state machine.
//!
//! The timer is driven by [`Pomodoro::tick`], one call per second while
//! running; [`Pomodoro::run`] does that on a tokio interval.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub const WORK_SECS: u32 = 25 * 60;
pub const BREAK_SECS: u32 = 5 * 60;
pub const LONG_BREAK_SECS: u32 = 15 * 60;
/// Every n-th completed work session earns a long break
pub const LONG_BREAK_EVERY: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn duration_secs(&self) -> u32 {
        match self {
            Self::Work => WORK_SECS,
            Self::ShortBreak => BREAK_SECS,
            Self::LongBreak => LONG_BREAK_SECS,
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, Self::Work)
    }
}

/// Emitted when a phase runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PomodoroEvent {
    /// A work session finished; `sessions` is the new completed count
    BreakStarted { long: bool, sessions: u32 },
    WorkStarted,
}

impl PomodoroEvent {
    pub fn message(&self) -> &'static str {
        match self {
            Self::BreakStarted { long: true, .. } => "Well done! Time for a long break",
            Self::BreakStarted { long: false, .. } => "Time for a break",
            Self::WorkStarted => "Time to focus again!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pomodoro {
    phase: Phase,
    remaining_secs: u32,
    active: bool,
    sessions: u32,
}

impl Default for Pomodoro {
    fn default() -> Self {
        Self::new()
    }
}

impl Pomodoro {
    pub fn new() -> Self {
        Self {
            phase: Phase::Work,
            remaining_secs: WORK_SECS,
            active: false,
            sessions: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn sessions(&self) -> u32 {
        self.sessions
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// `MM:SS`
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }

    /// Elapsed share of the current phase, 0 to 100.
    pub fn progress_percent(&self) -> f64 {
        let total = f64::from(self.phase.duration_secs());
        (total - f64::from(self.remaining_secs)) / total * 100.0
    }

    /// Start or pause.
    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        self.active
    }

    /// Stop and return to a fresh work phase. Completed sessions are kept.
    pub fn reset(&mut self) {
        self.active = false;
        self.phase = Phase::Work;
        self.remaining_secs = WORK_SECS;
    }

    /// Advance one second. The phase switches on the tick after `00:00`.
    pub fn tick(&mut self) -> Option<PomodoroEvent> {
        if !self.active {
            return None;
        }
        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
            return None;
        }

        let event = match self.phase {
            Phase::Work => {
                self.sessions += 1;
                let long = self.sessions % LONG_BREAK_EVERY == 0;
                self.phase = if long { Phase::LongBreak } else { Phase::ShortBreak };
                PomodoroEvent::BreakStarted {
                    long,
                    sessions: self.sessions,
                }
            }
            Phase::ShortBreak | Phase::LongBreak => {
                self.phase = Phase::Work;
                PomodoroEvent::WorkStarted
            }
        };
        self.remaining_secs = self.phase.duration_secs();
        tracing::info!("{}", event.message());
        Some(event)
    }

    /// Tick once a second until cancelled, forwarding phase changes.
    pub async fn run(
        mut self,
        events: mpsc::Sender<PomodoroEvent>,
        cancel: CancellationToken,
    ) -> Self {
        self.active = true;
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // The first tick completes immediately
        interval.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    if let Some(event) = self.tick() {
                        if events.send(event).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
        self
    }
}
