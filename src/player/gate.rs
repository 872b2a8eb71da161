//! Ad interstitial gate
//!
//! Holds back the player behind a sponsor script for a countdown. Without a
//! script the content is shown immediately. Once the countdown passes, the
//! gate stays open for the rest of its lifetime.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use crate::models::{AdConfig, Placement};

/// Countdown step
pub const TICK: Duration = Duration::from_secs(1);

/// Where the gate currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatePhase {
    Counting { remaining: u32 },
    Passed,
}

/// What the page should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateView<'a> {
    Ad { script: &'a str, remaining: u32 },
    Content,
}

/// One-shot countdown in front of the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdGate {
    script: Option<String>,
    phase: GatePhase,
}

impl AdGate {
    /// Gate for a script and countdown. No script, or a zero countdown, starts open.
    pub fn new(script: Option<&str>, duration_secs: u32) -> Self {
        let script = script
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let phase = match (&script, duration_secs) {
            (Some(_), remaining) if remaining > 0 => GatePhase::Counting { remaining },
            _ => GatePhase::Passed,
        };
        Self { script, phase }
    }

    /// Gate configured from the player-loading placement
    pub fn from_ads(ads: Option<&AdConfig>) -> Self {
        match ads {
            Some(ads) => Self::new(
                ads.script(Placement::PlayerLoading),
                ads.loading_time_seconds(),
            ),
            None => Self::new(None, 0),
        }
    }

    pub fn phase(&self) -> &GatePhase {
        &self.phase
    }

    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    pub fn is_passed(&self) -> bool {
        self.phase == GatePhase::Passed
    }

    /// Advance the countdown by one second
    pub fn tick(&mut self) -> &GatePhase {
        if let GatePhase::Counting { remaining } = self.phase {
            self.phase = if remaining <= 1 {
                GatePhase::Passed
            } else {
                GatePhase::Counting {
                    remaining: remaining - 1,
                }
            };
        }
        &self.phase
    }

    pub fn view(&self) -> GateView<'_> {
        match (&self.phase, self.script.as_deref()) {
            (GatePhase::Counting { remaining }, Some(script)) => GateView::Ad {
                script,
                remaining: *remaining,
            },
            _ => GateView::Content,
        }
    }
}

/// Drives an [`AdGate`] on a one-second interval.
///
/// Observers get every change through a watch channel. Dropping the timer
/// stops the countdown.
pub struct GateTimer {
    state: watch::Receiver<AdGate>,
    task: Option<JoinHandle<()>>,
}

impl GateTimer {
    pub fn start(gate: AdGate) -> Self {
        let (tx, state) = watch::channel(gate.clone());
        let task = if gate.is_passed() {
            None
        } else {
            Some(tokio::spawn(count_down(gate, tx)))
        };
        Self { state, task }
    }

    /// Snapshot of the gate
    pub fn current(&self) -> AdGate {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AdGate> {
        self.state.clone()
    }

    /// Resolves once the content may be shown
    pub async fn wait_passed(&mut self) {
        if self.state.wait_for(AdGate::is_passed).await.is_err() {
            tracing::debug!("Gate countdown stopped before passing");
        }
    }

    /// Restart with a new gate when the placement script changed.
    ///
    /// The same script keeps the current countdown (or the open gate).
    pub fn rearm(&mut self, gate: AdGate) -> bool {
        if self.state.borrow().script() == gate.script() {
            return false;
        }
        *self = Self::start(gate);
        true
    }
}

impl Drop for GateTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn count_down(mut gate: AdGate, tx: watch::Sender<AdGate>) {
    let mut ticks = interval_at(Instant::now() + TICK, TICK);
    loop {
        ticks.tick().await;
        gate.tick();
        let passed = gate.is_passed();
        if tx.send(gate.clone()).is_err() || passed {
            break;
        }
    }
}
