use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdlePhase {
    Active,
    Warning,
    Expired,
}

/// Edge-triggered outcome of one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdleTransition {
    None,
    /// Remaining time crossed into the warning band. Fires once per cycle.
    EnterWarning,
    /// The countdown ran out. Fires once; the controller then waits for
    /// `restart` (normally via the reset sequence).
    Expired,
}

/// Application-supplied reset hooks, shared between the automatic timeout
/// path and the explicit "return to start" action. Every hook must be
/// idempotent; the whole sequence may run twice in quick succession.
pub trait ResetActions {
    fn close_all_modals(&mut self);
    fn clear_selection_state(&mut self);
    fn restore_default_accessibility(&mut self);
    fn navigate_to_start(&mut self);
}

pub fn run_reset_sequence(target: &mut dyn ResetActions) {
    target.close_all_modals();
    target.clear_selection_state();
    target.restore_default_accessibility();
    target.navigate_to_start();
}

/// Session inactivity tracker.
///
/// One timer model: a sub-second tick recomputes remaining time from the
/// wall-clock activity anchor on every call. Remaining is always derived,
/// never stored, so ticks can never drift against a second clock.
#[derive(Debug)]
pub struct IdleController {
    last_activity: Instant,
    timeout: Duration,
    warning_threshold: Duration,
    debounce: Duration,
    warned: bool,
    expired: bool,
    /// Fixed shorter deadline while the warning interstitial is open.
    pinned_deadline: Option<Instant>,
}

impl IdleController {
    pub fn new(
        timeout: Duration,
        warning_threshold: Duration,
        debounce: Duration,
        now: Instant,
    ) -> Self {
        Self {
            last_activity: now,
            timeout,
            warning_threshold,
            debounce,
            warned: false,
            expired: false,
            pinned_deadline: None,
        }
    }

    /// `max(0, timeout - (now - last_activity))`, or the pinned window while
    /// the warning interstitial holds one.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.pinned_deadline {
            Some(deadline) => deadline.saturating_duration_since(now),
            None => self
                .timeout
                .saturating_sub(now.saturating_duration_since(self.last_activity)),
        }
    }

    pub fn phase(&self, now: Instant) -> IdlePhase {
        let remaining = self.remaining(now);
        if remaining.is_zero() {
            IdlePhase::Expired
        } else if remaining <= self.warning_threshold {
            IdlePhase::Warning
        } else {
            IdlePhase::Active
        }
    }

    pub fn tick(&mut self, now: Instant) -> IdleTransition {
        if self.expired {
            // Already reported; the reset sequence restarts the cycle.
            return IdleTransition::None;
        }
        let remaining = self.remaining(now);
        if remaining.is_zero() {
            self.expired = true;
            return IdleTransition::Expired;
        }
        if remaining <= self.warning_threshold && !self.warned {
            self.warned = true;
            return IdleTransition::EnterWarning;
        }
        IdleTransition::None
    }

    /// Debounced: bursts of input within the debounce window collapse into
    /// one anchor update. Ignored while the warning window is pinned — only
    /// an explicit dismissal extends the session then.
    pub fn record_activity(&mut self, now: Instant) {
        if self.pinned_deadline.is_some() || self.expired {
            return;
        }
        if now.saturating_duration_since(self.last_activity) <= self.debounce {
            return;
        }
        self.last_activity = now;
        self.warned = false;
    }

    /// Pin remaining time to a fixed short window while the warning
    /// interstitial is on screen.
    pub fn pin_warning_window(&mut self, now: Instant, window: Duration) {
        self.pinned_deadline = Some(now + window);
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned_deadline.is_some()
    }

    /// The interstitial went away. Regardless of how it was dismissed, the
    /// shortened window must not continue: the cycle restarts at the full
    /// default duration.
    pub fn unpin(&mut self, now: Instant) {
        self.pinned_deadline = None;
        self.restart(now);
    }

    /// Fresh full-duration cycle.
    pub fn restart(&mut self, now: Instant) {
        self.last_activity = now;
        self.warned = false;
        self.expired = false;
        self.pinned_deadline = None;
    }
}
