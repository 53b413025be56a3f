//! Long press versus tap disambiguation.
//!
//! Each down arms a timer whose length depends on the torch: switching the
//! torch off arms a short delay, switching it on a long one. If the timer
//! fires before release the press toggles the torch and the rest of the
//! sequence is swallowed; otherwise every event goes on to tap recognition.

use crate::config::TimingConfig;
use crate::core::gesture::{Gesture, GestureRecognizer};
use crate::core::torch::{ToggleOutcome, TorchActuator};
use crate::platform::{CameraService, SystemActions, TouchAction, TouchEvent};

/// Floor for the delay that switches the torch on.
pub const SWITCH_ON_FLOOR_MS: u64 = 1_000;

/// Cap applied to the long-press timeout when deriving the switch-off delay.
pub const SWITCH_OFF_CAP_MS: u64 = 500;

/// Margin added on top of the double-tap timeout for the switch-off delay.
pub const DOUBLE_TAP_MARGIN_MS: u64 = 100;

/// Hold delays before a press toggles the torch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressDelays {
    /// Armed while the torch is off.
    pub switch_on_ms: u64,
    /// Armed while the torch is on. Always shorter than `switch_on_ms`.
    pub switch_off_ms: u64,
}

impl PressDelays {
    /// Derive the delays from the platform's long-press and double-tap timeouts.
    pub fn from_timeouts(long_press_timeout_ms: u64, double_tap_timeout_ms: u64) -> Self {
        let switch_on_ms = long_press_timeout_ms.max(SWITCH_ON_FLOOR_MS);
        let switch_off_ms = (double_tap_timeout_ms + DOUBLE_TAP_MARGIN_MS)
            .max(long_press_timeout_ms.min(SWITCH_OFF_CAP_MS))
            .min(switch_on_ms - 1);

        Self {
            switch_on_ms,
            switch_off_ms,
        }
    }

    /// The delay to arm for the given acknowledged torch state.
    pub fn armed_for(&self, torch_on: bool) -> u64 {
        if torch_on {
            self.switch_off_ms
        } else {
            self.switch_on_ms
        }
    }
}

impl From<&TimingConfig> for PressDelays {
    fn from(config: &TimingConfig) -> Self {
        Self::from_timeouts(
            config.long_press_timeout.as_millis() as u64,
            config.double_tap_timeout.as_millis() as u64,
        )
    }
}

/// Where the current touch sequence stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressState {
    /// No sequence in progress.
    Idle,
    /// Finger down, long-press timer pending.
    Armed,
    /// Long press fired; the rest of the sequence is swallowed.
    Fired,
}

/// What happened to a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchOutcome {
    /// Swallowed after a long press.
    Consumed,
    /// Passed to tap recognition, possibly completing a gesture.
    Forwarded(Option<Gesture>),
}

#[derive(Debug, Clone, Copy)]
struct PressSession {
    long_press_fired: bool,
    armed_timeout_ms: u64,
    deadline: Option<u64>,
}

/// Splits touch sequences between the torch and tap recognition.
#[derive(Debug)]
pub struct PressDisambiguator {
    delays: PressDelays,
    session: Option<PressSession>,
}

impl PressDisambiguator {
    pub fn new(delays: PressDelays) -> Self {
        Self {
            delays,
            session: None,
        }
    }

    pub fn delays(&self) -> PressDelays {
        self.delays
    }

    pub fn state(&self) -> PressState {
        match self.session {
            Some(PressSession {
                long_press_fired: true,
                ..
            }) => PressState::Fired,
            Some(PressSession {
                deadline: Some(_), ..
            }) => PressState::Armed,
            _ => PressState::Idle,
        }
    }

    /// Delay armed by the current sequence, if any.
    pub fn armed_timeout_ms(&self) -> Option<u64> {
        self.session.map(|s| s.armed_timeout_ms)
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.session.and_then(|s| s.deadline)
    }

    /// Route one touch event. The caller reports every event as handled.
    pub fn on_touch(
        &mut self,
        event: &TouchEvent,
        torch_on: bool,
        gestures: &mut GestureRecognizer,
        actions: &mut dyn SystemActions,
    ) -> TouchOutcome {
        match event.action {
            TouchAction::Down => {
                let armed_timeout_ms = self.delays.armed_for(torch_on);
                self.session = Some(PressSession {
                    long_press_fired: false,
                    armed_timeout_ms,
                    deadline: Some(event.time_ms.saturating_add(armed_timeout_ms)),
                });
                tracing::debug!(
                    x = event.x,
                    y = event.y,
                    armed_timeout_ms,
                    "press armed"
                );
            }
            TouchAction::Up | TouchAction::Cancel => {
                let fired = self
                    .session
                    .take()
                    .map(|s| s.long_press_fired)
                    .unwrap_or(false);
                if fired {
                    tracing::debug!(action = ?event.action, "release after long press consumed");
                    return TouchOutcome::Consumed;
                }
            }
            TouchAction::Move => {}
        }

        TouchOutcome::Forwarded(gestures.on_touch(event, actions))
    }

    /// Fire the long press if its deadline has passed.
    pub fn on_timer<P>(
        &mut self,
        now_ms: u64,
        torch: &mut TorchActuator,
        gestures: &mut GestureRecognizer,
        platform: &mut P,
    ) -> Option<ToggleOutcome>
    where
        P: CameraService + SystemActions,
    {
        let session = self.session.as_mut()?;
        match session.deadline {
            Some(deadline) if deadline <= now_ms => {}
            _ => return None,
        }

        session.deadline = None;
        session.long_press_fired = true;
        tracing::debug!(
            armed_timeout_ms = session.armed_timeout_ms,
            "long press fired"
        );

        gestures.reset();
        Some(torch.toggle(platform))
    }

    /// Drop the sequence in progress without firing.
    pub fn clear(&mut self) {
        self.session = None;
    }
}
