//! The controller as seen by its host.
//!
//! [`NotchService`] wires the components together over one [`Platform`] and
//! exposes the hooks a host calls from its single event queue: connect and
//! disconnect, touch intake, torch callbacks, display notifications, and
//! timer expiry through [`NotchService::advance`].

use crate::config::Config;
use crate::core::gesture::{Gesture, GestureRecognizer, TapTiming};
use crate::core::overlay::{OverlayLifecycleManager, OverlayState, SyncOutcome};
use crate::core::press::{PressDelays, PressDisambiguator, PressState, TouchOutcome};
use crate::core::torch::{ToggleOutcome, TorchActuator};
use crate::platform::{DisplayEvent, Platform, TouchEvent};
use crate::stats::{create_shared_log, SharedActivityLog};

/// Notch overlay and gesture/hardware controller.
pub struct NotchService<P: Platform> {
    platform: P,
    overlay: OverlayLifecycleManager,
    torch: TorchActuator,
    press: PressDisambiguator,
    gestures: GestureRecognizer,
    activity: SharedActivityLog,
}

impl<P: Platform> NotchService<P> {
    pub fn new(platform: P, config: &Config) -> Self {
        Self {
            platform,
            overlay: OverlayLifecycleManager::new(),
            torch: TorchActuator::new(config.torch.strength_level),
            press: PressDisambiguator::new(PressDelays::from(&config.timing)),
            gestures: GestureRecognizer::new(TapTiming::from(&config.timing)),
            activity: create_shared_log(),
        }
    }

    /// Record activity into an existing log instead of a private one.
    pub fn with_activity(mut self, activity: SharedActivityLog) -> Self {
        self.activity = activity;
        self
    }

    /// Host connected: find the torch and attach the overlay.
    pub fn on_connect(&mut self) {
        tracing::info!("service connected");
        self.torch.initialize(&mut self.platform);
        self.overlay.start(&mut self.platform);
    }

    /// Host disconnecting: tear everything down. Safe to call repeatedly.
    pub fn on_disconnect(&mut self) {
        self.overlay.stop(&mut self.platform);
        self.torch.shutdown(&mut self.platform);
        self.press.clear();
        self.gestures.reset();
        tracing::info!("service disconnected");
    }

    /// Raw touch intake from the overlay surface. Always reports the event handled.
    pub fn on_touch(&mut self, event: TouchEvent) -> bool {
        self.activity.record_touch();
        self.advance(event.time_ms);

        let outcome = self.press.on_touch(
            &event,
            self.torch.is_on(),
            &mut self.gestures,
            &mut self.platform,
        );
        if let TouchOutcome::Forwarded(Some(gesture)) = outcome {
            self.record_gesture(gesture);
        }
        true
    }

    /// Torch callback from the camera service.
    pub fn on_torch_changed(&mut self, camera_id: &str, enabled: bool) {
        self.torch.on_hardware_torch_changed(camera_id, enabled);
    }

    /// Rotation, configuration or screen power notification.
    pub fn on_display_event(&mut self, event: DisplayEvent) -> SyncOutcome {
        let outcome = self.overlay.on_display_event(event, &mut self.platform);
        if outcome == SyncOutcome::Relayout {
            self.activity.record_relayout();
        }
        outcome
    }

    /// Earliest pending timer, in host milliseconds.
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.press.next_deadline(), self.gestures.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fire every timer due at or before `now_ms`, earliest first.
    pub fn advance(&mut self, now_ms: u64) {
        while let Some(deadline) = self.next_deadline().filter(|d| *d <= now_ms) {
            if self.press.next_deadline() == Some(deadline) {
                let toggled = self.press.on_timer(
                    deadline,
                    &mut self.torch,
                    &mut self.gestures,
                    &mut self.platform,
                );
                if let Some(outcome) = toggled {
                    self.record_toggle(outcome);
                }
            } else if let Some(gesture) = self.gestures.on_timer(deadline, &mut self.platform) {
                self.record_gesture(gesture);
            }
        }
    }

    pub fn overlay_state(&self) -> OverlayState {
        self.overlay.state()
    }

    pub fn overlay(&self) -> &OverlayLifecycleManager {
        &self.overlay
    }

    pub fn torch(&self) -> &TorchActuator {
        &self.torch
    }

    pub fn press_state(&self) -> PressState {
        self.press.state()
    }

    pub fn press_delays(&self) -> PressDelays {
        self.press.delays()
    }

    pub fn activity(&self) -> &SharedActivityLog {
        &self.activity
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    fn record_gesture(&self, gesture: Gesture) {
        match gesture {
            Gesture::SingleTap => self.activity.record_single_tap(),
            Gesture::DoubleTap => self.activity.record_double_tap(),
        }
    }

    fn record_toggle(&self, outcome: ToggleOutcome) {
        self.activity.record_long_press();
        match outcome {
            ToggleOutcome::Requested { .. } => self.activity.record_torch_request(),
            ToggleOutcome::Failed => self.activity.record_torch_failure(),
            ToggleOutcome::Unavailable => {}
        }
    }
}
