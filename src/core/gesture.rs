//! Single and double tap recognition.
//!
//! Follows the platform's standard tap discrimination: a down arms a
//! single-tap confirmation deadline one double-tap timeout later, and a
//! second down that lands while it is still pending, close enough in time
//! and space to the first tap, is a double tap. Long press is not
//! recognized here; the press disambiguator owns it.

use crate::config::TimingConfig;
use crate::platform::{SystemActions, TouchAction, TouchEvent};

/// A recognized gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// One tap, confirmed once no second tap followed. Shows the volume UI.
    SingleTap,
    /// Two taps in quick succession. Locks the screen.
    DoubleTap,
}

/// Tap timing and slop, in milliseconds and pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapTiming {
    pub double_tap_timeout_ms: u64,
    pub double_tap_min_time_ms: u64,
    pub touch_slop: f32,
    pub double_tap_slop: f32,
}

impl From<&TimingConfig> for TapTiming {
    fn from(config: &TimingConfig) -> Self {
        Self {
            double_tap_timeout_ms: config.double_tap_timeout.as_millis() as u64,
            double_tap_min_time_ms: config.double_tap_min_time.as_millis() as u64,
            touch_slop: config.touch_slop,
            double_tap_slop: config.double_tap_slop,
        }
    }
}

impl Default for TapTiming {
    fn default() -> Self {
        Self::from(&TimingConfig::default())
    }
}

#[derive(Debug, Clone, Copy)]
struct Point {
    x: f32,
    y: f32,
}

impl Point {
    fn of(event: &TouchEvent) -> Self {
        Self {
            x: event.x,
            y: event.y,
        }
    }

    fn distance_sq(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Classifies touch sequences into single and double taps and dispatches them.
#[derive(Debug)]
pub struct GestureRecognizer {
    timing: TapTiming,
    /// Pending single-tap confirmation.
    confirm_deadline: Option<u64>,
    current_down: Option<(Point, u64)>,
    previous_up: Option<u64>,
    still_down: bool,
    in_tap_region: bool,
    double_tapping: bool,
    defer_confirm: bool,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(TapTiming::default())
    }
}

impl GestureRecognizer {
    pub fn new(timing: TapTiming) -> Self {
        Self {
            timing,
            confirm_deadline: None,
            current_down: None,
            previous_up: None,
            still_down: false,
            in_tap_region: false,
            double_tapping: false,
            defer_confirm: false,
        }
    }

    /// Feed one touch event, dispatching any gesture it completes.
    pub fn on_touch(
        &mut self,
        event: &TouchEvent,
        actions: &mut dyn SystemActions,
    ) -> Option<Gesture> {
        let gesture = match event.action {
            TouchAction::Down => self.handle_down(event),
            TouchAction::Move => {
                self.handle_move(event);
                None
            }
            TouchAction::Up => self.handle_up(event),
            TouchAction::Cancel => {
                self.reset();
                None
            }
        };

        if let Some(gesture) = gesture {
            dispatch(gesture, actions);
        }
        gesture
    }

    /// Fire the single-tap confirmation if it is due.
    pub fn on_timer(&mut self, now_ms: u64, actions: &mut dyn SystemActions) -> Option<Gesture> {
        match self.confirm_deadline {
            Some(deadline) if deadline <= now_ms => {}
            _ => return None,
        }
        self.confirm_deadline = None;

        if self.still_down {
            self.defer_confirm = true;
            return None;
        }

        dispatch(Gesture::SingleTap, actions);
        Some(Gesture::SingleTap)
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.confirm_deadline
    }

    fn clear_sequence(&mut self) {
        self.confirm_deadline = None;
        self.still_down = false;
        self.in_tap_region = false;
        self.double_tapping = false;
        self.defer_confirm = false;
    }

    /// Drop all state, including the previous tap a double tap could pair with.
    pub fn reset(&mut self) {
        self.clear_sequence();
        self.current_down = None;
        self.previous_up = None;
    }

    fn handle_down(&mut self, event: &TouchEvent) -> Option<Gesture> {
        let had_pending_tap = self.confirm_deadline.take().is_some();
        let point = Point::of(event);

        let gesture = if had_pending_tap && self.is_second_tap(point, event.time_ms) {
            self.double_tapping = true;
            Some(Gesture::DoubleTap)
        } else {
            self.confirm_deadline = Some(
                event
                    .time_ms
                    .saturating_add(self.timing.double_tap_timeout_ms),
            );
            None
        };

        self.current_down = Some((point, event.time_ms));
        self.still_down = true;
        self.in_tap_region = true;
        self.defer_confirm = false;
        gesture
    }

    fn handle_move(&mut self, event: &TouchEvent) {
        if !self.in_tap_region {
            return;
        }
        let Some((down, _)) = self.current_down else {
            return;
        };

        let slop = self.timing.touch_slop;
        if Point::of(event).distance_sq(down) > slop * slop {
            self.in_tap_region = false;
            self.confirm_deadline = None;
        }
    }

    fn handle_up(&mut self, event: &TouchEvent) -> Option<Gesture> {
        self.still_down = false;

        let gesture = if !self.double_tapping && self.in_tap_region && self.defer_confirm {
            Some(Gesture::SingleTap)
        } else {
            None
        };

        self.previous_up = Some(event.time_ms);
        self.double_tapping = false;
        self.defer_confirm = false;
        gesture
    }

    fn is_second_tap(&self, point: Point, time_ms: u64) -> bool {
        let (Some((first_down, _)), Some(first_up)) = (self.current_down, self.previous_up) else {
            return false;
        };
        if !self.in_tap_region {
            return false;
        }

        let gap = time_ms.saturating_sub(first_up);
        if gap > self.timing.double_tap_timeout_ms || gap < self.timing.double_tap_min_time_ms {
            return false;
        }

        let slop = self.timing.double_tap_slop;
        point.distance_sq(first_down) < slop * slop
    }
}

fn dispatch(gesture: Gesture, actions: &mut dyn SystemActions) {
    tracing::debug!(?gesture, "gesture recognized");
    match gesture {
        Gesture::SingleTap => actions.nudge_volume(),
        Gesture::DoubleTap => actions.lock_screen(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorded {
        volume: usize,
        lock: usize,
        haptic: usize,
    }

    impl SystemActions for Recorded {
        fn heavy_click(&mut self) {
            self.haptic += 1;
        }

        fn nudge_volume(&mut self) {
            self.volume += 1;
        }

        fn lock_screen(&mut self) {
            self.lock += 1;
        }
    }

    fn ev(action: TouchAction, x: f32, t: u64) -> TouchEvent {
        TouchEvent::new(action, x, 10.0, t)
    }

    #[test]
    fn test_single_tap_confirmed_after_timeout() {
        let mut recognizer = GestureRecognizer::default();
        let mut actions = Recorded::default();

        assert_eq!(recognizer.on_touch(&ev(TouchAction::Down, 5.0, 0), &mut actions), None);
        assert_eq!(recognizer.on_touch(&ev(TouchAction::Up, 5.0, 60), &mut actions), None);
        assert_eq!(recognizer.next_deadline(), Some(300));

        assert_eq!(recognizer.on_timer(299, &mut actions), None);
        assert_eq!(
            recognizer.on_timer(300, &mut actions),
            Some(Gesture::SingleTap)
        );
        assert_eq!(actions.volume, 1);
        assert_eq!(actions.lock, 0);
    }

    #[test]
    fn test_double_tap_fires_on_second_down() {
        let mut recognizer = GestureRecognizer::default();
        let mut actions = Recorded::default();

        recognizer.on_touch(&ev(TouchAction::Down, 5.0, 0), &mut actions);
        recognizer.on_touch(&ev(TouchAction::Up, 5.0, 50), &mut actions);
        assert_eq!(
            recognizer.on_touch(&ev(TouchAction::Down, 7.0, 150), &mut actions),
            Some(Gesture::DoubleTap)
        );
        assert_eq!(recognizer.on_touch(&ev(TouchAction::Up, 7.0, 200), &mut actions), None);

        assert_eq!(recognizer.next_deadline(), None);
        assert_eq!(recognizer.on_timer(1_000, &mut actions), None);
        assert_eq!(actions.lock, 1);
        assert_eq!(actions.volume, 0);
    }

    #[test]
    fn test_second_tap_too_soon_is_not_double() {
        let mut recognizer = GestureRecognizer::default();
        let mut actions = Recorded::default();

        recognizer.on_touch(&ev(TouchAction::Down, 5.0, 0), &mut actions);
        recognizer.on_touch(&ev(TouchAction::Up, 5.0, 50), &mut actions);
        assert_eq!(
            recognizer.on_touch(&ev(TouchAction::Down, 5.0, 60), &mut actions),
            None
        );
        assert_eq!(actions.lock, 0);
    }

    #[test]
    fn test_second_tap_too_far_is_not_double() {
        let mut recognizer = GestureRecognizer::default();
        let mut actions = Recorded::default();

        recognizer.on_touch(&ev(TouchAction::Down, 0.0, 0), &mut actions);
        recognizer.on_touch(&ev(TouchAction::Up, 0.0, 50), &mut actions);
        recognizer.on_touch(&ev(TouchAction::Down, 150.0, 150), &mut actions);
        assert_eq!(actions.lock, 0);
    }

    #[test]
    fn test_held_tap_confirms_on_release() {
        let mut recognizer = GestureRecognizer::default();
        let mut actions = Recorded::default();

        recognizer.on_touch(&ev(TouchAction::Down, 5.0, 0), &mut actions);
        assert_eq!(recognizer.on_timer(300, &mut actions), None);
        assert_eq!(
            recognizer.on_touch(&ev(TouchAction::Up, 5.0, 350), &mut actions),
            Some(Gesture::SingleTap)
        );
        assert_eq!(actions.volume, 1);
    }

    #[test]
    fn test_move_beyond_slop_is_not_a_tap() {
        let mut recognizer = GestureRecognizer::default();
        let mut actions = Recorded::default();

        recognizer.on_touch(&ev(TouchAction::Down, 5.0, 0), &mut actions);
        recognizer.on_touch(&ev(TouchAction::Move, 40.0, 30), &mut actions);
        recognizer.on_touch(&ev(TouchAction::Up, 40.0, 60), &mut actions);

        assert_eq!(recognizer.next_deadline(), None);
        assert_eq!(recognizer.on_timer(1_000, &mut actions), None);
        assert_eq!(actions.volume, 0);
    }

    #[test]
    fn test_small_move_stays_a_tap() {
        let mut recognizer = GestureRecognizer::default();
        let mut actions = Recorded::default();

        recognizer.on_touch(&ev(TouchAction::Down, 5.0, 0), &mut actions);
        recognizer.on_touch(&ev(TouchAction::Move, 9.0, 30), &mut actions);
        recognizer.on_touch(&ev(TouchAction::Up, 9.0, 60), &mut actions);
        assert_eq!(
            recognizer.on_timer(300, &mut actions),
            Some(Gesture::SingleTap)
        );
    }

    #[test]
    fn test_cancel_drops_pending_tap() {
        let mut recognizer = GestureRecognizer::default();
        let mut actions = Recorded::default();

        recognizer.on_touch(&ev(TouchAction::Down, 5.0, 0), &mut actions);
        recognizer.on_touch(&ev(TouchAction::Cancel, 5.0, 40), &mut actions);
        assert_eq!(recognizer.on_timer(1_000, &mut actions), None);
        assert_eq!(actions.volume, 0);
        assert_eq!(actions.haptic, 0);
    }

    #[test]
    fn test_down_at_end_of_clock_does_not_overflow() {
        let mut recognizer = GestureRecognizer::default();
        let mut actions = Recorded::default();

        recognizer.on_touch(&ev(TouchAction::Down, 5.0, u64::MAX - 1), &mut actions);
        assert_eq!(recognizer.next_deadline(), Some(u64::MAX));
        recognizer.on_touch(&ev(TouchAction::Up, 5.0, u64::MAX), &mut actions);
        assert_eq!(
            recognizer.on_timer(u64::MAX, &mut actions),
            Some(Gesture::SingleTap)
        );
    }

    #[test]
    fn test_reset_forgets_previous_tap() {
        let mut recognizer = GestureRecognizer::default();
        let mut actions = Recorded::default();

        recognizer.on_touch(&ev(TouchAction::Down, 5.0, 0), &mut actions);
        recognizer.on_touch(&ev(TouchAction::Up, 5.0, 50), &mut actions);
        recognizer.reset();
        assert_eq!(
            recognizer.on_touch(&ev(TouchAction::Down, 5.0, 150), &mut actions),
            None
        );
        assert_eq!(actions.lock, 0);
    }
}
