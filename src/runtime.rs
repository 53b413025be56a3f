//! Host runtime for the simulated platform.
//!
//! Everything the controller reacts to arrives as a [`ServiceEvent`] on one
//! queue: touches and display notifications from the input side, torch
//! acknowledgements from the camera service. Two drivers consume it:
//!
//! - [`replay`] runs a script on a virtual clock, firing timers exactly at
//!   their deadlines, and reports every platform call with its time.
//! - [`run_event_loop`] runs against the wall clock, waking for the next
//!   timer deadline or the next event, whichever comes first.

use crate::config::Config;
use crate::core::NotchService;
use crate::platform::{
    DisplayEvent, NotificationPath, PlatformCall, Rotation, SimulatedPlatform, TouchAction,
    TouchEvent,
};
use crate::stats::ActivityStats;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Longest the real-time loop sleeps before re-checking the stop flag.
const POLL_INTERVAL_MS: u64 = 100;

/// An input to the controller, as carried on the host queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServiceEvent {
    /// Raw touch on the overlay. Time comes from the host clock.
    Touch { action: TouchAction, x: f32, y: f32 },
    /// Torch callback from the camera service.
    #[serde(rename = "torch_ack")]
    TorchChanged { camera_id: String, enabled: bool },
    /// The display turned to `rotation`.
    Rotate { rotation: Rotation },
    ConfigurationChanged,
    ScreenOn,
    ScreenOff,
    /// The host is unbinding the service.
    Disconnect,
}

/// One scripted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptLine {
    /// Host time in milliseconds since connect.
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: ServiceEvent,
}

/// Errors loading a replay script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to read script: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Line {line}: at_ms {at_ms} is earlier than the previous event")]
    OutOfOrder { line: usize, at_ms: u64 },
}

/// Parse a JSON-lines script. Blank lines and `#` comments are skipped.
pub fn parse_script(text: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut lines = Vec::new();
    let mut last_at = 0;

    for (idx, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let line: ScriptLine = serde_json::from_str(trimmed).map_err(|source| {
            ScriptError::Parse {
                line: idx + 1,
                source,
            }
        })?;
        if line.at_ms < last_at {
            return Err(ScriptError::OutOfOrder {
                line: idx + 1,
                at_ms: line.at_ms,
            });
        }
        last_at = line.at_ms;
        lines.push(line);
    }

    Ok(lines)
}

/// Read and parse a script file.
pub fn load_script(path: &Path) -> Result<Vec<ScriptLine>, ScriptError> {
    let text = std::fs::read_to_string(path)?;
    parse_script(&text)
}

/// Hand one event to the service at host time `now_ms`.
///
/// Display notifications are only delivered for the source the overlay
/// subscribed to, as a real host would. Returns `false` once the service
/// has disconnected.
pub fn dispatch(
    service: &mut NotchService<SimulatedPlatform>,
    event: ServiceEvent,
    now_ms: u64,
) -> bool {
    service.advance(now_ms);

    match event {
        ServiceEvent::Touch { action, x, y } => {
            service.on_touch(TouchEvent::new(action, x, y, now_ms));
        }
        ServiceEvent::TorchChanged { camera_id, enabled } => {
            service.on_torch_changed(&camera_id, enabled);
        }
        ServiceEvent::Rotate { rotation } => {
            service.platform_mut().set_rotation(rotation);
            notify(service, DisplayEvent::Rotated(rotation));
        }
        ServiceEvent::ConfigurationChanged => notify(service, DisplayEvent::ConfigurationChanged),
        ServiceEvent::ScreenOn => notify(service, DisplayEvent::ScreenOn),
        ServiceEvent::ScreenOff => notify(service, DisplayEvent::ScreenOff),
        ServiceEvent::Disconnect => {
            service.on_disconnect();
            return false;
        }
    }
    true
}

fn notify(service: &mut NotchService<SimulatedPlatform>, event: DisplayEvent) {
    let subscribed = service.platform().subscription();
    let delivered = match event {
        DisplayEvent::Rotated(_) => subscribed == Some(NotificationPath::Rotation),
        DisplayEvent::ConfigurationChanged | DisplayEvent::ScreenOn | DisplayEvent::ScreenOff => {
            subscribed == Some(NotificationPath::Legacy)
        }
    };

    if delivered {
        let outcome = service.on_display_event(event);
        tracing::debug!(?event, ?outcome, "display event handled");
    } else {
        tracing::debug!(?event, "display event not subscribed");
    }
}

/// A platform call made during a replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayStep {
    pub at_ms: u64,
    pub call: PlatformCall,
}

/// Everything a replay produced.
#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub steps: Vec<ReplayStep>,
    pub stats: ActivityStats,
}

impl ReplayReport {
    /// Calls matching `pred`, in order.
    pub fn calls<'a>(
        &'a self,
        pred: impl Fn(&PlatformCall) -> bool + 'a,
    ) -> impl Iterator<Item = &'a ReplayStep> + 'a {
        self.steps.iter().filter(move |step| pred(&step.call))
    }
}

/// Run a script on a virtual clock.
///
/// The service connects at time zero. Timers fire exactly at their deadlines
/// between scripted events, and torch acknowledgements are delivered as soon
/// as the request that caused them returns. After the last line, pending
/// timers are run out and the service disconnects unless the script did.
pub fn replay(config: &Config, script: &[ScriptLine]) -> ReplayReport {
    let (tx, rx) = unbounded();
    let platform = SimulatedPlatform::new(config.simulation.clone()).with_ack_sender(tx);
    let mut service = NotchService::new(platform, config);
    let mut steps = Vec::new();

    service.on_connect();
    record(&mut service, 0, &mut steps);

    let mut now = 0;
    let mut connected = true;
    for line in script {
        settle(&mut service, &rx, line.at_ms, &mut steps);
        now = line.at_ms;

        connected = dispatch(&mut service, line.event.clone(), now);
        deliver_acks(&mut service, &rx, now);
        record(&mut service, now, &mut steps);
        if !connected {
            break;
        }
    }

    if connected {
        while let Some(deadline) = service.next_deadline() {
            settle(&mut service, &rx, deadline, &mut steps);
            now = deadline;
        }
        service.on_disconnect();
        record(&mut service, now, &mut steps);
    }

    ReplayReport {
        steps,
        stats: service.activity().stats(),
    }
}

fn settle(
    service: &mut NotchService<SimulatedPlatform>,
    acks: &Receiver<ServiceEvent>,
    until_ms: u64,
    steps: &mut Vec<ReplayStep>,
) {
    while let Some(deadline) = service.next_deadline().filter(|d| *d <= until_ms) {
        service.advance(deadline);
        deliver_acks(service, acks, deadline);
        record(service, deadline, steps);
    }
}

fn deliver_acks(
    service: &mut NotchService<SimulatedPlatform>,
    acks: &Receiver<ServiceEvent>,
    now_ms: u64,
) {
    while let Ok(event) = acks.try_recv() {
        dispatch(service, event, now_ms);
    }
}

fn record(service: &mut NotchService<SimulatedPlatform>, at_ms: u64, steps: &mut Vec<ReplayStep>) {
    steps.extend(
        service
            .platform_mut()
            .take_calls()
            .into_iter()
            .map(|call| ReplayStep { at_ms, call }),
    );
}

/// Drive the service in real time until `running` clears or the service disconnects.
///
/// Torch acknowledgements are expected on the same queue as input events.
pub fn run_event_loop(
    service: &mut NotchService<SimulatedPlatform>,
    events: &Receiver<ServiceEvent>,
    running: &AtomicBool,
) {
    let start = Instant::now();
    let now = || start.elapsed().as_millis() as u64;

    while running.load(Ordering::SeqCst) {
        let wait_ms = service
            .next_deadline()
            .map(|d| d.saturating_sub(now()))
            .unwrap_or(POLL_INTERVAL_MS)
            .min(POLL_INTERVAL_MS);

        match events.recv_timeout(Duration::from_millis(wait_ms)) {
            Ok(event) => {
                if !dispatch(service, event, now()) {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => service.advance(now()),
            Err(RecvTimeoutError::Disconnected) => {
                tracing::warn!("Event queue closed");
                break;
            }
        }
    }
}

/// Forward JSON-lines events from `reader` until it ends, then send a disconnect.
///
/// Malformed lines are logged and skipped.
pub fn read_events<R: BufRead>(reader: R, sender: &Sender<ServiceEvent>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Failed to read event: {}", e);
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<ServiceEvent>(trimmed) {
            Ok(event) => {
                if sender.send(event).is_err() {
                    return;
                }
            }
            Err(e) => tracing::warn!("Ignoring malformed event: {}", e),
        }
    }

    if let Err(e) = sender.send(ServiceEvent::Disconnect) {
        tracing::debug!("Disconnect not delivered: {}", e);
    }
}
