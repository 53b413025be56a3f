//! Notch Touch - turns the dead touchscreen area over a display cutout into controls.
//!
//! A transparent overlay sits exactly over the camera cutout and catches raw
//! touches there. A single tap shows the volume UI, a double tap locks the
//! screen, and a long press toggles the torch.
//!
//! # Behavior
//!
//! - **Long press wins**: once a press has toggled the torch, its release never
//!   counts as a tap
//! - **Hardware is the truth**: the torch is on only after the camera service
//!   says so
//! - **Asymmetric hold**: switching the torch off takes a shorter hold than
//!   switching it on
//! - **Degrades quietly**: no cutout means no overlay, no flash means no torch
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Notch Service                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │   Overlay   │──▶│    Press    │──▶│   Gesture   │       │
//! │  │  (cutout)   │   │ (long/tap)  │   │ (1x / 2x)   │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │         ▲                 │                  │              │
//! │         │                 ▼                  ▼              │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │   Display   │   │    Torch    │   │   System    │       │
//! │  │   events    │   │  (camera)   │   │  actions    │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use notch_touch::{Config, NotchService, SimulatedPlatform, TouchEvent};
//!
//! let config = Config::default();
//! let platform = SimulatedPlatform::new(config.simulation.clone());
//! let mut service = NotchService::new(platform, &config);
//!
//! service.on_connect();
//! service.on_touch(TouchEvent::down(50.0, 10.0, 0));
//! service.on_touch(TouchEvent::up(50.0, 10.0, 60));
//! service.advance(400);
//! ```

pub mod config;
pub mod core;
pub mod platform;
pub mod runtime;
pub mod stats;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError, TimingConfig, TorchConfig};
pub use core::{Gesture, NotchService, OverlayState, PressDelays, PressState, SyncOutcome};
pub use platform::{
    CutoutRect, DisplayEvent, Platform, PlatformCall, PlatformError, Rotation, SimulatedPlatform,
    TouchAction, TouchEvent,
};
pub use runtime::{ScriptError, ServiceEvent};
pub use stats::{ActivityLog, ActivityStats, SharedActivityLog};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Gesture reference card that can be displayed to users.
pub const GESTURE_CARD: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║                 NOTCH TOUCH - GESTURE REFERENCE                  ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  Touch the area around the camera cutout:                        ║
║                                                                  ║
║  ✓ TAP ONCE:                                                     ║
║    • Shows the volume panel                                      ║
║                                                                  ║
║  ✓ TAP TWICE:                                                    ║
║    • Locks the screen                                            ║
║                                                                  ║
║  ✓ PRESS AND HOLD:                                               ║
║    • Switches the torch on (about one second, with a buzz)       ║
║    • Switches it off again (a shorter hold)                      ║
║                                                                  ║
║  ✗ NOTHING ELSE:                                                 ║
║    • Swipes starting at the cutout do nothing                    ║
║    • A hold never also counts as a tap                           ║
║                                                                  ║
║  Print the hold delays for your settings with:                   ║
║    notch-touch timeouts                                          ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;
