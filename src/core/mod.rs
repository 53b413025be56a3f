//! Core controller logic.
//!
//! This module contains:
//! - Cutout bounds resolution
//! - Overlay surface lifecycle
//! - Long press versus tap disambiguation
//! - Single and double tap recognition
//! - Torch control through the camera service
//! - The service that wires them together

pub mod bounds;
pub mod gesture;
pub mod overlay;
pub mod press;
pub mod service;
pub mod torch;

// Re-export commonly used types
pub use bounds::BoundsProvider;
pub use gesture::{Gesture, GestureRecognizer, TapTiming};
pub use overlay::{OverlayLifecycleManager, OverlayState, OverlaySurface, SyncOutcome};
pub use press::{PressDelays, PressDisambiguator, PressState, TouchOutcome};
pub use service::NotchService;
pub use torch::{resolve_entry_point, ToggleOutcome, TorchActuator};
