//! Interfaces to the operating environment.
//!
//! The controller never talks to the display, window manager, camera or
//! feedback services directly. Each service is a trait here; a host binds
//! them to the real platform, and [`sim::SimulatedPlatform`] binds them to an
//! in-process model for the CLI and tests.

pub mod sim;
pub mod types;

pub use sim::{PlatformCall, SimulatedPlatform};
pub use types::{
    CutoutRect, DisplayEvent, NotificationPath, Rotation, SurfaceFlags, SurfaceParams,
    TorchEntryPoint, TouchAction, TouchEvent,
};

/// Failures reported by platform services.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("camera in use")]
    CameraInUse,

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("entry point {0:?} failed: {1}")]
    InvocationFailed(TorchEntryPoint, String),

    #[error("surface rejected: {0}")]
    SurfaceRejected(String),

    #[error("surface not attached")]
    NotAttached,

    #[error("not subscribed")]
    NotSubscribed,

    #[error("query failed: {0}")]
    Query(String),
}

/// Display geometry queries.
pub trait DisplayInsets {
    /// Bounding rectangles of the display cutout in the current orientation.
    ///
    /// `Ok(vec![])` means the display reports a cutout object with no rectangles;
    /// a device without a cutout also returns an empty list.
    fn cutout_rects(&self) -> Result<Vec<CutoutRect>, PlatformError>;

    /// Current display rotation.
    fn rotation(&self) -> Rotation;
}

/// The window-presentation service hosting the overlay surface.
pub trait WindowPresenter {
    fn add_surface(&mut self, params: &SurfaceParams) -> Result<(), PlatformError>;
    fn update_surface(&mut self, params: &SurfaceParams) -> Result<(), PlatformError>;
    fn remove_surface(&mut self) -> Result<(), PlatformError>;
}

/// Camera enumeration and torch control.
pub trait CameraService {
    fn camera_ids(&self) -> Result<Vec<String>, PlatformError>;
    fn has_flash(&self, camera_id: &str) -> Result<bool, PlatformError>;

    /// Dynamic lookup of an activation entry point.
    fn has_entry_point(&self, entry: TorchEntryPoint) -> bool;

    /// Request a torch mode. The outcome is reported later through the torch callback.
    fn set_torch_mode(
        &mut self,
        entry: TorchEntryPoint,
        camera_id: &str,
        enabled: bool,
        level: u32,
    ) -> Result<(), PlatformError>;

    fn register_torch_callback(&mut self);
    fn unregister_torch_callback(&mut self);
}

/// Fire-and-forget system actions triggered by gestures.
pub trait SystemActions {
    /// Predefined heavy-click vibration.
    fn heavy_click(&mut self);
    /// Adjust the music stream by zero steps with the volume UI shown.
    fn nudge_volume(&mut self);
    /// Global lock-screen action.
    fn lock_screen(&mut self);
}

/// Rotation, configuration and screen-power notifications.
pub trait DisplayNotifications {
    /// Whether the platform can deliver continuous rotation callbacks.
    fn supports_rotation_callbacks(&self) -> bool;
    fn subscribe(&mut self, path: NotificationPath) -> Result<(), PlatformError>;
    fn unsubscribe(&mut self, path: NotificationPath) -> Result<(), PlatformError>;
}

/// Everything the controller consumes from its host.
pub trait Platform:
    DisplayInsets + WindowPresenter + CameraService + SystemActions + DisplayNotifications
{
    /// Platform API level, used to pick the torch entry point.
    fn sdk_version(&self) -> u32;
}
