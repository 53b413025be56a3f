//! In-process model of the platform services.
//!
//! Backs the CLI and the test suite. Every call is recorded in order so
//! callers can assert on the exact side effects the controller produced.
//! Torch acknowledgements are sent into the host event queue when an ack
//! sender is attached, the same way a hardware callback would arrive.

use crate::config::SimulationConfig;
use crate::platform::{
    CameraService, CutoutRect, DisplayInsets, DisplayNotifications, NotificationPath, Platform,
    PlatformError, Rotation, SurfaceParams, SystemActions, TorchEntryPoint, WindowPresenter,
};
use crate::runtime::ServiceEvent;
use crossbeam_channel::Sender;

/// A side effect requested from the simulated platform.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    AddSurface(SurfaceParams),
    UpdateSurface(SurfaceParams),
    RemoveSurface,
    SetTorchMode {
        entry: TorchEntryPoint,
        camera_id: String,
        enabled: bool,
        level: u32,
    },
    RegisterTorchCallback,
    UnregisterTorchCallback,
    HeavyClick,
    NudgeVolume,
    LockScreen,
    Subscribe(NotificationPath),
    Unsubscribe(NotificationPath),
}

/// Simulated device implementing every platform trait.
pub struct SimulatedPlatform {
    config: SimulationConfig,
    rotation: Rotation,
    surface: Option<SurfaceParams>,
    subscription: Option<NotificationPath>,
    torch_callback: bool,
    reject_surfaces: bool,
    fail_inset_queries: bool,
    camera_access_denied: bool,
    ack_sender: Option<Sender<ServiceEvent>>,
    calls: Vec<PlatformCall>,
}

impl SimulatedPlatform {
    /// Create a simulated device from its configuration.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            rotation: Rotation::Deg0,
            surface: None,
            subscription: None,
            torch_callback: false,
            reject_surfaces: false,
            fail_inset_queries: false,
            camera_access_denied: false,
            ack_sender: None,
            calls: Vec::new(),
        }
    }

    /// Deliver torch acknowledgements into `sender`.
    pub fn with_ack_sender(mut self, sender: Sender<ServiceEvent>) -> Self {
        self.ack_sender = Some(sender);
        self
    }

    /// Turn the simulated display.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    /// Replace the cutout geometry for both orientations.
    pub fn set_cutouts(&mut self, portrait: Option<CutoutRect>, landscape: Option<CutoutRect>) {
        self.config.portrait_cutout = portrait;
        self.config.landscape_cutout = landscape;
    }

    /// Make the window service refuse new surfaces.
    pub fn reject_surfaces(&mut self, reject: bool) {
        self.reject_surfaces = reject;
    }

    /// Make inset queries fail.
    pub fn fail_inset_queries(&mut self, fail: bool) {
        self.fail_inset_queries = fail;
    }

    /// Make camera enumeration fail.
    pub fn deny_camera_access(&mut self, deny: bool) {
        self.camera_access_denied = deny;
    }

    /// Make torch requests fail as if another client held the camera.
    pub fn set_torch_busy(&mut self, busy: bool) {
        self.config.torch_busy = busy;
    }

    /// All calls recorded so far.
    pub fn calls(&self) -> &[PlatformCall] {
        &self.calls
    }

    /// Take and clear the recorded calls.
    pub fn take_calls(&mut self) -> Vec<PlatformCall> {
        std::mem::take(&mut self.calls)
    }

    /// Count recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&PlatformCall) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }

    /// The surface currently attached to the simulated window service.
    pub fn surface(&self) -> Option<&SurfaceParams> {
        self.surface.as_ref()
    }

    /// The active notification subscription.
    pub fn subscription(&self) -> Option<NotificationPath> {
        self.subscription
    }

    /// Whether a torch callback is registered.
    pub fn torch_callback_registered(&self) -> bool {
        self.torch_callback
    }
}

impl DisplayInsets for SimulatedPlatform {
    fn cutout_rects(&self) -> Result<Vec<CutoutRect>, PlatformError> {
        if self.fail_inset_queries {
            return Err(PlatformError::Query("window metrics unavailable".to_string()));
        }

        let cutout = if self.rotation.is_landscape() {
            self.config.landscape_cutout
        } else {
            self.config.portrait_cutout
        };
        Ok(cutout.into_iter().collect())
    }

    fn rotation(&self) -> Rotation {
        self.rotation
    }
}

impl WindowPresenter for SimulatedPlatform {
    fn add_surface(&mut self, params: &SurfaceParams) -> Result<(), PlatformError> {
        self.calls.push(PlatformCall::AddSurface(*params));
        if self.reject_surfaces {
            return Err(PlatformError::SurfaceRejected(
                "overlay permission missing".to_string(),
            ));
        }
        if self.surface.is_some() {
            return Err(PlatformError::SurfaceRejected(
                "surface already added".to_string(),
            ));
        }
        self.surface = Some(*params);
        Ok(())
    }

    fn update_surface(&mut self, params: &SurfaceParams) -> Result<(), PlatformError> {
        self.calls.push(PlatformCall::UpdateSurface(*params));
        match self.surface.as_mut() {
            Some(surface) => {
                *surface = *params;
                Ok(())
            }
            None => Err(PlatformError::NotAttached),
        }
    }

    fn remove_surface(&mut self) -> Result<(), PlatformError> {
        self.calls.push(PlatformCall::RemoveSurface);
        self.surface
            .take()
            .map(|_| ())
            .ok_or(PlatformError::NotAttached)
    }
}

impl CameraService for SimulatedPlatform {
    fn camera_ids(&self) -> Result<Vec<String>, PlatformError> {
        if self.camera_access_denied {
            return Err(PlatformError::AccessDenied("camera service".to_string()));
        }
        Ok(self.config.cameras.iter().map(|c| c.id.clone()).collect())
    }

    fn has_flash(&self, camera_id: &str) -> Result<bool, PlatformError> {
        self.config
            .cameras
            .iter()
            .find(|c| c.id == camera_id)
            .map(|c| c.flash)
            .ok_or_else(|| PlatformError::Query(format!("unknown camera {camera_id}")))
    }

    fn has_entry_point(&self, entry: TorchEntryPoint) -> bool {
        match entry {
            TorchEntryPoint::Standard => true,
            TorchEntryPoint::StandardWithLevel => self.config.level_entry_point,
            TorchEntryPoint::Vendor => self.config.vendor_entry_point,
        }
    }

    fn set_torch_mode(
        &mut self,
        entry: TorchEntryPoint,
        camera_id: &str,
        enabled: bool,
        level: u32,
    ) -> Result<(), PlatformError> {
        self.calls.push(PlatformCall::SetTorchMode {
            entry,
            camera_id: camera_id.to_string(),
            enabled,
            level,
        });

        if !self.has_entry_point(entry) {
            return Err(PlatformError::InvocationFailed(
                entry,
                "no such method".to_string(),
            ));
        }
        if self.config.torch_busy {
            return Err(PlatformError::CameraInUse);
        }

        tracing::info!(camera_id, enabled, "torch switched");
        if self.torch_callback {
            if let Some(ref sender) = self.ack_sender {
                let ack = ServiceEvent::TorchChanged {
                    camera_id: camera_id.to_string(),
                    enabled,
                };
                if let Err(e) = sender.send(ack) {
                    tracing::debug!("Torch ack dropped: {}", e);
                }
            }
        }
        Ok(())
    }

    fn register_torch_callback(&mut self) {
        self.calls.push(PlatformCall::RegisterTorchCallback);
        self.torch_callback = true;
    }

    fn unregister_torch_callback(&mut self) {
        self.calls.push(PlatformCall::UnregisterTorchCallback);
        self.torch_callback = false;
    }
}

impl SystemActions for SimulatedPlatform {
    fn heavy_click(&mut self) {
        self.calls.push(PlatformCall::HeavyClick);
        tracing::info!("haptic: heavy click");
    }

    fn nudge_volume(&mut self) {
        self.calls.push(PlatformCall::NudgeVolume);
        tracing::info!("volume UI shown");
    }

    fn lock_screen(&mut self) {
        self.calls.push(PlatformCall::LockScreen);
        tracing::info!("screen locked");
    }
}

impl DisplayNotifications for SimulatedPlatform {
    fn supports_rotation_callbacks(&self) -> bool {
        self.config.rotation_callbacks
    }

    fn subscribe(&mut self, path: NotificationPath) -> Result<(), PlatformError> {
        self.calls.push(PlatformCall::Subscribe(path));
        self.subscription = Some(path);
        Ok(())
    }

    fn unsubscribe(&mut self, path: NotificationPath) -> Result<(), PlatformError> {
        self.calls.push(PlatformCall::Unsubscribe(path));
        match self.subscription {
            Some(current) if current == path => {
                self.subscription = None;
                Ok(())
            }
            _ => Err(PlatformError::NotSubscribed),
        }
    }
}

impl Platform for SimulatedPlatform {
    fn sdk_version(&self) -> u32 {
        self.config.sdk_version
    }
}
