//! Torch (flashlight) control through the camera service.
//!
//! The actuator never assumes a request succeeded. The torch is considered
//! on only after the camera service reports it through the torch callback,
//! so overlapping toggles and late acknowledgements cannot desync it.

use crate::platform::{CameraService, Platform, SystemActions, TorchEntryPoint};

/// Highest platform API level on which the level-taking standard overload is tried.
/// Newer levels try the vendor alternate instead.
pub const LEVEL_ENTRY_MAX_SDK: u32 = 32;

/// Pick the entry point used for every torch request.
///
/// The version threshold selects a candidate; if the camera service does not
/// expose it, the plain standard call is used.
pub fn resolve_entry_point(sdk_version: u32, camera: &dyn CameraService) -> TorchEntryPoint {
    let candidate = if sdk_version <= LEVEL_ENTRY_MAX_SDK {
        TorchEntryPoint::StandardWithLevel
    } else {
        TorchEntryPoint::Vendor
    };

    if camera.has_entry_point(candidate) {
        candidate
    } else {
        tracing::debug!(?candidate, "entry point not found, using standard");
        TorchEntryPoint::Standard
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Availability {
    Unavailable,
    Available { camera_id: String, on: bool },
}

/// Result of a toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The camera service accepted a request for the given state.
    Requested { enabled: bool },
    /// No flash-capable camera; nothing was done.
    Unavailable,
    /// The request failed and was dropped.
    Failed,
}

/// Drives the torch of the first flash-capable camera.
#[derive(Debug)]
pub struct TorchActuator {
    state: Availability,
    /// Last acknowledged state, kept across shutdown.
    retained: Option<(String, bool)>,
    entry_point: Option<TorchEntryPoint>,
    level: u32,
}

impl TorchActuator {
    /// Create an actuator passing `level` to entry points that take a strength.
    pub fn new(level: u32) -> Self {
        Self {
            state: Availability::Unavailable,
            retained: None,
            entry_point: None,
            level,
        }
    }

    /// Find a flash-capable camera and start listening for torch changes.
    ///
    /// Returns whether the torch is usable. The entry point is resolved on the
    /// first call only.
    pub fn initialize<P: Platform>(&mut self, platform: &mut P) -> bool {
        if self.entry_point.is_none() {
            let entry = resolve_entry_point(platform.sdk_version(), &*platform);
            tracing::debug!(?entry, "resolved torch entry point");
            self.entry_point = Some(entry);
        }

        if self.is_available() {
            return true;
        }

        let camera_id = match find_flash_camera(&*platform) {
            Some(id) => id,
            None => {
                tracing::info!("No flash-capable camera, long press disabled");
                self.state = Availability::Unavailable;
                return false;
            }
        };

        let on = match &self.retained {
            Some((id, on)) if *id == camera_id => *on,
            _ => false,
        };
        platform.register_torch_callback();
        tracing::info!(camera_id = %camera_id, on, "torch available");
        self.state = Availability::Available { camera_id, on };
        true
    }

    /// Stop listening for torch changes and forget the camera.
    ///
    /// The last acknowledged state is kept and restored if the same camera is
    /// found again, since the hardware stays lit across a rebind.
    pub fn shutdown(&mut self, camera: &mut dyn CameraService) {
        let state = std::mem::replace(&mut self.state, Availability::Unavailable);
        if let Availability::Available { camera_id, on } = state {
            camera.unregister_torch_callback();
            self.retained = Some((camera_id, on));
        }
    }

    /// Request the opposite of the last acknowledged state.
    ///
    /// Does not touch the torch state; the acknowledgement does that. A request
    /// to switch on is confirmed with a heavy-click haptic.
    pub fn toggle<P>(&mut self, platform: &mut P) -> ToggleOutcome
    where
        P: CameraService + SystemActions + ?Sized,
    {
        let Availability::Available { camera_id, on } = &self.state else {
            tracing::debug!("torch toggle ignored, no flash camera");
            return ToggleOutcome::Unavailable;
        };

        let enabled = !*on;
        let entry = self.entry_point.unwrap_or(TorchEntryPoint::Standard);
        let level = if entry.takes_level() { self.level } else { 0 };

        match platform.set_torch_mode(entry, camera_id, enabled, level) {
            Ok(()) => {
                if enabled {
                    platform.heavy_click();
                }
                ToggleOutcome::Requested { enabled }
            }
            Err(e) => {
                tracing::error!("Torch toggle failed: {}", e);
                ToggleOutcome::Failed
            }
        }
    }

    /// Torch callback from the camera service. Only our camera's reports count.
    pub fn on_hardware_torch_changed(&mut self, camera_id: &str, enabled: bool) {
        if let Availability::Available {
            camera_id: ours,
            on,
        } = &mut self.state
        {
            if ours == camera_id {
                *on = enabled;
                tracing::debug!(enabled, "torch state acknowledged");
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, Availability::Available { .. })
    }

    /// Last acknowledged torch state; `false` when unavailable.
    pub fn is_on(&self) -> bool {
        matches!(self.state, Availability::Available { on: true, .. })
    }

    pub fn camera_id(&self) -> Option<&str> {
        match &self.state {
            Availability::Available { camera_id, .. } => Some(camera_id),
            Availability::Unavailable => None,
        }
    }

    pub fn entry_point(&self) -> Option<TorchEntryPoint> {
        self.entry_point
    }
}

fn find_flash_camera(camera: &dyn CameraService) -> Option<String> {
    let ids = match camera.camera_ids() {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!("Camera enumeration failed: {}", e);
            return None;
        }
    };

    for id in ids {
        match camera.has_flash(&id) {
            Ok(true) => return Some(id),
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("Camera enumeration failed: {}", e);
                return None;
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SimulatedCamera, SimulationConfig};
    use crate::platform::{PlatformCall, SimulatedPlatform};

    fn platform() -> SimulatedPlatform {
        SimulatedPlatform::new(SimulationConfig::default())
    }

    fn torch_calls(sim: &SimulatedPlatform) -> usize {
        sim.count(|c| matches!(c, PlatformCall::SetTorchMode { .. }))
    }

    #[test]
    fn test_selects_first_flash_camera() {
        let mut config = SimulationConfig::default();
        config.cameras = vec![
            SimulatedCamera {
                id: "front".to_string(),
                flash: false,
            },
            SimulatedCamera {
                id: "back".to_string(),
                flash: true,
            },
            SimulatedCamera {
                id: "wide".to_string(),
                flash: true,
            },
        ];
        let mut sim = SimulatedPlatform::new(config);
        let mut torch = TorchActuator::new(5);

        assert!(torch.initialize(&mut sim));
        assert_eq!(torch.camera_id(), Some("back"));
        assert!(sim.torch_callback_registered());
    }

    #[test]
    fn test_no_flash_camera_is_unavailable() {
        let mut config = SimulationConfig::default();
        config.cameras.iter_mut().for_each(|c| c.flash = false);
        let mut sim = SimulatedPlatform::new(config);
        let mut torch = TorchActuator::new(5);

        assert!(!torch.initialize(&mut sim));
        assert_eq!(torch.toggle(&mut sim), ToggleOutcome::Unavailable);
        assert_eq!(torch_calls(&sim), 0);
    }

    #[test]
    fn test_enumeration_failure_is_unavailable() {
        let mut sim = platform();
        sim.deny_camera_access(true);
        let mut torch = TorchActuator::new(5);

        assert!(!torch.initialize(&mut sim));
        assert!(!torch.is_available());
        assert!(!sim.torch_callback_registered());
    }

    #[test]
    fn test_entry_point_by_version() {
        let mut config = SimulationConfig::default();
        config.sdk_version = 31;
        config.level_entry_point = true;
        assert_eq!(
            resolve_entry_point(31, &SimulatedPlatform::new(config.clone())),
            TorchEntryPoint::StandardWithLevel
        );

        config.vendor_entry_point = true;
        assert_eq!(
            resolve_entry_point(34, &SimulatedPlatform::new(config.clone())),
            TorchEntryPoint::Vendor
        );

        config.vendor_entry_point = false;
        assert_eq!(
            resolve_entry_point(34, &SimulatedPlatform::new(config)),
            TorchEntryPoint::Standard
        );
    }

    #[test]
    fn test_entry_point_resolved_once() {
        let mut sim = platform();
        let mut torch = TorchActuator::new(5);
        torch.initialize(&mut sim);
        assert_eq!(torch.entry_point(), Some(TorchEntryPoint::Standard));

        torch.shutdown(&mut sim);
        let mut config = SimulationConfig::default();
        config.vendor_entry_point = true;
        let mut vendor_sim = SimulatedPlatform::new(config);
        torch.initialize(&mut vendor_sim);
        assert_eq!(torch.entry_point(), Some(TorchEntryPoint::Standard));
    }

    #[test]
    fn test_toggle_does_not_change_state() {
        let mut sim = platform();
        let mut torch = TorchActuator::new(5);
        torch.initialize(&mut sim);

        assert_eq!(
            torch.toggle(&mut sim),
            ToggleOutcome::Requested { enabled: true }
        );
        assert!(!torch.is_on());

        // Without an acknowledgement the next toggle asks for "on" again.
        assert_eq!(
            torch.toggle(&mut sim),
            ToggleOutcome::Requested { enabled: true }
        );
    }

    #[test]
    fn test_ack_for_other_camera_is_ignored() {
        let mut sim = platform();
        let mut torch = TorchActuator::new(5);
        torch.initialize(&mut sim);

        torch.on_hardware_torch_changed("1", true);
        assert!(!torch.is_on());

        torch.on_hardware_torch_changed("0", true);
        assert!(torch.is_on());
    }

    #[test]
    fn test_latest_ack_wins() {
        let mut sim = platform();
        let mut torch = TorchActuator::new(5);
        torch.initialize(&mut sim);

        torch.toggle(&mut sim);
        torch.toggle(&mut sim);
        torch.on_hardware_torch_changed("0", true);
        torch.on_hardware_torch_changed("0", false);
        assert!(!torch.is_on());
    }

    #[test]
    fn test_haptic_only_when_switching_on() {
        let mut sim = platform();
        let mut torch = TorchActuator::new(5);
        torch.initialize(&mut sim);

        torch.toggle(&mut sim);
        assert_eq!(sim.count(|c| *c == PlatformCall::HeavyClick), 1);

        torch.on_hardware_torch_changed("0", true);
        assert_eq!(
            torch.toggle(&mut sim),
            ToggleOutcome::Requested { enabled: false }
        );
        assert_eq!(sim.count(|c| *c == PlatformCall::HeavyClick), 1);
    }

    #[test]
    fn test_failed_toggle_is_a_noop() {
        let mut sim = platform();
        let mut torch = TorchActuator::new(5);
        torch.initialize(&mut sim);
        sim.set_torch_busy(true);

        assert_eq!(torch.toggle(&mut sim), ToggleOutcome::Failed);
        assert!(!torch.is_on());
        assert_eq!(sim.count(|c| *c == PlatformCall::HeavyClick), 0);

        sim.set_torch_busy(false);
        assert_eq!(
            torch.toggle(&mut sim),
            ToggleOutcome::Requested { enabled: true }
        );
    }

    #[test]
    fn test_level_passed_to_level_entry_points() {
        let mut config = SimulationConfig::default();
        config.sdk_version = 30;
        let mut sim = SimulatedPlatform::new(config);
        let mut torch = TorchActuator::new(5);
        torch.initialize(&mut sim);
        torch.toggle(&mut sim);

        assert!(sim.calls().contains(&PlatformCall::SetTorchMode {
            entry: TorchEntryPoint::StandardWithLevel,
            camera_id: "0".to_string(),
            enabled: true,
            level: 5,
        }));
    }

    #[test]
    fn test_shutdown_unregisters() {
        let mut sim = platform();
        let mut torch = TorchActuator::new(5);
        torch.initialize(&mut sim);
        torch.shutdown(&mut sim);

        assert!(!torch.is_available());
        assert!(!sim.torch_callback_registered());

        torch.shutdown(&mut sim);
        assert_eq!(
            sim.count(|c| *c == PlatformCall::UnregisterTorchCallback),
            1
        );
    }

    #[test]
    fn test_acknowledged_state_survives_rebind() {
        let mut sim = platform();
        let mut torch = TorchActuator::new(5);
        torch.initialize(&mut sim);
        torch.on_hardware_torch_changed("0", true);

        torch.shutdown(&mut sim);
        assert!(!torch.is_on());

        torch.initialize(&mut sim);
        assert!(torch.is_on());
        assert_eq!(
            torch.toggle(&mut sim),
            ToggleOutcome::Requested { enabled: false }
        );
    }

    #[test]
    fn test_retained_state_ignored_for_other_camera() {
        let mut sim = platform();
        let mut torch = TorchActuator::new(5);
        torch.initialize(&mut sim);
        torch.on_hardware_torch_changed("0", true);
        torch.shutdown(&mut sim);

        let mut config = SimulationConfig::default();
        config.cameras = vec![SimulatedCamera {
            id: "rear".to_string(),
            flash: true,
        }];
        let mut other = SimulatedPlatform::new(config);
        torch.initialize(&mut other);
        assert_eq!(torch.camera_id(), Some("rear"));
        assert!(!torch.is_on());
    }
}
