//! Overlay surface lifecycle.
//!
//! Owns the single input-catching surface over the cutout: attaches it on
//! start, keeps it aligned as the display rotates, detaches and re-attaches
//! it around screen power changes on platforms without rotation callbacks,
//! and removes it on stop.

use crate::core::bounds::BoundsProvider;
use crate::platform::{
    CutoutRect, DisplayEvent, NotificationPath, Platform, PlatformError, Rotation, SurfaceParams,
};

/// Lifecycle state of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// No surface exists.
    NoOverlay,
    /// The surface is on screen.
    Attached,
    /// The surface exists but was taken off screen while the display was off.
    Detached,
}

/// The overlay surface as last handed to the window service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlaySurface {
    pub params: SurfaceParams,
    pub attached: bool,
}

impl OverlaySurface {
    pub fn bounds(&self) -> CutoutRect {
        self.params.bounds
    }
}

/// Result of handling a display notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing to do: no overlay, same rotation, or same bounds.
    Unchanged,
    /// The surface was moved or resized in place.
    Relayout,
    /// New bounds recorded for a detached surface; applied on re-attach.
    Deferred,
    /// The surface was put back on screen.
    Reattached,
    /// The surface was taken off screen.
    Detached,
    /// The platform call failed or bounds were unavailable; logged.
    Failed,
}

/// Attaches, repositions and removes the overlay surface.
#[derive(Debug, Default)]
pub struct OverlayLifecycleManager {
    bounds: BoundsProvider,
    surface: Option<OverlaySurface>,
    rotation: Option<Rotation>,
    subscription: Option<NotificationPath>,
}

impl OverlayLifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> OverlayState {
        match self.surface {
            None => OverlayState::NoOverlay,
            Some(OverlaySurface { attached: true, .. }) => OverlayState::Attached,
            Some(OverlaySurface {
                attached: false, ..
            }) => OverlayState::Detached,
        }
    }

    pub fn surface(&self) -> Option<&OverlaySurface> {
        self.surface.as_ref()
    }

    /// The notification source subscribed at start.
    pub fn subscription(&self) -> Option<NotificationPath> {
        self.subscription
    }

    /// Last rotation seen by the lifecycle.
    pub fn rotation(&self) -> Option<Rotation> {
        self.rotation
    }

    /// Attach the overlay over the cutout and subscribe to display notifications.
    ///
    /// Returns whether an overlay is present afterwards. Without a cutout, or when
    /// the window service rejects the surface, nothing is attached or subscribed.
    pub fn start<P: Platform>(&mut self, platform: &mut P) -> bool {
        if self.surface.is_some() {
            return true;
        }

        let Some(rect) = self.bounds.current_cutout(&*platform) else {
            tracing::info!("No display cutout, overlay inactive");
            return false;
        };

        let params = SurfaceParams::overlay(rect);
        if let Err(e) = platform.add_surface(&params) {
            tracing::error!("Failed to add overlay: {}", e);
            return false;
        }

        self.surface = Some(OverlaySurface {
            params,
            attached: true,
        });
        self.rotation = Some(platform.rotation());

        let path = if platform.supports_rotation_callbacks() {
            NotificationPath::Rotation
        } else {
            NotificationPath::Legacy
        };
        match platform.subscribe(path) {
            Ok(()) => self.subscription = Some(path),
            Err(e) => tracing::warn!("Display notifications unavailable: {}", e),
        }

        tracing::info!(
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            ?path,
            "overlay attached"
        );
        true
    }

    /// Handle a notification that the overlay may need to move or change visibility.
    pub fn on_display_event<P: Platform>(
        &mut self,
        event: DisplayEvent,
        platform: &mut P,
    ) -> SyncOutcome {
        if self.surface.is_none() {
            return SyncOutcome::Unchanged;
        }

        match event {
            DisplayEvent::Rotated(rotation) => {
                if self.rotation == Some(rotation) {
                    return SyncOutcome::Unchanged;
                }
                let outcome = self.resync(platform);
                if outcome != SyncOutcome::Failed {
                    self.rotation = Some(rotation);
                }
                outcome
            }
            DisplayEvent::ConfigurationChanged => self.resync(platform),
            DisplayEvent::ScreenOn => self.reattach(platform),
            DisplayEvent::ScreenOff => self.detach(platform),
        }
    }

    /// Re-read the cutout and move the surface if it changed.
    pub fn resync<P: Platform>(&mut self, platform: &mut P) -> SyncOutcome {
        let Some(rect) = self.bounds.current_cutout(&*platform) else {
            tracing::warn!("Failed to update overlay bounds: cutout unavailable");
            return SyncOutcome::Failed;
        };
        let Some(surface) = self.surface.as_mut() else {
            return SyncOutcome::Unchanged;
        };

        if surface.params.bounds == rect {
            return SyncOutcome::Unchanged;
        }
        surface.params.bounds = rect;

        if !surface.attached {
            tracing::debug!(?rect, "overlay detached, bounds applied on re-attach");
            return SyncOutcome::Deferred;
        }

        match platform.update_surface(&surface.params) {
            Ok(()) => {
                tracing::debug!(?rect, "overlay repositioned");
                SyncOutcome::Relayout
            }
            Err(e) => {
                tracing::error!("Failed to update overlay bounds: {}", e);
                SyncOutcome::Failed
            }
        }
    }

    fn reattach<P: Platform>(&mut self, platform: &mut P) -> SyncOutcome {
        let Some(surface) = self.surface.as_mut() else {
            return SyncOutcome::Unchanged;
        };
        if surface.attached {
            return SyncOutcome::Unchanged;
        }

        match platform.add_surface(&surface.params) {
            Ok(()) => {
                surface.attached = true;
                tracing::debug!("overlay re-attached");
                SyncOutcome::Reattached
            }
            Err(e) => {
                tracing::error!("Failed to re-attach overlay: {}", e);
                SyncOutcome::Failed
            }
        }
    }

    fn detach<P: Platform>(&mut self, platform: &mut P) -> SyncOutcome {
        let Some(surface) = self.surface.as_mut() else {
            return SyncOutcome::Unchanged;
        };
        if !surface.attached {
            return SyncOutcome::Unchanged;
        }

        surface.attached = false;
        match platform.remove_surface() {
            Ok(()) => {
                tracing::debug!("overlay detached");
                SyncOutcome::Detached
            }
            Err(e) => {
                tracing::warn!("Failed to detach overlay: {}", e);
                SyncOutcome::Failed
            }
        }
    }

    /// Unsubscribe and remove the surface. Safe to call repeatedly.
    pub fn stop<P: Platform>(&mut self, platform: &mut P) {
        if let Some(path) = self.subscription.take() {
            ignore_teardown(platform.unsubscribe(path));
        }
        if let Some(surface) = self.surface.take() {
            if surface.attached {
                ignore_teardown(platform.remove_surface());
            }
            tracing::info!("overlay removed");
        }
        self.rotation = None;
    }
}

fn ignore_teardown(result: Result<(), PlatformError>) {
    if let Err(e) = result {
        tracing::debug!("Ignoring teardown error: {}", e);
    }
}
