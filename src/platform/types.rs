//! Value types exchanged with the platform services.
//!
//! Geometry is in screen pixels with the origin at the top-left corner.

use serde::{Deserialize, Serialize};

/// Bounding rectangle of a display cutout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutoutRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CutoutRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A cutout only counts when it covers some area.
    pub fn has_area(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Display rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    #[serde(rename = "0")]
    Deg0,
    #[serde(rename = "90")]
    Deg90,
    #[serde(rename = "180")]
    Deg180,
    #[serde(rename = "270")]
    Deg270,
}

impl Rotation {
    /// Whether the display is held sideways.
    pub fn is_landscape(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

/// Raw touch action as delivered to the overlay surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchAction {
    Down,
    Move,
    Up,
    Cancel,
}

/// A single touch event on the overlay surface.
///
/// Coordinates are local to the surface; `time_ms` is the host's monotonic event time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub x: f32,
    pub y: f32,
    pub time_ms: u64,
}

impl TouchEvent {
    pub fn new(action: TouchAction, x: f32, y: f32, time_ms: u64) -> Self {
        Self {
            action,
            x,
            y,
            time_ms,
        }
    }

    pub fn down(x: f32, y: f32, time_ms: u64) -> Self {
        Self::new(TouchAction::Down, x, y, time_ms)
    }

    pub fn up(x: f32, y: f32, time_ms: u64) -> Self {
        Self::new(TouchAction::Up, x, y, time_ms)
    }
}

/// Window flags requested for the overlay surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceFlags {
    /// Never takes input focus away from the foreground app.
    pub not_focusable: bool,
    /// Positioned in absolute screen coordinates, ignoring decorations.
    pub layout_in_screen: bool,
    /// Touches outside the surface go to the windows beneath it.
    pub not_touch_modal: bool,
}

impl SurfaceFlags {
    pub const OVERLAY: SurfaceFlags = SurfaceFlags {
        not_focusable: true,
        layout_in_screen: true,
        not_touch_modal: true,
    };
}

/// Everything the window service needs to place the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceParams {
    pub bounds: CutoutRect,
    pub flags: SurfaceFlags,
    /// Lay out into the cutout on the short edges of the screen.
    pub short_edges_cutout: bool,
    /// Anchored at the top-start corner so `bounds.x/y` are absolute offsets.
    pub gravity_top_start: bool,
    pub translucent: bool,
}

impl SurfaceParams {
    /// Parameters for an input-catching overlay sized to `bounds`.
    pub fn overlay(bounds: CutoutRect) -> Self {
        Self {
            bounds,
            flags: SurfaceFlags::OVERLAY,
            short_edges_cutout: true,
            gravity_top_start: true,
            translucent: true,
        }
    }
}

/// Torch activation entry points a camera service may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TorchEntryPoint {
    /// The public on/off call every platform version has.
    Standard,
    /// The standard call's hidden overload that also takes a strength level.
    StandardWithLevel,
    /// A vendor alternate with the same signature as `StandardWithLevel`.
    Vendor,
}

impl TorchEntryPoint {
    /// Whether the entry point takes a strength level argument.
    pub fn takes_level(self) -> bool {
        !matches!(self, TorchEntryPoint::Standard)
    }
}

/// Which notification source reports that the overlay bounds may be stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationPath {
    /// Continuous rotation callbacks.
    Rotation,
    /// Configuration-change plus screen-on/screen-off broadcasts.
    Legacy,
}

/// Display notifications that feed the overlay lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayEvent {
    Rotated(Rotation),
    ConfigurationChanged,
    ScreenOn,
    ScreenOff,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_area() {
        assert!(CutoutRect::new(40, 0, 100, 30).has_area());
        assert!(!CutoutRect::new(40, 0, 0, 30).has_area());
        assert!(!CutoutRect::new(40, 0, 100, 0).has_area());
    }

    #[test]
    fn test_entry_point_levels() {
        assert!(!TorchEntryPoint::Standard.takes_level());
        assert!(TorchEntryPoint::StandardWithLevel.takes_level());
        assert!(TorchEntryPoint::Vendor.takes_level());
    }

    #[test]
    fn test_overlay_params() {
        let params = SurfaceParams::overlay(CutoutRect::new(1, 2, 3, 4));
        assert_eq!(params.flags, SurfaceFlags::OVERLAY);
        assert!(params.short_edges_cutout);
        assert!(params.gravity_top_start);
    }

    #[test]
    fn test_rotation_serde() {
        let json = serde_json::to_string(&Rotation::Deg90).unwrap();
        assert_eq!(json, "\"90\"");
        assert!(Rotation::Deg270.is_landscape());
        assert!(!Rotation::Deg180.is_landscape());
    }
}
