//! Live cutout geometry.

use crate::platform::{CutoutRect, DisplayInsets};

/// Reads the current cutout rectangle from the display.
///
/// Nothing is cached: every call reflects the orientation the display is in
/// right now.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoundsProvider;

impl BoundsProvider {
    pub fn new() -> Self {
        Self
    }

    /// The first bounding rectangle of the cutout, or `None` when there is no
    /// usable cutout. Query failures are logged and read as `None`.
    pub fn current_cutout(&self, display: &dyn DisplayInsets) -> Option<CutoutRect> {
        match display.cutout_rects() {
            Ok(rects) => rects.into_iter().next().filter(CutoutRect::has_area),
            Err(e) => {
                tracing::warn!("Cutout query failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{PlatformError, Rotation};

    struct FixedInsets(Result<Vec<CutoutRect>, PlatformError>);

    impl DisplayInsets for FixedInsets {
        fn cutout_rects(&self) -> Result<Vec<CutoutRect>, PlatformError> {
            self.0.clone()
        }

        fn rotation(&self) -> Rotation {
            Rotation::Deg0
        }
    }

    #[test]
    fn test_first_rect_wins() {
        let insets = FixedInsets(Ok(vec![
            CutoutRect::new(40, 0, 100, 30),
            CutoutRect::new(400, 0, 20, 20),
        ]));
        assert_eq!(
            BoundsProvider::new().current_cutout(&insets),
            Some(CutoutRect::new(40, 0, 100, 30))
        );
    }

    #[test]
    fn test_no_rects_is_absent() {
        let insets = FixedInsets(Ok(Vec::new()));
        assert_eq!(BoundsProvider::new().current_cutout(&insets), None);
    }

    #[test]
    fn test_zero_area_is_absent() {
        let insets = FixedInsets(Ok(vec![CutoutRect::new(40, 0, 0, 30)]));
        assert_eq!(BoundsProvider::new().current_cutout(&insets), None);
    }

    #[test]
    fn test_query_failure_is_absent() {
        let insets = FixedInsets(Err(PlatformError::Query("boom".to_string())));
        assert_eq!(BoundsProvider::new().current_cutout(&insets), None);
    }
}
