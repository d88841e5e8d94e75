//! Scale clamping and the "safe position" rule that keeps the zoomed element
//! covering its viewport.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Size, simulate_transformation, transform_origin_from_target};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomBoundaries {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomBoundaries {
    fn default() -> Self {
        Self { min: 1.0, max: 3.0 }
    }
}

/// How a pinch frame's distance ratio is folded into the current scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinchScaling {
    /// `scale * ratio`
    #[default]
    Multiplicative,
    /// `scale + (ratio - 1)`, the older approximation.
    Additive,
}

impl PinchScaling {
    pub fn apply(self, scale: f64, ratio: f64) -> f64 {
        match self {
            PinchScaling::Multiplicative => scale * ratio,
            PinchScaling::Additive => scale + (ratio - 1.0),
        }
    }
}

/// Committed transform of the zoomable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransformState {
    pub scale: f64,
    pub translation: Point,
    pub origin: Point,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translation: Point::ZERO,
            origin: Point::ZERO,
        }
    }
}

/// Which axes were honored without clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisFreedom {
    pub horizontal_allowed: bool,
    pub vertical_allowed: bool,
}

/// Untransformed placement of the zoomable for one gesture step.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub position: Point,
    pub size: Size,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub boundaries: ZoomBoundaries,
    /// Half-width of the band around 1 the scale may never enter.
    pub epsilon: f64,
    /// Pixels the viewport is shrunk by on each side before comparing.
    pub border_tolerance: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            boundaries: ZoomBoundaries::default(),
            epsilon: 0.01,
            border_tolerance: 1.0,
        }
    }
}

impl ZoomLimits {
    /// Clamps `proposed` into the boundaries and pushes it out of the band
    /// around 1. `previous` decides the push direction when zooming out below 1
    /// is possible.
    pub fn safe_scale(&self, previous: f64, proposed: f64) -> f64 {
        let ZoomBoundaries { min, max } = self.boundaries;
        let mut scale = proposed.min(max).max(min);
        if (scale - 1.0).abs() < self.epsilon {
            let up = 1.0 + self.epsilon;
            let down = 1.0 - self.epsilon;
            let zooming_out = min < 1.0 && previous > scale;
            scale = if zooming_out {
                if down >= min { down } else { up }
            } else if up <= max {
                up
            } else {
                down
            };
        }
        scale
    }

    /// The scale a zoomable rests at when fully zoomed out.
    pub fn resting_scale(&self) -> f64 {
        let min = self.boundaries.min;
        self.safe_scale(min, min)
    }

    /// Clamps a proposed transform so the zoomable keeps covering `viewport`
    /// (shrunk by the tolerance) and returns the state to commit.
    ///
    /// The proposed origin only matters through the rectangle it simulates
    /// to; the committed origin is back-solved from the clamped rectangle.
    pub fn safe_position(
        &self,
        previous_scale: f64,
        viewport: Rect,
        placement: Placement,
        proposal: TransformState,
    ) -> (TransformState, AxisFreedom) {
        let borders = viewport.inset(self.border_tolerance);
        let scale = self.safe_scale(previous_scale, proposal.scale);

        let outcome = simulate_transformation(
            placement.position,
            placement.size,
            proposal.origin,
            proposal.translation,
            scale,
        );
        let width = outcome.width();
        let height = outcome.height();

        let left_ok = outcome.x <= borders.x;
        let right_ok = outcome.x2 >= borders.x2;
        let top_ok = outcome.y <= borders.y;
        let bottom_ok = outcome.y2 >= borders.y2;

        let target = Point::new(
            pin_axis(outcome.x, width, borders.x, borders.x2, left_ok, right_ok),
            pin_axis(outcome.y, height, borders.y, borders.y2, top_ok, bottom_ok),
        );
        let origin =
            transform_origin_from_target(target, placement.position, proposal.translation, scale);

        let freedom = AxisFreedom {
            horizontal_allowed: left_ok && right_ok,
            vertical_allowed: top_ok && bottom_ok,
        };
        if !(freedom.horizontal_allowed && freedom.vertical_allowed) {
            trace!(
                "clamped to ({:.1}, {:.1}) at scale {scale:.3}: {freedom:?}",
                target.x, target.y
            );
        }

        (
            TransformState {
                scale,
                translation: proposal.translation,
                origin,
            },
            freedom,
        )
    }
}

fn pin_axis(low: f64, extent: f64, border_low: f64, border_high: f64, low_ok: bool, high_ok: bool) -> f64 {
    if !low_ok {
        border_low
    } else if !high_ok {
        border_high - extent
    } else {
        low
    }
}
