//! Pan/zoom state of the live view and the world <-> screen mapping.
//!
//! `screen = world * zoom + pan`. Every operation is a pure function from one
//! `ViewportState` to the next and refuses to produce a non-finite transform.

use serde::Serialize;

use crate::config::ViewportConfig;
use crate::error::ViewportError;
use crate::ir::Point;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    pub pan_x: f32,
    pub pan_y: f32,
    pub zoom: f32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewportState {
    pub const IDENTITY: ViewportState = ViewportState {
        pan_x: 0.0,
        pan_y: 0.0,
        zoom: 1.0,
    };

    pub fn new(pan_x: f32, pan_y: f32, zoom: f32) -> Result<Self, ViewportError> {
        Self { pan_x, pan_y, zoom }.checked()
    }

    /// Transform applied on load and on reset: horizontally centered on the
    /// logical canvas at the default zoom, with a fixed gap above.
    pub fn reset(
        logical_width: f32,
        container_width: f32,
        config: &ViewportConfig,
    ) -> Result<Self, ViewportError> {
        let zoom = config.clamp_zoom(config.default_zoom);
        Self::new(
            container_width / 2.0 - logical_width / 2.0 * zoom,
            config.top_margin * zoom,
            zoom,
        )
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(
            world.x * self.zoom + self.pan_x,
            world.y * self.zoom + self.pan_y,
        )
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan_x) / self.zoom,
            (screen.y - self.pan_y) / self.zoom,
        )
    }

    pub fn panned(self, dx: f32, dy: f32) -> Result<Self, ViewportError> {
        Self::new(self.pan_x + dx, self.pan_y + dy, self.zoom)
    }

    pub fn with_pan(self, pan: Point) -> Result<Self, ViewportError> {
        Self::new(pan.x, pan.y, self.zoom)
    }

    /// One wheel event at `pointer`. A positive `delta` (scrolling down)
    /// zooms out. The world point under the pointer stays put.
    pub fn zoomed_at(
        self,
        pointer: Point,
        delta: f32,
        config: &ViewportConfig,
    ) -> Result<Self, ViewportError> {
        if !delta.is_finite() {
            return Err(ViewportError::InvalidFactor(delta));
        }
        if delta == 0.0 {
            return Ok(self);
        }
        let step = if delta > 0.0 {
            -config.wheel_step
        } else {
            config.wheel_step
        };
        let zoom = config.clamp_zoom(self.zoom + step);
        let anchor = self.screen_to_world(pointer);
        Self::new(
            pointer.x - anchor.x * zoom,
            pointer.y - anchor.y * zoom,
            zoom,
        )
    }

    /// Multiplies the zoom, keeping the pan offset as is.
    pub fn scaled(self, factor: f32, config: &ViewportConfig) -> Result<Self, ViewportError> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(ViewportError::InvalidFactor(factor));
        }
        Self::new(self.pan_x, self.pan_y, config.clamp_zoom(self.zoom * factor))
    }

    /// The whole transform as one SVG `matrix(...)`.
    pub fn svg_matrix(&self) -> String {
        format!(
            "matrix({:.4} 0 0 {:.4} {:.4} {:.4})",
            self.zoom, self.zoom, self.pan_x, self.pan_y
        )
    }

    fn checked(self) -> Result<Self, ViewportError> {
        if self.pan_x.is_finite() && self.pan_y.is_finite() && self.zoom.is_finite() && self.zoom > 0.0
        {
            Ok(self)
        } else {
            Err(ViewportError::NonFinite {
                pan_x: self.pan_x,
                pan_y: self.pan_y,
                zoom: self.zoom,
            })
        }
    }
}

/// Pixel size of the surface the live view draws into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Drag-to-pan: the offset between the pointer and the pan origin is captured
/// when the gesture starts and held for every move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGesture {
    anchor: Point,
}

impl DragGesture {
    pub fn begin(pointer: Point, state: &ViewportState) -> Self {
        Self {
            anchor: Point::new(pointer.x - state.pan_x, pointer.y - state.pan_y),
        }
    }

    pub fn update(&self, pointer: Point, state: ViewportState) -> Result<ViewportState, ViewportError> {
        state.with_pan(Point::new(
            pointer.x - self.anchor.x,
            pointer.y - self.anchor.y,
        ))
    }
}
