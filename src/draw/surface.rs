use crate::draw::capture::encode_png_base64;
use crate::draw::model::{Color, Point, StrokeStyle};
use crate::draw::raster::{alpha_bounds, PixelBounds, RgbaBuffer};
use crate::draw::render::{draw_segment, DirtyRect};
use crate::draw::state::{StrokeLifecycle, StrokeState};
use anyhow::Result;

/// Colour shown behind the transparent raster.
pub const BASE_BACKGROUND: Color = Color::BLACK;

/// Freehand drawing surface.
///
/// Strokes are rasterized straight into an RGBA buffer that starts fully
/// transparent; the background colour is presentation state only and never
/// ends up in captured images.
#[derive(Debug, Clone)]
pub struct DrawingSurface {
    buffer: RgbaBuffer,
    background: Color,
    style: StrokeStyle,
    stroke: StrokeState,
    revision: u64,
    dirty: Option<DirtyRect>,
}

impl DrawingSurface {
    pub fn new(width: u32, height: u32, style: StrokeStyle) -> Self {
        Self {
            buffer: RgbaBuffer::transparent(width, height),
            background: BASE_BACKGROUND,
            style,
            stroke: StrokeState::Idle,
            revision: 0,
            dirty: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width
    }

    pub fn height(&self) -> u32 {
        self.buffer.height
    }

    pub fn buffer(&self) -> &RgbaBuffer {
        &self.buffer
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn color(&self) -> Color {
        self.style.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.style.color = color;
    }

    pub fn stroke_width(&self) -> u32 {
        self.style.width
    }

    pub fn lifecycle(&self) -> StrokeLifecycle {
        self.stroke.lifecycle()
    }

    /// Bumped on every pixel mutation so views can tell when to re-upload.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Region touched since the last call, if any. After a resize this is
    /// `None` even though the revision moved; the whole raster is new.
    pub fn take_dirty(&mut self) -> Option<DirtyRect> {
        self.dirty.take()
    }

    pub fn begin_stroke(&mut self, point: Point) {
        if self.stroke.is_drawing() {
            return;
        }
        self.background = BASE_BACKGROUND;
        self.stroke = StrokeState::Drawing { last: point };
    }

    pub fn extend_stroke(&mut self, point: Point) {
        let StrokeState::Drawing { last } = self.stroke else {
            return;
        };
        if let Some(touched) = draw_segment(&mut self.buffer, last, point, self.style) {
            self.mark_dirty(touched);
        }
        self.stroke = StrokeState::Drawing { last: point };
    }

    pub fn end_stroke(&mut self) {
        self.stroke = StrokeState::Idle;
    }

    pub fn clear(&mut self) {
        self.buffer.fill(Color::TRANSPARENT);
        self.background = BASE_BACKGROUND;
        self.revision += 1;
        self.dirty = DirtyRect::full(self.buffer.width, self.buffer.height);
    }

    /// Replaces the raster with a blank one of the new size, as resizing a
    /// canvas element does. Any active stroke ends.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.buffer.width, self.buffer.height) {
            return;
        }
        tracing::debug!(width, height, "resizing drawing surface");
        self.buffer = RgbaBuffer::transparent(width, height);
        self.stroke = StrokeState::Idle;
        self.revision += 1;
        self.dirty = None;
    }

    /// Current raster as base64 PNG, no MIME prefix.
    pub fn capture_image(&self) -> Result<String> {
        encode_png_base64(&self.buffer)
    }

    pub fn content_bounds(&self) -> PixelBounds {
        alpha_bounds(&self.buffer)
    }

    fn mark_dirty(&mut self, rect: DirtyRect) {
        self.revision += 1;
        self.dirty = Some(match self.dirty {
            Some(existing) => existing.union(rect),
            None => rect,
        });
    }
}
