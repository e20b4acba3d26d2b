//! Freehand signature surface rasterized with tiny-skia.
//!
//! Coordinates are logical pixels relative to the surface's top-left corner.
//! Ending a stroke snapshots the surface as a transparent PNG data URL, but
//! only once something was drawn since the last clear.

use egui::Pos2;
use shared::domain::EncodedImage;
use thiserror::Error;
use tiny_skia::{Color, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

pub const SIGNATURE_HEIGHT: u32 = 200;
pub const STROKE_WIDTH: f32 = 2.0;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature surface must be non-empty, got {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("failed to encode signature png: {0}")]
    Encode(String),
}

/// Pointer state over the surface for one frame, in surface coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSample {
    /// Primary button is held after going down on the surface.
    pub held: bool,
    /// Where the button went down, when that was over the surface.
    pub press_origin: Option<Pos2>,
    pub position: Option<Pos2>,
}

pub struct SignaturePad {
    pixmap: Pixmap,
    paint: Paint<'static>,
    stroke: Stroke,
    cursor: Option<Pos2>,
    pressed: bool,
    drawn_since_clear: bool,
    signature: Option<EncodedImage>,
    revision: u64,
}

impl SignaturePad {
    /// Creates a blank surface `width` pixels wide and 200 tall.
    pub fn new(width: u32) -> Result<Self, SignatureError> {
        let pixmap = Pixmap::new(width, SIGNATURE_HEIGHT).ok_or(SignatureError::InvalidSize {
            width,
            height: SIGNATURE_HEIGHT,
        })?;

        let mut paint = Paint::default();
        paint.set_color(Color::BLACK);
        paint.anti_alias = true;
        let stroke = Stroke {
            width: STROKE_WIDTH,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        Ok(Self {
            pixmap,
            paint,
            stroke,
            cursor: None,
            pressed: false,
            drawn_since_clear: false,
            signature: None,
            revision: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn is_drawing(&self) -> bool {
        self.cursor.is_some()
    }

    /// Bumped whenever pixels change, so a texture copy can be refreshed lazily.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Premultiplied RGBA pixels, row-major.
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data()
    }

    pub fn begin_stroke(&mut self, at: Pos2) {
        self.cursor = Some(at);
    }

    /// Draws a segment from the previous point to `to`. Ignored when no
    /// stroke is in progress.
    pub fn extend_stroke(&mut self, to: Pos2) {
        let Some(from) = self.cursor else {
            return;
        };

        let mut builder = PathBuilder::new();
        builder.move_to(from.x, from.y);
        builder.line_to(to.x, to.y);
        if let Some(path) = builder.finish() {
            self.pixmap
                .stroke_path(&path, &self.paint, &self.stroke, Transform::identity(), None);
            self.drawn_since_clear = true;
            self.revision += 1;
        }
        self.cursor = Some(to);
    }

    /// Finishes the current stroke. A second call without a new stroke is a
    /// no-op.
    pub fn end_stroke(&mut self) -> Result<(), SignatureError> {
        if self.cursor.take().is_none() {
            return Ok(());
        }
        if self.drawn_since_clear {
            self.capture()?;
        }
        Ok(())
    }

    /// Feeds one frame of pointer input. A stroke starts where the button went
    /// down, follows the pointer while it stays on the surface, and ends on
    /// release or when the pointer leaves. Re-entering while still held does
    /// not start a new stroke.
    pub fn track_pointer(&mut self, sample: PointerSample) -> Result<(), SignatureError> {
        if !sample.held {
            self.pressed = false;
            return self.end_stroke();
        }

        if !self.pressed {
            self.pressed = true;
            if let Some(origin) = sample.press_origin.or(sample.position) {
                self.begin_stroke(origin);
            }
        }

        if self.is_drawing() {
            match sample.position.filter(|pos| self.contains(*pos)) {
                Some(pos) if Some(pos) != self.cursor => self.extend_stroke(pos),
                Some(_) => {}
                None => return self.end_stroke(),
            }
        }
        Ok(())
    }

    fn contains(&self, pos: Pos2) -> bool {
        (0.0..=self.width() as f32).contains(&pos.x) && (0.0..=self.height() as f32).contains(&pos.y)
    }

    /// Snapshots the surface as it is now, blank or not.
    pub fn capture(&mut self) -> Result<&EncodedImage, SignatureError> {
        let png = self
            .pixmap
            .encode_png()
            .map_err(|err| SignatureError::Encode(err.to_string()))?;
        Ok(self.signature.insert(EncodedImage::png(&png)))
    }

    /// Wipes the surface and forgets any captured signature.
    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
        self.cursor = None;
        self.drawn_since_clear = false;
        self.signature = None;
        self.revision += 1;
    }

    pub fn signature(&self) -> Option<&EncodedImage> {
        self.signature.as_ref()
    }
}

#[cfg(test)]
#[path = "tests/signature_tests.rs"]
mod tests;
