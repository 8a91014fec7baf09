//! CPU raster backend (made by FontLab https://www.fontlab.com/)
//!
//! Glyph outlines come from skrifa, are turned into tiny-skia paths and
//! filled into a double-buffered pixmap. System families resolve through
//! the same `fontdb` database the catalog enumerates.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::{FontRef, GlyphId, MetadataProvider};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Transform};

use super::{GraphicsBackend, LayoutRect, SurfaceSize, TextFormatRequest};
use crate::collection::FontCollection;

/// Software [`GraphicsBackend`] that keeps the most recent presented frame.
pub struct RasterBackend {
    db: Arc<Database>,
    presented: u64,
    last_frame: Option<Pixmap>,
}

impl RasterBackend {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            presented: 0,
            last_frame: None,
        }
    }

    /// Number of frames presented so far.
    pub fn presented_frames(&self) -> u64 {
        self.presented
    }

    pub fn last_presented(&self) -> Option<&Pixmap> {
        self.last_frame.as_ref()
    }

    /// Write the last presented frame as PNG.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        let frame = self
            .last_frame
            .as_ref()
            .ok_or_else(|| anyhow!("no frame has been presented"))?;
        frame
            .save_png(path)
            .with_context(|| format!("writing {}", path.display()))
    }
}

/// What a system face was resolved for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SystemFaceKey {
    family: String,
    weight: u16,
    italic: bool,
    stretch: u16,
}

impl SystemFaceKey {
    fn for_request(request: &TextFormatRequest) -> Self {
        Self {
            family: request.family.to_lowercase(),
            weight: request.weight,
            italic: request.italic,
            stretch: request.stretch,
        }
    }
}

/// Per-device cache of resolved system face data.
#[derive(Default)]
pub struct RasterDevice {
    system_faces: HashMap<SystemFaceKey, (Arc<[u8]>, u32)>,
}

impl RasterDevice {
    /// Number of distinct system faces resolved on this device.
    pub fn cached_system_faces(&self) -> usize {
        self.system_faces.len()
    }
}

pub struct RasterSurface {
    front: Pixmap,
    back: Pixmap,
    drawing: bool,
}

/// Vertical metrics of a face at the format's size, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LineMetrics {
    ascent: f32,
    descent: f32,
    line_height: f32,
}

/// A resolved face at a fixed pixel size.
#[derive(Clone)]
pub struct RasterTextFormat {
    data: Arc<[u8]>,
    index: u32,
    size: f32,
    line: LineMetrics,
    family: String,
    locale: String,
}

impl RasterTextFormat {
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Face index inside the shared font bytes.
    pub fn face_index(&self) -> u32 {
        self.index
    }

    fn face(&self) -> Result<FontRef<'_>> {
        FontRef::from_index(&self.data, self.index)
            .map_err(|err| anyhow!("face {} of {}: {err}", self.index, self.family))
    }
}

fn pixmap(size: SurfaceSize) -> Result<Pixmap> {
    Pixmap::new(size.width, size.height)
        .ok_or_else(|| anyhow!("cannot allocate {}x{} surface", size.width, size.height))
}

fn colour(rgba: [f32; 4]) -> Color {
    Color::from_rgba(rgba[0], rgba[1], rgba[2], rgba[3]).unwrap_or(Color::BLACK)
}

impl GraphicsBackend for RasterBackend {
    type Device = RasterDevice;
    type Surface = RasterSurface;
    type TextFormat = RasterTextFormat;

    fn create_device(&mut self) -> Result<RasterDevice> {
        Ok(RasterDevice::default())
    }

    fn create_surface(&mut self, _device: &mut RasterDevice, size: SurfaceSize) -> Result<RasterSurface> {
        Ok(RasterSurface {
            front: pixmap(size)?,
            back: pixmap(size)?,
            drawing: false,
        })
    }

    fn resize_surface(
        &mut self,
        _device: &mut RasterDevice,
        surface: &mut RasterSurface,
        size: SurfaceSize,
    ) -> Result<()> {
        surface.front = pixmap(size)?;
        surface.back = pixmap(size)?;
        Ok(())
    }

    fn create_text_format(
        &mut self,
        device: &mut RasterDevice,
        request: &TextFormatRequest,
        collection: Option<&FontCollection>,
    ) -> Result<RasterTextFormat> {
        let (data, index) = match collection {
            Some(collection) => {
                let face = collection.find_family(&request.family).ok_or_else(|| {
                    anyhow!(
                        "{} has no family named {}",
                        collection.path().display(),
                        request.family
                    )
                })?;
                (Arc::clone(collection.data()), face.index)
            }
            None => {
                let key = SystemFaceKey::for_request(request);
                match device.system_faces.get(&key) {
                    Some((data, index)) => (Arc::clone(data), *index),
                    None => {
                        let resolved = resolve_system(&self.db, request)?;
                        device
                            .system_faces
                            .insert(key, (Arc::clone(&resolved.0), resolved.1));
                        resolved
                    }
                }
            }
        };

        let line = {
            let font = FontRef::from_index(&data, index)
                .map_err(|err| anyhow!("face {index} of {}: {err}", request.family))?;
            let metrics = font.metrics(Size::new(request.size), LocationRef::default());
            LineMetrics {
                ascent: metrics.ascent,
                descent: metrics.descent,
                line_height: metrics.ascent - metrics.descent + metrics.leading,
            }
        };

        Ok(RasterTextFormat {
            data,
            index,
            size: request.size,
            line,
            family: request.family.clone(),
            locale: request.locale.clone(),
        })
    }

    fn begin_draw(&mut self, _device: &mut RasterDevice, surface: &mut RasterSurface) -> Result<()> {
        if surface.drawing {
            bail!("draw already open on this surface");
        }
        surface.drawing = true;
        Ok(())
    }

    fn clear(&mut self, surface: &mut RasterSurface, rgba: [f32; 4]) {
        surface.back.fill(colour(rgba));
    }

    fn draw_text(
        &mut self,
        surface: &mut RasterSurface,
        format: &RasterTextFormat,
        text: &str,
        rect: LayoutRect,
        rgba: [f32; 4],
    ) -> Result<()> {
        // FontRef borrows the shared bytes; only the table directory is re-read here
        let font = format.face()?;
        let size = Size::new(format.size);
        let location = LocationRef::default();
        let line = format.line;
        let advances = font.glyph_metrics(size, location);
        let charmap = font.charmap();
        let outlines = font.outline_glyphs();
        let mut paint = Paint::default();
        paint.set_color(colour(rgba));
        paint.anti_alias = true;

        let mut pen_x = rect.left;
        let mut baseline = rect.top + line.ascent;
        for ch in text.chars() {
            if ch == '\n' {
                pen_x = rect.left;
                baseline += line.line_height;
                continue;
            }
            let glyph = charmap.map(ch).unwrap_or(GlyphId::NOTDEF);
            let advance = advances.advance_width(glyph).unwrap_or(0.0);
            if pen_x + advance > rect.right && pen_x > rect.left {
                pen_x = rect.left;
                baseline += line.line_height;
            }
            if baseline - line.descent > rect.bottom {
                break;
            }

            if let Some(outline) = outlines.get(glyph) {
                let mut pen = PathPen::default();
                if outline
                    .draw(DrawSettings::unhinted(size, location), &mut pen)
                    .is_ok()
                {
                    if let Some(path) = pen.0.finish() {
                        // font units grow upward
                        let transform = Transform::from_row(1.0, 0.0, 0.0, -1.0, pen_x, baseline);
                        surface
                            .back
                            .fill_path(&path, &paint, FillRule::Winding, transform, None);
                    }
                }
            }
            pen_x += advance;
        }
        Ok(())
    }

    fn end_draw(&mut self, _device: &mut RasterDevice, surface: &mut RasterSurface) -> Result<()> {
        if !surface.drawing {
            bail!("end draw without begin draw");
        }
        surface.drawing = false;
        Ok(())
    }

    fn present(&mut self, surface: &mut RasterSurface, sync_interval: u32) -> Result<()> {
        std::mem::swap(&mut surface.front, &mut surface.back);
        self.last_frame = Some(surface.front.clone());
        self.presented += 1;
        tracing::trace!(frame = self.presented, sync_interval, "frame presented");
        Ok(())
    }
}

fn resolve_system(db: &Database, request: &TextFormatRequest) -> Result<(Arc<[u8]>, u32)> {
    let id = db
        .query(&Query {
            families: &[Family::Name(request.family.as_str())],
            weight: Weight(request.weight),
            stretch: stretch(request.stretch),
            style: if request.italic { Style::Italic } else { Style::Normal },
        })
        .ok_or_else(|| anyhow!("system font store has no family {}", request.family))?;
    db.with_face_data(id, |data, index| (Arc::<[u8]>::from(data), index))
        .ok_or_else(|| anyhow!("face data for {} unavailable", request.family))
}

fn stretch(width_class: u16) -> Stretch {
    match width_class {
        1 => Stretch::UltraCondensed,
        2 => Stretch::ExtraCondensed,
        3 => Stretch::Condensed,
        4 => Stretch::SemiCondensed,
        6 => Stretch::SemiExpanded,
        7 => Stretch::Expanded,
        8 => Stretch::ExtraExpanded,
        9 => Stretch::UltraExpanded,
        _ => Stretch::Normal,
    }
}

#[derive(Default)]
struct PathPen(PathBuilder);

impl OutlinePen for PathPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to(x, y);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.0.quad_to(cx0, cy0, x, y);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.0.cubic_to(cx0, cy0, cx1, cy1, x, y);
    }

    fn close(&mut self) {
        self.0.close();
    }
}
