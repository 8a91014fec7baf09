//! Live preview rendering (made by FontLab https://www.fontlab.com/)
//!
//! [`PreviewRenderer`] drives a [`GraphicsBackend`] through an explicit
//! lifecycle: `Uninitialized → DeviceReady → SurfaceReady`, with a transient
//! drawing phase per pass. Every failure ends the pass early and leaves the
//! last presented frame on screen; nothing here is allowed to take the host
//! process down.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::collection::{FontCollection, FontCollectionCache};
use crate::entry::FontEntry;

#[cfg(feature = "raster")]
pub mod raster;

/// Sample shown when the input control is empty.
pub const DEFAULT_SAMPLE_TEXT: &str = "あいうABC123";

/// An sRGB colour as the host's colour picker reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels scaled to `[0, 1]` with full opacity.
    pub fn to_rgba_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            1.0,
        ]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::WHITE
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = Error;

    /// Parse `rrggbb`, optionally prefixed with `#`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(anyhow!("colour must be six hex digits: {raw}"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| anyhow!("invalid colour: {raw}"))
        };
        Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("#{self}"))
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Output size in device pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Layout box for text, in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl LayoutRect {
    /// The surface bounds shrunk by `margin` on every side.
    pub fn inset(size: SurfaceSize, margin: f32) -> Self {
        Self {
            left: margin,
            top: margin,
            right: size.width as f32 - margin,
            bottom: size.height as f32 - margin,
        }
    }

    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }
}

/// Everything a backend needs to build a text format.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFormatRequest {
    pub family: String,
    pub weight: u16,
    pub italic: bool,
    /// OS/2 width class; 5 is normal.
    pub stretch: u16,
    pub size: f32,
    pub locale: String,
}

impl TextFormatRequest {
    /// Normal weight, upright, normal width.
    pub fn normal(family: impl Into<String>, size: f32, locale: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            weight: 400,
            italic: false,
            stretch: 5,
            size,
            locale: locale.into(),
        }
    }

    pub fn with_family(&self, family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            ..self.clone()
        }
    }
}

/// Device, surface and drawing primitives the preview needs.
///
/// Devices and surfaces are owned exclusively by the renderer; collections
/// are borrowed for the duration of a call.
pub trait GraphicsBackend {
    type Device;
    type Surface;
    type TextFormat;

    fn create_device(&mut self) -> Result<Self::Device>;

    /// Double-buffered surface bound to the output region.
    fn create_surface(&mut self, device: &mut Self::Device, size: SurfaceSize)
        -> Result<Self::Surface>;

    fn resize_surface(
        &mut self,
        device: &mut Self::Device,
        surface: &mut Self::Surface,
        size: SurfaceSize,
    ) -> Result<()>;

    /// Resolve `request.family` inside `collection`, or through the system store when `None`.
    fn create_text_format(
        &mut self,
        device: &mut Self::Device,
        request: &TextFormatRequest,
        collection: Option<&FontCollection>,
    ) -> Result<Self::TextFormat>;

    fn begin_draw(&mut self, device: &mut Self::Device, surface: &mut Self::Surface)
        -> Result<()>;

    fn clear(&mut self, surface: &mut Self::Surface, rgba: [f32; 4]);

    fn draw_text(
        &mut self,
        surface: &mut Self::Surface,
        format: &Self::TextFormat,
        text: &str,
        rect: LayoutRect,
        rgba: [f32; 4],
    ) -> Result<()>;

    fn end_draw(&mut self, device: &mut Self::Device, surface: &mut Self::Surface) -> Result<()>;

    /// Show the back buffer, waiting `sync_interval` vertical blanks.
    fn present(&mut self, surface: &mut Self::Surface, sync_interval: u32) -> Result<()>;
}

/// The live controls a pass reads from.
pub trait PreviewTarget {
    /// Current sample input text; `None` when there is no input control.
    fn sample_text(&self) -> Option<String>;

    /// Client area of the output region.
    fn client_size(&self) -> SurfaceSize;
}

/// Tunables for a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewSettings {
    pub font_size: f32,
    pub locale: String,
    pub fallback_family: String,
    pub margin: f32,
    pub default_sample: String,
    pub sync_interval: u32,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            font_size: 48.0,
            locale: "ja-jp".to_string(),
            fallback_family: "Segoe UI".to_string(),
            margin: 10.0,
            default_sample: DEFAULT_SAMPLE_TEXT.to_string(),
            sync_interval: 1,
        }
    }
}

/// Resource lifecycle position, as observed between passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Uninitialized,
    DeviceReady,
    SurfaceReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderPhase {
    Idle,
    Drawing,
}

/// How a render request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Frame presented; `text_drawn` is false when no font could be resolved.
    Presented { text_drawn: bool },
    /// A pass was already in flight.
    Dropped,
    /// Zero-sized output region.
    EmptyArea,
    DeviceUnavailable,
    SurfaceUnavailable,
    DrawFailed,
    PresentFailed,
}

impl RenderOutcome {
    pub fn presented(self) -> bool {
        matches!(self, RenderOutcome::Presented { .. })
    }
}

enum Stage<D, S> {
    Uninitialized,
    DeviceReady(D),
    SurfaceReady {
        device: D,
        surface: S,
        size: SurfaceSize,
    },
}

impl<D, S> Stage<D, S> {
    fn state(&self) -> RenderState {
        match self {
            Stage::Uninitialized => RenderState::Uninitialized,
            Stage::DeviceReady(_) => RenderState::DeviceReady,
            Stage::SurfaceReady { .. } => RenderState::SurfaceReady,
        }
    }
}

struct Inner<B: GraphicsBackend> {
    backend: B,
    stage: Stage<B::Device, B::Surface>,
    collections: FontCollectionCache,
    sample_text: String,
}

/// Resets the phase when a pass ends, however it ends.
struct PhaseGuard<'a>(&'a Cell<RenderPhase>);

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.0.set(RenderPhase::Idle);
    }
}

/// Owns the backend, its device/surface and the collection cache.
///
/// Passes run on a single control thread. The phase flag is a `Cell`, which
/// keeps the renderer `!Sync`.
pub struct PreviewRenderer<B: GraphicsBackend> {
    settings: PreviewSettings,
    phase: Cell<RenderPhase>,
    state: Cell<RenderState>,
    inner: RefCell<Inner<B>>,
}

impl<B: GraphicsBackend> PreviewRenderer<B> {
    pub fn new(backend: B, settings: PreviewSettings) -> Self {
        let sample_text = settings.default_sample.clone();
        Self {
            settings,
            phase: Cell::new(RenderPhase::Idle),
            state: Cell::new(RenderState::Uninitialized),
            inner: RefCell::new(Inner {
                backend,
                stage: Stage::Uninitialized,
                collections: FontCollectionCache::new(),
                sample_text,
            }),
        }
    }

    pub fn settings(&self) -> &PreviewSettings {
        &self.settings
    }

    pub fn state(&self) -> RenderState {
        self.state.get()
    }

    pub fn is_drawing(&self) -> bool {
        self.phase.get() == RenderPhase::Drawing
    }

    /// Sample text as of the last sync.
    pub fn sample_text(&self) -> String {
        match self.inner.try_borrow() {
            Ok(inner) => inner.sample_text.clone(),
            Err(_) => self.settings.default_sample.clone(),
        }
    }

    /// Pull the sample text from `target` without rendering.
    pub fn sync_sample_text(&self, target: &dyn PreviewTarget) {
        let Some(text) = target.sample_text() else {
            return;
        };
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            tracing::trace!(len = text.chars().count(), "sample text synced");
            inner.sample_text = text;
        }
    }

    /// Run `f` against the backend between passes.
    pub fn with_backend<R>(&self, f: impl FnOnce(&B) -> R) -> Option<R> {
        self.inner.try_borrow().ok().map(|inner| f(&inner.backend))
    }

    /// Drop surface and device; the next pass starts from scratch.
    pub fn release(&self) {
        if self.is_drawing() {
            return;
        }
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.stage = Stage::Uninitialized;
            self.state.set(RenderState::Uninitialized);
            tracing::debug!("preview resources released");
        }
    }

    /// Run one render pass.
    ///
    /// A request arriving while another pass is in flight is dropped.
    pub fn render(
        &self,
        target: &dyn PreviewTarget,
        entry: Option<&FontEntry>,
        background: Rgb,
        reason: &str,
    ) -> RenderOutcome {
        if self.is_drawing() {
            tracing::trace!(reason, "render dropped: pass in flight");
            return RenderOutcome::Dropped;
        }
        self.phase.set(RenderPhase::Drawing);
        let _guard = PhaseGuard(&self.phase);

        self.sync_sample_text(target);
        let size = target.client_size();
        tracing::trace!(
            reason,
            width = size.width,
            height = size.height,
            selected = ?entry.map(|e| e.display_name()),
            "render start"
        );
        if size.is_empty() {
            return RenderOutcome::EmptyArea;
        }

        let Ok(mut inner) = self.inner.try_borrow_mut() else {
            return RenderOutcome::Dropped;
        };
        let outcome = inner.pass(&self.settings, size, entry, background);
        self.state.set(inner.stage.state());
        outcome
    }
}

impl<B: GraphicsBackend> Inner<B> {
    fn ensure_device(&mut self) -> Result<(), RenderOutcome> {
        if !matches!(self.stage, Stage::Uninitialized) {
            return Ok(());
        }
        match self.backend.create_device() {
            Ok(device) => {
                tracing::info!("preview device initialized");
                self.stage = Stage::DeviceReady(device);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "preview device creation failed");
                Err(RenderOutcome::DeviceUnavailable)
            }
        }
    }

    fn ensure_surface(&mut self, size: SurfaceSize) -> Result<(), RenderOutcome> {
        self.ensure_device()?;

        match std::mem::replace(&mut self.stage, Stage::Uninitialized) {
            Stage::Uninitialized => Err(RenderOutcome::DeviceUnavailable),
            Stage::DeviceReady(mut device) => {
                match self.backend.create_surface(&mut device, size) {
                    Ok(surface) => {
                        tracing::debug!(width = size.width, height = size.height, "surface created");
                        self.stage = Stage::SurfaceReady {
                            device,
                            surface,
                            size,
                        };
                        Ok(())
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "surface creation failed");
                        self.stage = Stage::DeviceReady(device);
                        Err(RenderOutcome::SurfaceUnavailable)
                    }
                }
            }
            Stage::SurfaceReady {
                mut device,
                mut surface,
                size: current,
            } => {
                if current == size {
                    self.stage = Stage::SurfaceReady {
                        device,
                        surface,
                        size,
                    };
                    return Ok(());
                }
                match self.backend.resize_surface(&mut device, &mut surface, size) {
                    Ok(()) => {
                        tracing::trace!(width = size.width, height = size.height, "surface resized");
                        self.stage = Stage::SurfaceReady {
                            device,
                            surface,
                            size,
                        };
                        Ok(())
                    }
                    Err(err) => {
                        // the surface is discarded so the next pass recreates it
                        tracing::warn!(error = %err, "surface resize failed");
                        drop(surface);
                        self.stage = Stage::DeviceReady(device);
                        Err(RenderOutcome::SurfaceUnavailable)
                    }
                }
            }
        }
    }

    fn pass(
        &mut self,
        settings: &PreviewSettings,
        size: SurfaceSize,
        entry: Option<&FontEntry>,
        background: Rgb,
    ) -> RenderOutcome {
        if let Err(outcome) = self.ensure_surface(size) {
            return outcome;
        }

        let sample = if self.sample_text.is_empty() {
            tracing::warn!("sample text empty, using fallback");
            settings.default_sample.clone()
        } else {
            self.sample_text.clone()
        };

        let Inner {
            backend,
            stage,
            collections,
            ..
        } = self;
        let Stage::SurfaceReady {
            device, surface, ..
        } = stage
        else {
            return RenderOutcome::SurfaceUnavailable;
        };

        if let Err(err) = backend.begin_draw(device, surface) {
            tracing::warn!(error = %err, "begin draw failed");
            return RenderOutcome::DrawFailed;
        }
        backend.clear(surface, background.to_rgba_f32());

        let mut text_drawn = false;
        match entry {
            Some(entry) => {
                if let Some(format) = resolve_format(backend, device, collections, settings, entry) {
                    let rect = LayoutRect::inset(size, settings.margin);
                    match backend.draw_text(surface, &format, &sample, rect, Rgb::BLACK.to_rgba_f32()) {
                        Ok(()) => {
                            text_drawn = true;
                            tracing::trace!(
                                len = sample.chars().count(),
                                family = entry.family_name(),
                                "sample drawn"
                            );
                        }
                        Err(err) => tracing::warn!(error = %err, "draw text failed"),
                    }
                }
            }
            None => tracing::debug!("no font selected; clearing only"),
        }

        if let Err(err) = backend.end_draw(device, surface) {
            tracing::warn!(error = %err, "end draw failed");
            return RenderOutcome::DrawFailed;
        }
        if let Err(err) = backend.present(surface, settings.sync_interval) {
            tracing::warn!(error = %err, "present failed");
            return RenderOutcome::PresentFailed;
        }
        RenderOutcome::Presented { text_drawn }
    }
}

/// Text format for `entry`: its own collection first, then the fallback UI family.
fn resolve_format<B: GraphicsBackend>(
    backend: &mut B,
    device: &mut B::Device,
    collections: &mut FontCollectionCache,
    settings: &PreviewSettings,
    entry: &FontEntry,
) -> Option<B::TextFormat> {
    let collection = if entry.is_system_font() {
        None
    } else {
        match collections.get_or_create(entry.file_path()) {
            Ok(collection) => Some(collection),
            Err(err) => {
                tracing::warn!(
                    path = %entry.file_path().display(),
                    error = %err,
                    "external font collection unavailable; using system resolution"
                );
                None
            }
        }
    };

    let request =
        TextFormatRequest::normal(entry.family_name(), settings.font_size, &settings.locale);
    let primary = match backend.create_text_format(device, &request, collection.as_deref()) {
        Ok(format) => return Some(format),
        Err(err) => err,
    };

    let fallback = request.with_family(&settings.fallback_family);
    match backend.create_text_format(device, &fallback, None) {
        Ok(format) => {
            tracing::warn!(family = %request.family, error = %primary, "primary format failed; using fallback family");
            Some(format)
        }
        Err(err) => {
            tracing::warn!(
                family = %request.family,
                primary = %primary,
                fallback = %err,
                "no usable text format"
            );
            None
        }
    }
}
