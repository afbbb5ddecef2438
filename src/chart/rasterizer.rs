//! Off-screen chart rasterization.
//!
//! Each call gets its own detached surface that never touches the document.
//! The draw runs on tokio's blocking pool; the encoded image comes back over
//! a oneshot channel that is fed from exactly one place, the
//! `on_complete` hook. A draw that fails sends its error down the same
//! channel, and a render task that dies without sending anything shows up
//! as [`RasterError::Aborted`], so the caller can never wait forever.

use tiny_skia::Pixmap;
use tokio::sync::oneshot;

use super::draw::{Chart, ChartInk, RenderHooks};
use super::ChartSpec;
use crate::error::RasterError;
use crate::style::{Color, Theme};

/// Largest surface edge, in pixels, the rasterizer will allocate.
const MAX_EDGE_PX: u32 = 8192;

/// A captured chart: PNG bytes and their pixel size.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Surface size and colors for one render.
#[derive(Debug, Clone, Copy)]
pub struct RasterOptions {
    pub width: u32,
    pub height: u32,
    /// Backdrop, axis and text colors.
    pub ink: ChartInk,
}

impl RasterOptions {
    pub fn new(width: u32, height: u32, theme: Theme) -> Self {
        Self {
            width,
            height,
            ink: ChartInk::for_theme(theme),
        }
    }
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self::new(600, 400, Theme::Light)
    }
}

type CaptureResult = Result<RasterImage, RasterError>;

/// Fills the backdrop before drawing and captures the surface on completion.
struct CaptureHooks {
    background: Color,
    sender: Option<oneshot::Sender<CaptureResult>>,
}

impl RenderHooks for CaptureHooks {
    fn before_draw(&mut self, surface: &mut Pixmap) {
        let [r, g, b, _] = self.background.to_rgba8();
        // Always opaque: a transparent backdrop would let the page show through.
        surface.fill(tiny_skia::Color::from_rgba8(r, g, b, 255));
    }

    fn on_complete(&mut self, surface: &Pixmap) {
        let result = surface
            .encode_png()
            .map(|data| RasterImage {
                data,
                width: surface.width(),
                height: surface.height(),
            })
            .map_err(|e| RasterError::Encode(e.to_string()));
        if let Some(sender) = self.sender.take() {
            // The receiver may have been dropped; nothing is waiting then.
            let _ = sender.send(result);
        }
    }
}

/// Renders chart specs to images.
#[derive(Debug, Clone, Default)]
pub struct ChartRasterizer;

impl ChartRasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Render `spec` on a fresh `options.width` x `options.height` surface.
    ///
    /// Resolves only after the chart has signalled completion. Unknown chart
    /// types and undrawable data are rejected.
    pub async fn rasterize(&self, spec: &ChartSpec, options: RasterOptions) -> CaptureResult {
        let RasterOptions { width, height, .. } = options;
        if width == 0 || height == 0 || width > MAX_EDGE_PX || height > MAX_EDGE_PX {
            return Err(RasterError::InvalidSize { width, height });
        }

        let (sender, receiver) = oneshot::channel();
        let owned = spec.clone();

        tokio::task::spawn_blocking(move || {
            let mut hooks = CaptureHooks {
                background: options.ink.backdrop,
                sender: Some(sender),
            };
            let drawn = match Pixmap::new(width, height) {
                Some(mut surface) => Chart::new(&owned, options.ink)
                    .and_then(|chart| chart.render(&mut surface, &mut hooks)),
                None => Err(RasterError::InvalidSize { width, height }),
            };
            if let Err(e) = drawn {
                if let Some(sender) = hooks.sender.take() {
                    let _ = sender.send(Err(e));
                }
            }
        });

        let image = receiver.await.map_err(|_| {
            RasterError::Aborted("render task ended without signalling completion".to_string())
        })??;

        log::debug!(
            "Rasterized {} chart at {}x{} ({} bytes)",
            spec.kind,
            image.width,
            image.height,
            image.data.len()
        );
        Ok(image)
    }
}
