mod ascii;
pub mod export;
mod image_pipeline;
mod output;
mod session;

use log::debug;

pub use ascii::{
    grid::{CellGlyph, GlyphGrid},
    mapping::{luminance, GlyphMapper},
    presets::{self, RampPreset},
    ramp::GlyphRamp,
};
pub use export::{
    encode_png, export_bitmap,
    face::{BitmapFace, CellBox, GlyphFace, GlyphMask, OutlineFace},
    save_png, ColorMode, ExportOptions,
};
pub use image_pipeline::{
    loader::SourceImage,
    resize::{GridDimensions, SizePreset, ViewportLayout, GLYPH_ASPECT},
    sample::{SampleBuffer, Sampling},
};
pub use output::{ansi::ansi_truecolor, markup::color_markup, text::plain_text};
pub use session::{Completed, Request, Session, Ticket};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("pixel buffer does not match {width}x{height} RGBA")]
    BufferSize { width: u32, height: u32 },
    #[error("glyph ramp must contain at least one character")]
    EmptyRamp,
    #[error("size budget must be at least one cell")]
    InvalidBudget,
    #[error("no image has been converted yet")]
    NoSourceImage,
    #[error("failed to load font: {0}")]
    Font(String),
    #[error("export bitmap {width}x{height} exceeds the pixel limit")]
    ExportTooLarge { width: u64, height: u64 },
    #[error("failed to encode bitmap: {0}")]
    Encoding(#[source] image::ImageError),
}

/// Coarse failure category a caller can branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidImage,
    InvalidRamp,
    InvalidBudget,
    NoSourceImage,
    Font,
    OutOfMemory,
    EncodingFailure,
}

impl RenderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::Decode(_)
            | RenderError::EmptyImage { .. }
            | RenderError::BufferSize { .. } => ErrorKind::InvalidImage,
            RenderError::EmptyRamp => ErrorKind::InvalidRamp,
            RenderError::InvalidBudget => ErrorKind::InvalidBudget,
            RenderError::NoSourceImage => ErrorKind::NoSourceImage,
            RenderError::Font(_) => ErrorKind::Font,
            RenderError::ExportTooLarge { .. } => ErrorKind::OutOfMemory,
            RenderError::Encoding(_) => ErrorKind::EncodingFailure,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineOptions {
    /// Glyph cell width / height assumed when deriving grid size.
    pub glyph_aspect: f64,
    pub sampling: Sampling,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { glyph_aspect: GLYPH_ASPECT, sampling: Sampling::Area }
    }
}

/// The grid of one conversion together with both text renderings of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversion {
    pub plain_text: String,
    pub color_markup: String,
    pub grid: GlyphGrid,
}

impl Conversion {
    pub fn from_grid(grid: GlyphGrid) -> Self {
        Self { plain_text: plain_text(&grid), color_markup: color_markup(&grid), grid }
    }

    pub fn dimensions(&self) -> GridDimensions {
        GridDimensions { columns: self.grid.width, rows: self.grid.height }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Reduces `image` to one sample per cell of a grid whose larger side is `max_size`.
    pub fn sample(&self, image: &SourceImage, max_size: u16) -> Result<SampleBuffer, RenderError> {
        let (width, height) = image.dimensions();
        let dimensions = GridDimensions::fit(width, height, max_size, self.options.glyph_aspect)?;
        debug!(
            "sampling {}x{} image into {}x{} cells",
            width, height, dimensions.columns, dimensions.rows
        );
        Ok(image_pipeline::sample::downsample(image.pixels(), dimensions, self.options.sampling))
    }

    pub fn convert(
        &self,
        image: &SourceImage,
        ramp: &GlyphRamp,
        max_size: u16,
    ) -> Result<Conversion, RenderError> {
        let samples = self.sample(image, max_size)?;
        Ok(self.quantize(&samples, ramp))
    }

    /// Decodes `bytes` and samples it; the decoded image is dropped on return.
    pub fn sample_bytes(&self, bytes: &[u8], max_size: u16) -> Result<SampleBuffer, RenderError> {
        let image = SourceImage::decode(bytes)?;
        self.sample(&image, max_size)
    }

    pub fn convert_bytes(
        &self,
        bytes: &[u8],
        ramp: &GlyphRamp,
        max_size: u16,
    ) -> Result<Conversion, RenderError> {
        let samples = self.sample_bytes(bytes, max_size)?;
        Ok(self.quantize(&samples, ramp))
    }

    pub fn quantize(&self, samples: &SampleBuffer, ramp: &GlyphRamp) -> Conversion {
        let grid = GlyphMapper::new(ramp.clone()).map_samples(samples);
        Conversion::from_grid(grid)
    }
}

/// Converts `image` with the default pipeline options.
pub fn convert(
    image: &SourceImage,
    ramp: &GlyphRamp,
    max_size: u16,
) -> Result<Conversion, RenderError> {
    Pipeline::default().convert(image, ramp, max_size)
}
