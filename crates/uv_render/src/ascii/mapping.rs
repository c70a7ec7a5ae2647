use crate::image_pipeline::sample::SampleBuffer;

use super::{
    grid::{CellGlyph, GlyphGrid},
    ramp::GlyphRamp,
};

/// ITU-R BT.601 luma of an RGB triple, in `[0, 255]`.
pub fn luminance(rgb: [u8; 3]) -> f64 {
    0.299 * f64::from(rgb[0]) + 0.587 * f64::from(rgb[1]) + 0.114 * f64::from(rgb[2])
}

pub struct GlyphMapper {
    ramp: GlyphRamp,
}

impl GlyphMapper {
    pub fn new(ramp: GlyphRamp) -> Self {
        Self { ramp }
    }

    /// Maps every sample to a glyph by luminance and keeps its RGB unmodified.
    ///
    /// Samples are straight color, so transparent cells arrive as black.
    pub fn map_samples(&self, samples: &SampleBuffer) -> GlyphGrid {
        let cells = samples
            .pixels
            .iter()
            .map(|&[r, g, b, _]| {
                let rgb = [r, g, b];
                let index = self.ramp.index_for(luminance(rgb));
                CellGlyph::new(self.ramp.char_at(index), index as u32, rgb)
            })
            .collect();

        let levels = u32::try_from(self.ramp.len()).unwrap_or(u32::MAX);
        GlyphGrid::new(samples.width, samples.height, levels, cells)
    }
}
