//! Rasterizes a glyph grid into a bitmap, reproducing the on-screen layout
//! cell for cell.

pub mod face;

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageFormat, Rgba, RgbaImage};
use log::{debug, warn};

use crate::ascii::grid::{CellGlyph, GlyphGrid};
use crate::image_pipeline::resize::GLYPH_ASPECT;
use crate::RenderError;
use face::{CellBox, GlyphFace, GlyphMask};

/// Pixels per glyph height in exported bitmaps.
pub const DEFAULT_EXPORT_SCALE: u32 = 32;
pub const DEFAULT_BACKGROUND: [u8; 3] = [0x0a, 0x0a, 0x0f];
/// Glyph color in monochrome exports.
pub const DEFAULT_ACCENT: [u8; 3] = [0xc7, 0x7d, 0xff];
/// Color exports are brightened to make up for contrast lost off-screen.
pub const DEFAULT_BRIGHTEN: f32 = 1.3;
/// Upper bound on exported pixels, well above the largest size preset.
pub const MAX_EXPORT_PIXELS: u64 = 64 * 1024 * 1024;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    #[default]
    Color,
    Monochrome,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExportOptions {
    pub color_mode: ColorMode,
    pub scale: u32,
    pub glyph_aspect: f64,
    pub background: [u8; 3],
    pub accent: [u8; 3],
    pub brighten: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::Color,
            scale: DEFAULT_EXPORT_SCALE,
            glyph_aspect: GLYPH_ASPECT,
            background: DEFAULT_BACKGROUND,
            accent: DEFAULT_ACCENT,
            brighten: DEFAULT_BRIGHTEN,
        }
    }
}

impl ExportOptions {
    /// Bitmap size for a `columns x rows` grid.
    pub fn bitmap_size(&self, columns: u16, rows: u16) -> (u64, u64) {
        let scale = f64::from(self.scale);
        let width = (f64::from(columns) * scale * self.glyph_aspect).ceil();
        let height = (f64::from(rows) * scale).ceil();
        (width as u64, height as u64)
    }

    fn cell_origin(&self, column: u16, row: u16) -> (i64, i64) {
        let scale = f64::from(self.scale);
        let x = (f64::from(column) * scale * self.glyph_aspect).round();
        let y = (f64::from(row) * scale).round();
        (x as i64, y as i64)
    }

    fn cell_box(&self) -> CellBox {
        let width = (f64::from(self.scale) * self.glyph_aspect).round().max(1.0) as u32;
        CellBox { width, height: self.scale.max(1) }
    }

    fn glyph_color(&self, cell: &CellGlyph) -> [u8; 3] {
        match self.color_mode {
            ColorMode::Color => brighten(cell.fg, self.brighten),
            ColorMode::Monochrome => self.accent,
        }
    }
}

/// Multiplies each channel by `factor`, saturating at 255.
pub fn brighten(rgb: [u8; 3], factor: f32) -> [u8; 3] {
    rgb.map(|channel| (f32::from(channel) * factor).round().clamp(0.0, 255.0) as u8)
}

/// Draws every cell of `grid` left/top-aligned in its slot, in row-major order.
pub fn export_bitmap(
    grid: &GlyphGrid,
    options: &ExportOptions,
    face: &dyn GlyphFace,
) -> Result<RgbaImage, RenderError> {
    let (width, height) = options.bitmap_size(grid.width, grid.height);
    if width.saturating_mul(height) > MAX_EXPORT_PIXELS
        || width > u64::from(u32::MAX)
        || height > u64::from(u32::MAX)
    {
        return Err(RenderError::ExportTooLarge { width, height });
    }

    let [r, g, b] = options.background;
    let mut bitmap = RgbaImage::from_pixel(width as u32, height as u32, Rgba([r, g, b, 255]));
    debug!("exporting {}x{} grid to {}x{} bitmap", grid.width, grid.height, width, height);

    let cell_box = options.cell_box();
    let mut glyphs = GlyphCache::new(face, cell_box);

    for (row_index, row) in grid.cell_rows().enumerate() {
        for (column_index, cell) in row.iter().enumerate() {
            let (x, y) = options.cell_origin(column_index as u16, row_index as u16);
            let mask = glyphs.mask(cell, grid.levels);
            blend(&mut bitmap, x, y, mask, options.glyph_color(cell));
        }
    }

    Ok(bitmap)
}

struct GlyphCache<'a> {
    face: &'a dyn GlyphFace,
    cell: CellBox,
    glyphs: HashMap<char, Option<GlyphMask>>,
    fallbacks: HashMap<u32, GlyphMask>,
}

impl<'a> GlyphCache<'a> {
    fn new(face: &'a dyn GlyphFace, cell: CellBox) -> Self {
        Self { face, cell, glyphs: HashMap::new(), fallbacks: HashMap::new() }
    }

    fn mask(&mut self, cell: &CellGlyph, levels: u32) -> &GlyphMask {
        let (face, cell_box) = (self.face, self.cell);
        let glyph = self.glyphs.entry(cell.ch).or_insert_with(|| {
            let mask = face.rasterize(cell.ch, cell_box).map(|mask| mask.embolden());
            if mask.is_none() {
                let code = cell.ch as u32;
                warn!("no glyph for {:?} (U+{:04X}), drawing a level block", cell.ch, code);
            }
            mask
        });

        match glyph {
            Some(mask) => mask,
            None => self.fallbacks.entry(cell.level).or_insert_with(|| {
                let fraction = f64::from(cell.level) / f64::from(levels.saturating_sub(1).max(1));
                GlyphMask::level_block(cell_box, fraction)
            }),
        }
    }
}

fn blend(bitmap: &mut RgbaImage, x: i64, y: i64, mask: &GlyphMask, color: [u8; 3]) {
    let (width, height) = (i64::from(bitmap.width()), i64::from(bitmap.height()));

    for my in 0..mask.height {
        let py = y + i64::from(mask.top) + i64::from(my);
        if py < 0 || py >= height {
            continue;
        }
        for mx in 0..mask.width {
            let coverage = mask.get(mx, my);
            let px = x + i64::from(mask.left) + i64::from(mx);
            if coverage <= 0.0 || px < 0 || px >= width {
                continue;
            }
            let pixel = bitmap.get_pixel_mut(px as u32, py as u32);
            for (channel, target) in pixel.0.iter_mut().zip(color) {
                let mixed = f32::from(*channel) * (1.0 - coverage) + f32::from(target) * coverage;
                *channel = mixed.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Encodes a bitmap as PNG bytes.
pub fn encode_png(bitmap: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(bitmap.as_raw(), bitmap.width(), bitmap.height(), ColorType::Rgba8)
        .map_err(RenderError::Encoding)?;
    Ok(buffer.into_inner())
}

/// Writes a bitmap as PNG. A partially written file is removed on failure.
pub fn save_png<P: AsRef<Path>>(bitmap: &RgbaImage, path: P) -> Result<(), RenderError> {
    let path = path.as_ref();
    bitmap.save_with_format(path, ImageFormat::Png).map_err(|err| {
        let _ = std::fs::remove_file(path);
        RenderError::Encoding(err)
    })
}
