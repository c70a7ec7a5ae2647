use std::path::Path;

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use font8x8::{
    UnicodeFonts, BASIC_FONTS, BLOCK_FONTS, BOX_FONTS, GREEK_FONTS, HIRAGANA_FONTS, LATIN_FONTS,
    MISC_FONTS,
};

use crate::RenderError;

/// Pixel size of one grid cell in the exported bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellBox {
    pub width: u32,
    pub height: u32,
}

/// Glyph coverage in `[0, 1]`, positioned relative to the cell's top-left corner.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphMask {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<f32>,
}

impl GlyphMask {
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self { left, top, width, height, coverage: vec![0.0; (width * height) as usize] }
    }

    pub fn empty() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.coverage[(y * self.width + x) as usize]
    }

    fn set(&mut self, x: u32, y: u32, value: f32) {
        if x < self.width && y < self.height {
            self.coverage[(y * self.width + x) as usize] = value.clamp(0.0, 1.0);
        }
    }

    pub fn is_blank(&self) -> bool {
        self.coverage.iter().all(|c| *c <= 0.0)
    }

    /// Synthetic bold: every stroke is widened by one pixel to the right.
    pub fn embolden(&self) -> Self {
        if self.width == 0 || self.height == 0 {
            return self.clone();
        }
        let mut bold = Self::new(self.left, self.top, self.width + 1, self.height);
        for y in 0..self.height {
            for x in 0..bold.width {
                let here = self.get(x, y);
                let left = if x > 0 { self.get(x - 1, y) } else { 0.0 };
                bold.set(x, y, here.max(left));
            }
        }
        bold
    }

    /// Centered block covering roughly `fraction` of the cell, used for glyphs a
    /// face cannot draw.
    pub fn level_block(cell: CellBox, fraction: f64) -> Self {
        let side = fraction.clamp(0.0, 1.0).sqrt();
        let width = (f64::from(cell.width) * side).round() as u32;
        let height = (f64::from(cell.height) * side).round() as u32;
        let left = ((cell.width - width) / 2) as i32;
        let top = ((cell.height - height) / 2) as i32;
        let mut mask = Self::new(left, top, width, height);
        mask.coverage.fill(1.0);
        mask
    }
}

/// Something that can turn a glyph into a coverage mask for a given cell size.
pub trait GlyphFace {
    /// Returns `None` when the face has no glyph for `ch`.
    fn rasterize(&self, ch: char, cell: CellBox) -> Option<GlyphMask>;
}

/// Built-in 8x8 bitmap face, scaled to the cell. Always available.
#[derive(Clone, Copy, Debug, Default)]
pub struct BitmapFace;

impl BitmapFace {
    fn lookup(ch: char) -> Option<[u8; 8]> {
        BASIC_FONTS
            .get(ch)
            .or_else(|| LATIN_FONTS.get(ch))
            .or_else(|| BLOCK_FONTS.get(ch))
            .or_else(|| BOX_FONTS.get(ch))
            .or_else(|| GREEK_FONTS.get(ch))
            .or_else(|| HIRAGANA_FONTS.get(ch))
            .or_else(|| MISC_FONTS.get(ch))
    }
}

impl GlyphFace for BitmapFace {
    fn rasterize(&self, ch: char, cell: CellBox) -> Option<GlyphMask> {
        let rows = Self::lookup(ch)?;
        let mut mask = GlyphMask::new(0, 0, cell.width, cell.height);

        for y in 0..cell.height {
            // Bit 0 of each row byte is the leftmost pixel.
            let bits = rows[(y * 8 / cell.height.max(1)).min(7) as usize];
            for x in 0..cell.width {
                let column = (x * 8 / cell.width.max(1)).min(7);
                if bits & (1 << column) != 0 {
                    mask.set(x, y, 1.0);
                }
            }
        }

        Some(mask)
    }
}

/// TrueType/OpenType face rasterized with `ab_glyph`.
pub struct OutlineFace {
    font: FontVec,
}

impl std::fmt::Debug for OutlineFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutlineFace").field("glyphs", &self.font.glyph_count()).finish()
    }
}

impl OutlineFace {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, RenderError> {
        let font = FontVec::try_from_vec(data).map_err(|err| RenderError::Font(err.to_string()))?;
        Ok(Self { font })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|err| RenderError::Font(format!("{}: {err}", path.display())))?;
        let font = FontVec::try_from_vec(data)
            .map_err(|err| RenderError::Font(format!("{}: {err}", path.display())))?;
        Ok(Self { font })
    }
}

impl GlyphFace for OutlineFace {
    fn rasterize(&self, ch: char, cell: CellBox) -> Option<GlyphMask> {
        let id = self.font.glyph_id(ch);
        if id.0 == 0 {
            return None;
        }

        let scale = PxScale::from(cell.height as f32);
        let ascent = self.font.as_scaled(scale).ascent();
        let glyph = id.with_scale_and_position(scale, point(0.0, ascent));

        // Whitespace has a glyph but no outline.
        let Some(outlined) = self.font.outline_glyph(glyph) else {
            return Some(GlyphMask::empty());
        };

        let bounds = outlined.px_bounds();
        let mut mask = GlyphMask::new(
            bounds.min.x as i32,
            bounds.min.y as i32,
            bounds.width().max(0.0) as u32,
            bounds.height().max(0.0) as u32,
        );
        outlined.draw(|x, y, coverage| mask.set(x, y, coverage));
        Some(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL: CellBox = CellBox { width: 19, height: 32 };

    #[test]
    fn bitmap_face_covers_ascii_blocks_and_box_drawing() {
        for ch in ['@', '#', 'a', '█', '▓', '░', '─', '│', 'α', 'あ'] {
            let mask = BitmapFace.rasterize(ch, CELL).unwrap_or_else(|| panic!("missing {ch}"));
            assert_eq!((mask.width, mask.height), (19, 32));
            assert!(!mask.is_blank(), "{ch} rendered blank");
        }
    }

    #[test]
    fn space_is_blank_but_present() {
        let mask = BitmapFace.rasterize(' ', CELL).unwrap();
        assert!(mask.is_blank());
    }

    #[test]
    fn full_block_fills_the_cell() {
        let mask = BitmapFace.rasterize('█', CELL).unwrap();
        assert!(mask.coverage.iter().all(|c| *c == 1.0));
    }

    #[test]
    fn embolden_widens_strokes() {
        let mut mask = GlyphMask::new(0, 0, 3, 1);
        mask.set(1, 0, 1.0);
        let bold = mask.embolden();
        assert_eq!(bold.width, 4);
        assert_eq!(bold.coverage, vec![0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn level_block_is_centered() {
        let full = GlyphMask::level_block(CellBox { width: 10, height: 20 }, 1.0);
        assert_eq!((full.left, full.top, full.width, full.height), (0, 0, 10, 20));

        let quarter = GlyphMask::level_block(CellBox { width: 10, height: 20 }, 0.25);
        assert_eq!((quarter.left, quarter.top, quarter.width, quarter.height), (2, 5, 5, 10));

        let none = GlyphMask::level_block(CellBox { width: 10, height: 20 }, 0.0);
        assert!(none.coverage.is_empty());
    }

    #[test]
    fn invalid_font_bytes_are_rejected() {
        let err = OutlineFace::from_bytes(vec![1, 2, 3]).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Font);
    }
}
