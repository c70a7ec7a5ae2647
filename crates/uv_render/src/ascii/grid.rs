#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellGlyph {
    pub ch: char,
    /// Position of `ch` in the ramp it was quantized against.
    pub level: u32,
    /// Foreground color encoded as RGB bytes, copied from the sample.
    pub fg: [u8; 3],
}

impl CellGlyph {
    pub fn new(ch: char, level: u32, fg: [u8; 3]) -> Self {
        Self { ch, level, fg }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphGrid {
    pub width: u16,
    pub height: u16,
    pub cells: Vec<CellGlyph>,
    /// Length of the ramp the cells were quantized against.
    pub levels: u32,
}

impl GlyphGrid {
    pub fn new(width: u16, height: u16, levels: u32, cells: Vec<CellGlyph>) -> Self {
        assert_eq!(usize::from(width) * usize::from(height), cells.len());
        Self { width, height, cells, levels }
    }

    pub fn cell(&self, column: u16, row: u16) -> Option<&CellGlyph> {
        if column >= self.width || row >= self.height {
            return None;
        }
        self.cells.get(usize::from(row) * usize::from(self.width) + usize::from(column))
    }

    pub fn cell_rows(&self) -> impl Iterator<Item = &[CellGlyph]> + '_ {
        self.cells.chunks(usize::from(self.width).max(1))
    }

    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.cell_rows().map(|row| row.iter().map(|cell| cell.ch).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_lookup_is_row_major() {
        let cells = (0..6u8)
            .map(|i| CellGlyph::new(char::from(b'a' + i), u32::from(i), [i; 3]))
            .collect();
        let grid = GlyphGrid::new(3, 2, 6, cells);

        assert_eq!(grid.cell(0, 0).map(|c| c.ch), Some('a'));
        assert_eq!(grid.cell(2, 0).map(|c| c.ch), Some('c'));
        assert_eq!(grid.cell(0, 1).map(|c| c.ch), Some('d'));
        assert!(grid.cell(3, 0).is_none());
        assert!(grid.cell(0, 2).is_none());
        assert_eq!(grid.rows().collect::<Vec<_>>(), vec!["abc", "def"]);
    }

    #[test]
    #[should_panic]
    fn cell_count_must_match_dimensions() {
        GlyphGrid::new(2, 2, 1, vec![CellGlyph::new(' ', 0, [0; 3])]);
    }
}
