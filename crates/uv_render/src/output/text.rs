use crate::ascii::grid::GlyphGrid;

/// Monochrome rendering: one line per grid row, joined by `\n`.
pub fn plain_text(grid: &GlyphGrid) -> String {
    let capacity = grid.cells.len() + usize::from(grid.height);
    let mut out = String::with_capacity(capacity);
    for (index, row) in grid.rows().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.push_str(&row);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ascii::grid::CellGlyph;

    #[test]
    fn rows_are_newline_separated_without_trailer() {
        let cells = "ab.cd.".chars().map(|ch| CellGlyph::new(ch, 0, [0; 3])).collect();
        let grid = GlyphGrid::new(3, 2, 1, cells);
        assert_eq!(plain_text(&grid), "ab.\ncd.");
    }
}
