use std::fmt::Write;

use crate::ascii::grid::GlyphGrid;

const RESET: &str = "\x1b[0m";

/// Truecolor terminal rendering. Consecutive cells sharing a color reuse the
/// previous escape sequence; every row ends with a reset.
pub fn ansi_truecolor(grid: &GlyphGrid) -> String {
    let mut out = String::with_capacity(grid.cells.len() * 20);

    for (index, row) in grid.cell_rows().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let mut current = None;
        for cell in row {
            if current != Some(cell.fg) {
                let [r, g, b] = cell.fg;
                let _ = write!(out, "\x1b[38;2;{r};{g};{b}m");
                current = Some(cell.fg);
            }
            out.push(cell.ch);
        }
        out.push_str(RESET);
    }

    out
}
