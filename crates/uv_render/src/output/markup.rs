use std::fmt::Write;

use crate::ascii::grid::GlyphGrid;

const PRE_OPEN: &str = r#"<pre style="margin:0; padding:0; white-space:pre;">"#;
const PRE_CLOSE: &str = "</pre>";

/// Colorized rendering: one inline-colored `<span>` per cell inside a single
/// `<pre>` block, rows separated by `\n`.
pub fn color_markup(grid: &GlyphGrid) -> String {
    // `<span style="color:rgb(255,255,255)">x</span>` is at most 44 bytes.
    let mut out = String::with_capacity(PRE_OPEN.len() + grid.cells.len() * 44 + PRE_CLOSE.len());
    out.push_str(PRE_OPEN);

    for (index, row) in grid.cell_rows().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        for cell in row {
            let [r, g, b] = cell.fg;
            let _ = write!(out, r#"<span style="color:rgb({r},{g},{b})">"#);
            push_escaped(&mut out, cell.ch);
            out.push_str("</span>");
        }
    }

    out.push_str(PRE_CLOSE);
    out
}

fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        _ => out.push(ch),
    }
}

#[cfg(test)]
pub(crate) fn strip_markup(markup: &str) -> String {
    let mut text = String::with_capacity(markup.len());
    let mut in_tag = false;
    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {},
        }
    }
    text.replace("&lt;", "<").replace("&gt;", ">").replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ascii::grid::CellGlyph;
    use crate::output::text::plain_text;

    fn grid_of(width: u16, height: u16, glyphs: &str) -> GlyphGrid {
        let cells = glyphs
            .chars()
            .enumerate()
            .map(|(i, ch)| CellGlyph::new(ch, 0, [i as u8, 10, 200]))
            .collect();
        GlyphGrid::new(width, height, 1, cells)
    }

    #[test]
    fn wraps_each_cell_with_its_color() {
        let markup = color_markup(&grid_of(2, 1, "#@"));
        assert_eq!(
            markup,
            concat!(
                r#"<pre style="margin:0; padding:0; white-space:pre;">"#,
                r#"<span style="color:rgb(0,10,200)">#</span>"#,
                r#"<span style="color:rgb(1,10,200)">@</span>"#,
                "</pre>"
            )
        );
    }

    #[test]
    fn markup_characters_are_escaped() {
        let markup = color_markup(&grid_of(3, 1, "<&>"));
        assert!(markup.contains(">&lt;</span>"));
        assert!(markup.contains(">&amp;</span>"));
        assert!(markup.contains(">&gt;</span>"));
        assert_eq!(markup.matches("<span").count(), 3);
    }

    #[test]
    fn stripped_markup_matches_plain_text() {
        let grid = grid_of(4, 3, "<a&>b c\"'░█@");
        assert_eq!(strip_markup(&color_markup(&grid)), plain_text(&grid));
    }
}
