use crate::RenderError;

/// Width:height ratio of one glyph cell in a monospace face.
pub const GLYPH_ASPECT: f64 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridDimensions {
    pub columns: u16,
    pub rows: u16,
}

impl GridDimensions {
    pub fn cell_count(&self) -> usize {
        usize::from(self.columns) * usize::from(self.rows)
    }

    /// Fits a `source_width x source_height` image into a grid whose larger
    /// side is `max_size` cells, correcting for the glyph aspect ratio.
    pub fn fit(
        source_width: u32,
        source_height: u32,
        max_size: u16,
        glyph_aspect: f64,
    ) -> Result<Self, RenderError> {
        if source_width == 0 || source_height == 0 {
            return Err(RenderError::EmptyImage { width: source_width, height: source_height });
        }
        if max_size == 0 {
            return Err(RenderError::InvalidBudget);
        }

        let aspect = f64::from(source_width) / f64::from(source_height);
        let adjusted = aspect / glyph_aspect;
        let max = f64::from(max_size);

        let (columns, rows) = if adjusted > 1.0 {
            (max, (max / adjusted).round())
        } else {
            ((max * adjusted).round(), max)
        };

        Ok(Self { columns: clamp_cells(columns, max_size), rows: clamp_cells(rows, max_size) })
    }
}

fn clamp_cells(value: f64, max_size: u16) -> u16 {
    value.clamp(1.0, f64::from(max_size)) as u16
}

/// Named size budgets: the larger grid side in cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SizePreset {
    Small,
    #[default]
    Medium,
    Large,
}

impl SizePreset {
    pub const ALL: [SizePreset; 3] = [SizePreset::Small, SizePreset::Medium, SizePreset::Large];

    /// `constrained` marks mobile-class targets, which get a smaller large preset.
    pub fn max_size(self, constrained: bool) -> u16 {
        match self {
            SizePreset::Small => 60,
            SizePreset::Medium => 150,
            SizePreset::Large if constrained => 225,
            SizePreset::Large => 300,
        }
    }

    pub fn next(self) -> Self {
        match self {
            SizePreset::Small => SizePreset::Medium,
            SizePreset::Medium => SizePreset::Large,
            SizePreset::Large => SizePreset::Small,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SizePreset::Small => "small",
            SizePreset::Medium => "medium",
            SizePreset::Large => "large",
        }
    }
}

impl std::str::FromStr for SizePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SizePreset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown size preset {s:?} (expected small, medium or large)"))
    }
}

/// Font size and margins that fit a grid inside a viewport without cropping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportLayout {
    pub font_size: f64,
    pub line_height: f64,
    pub margin_x: f64,
    pub margin_y: f64,
}

impl ViewportLayout {
    pub fn fit(
        grid: GridDimensions,
        viewport_width: f64,
        viewport_height: f64,
        glyph_aspect: f64,
    ) -> Self {
        let columns = f64::from(grid.columns.max(1));
        let rows = f64::from(grid.rows.max(1));

        let horizontal = viewport_width / (columns * glyph_aspect);
        let vertical = viewport_height / rows;
        let font_size = horizontal.min(vertical);

        let actual_width = columns * font_size * glyph_aspect;
        let actual_height = rows * font_size;

        Self {
            font_size,
            line_height: font_size,
            margin_x: (viewport_width - actual_width) / 2.0,
            margin_y: (viewport_height - actual_height) / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(width: u32, height: u32, max: u16) -> GridDimensions {
        GridDimensions::fit(width, height, max, GLYPH_ASPECT).unwrap()
    }

    #[test]
    fn wide_image_uses_full_width() {
        // 2:1 / 0.6 = 3.33 -> 60 columns, 60 / 3.33 = 18 rows.
        assert_eq!(fit(2, 1, 60), GridDimensions { columns: 60, rows: 18 });
    }

    #[test]
    fn tall_image_uses_full_height() {
        // 1:2 / 0.6 = 0.833 -> 150 rows, 125 columns.
        assert_eq!(fit(100, 200, 150), GridDimensions { columns: 125, rows: 150 });
    }

    #[test]
    fn square_image_is_landscape_in_cells() {
        // 1 / 0.6 = 1.67 > 1, so a square image is still landscape in cells.
        assert_eq!(fit(64, 64, 60), GridDimensions { columns: 60, rows: 36 });
    }

    #[test]
    fn extreme_aspect_clamps_to_one_cell() {
        assert_eq!(fit(10_000, 1, 60), GridDimensions { columns: 60, rows: 1 });
        assert_eq!(fit(1, 10_000, 60), GridDimensions { columns: 1, rows: 60 });
    }

    #[test]
    fn zero_sized_source_is_invalid() {
        let err = GridDimensions::fit(0, 10, 60, GLYPH_ASPECT).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidImage);
        assert!(GridDimensions::fit(10, 0, 60, GLYPH_ASPECT).is_err());
    }

    #[test]
    fn zero_budget_is_invalid() {
        let err = GridDimensions::fit(10, 10, 0, GLYPH_ASPECT).unwrap_err();
        assert!(matches!(err, RenderError::InvalidBudget));
    }

    #[test]
    fn dimensions_respect_budget_and_aspect() {
        let sizes = [1u32, 2, 3, 7, 16, 33, 100, 480, 640, 1023, 1920, 4000];
        for &max in &[1u16, 2, 60, 150, 225, 300] {
            for &width in &sizes {
                for &height in &sizes {
                    let dims = fit(width, height, max);
                    assert!(dims.columns.max(dims.rows) <= max);
                    assert!(dims.columns >= 1 && dims.rows >= 1);

                    let adjusted = f64::from(width) / f64::from(height) / GLYPH_ASPECT;
                    if adjusted > 1.0 {
                        assert_eq!(dims.columns, max);
                        let exact = f64::from(max) / adjusted;
                        assert!((f64::from(dims.rows) - exact.max(1.0)).abs() <= 1.0);
                    } else {
                        assert_eq!(dims.rows, max);
                        let exact = f64::from(max) * adjusted;
                        assert!((f64::from(dims.columns) - exact.max(1.0)).abs() <= 1.0);
                    }
                }
            }
        }
    }

    #[test]
    fn presets_and_cycle() {
        assert_eq!(SizePreset::Small.max_size(false), 60);
        assert_eq!(SizePreset::Medium.max_size(true), 150);
        assert_eq!(SizePreset::Large.max_size(false), 300);
        assert_eq!(SizePreset::Large.max_size(true), 225);
        assert_eq!(SizePreset::Large.next(), SizePreset::Small);
        assert_eq!("LARGE".parse::<SizePreset>(), Ok(SizePreset::Large));
        assert!("huge".parse::<SizePreset>().is_err());
    }

    #[test]
    fn layout_fills_the_limiting_axis_and_centers() {
        let grid = GridDimensions { columns: 100, rows: 50 };
        let layout = ViewportLayout::fit(grid, 1200.0, 800.0, GLYPH_ASPECT);

        // horizontal: 1200 / 60 = 20, vertical: 800 / 50 = 16
        assert!((layout.font_size - 16.0).abs() < 1e-9);
        assert_eq!(layout.line_height, layout.font_size);
        assert!((layout.margin_x - (1200.0 - 960.0) / 2.0).abs() < 1e-9);
        assert!(layout.margin_y.abs() < 1e-9);
    }
}
