use super::presets;
use crate::RenderError;

/// Ordered glyph sequence, emptiest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphRamp {
    chars: Vec<char>,
}

impl GlyphRamp {
    pub fn new(chars: impl AsRef<str>) -> Result<Self, RenderError> {
        let chars: Vec<char> = chars.as_ref().chars().collect();
        if chars.is_empty() {
            return Err(RenderError::EmptyRamp);
        }
        Ok(Self { chars })
    }

    /// Looks up a ramp in the preset catalog by name, ignoring case.
    pub fn preset(name: &str) -> Option<Self> {
        presets::find(name).map(|preset| Self { chars: preset.glyphs.chars().collect() })
    }

    pub fn standard() -> Self {
        Self { chars: presets::STANDARD.chars().collect() }
    }

    pub fn detailed() -> Self {
        Self { chars: presets::DETAILED.chars().collect() }
    }

    pub fn blocks() -> Self {
        Self { chars: presets::BLOCKS.chars().collect() }
    }

    pub fn binary() -> Self {
        Self { chars: presets::BINARY.chars().collect() }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false; an empty ramp cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Quantizes a brightness in `[0, 255]` to a ramp index.
    ///
    /// The brightest value lands on the last glyph instead of one past it.
    pub fn index_for(&self, brightness: f64) -> usize {
        let levels = self.chars.len();
        let scaled = (brightness.clamp(0.0, 255.0) / 255.0) * levels as f64;
        (scaled.floor() as usize).min(levels - 1)
    }

    pub fn char_at(&self, index: usize) -> char {
        self.chars[index.min(self.chars.len() - 1)]
    }
}

impl Default for GlyphRamp {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::str::FromStr for GlyphRamp {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
