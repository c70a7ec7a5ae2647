//! Named glyph ramps. Every ramp starts with its emptiest glyph.

pub const STANDARD: &str = " .:-=+*#%@";
pub const DETAILED: &str =
    " .'\"`,^:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";
pub const BLOCKS: &str = " ░▒▓█";
pub const BINARY: &str = "01";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RampPreset {
    pub name: &'static str,
    pub glyphs: &'static str,
}

const fn preset(name: &'static str, glyphs: &'static str) -> RampPreset {
    RampPreset { name, glyphs }
}

pub const CATALOG: &[RampPreset] = &[
    preset("Standard", STANDARD),
    preset("Detailed", DETAILED),
    preset("Blocks", BLOCKS),
    preset("Triangles", " ◺◹◸◿▸▹►▻▷▶"),
    preset("Simple", " .-+*#@"),
    preset("Binary", BINARY),
    preset("Minimal", " .@"),
    preset("Dots", " .·•●"),
    preset("Circles", " ○◌◍◐◑●"),
    preset("Squares", " ▫▪◽◾◻◼"),
    preset("Shades", " ░▒▓█"),
    preset("Lines", " -=≡"),
    preset("Slashes", " /\\|"),
    preset("Arrows", " ←↑→↓"),
    preset("Box Drawing", " ─│┼╬█"),
    preset("Brackets", " ()[]{}"),
    preset("Waves", " ∼≈≋"),
    preset("Stars", " .·*✦✧★"),
    preset("Cards", " ♤♡♢♧"),
    preset("Music", " ♪♫♬"),
    preset("Currency", " ¢$€£¥"),
    preset("Math", " ∙·+×÷"),
    preset("Dingbats", " ○◇◊◆"),
    preset("Braille", " ⠁⠃⠇⠏⠟⠿⣿"),
    preset("Runes", " ᚁᚂᚃᚄᚅᚆᚇᚈ"),
    preset("Greek", " αβγδεζηθ"),
    preset("Japanese", " 。あいうえおかきくけこ"),
];

/// Case-insensitive lookup; `-` and `_` match a space so `box-drawing` works
/// on a command line.
pub fn find(name: &str) -> Option<&'static RampPreset> {
    let wanted = normalize(name);
    CATALOG.iter().find(|preset| normalize(preset.name) == wanted)
}

fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|ch| if ch == '-' || ch == '_' { ' ' } else { ch.to_ascii_lowercase() })
        .collect()
}
