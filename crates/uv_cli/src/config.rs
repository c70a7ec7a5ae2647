//! Optional TOML configuration.
//!
//! Looked up at `<config dir>/ultraviolet/config.toml` unless `--config` is
//! given. Command-line flags win over anything set here.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer};
use uv_render::SizePreset;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub render: RenderConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    #[serde(deserialize_with = "size_preset")]
    pub size: SizePreset,
    /// Use the reduced large preset meant for small screens.
    pub constrained: bool,
    pub ramp: Option<String>,
    pub chars: Option<String>,
    pub color: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { size: SizePreset::Medium, constrained: false, ramp: None, chars: None, color: true }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub scale: Option<u32>,
    pub font: Option<PathBuf>,
    pub brighten: Option<f32>,
    /// `#rrggbb`
    pub accent: Option<String>,
    /// `#rrggbb`
    pub background: Option<String>,
}

fn size_preset<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SizePreset, D::Error> {
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}

impl Config {
    /// Loads `path`, or the default location when `path` is `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            if explicit {
                bail!("config file {:?} does not exist", path);
            }
            log::debug!("no config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {:?}", path))?;
        let config = Self::parse(&content)
            .with_context(|| format!("failed to parse config {:?}", path))?;
        log::info!("loaded config from {:?}", path);
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ultraviolet").join("config.toml"))
}

/// Parses `#rrggbb` (the `#` is optional).
pub fn parse_hex_color(hex: &str) -> Result<[u8; 3]> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        bail!("invalid color {:?}, expected #rrggbb", hex);
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16);
    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.render.size, SizePreset::Medium);
        assert!(config.render.color);
        assert!(config.export.font.is_none());
    }

    #[test]
    fn parses_all_sections() {
        let config = Config::parse(
            r##"
            [render]
            size = "large"
            constrained = true
            ramp = "Blocks"
            color = false

            [export]
            scale = 16
            brighten = 1.0
            accent = "#9d4edd"
            "##,
        )
        .unwrap();

        assert_eq!(config.render.size, SizePreset::Large);
        assert!(config.render.constrained);
        assert_eq!(config.render.ramp.as_deref(), Some("Blocks"));
        assert!(!config.render.color);
        assert_eq!(config.export.scale, Some(16));
        assert_eq!(config.export.brighten, Some(1.0));
        assert_eq!(config.export.accent.as_deref(), Some("#9d4edd"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("[render]\nsparkle = true\n").is_err());
        assert!(Config::parse("[render]\nsize = \"huge\"\n").is_err());
    }

    #[test]
    fn loads_from_file_and_rejects_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[render]\nsize = \"small\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.render.size, SizePreset::Small);

        assert!(Config::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#c77dff").unwrap(), [0xc7, 0x7d, 0xff]);
        assert_eq!(parse_hex_color("0A0A0F").unwrap(), [0x0a, 0x0a, 0x0f]);
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("#gggggg").is_err());
    }
}
