mod config;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use flexi_logger::{Logger, LoggerHandle};
use log::info;
use uv_render::{
    ansi_truecolor, presets, save_png, BitmapFace, ColorMode, Conversion, ExportOptions,
    GlyphFace, GlyphRamp, OutlineFace, Session, SizePreset,
};

use config::{parse_hex_color, Config};

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert images to ASCII/Unicode glyph art")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Configuration file (defaults to <config dir>/ultraviolet/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render glyph art to stdout for a quick preview
    Preview(PreviewArgs),
    /// Convert an image and write plain text or HTML to disk
    Convert(ConvertArgs),
    /// Rasterize the glyph art into a PNG
    Export(ExportArgs),
    /// List the built-in glyph ramps
    Presets,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Input image path
    input: PathBuf,
    #[command(flatten)]
    colors: ColorSettings,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input image path
    input: PathBuf,
    /// Output file path
    #[arg(short, long)]
    output: PathBuf,
    /// Output format; guessed from the output extension when omitted
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input image path
    input: PathBuf,
    /// Output PNG path
    #[arg(short, long, default_value = "ultraviolet-ascii.png")]
    output: PathBuf,
    #[command(flatten)]
    colors: ColorSettings,
    /// TrueType/OpenType font; the built-in bitmap font is used otherwise
    #[arg(long)]
    font: Option<PathBuf>,
    /// Pixels per glyph height
    #[arg(long)]
    scale: Option<u32>,
    /// Color multiplier applied in color mode
    #[arg(long)]
    brighten: Option<f32>,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug, Clone, Copy)]
struct ColorSettings {
    /// Drop per-cell color (exports draw every glyph in the accent color)
    #[arg(long, default_value_t = false, conflicts_with = "color")]
    mono: bool,
    /// Keep per-cell color even when the config turns it off
    #[arg(long, default_value_t = false)]
    color: bool,
}

#[derive(Parser, Debug, Clone)]
struct RenderSettings {
    /// Size preset: small (60), medium (150) or large (300 cells)
    #[arg(long)]
    size: Option<SizePreset>,
    /// Use the reduced large preset (225) meant for small screens
    #[arg(long, default_value_t = false)]
    constrained: bool,
    /// Glyph ramp preset name, see `presets`
    #[arg(long)]
    ramp: Option<String>,
    /// Custom glyph ramp, emptiest glyph first; wins over --ramp
    #[arg(long)]
    chars: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Monochrome text
    Text,
    /// Standalone HTML page with the colorized markup
    Html,
    /// Colorized `<pre>` fragment only
    Markup,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _logger = init_logging(cli.verbose)?;
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Preview(args) => preview(args, &config),
        Commands::Convert(args) => convert(args, &config),
        Commands::Export(args) => export(args, &config),
        Commands::Presets => {
            list_presets();
            Ok(())
        },
    }
}

fn init_logging(verbose: u8) -> Result<LoggerHandle> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    Logger::try_with_env_or_str(level)
        .and_then(|logger| logger.log_to_stderr().start())
        .context("failed to start logger")
}

fn preview(args: PreviewArgs, config: &Config) -> Result<()> {
    let mut session = Session::default();
    let conversion = render(&mut session, &args.input, &args.settings, config)?;

    if args.colors.enabled(config) {
        println!("{}", ansi_truecolor(&conversion.grid));
    } else {
        println!("{}", conversion.plain_text);
    }
    Ok(())
}

fn convert(args: ConvertArgs, config: &Config) -> Result<()> {
    let mut session = Session::default();
    let conversion = render(&mut session, &args.input, &args.settings, config)?;
    let format = args.format.unwrap_or_else(|| guess_format(&args.output));

    let contents = match format {
        OutputFormat::Text => format!("{}\n", conversion.plain_text),
        OutputFormat::Markup => format!("{}\n", conversion.color_markup),
        OutputFormat::Html => html_page(conversion),
    };
    write_output(&args.output, contents.as_bytes())?;

    info!("wrote {:?} as {:?}", args.output, format);
    Ok(())
}

fn export(args: ExportArgs, config: &Config) -> Result<()> {
    let mut session = Session::default();
    render(&mut session, &args.input, &args.settings, config)?;

    let options = export_options(&args, config)?;
    let face = load_face(args.font.as_deref().or(config.export.font.as_deref()))?;
    let bitmap = session
        .export(&options, face.as_ref())
        .with_context(|| format!("failed to export {:?}", args.input))?;
    save_png(&bitmap, &args.output).with_context(|| format!("failed to save {:?}", args.output))?;

    info!("saved {}x{} bitmap to {:?}", bitmap.width(), bitmap.height(), args.output);
    Ok(())
}

fn list_presets() {
    let width = presets::CATALOG.iter().map(|preset| preset.name.len()).max().unwrap_or(0);
    for preset in presets::CATALOG {
        println!("{:<width$}  {}", preset.name, preset.glyphs);
    }
}

fn render<'a>(
    session: &'a mut Session,
    input: &Path,
    settings: &RenderSettings,
    config: &Config,
) -> Result<&'a Conversion> {
    let ramp = settings.ramp(config)?;
    let max_size = settings.max_size(config);
    let bytes = std::fs::read(input).with_context(|| format!("failed to read {:?}", input))?;

    let conversion = session
        .convert(bytes, &ramp, max_size)
        .with_context(|| format!("failed to render {:?}", input))?;
    info!(
        "rendered {:?} into {}x{} cells with a {}-glyph ramp",
        input,
        conversion.grid.width,
        conversion.grid.height,
        ramp.len()
    );
    Ok(conversion)
}

fn html_page(conversion: &Conversion) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html><head><meta charset=\"utf-8\"><title>ultraviolet</title></head>\n\
         <body style=\"background:#0a0a0f; font-family:'Courier New',monospace; \
         line-height:1;\">\n{}\n</body></html>\n",
        conversion.color_markup
    )
}

/// Writes `contents` to `path`, removing whatever was created if the write fails.
fn write_output(path: &Path, contents: &[u8]) -> Result<()> {
    if let Err(err) = std::fs::write(path, contents) {
        let _ = std::fs::remove_file(path);
        return Err(err).with_context(|| format!("failed to write {:?}", path));
    }
    Ok(())
}

fn guess_format(path: &Path) -> OutputFormat {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "html" | "htm" => OutputFormat::Html,
        _ => OutputFormat::Text,
    }
}

fn export_options(args: &ExportArgs, config: &Config) -> Result<ExportOptions> {
    let mut options = ExportOptions::default();
    options.color_mode =
        if args.colors.enabled(config) { ColorMode::Color } else { ColorMode::Monochrome };
    if let Some(scale) = args.scale.or(config.export.scale) {
        if scale == 0 {
            bail!("export scale must be at least 1");
        }
        options.scale = scale;
    }
    if let Some(brighten) = args.brighten.or(config.export.brighten) {
        options.brighten = brighten.max(0.0);
    }
    if let Some(accent) = &config.export.accent {
        options.accent = parse_hex_color(accent).context("invalid export.accent")?;
    }
    if let Some(background) = &config.export.background {
        options.background = parse_hex_color(background).context("invalid export.background")?;
    }
    Ok(options)
}

fn load_face(font: Option<&Path>) -> Result<Box<dyn GlyphFace>> {
    match font {
        Some(path) => {
            let face = OutlineFace::open(path)?;
            info!("using font {:?}", path);
            Ok(Box::new(face))
        },
        None => Ok(Box::new(BitmapFace)),
    }
}

impl ColorSettings {
    fn enabled(&self, config: &Config) -> bool {
        if self.mono {
            false
        } else {
            self.color || config.render.color
        }
    }
}

impl RenderSettings {
    /// Flags beat the config file; within each source custom chars beat a preset name.
    fn ramp(&self, config: &Config) -> Result<GlyphRamp> {
        if let Some(chars) = &self.chars {
            return GlyphRamp::new(chars).context("invalid --chars");
        }
        if let Some(name) = &self.ramp {
            return preset_ramp(name);
        }
        if let Some(chars) = &config.render.chars {
            return GlyphRamp::new(chars).context("invalid render.chars");
        }
        match &config.render.ramp {
            Some(name) => preset_ramp(name),
            None => Ok(GlyphRamp::standard()),
        }
    }

    fn max_size(&self, config: &Config) -> u16 {
        let size = self.size.unwrap_or(config.render.size);
        size.max_size(self.constrained || config.render.constrained)
    }
}

fn preset_ramp(name: &str) -> Result<GlyphRamp> {
    GlyphRamp::preset(name)
        .with_context(|| format!("unknown ramp {:?}, run `presets` for the list", name))
}
