//! fontgrid CLI (made by FontLab https://www.fontlab.com/)

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use tracing_subscriber::EnvFilter;

use fontgrid_core::alias::{self, AliasFields, TemplateId};
use fontgrid_core::catalog::Catalog;
use fontgrid_core::config::BrowserConfig;
use fontgrid_core::detail::axis_tag_line;
use fontgrid_core::discovery::{FolderFontSource, FontSource};
use fontgrid_core::entry::FontEntry;
use fontgrid_core::filter::{self, FilterState, TypeFilter};
use fontgrid_core::output::{write_json_pretty, write_ndjson};
use fontgrid_core::render::raster::RasterBackend;
use fontgrid_core::render::{PreviewRenderer, PreviewTarget, RenderOutcome, Rgb, SurfaceSize};
use fontgrid_core::system::{FontDbStore, SystemFontSource};

/// CLI entrypoint for fontgrid.
#[derive(Debug, Parser)]
#[command(
    name = "fontgrid",
    about = "Browse, preview and hand off fonts (made by FontLab https://www.fontlab.com/)"
)]
pub struct Cli {
    /// JSON configuration file
    #[arg(long = "config", global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Discover fonts and print the filtered catalog
    List(ListArgs),
    /// Render one preview frame to a PNG file
    Preview(PreviewArgs),
    /// Print host alias text for a catalog entry
    Alias(AliasArgs),
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Folder of external fonts (defaults to the configured folder)
    #[arg(long = "folder", value_hint = ValueHint::DirPath)]
    folder: Option<PathBuf>,

    /// Skip the system font store
    #[arg(long = "no-system", action = ArgAction::SetTrue)]
    no_system: bool,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[command(flatten)]
    sources: SourceArgs,

    /// Restrict by font source
    #[arg(long = "type", default_value_t = TypeChoice::All, value_enum)]
    kind: TypeChoice,

    /// Case-insensitive substring of the display name
    #[arg(short = 's', long = "search", default_value = "")]
    search: String,

    /// Emit a single JSON array
    #[arg(long = "json", action = ArgAction::SetTrue, conflicts_with = "ndjson")]
    json: bool,

    /// Emit newline-delimited JSON
    #[arg(long = "ndjson", action = ArgAction::SetTrue)]
    ndjson: bool,

    /// Append variable axis tags to each line
    #[arg(long = "axes", action = ArgAction::SetTrue)]
    axes: bool,

    /// Control colorized output (auto|always|never)
    #[arg(long = "color", default_value_t = ColorChoice::Auto, value_enum)]
    color: ColorChoice,
}

#[derive(Debug, Args)]
struct PreviewArgs {
    #[command(flatten)]
    sources: SourceArgs,

    /// Display or family name of the font to preview
    #[arg(short = 'f', long = "font")]
    font: String,

    /// Sample text (defaults to the configured sample)
    #[arg(short = 't', long = "text")]
    text: Option<String>,

    #[arg(long = "width", default_value_t = 640)]
    width: u32,

    #[arg(long = "height", default_value_t = 240)]
    height: u32,

    /// Background colour as RRGGBB
    #[arg(long = "background")]
    background: Option<String>,

    /// Output PNG path
    #[arg(short = 'o', long = "output", value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

#[derive(Debug, Args)]
struct AliasArgs {
    #[command(flatten)]
    sources: SourceArgs,

    /// Display or family name of the font
    #[arg(short = 'f', long = "font")]
    font: String,

    #[arg(long = "template", default_value_t = TemplateChoice::Vf, value_enum)]
    template: TemplateChoice,

    /// Timeline frame rate numerator
    #[arg(long = "rate", default_value_t = 30, allow_negative_numbers = true)]
    rate: i32,

    /// Timeline frame rate denominator
    #[arg(long = "scale", default_value_t = 1, allow_negative_numbers = true)]
    scale: i32,

    /// Sample text (defaults to the configured sample)
    #[arg(short = 't', long = "text")]
    text: Option<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum TypeChoice {
    All,
    System,
    Folder,
}

impl From<TypeChoice> for TypeFilter {
    fn from(choice: TypeChoice) -> Self {
        match choice {
            TypeChoice::All => TypeFilter::All,
            TypeChoice::System => TypeFilter::SystemOnly,
            TypeChoice::Folder => TypeFilter::FolderOnly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum TemplateChoice {
    /// Variable Font Text effect
    Vf,
    /// Standard text effect
    Text,
}

impl From<TemplateChoice> for TemplateId {
    fn from(choice: TemplateChoice) -> Self {
        match choice {
            TemplateChoice::Vf => TemplateId::VariableFontText,
            TemplateChoice::Text => TemplateId::Text,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

/// Parse CLI args and execute the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = BrowserConfig::load_or_default(cli.config.as_deref())?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match cli.command {
        Command::List(args) => run_list(&config, args, &mut handle),
        Command::Preview(args) => run_preview(&config, args, &mut handle),
        Command::Alias(args) => run_alias(&config, args, &mut handle),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fontgrid_core={level},fontgrid_cli={level}")));
    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Catalog plus the font database the raster backend resolves system families with.
struct Loaded {
    catalog: Catalog,
    database: Arc<fontdb::Database>,
}

fn load_catalog(config: &BrowserConfig, sources: &SourceArgs) -> Loaded {
    let folder_path = sources
        .folder
        .clone()
        .unwrap_or_else(|| config.resolve_font_folder());
    let folder = FolderFontSource::new(folder_path).with_locales(config.locales());

    if sources.no_system {
        return Loaded {
            catalog: Catalog::from_sources(&[&folder]),
            database: Arc::new(fontdb::Database::new()),
        };
    }

    let store = FontDbStore::load_system();
    let database = Arc::clone(store.database());
    let system = SystemFontSource::new(store).with_locales(config.locales());
    let sources: [&dyn FontSource; 2] = [&system, &folder];
    Loaded {
        catalog: Catalog::from_sources(&sources),
        database,
    }
}

fn find_entry<'a>(catalog: &'a Catalog, name: &str) -> Result<&'a FontEntry> {
    catalog
        .find(name)
        .map(|index| &catalog[index])
        .ok_or_else(|| anyhow!("no font named {name:?} in the catalog"))
}

fn run_list(config: &BrowserConfig, args: ListArgs, mut w: impl Write) -> Result<()> {
    let loaded = load_catalog(config, &args.sources);
    let state = FilterState::new()
        .with_type(args.kind.into())
        .with_query(args.search.clone());
    let (view, _) = filter::apply(&loaded.catalog, &state, None);
    let entries = view.indices().iter().map(|&index| &loaded.catalog[index]);

    if args.ndjson {
        write_ndjson(entries, &mut w)?;
    } else if args.json {
        write_json_pretty(entries, &mut w)?;
    } else {
        let use_color = match args.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stdout().is_terminal(),
        };
        let entries: Vec<&FontEntry> = entries.collect();
        write_plain(&entries, &mut w, use_color, args.axes)?;
    }
    Ok(())
}

fn write_plain(entries: &[&FontEntry], mut w: impl Write, color: bool, axes: bool) -> Result<()> {
    for entry in entries {
        let (kind, code) = if entry.is_system_font() {
            ("system", AnsiColor::Green)
        } else {
            ("folder", AnsiColor::Cyan)
        };
        let kind = apply_color(&format!("{kind:<6}"), color, code);
        let tags = axis_tag_line(entry);
        if axes && !tags.is_empty() {
            let tags = apply_color(&tags, color, AnsiColor::Yellow);
            writeln!(w, "{kind}  {}  {tags}", entry.display_name())?;
        } else {
            writeln!(w, "{kind}  {}", entry.display_name())?;
        }
    }
    Ok(())
}

#[derive(Copy, Clone)]
enum AnsiColor {
    Cyan,
    Yellow,
    Green,
}

fn apply_color(text: &str, color: bool, code: AnsiColor) -> String {
    if !color {
        return text.to_string();
    }

    let code_str = match code {
        AnsiColor::Cyan => "36",
        AnsiColor::Yellow => "33",
        AnsiColor::Green => "32",
    };

    format!("\u{1b}[{}m{}\u{1b}[0m", code_str, text)
}

/// Fixed-size, fixed-text stand-in for the preview window.
struct StaticTarget {
    text: String,
    size: SurfaceSize,
}

impl PreviewTarget for StaticTarget {
    fn sample_text(&self) -> Option<String> {
        Some(self.text.clone())
    }

    fn client_size(&self) -> SurfaceSize {
        self.size
    }
}

fn run_preview(config: &BrowserConfig, args: PreviewArgs, mut w: impl Write) -> Result<()> {
    let background = match &args.background {
        Some(raw) => raw
            .parse::<Rgb>()
            .with_context(|| format!("invalid --background {raw}"))?,
        None => config.background,
    };
    let loaded = load_catalog(config, &args.sources);
    let entry = find_entry(&loaded.catalog, &args.font)?;

    let renderer = PreviewRenderer::new(
        RasterBackend::new(loaded.database),
        config.preview_settings(),
    );
    let target = StaticTarget {
        text: args.text.clone().unwrap_or_else(|| config.sample_text.clone()),
        size: SurfaceSize::new(args.width, args.height),
    };

    match renderer.render(&target, Some(entry), background, "cli") {
        RenderOutcome::Presented { text_drawn: true } => {}
        RenderOutcome::Presented { text_drawn: false } => {
            tracing::warn!(font = entry.display_name(), "no usable face; frame has background only");
        }
        other => bail!("preview of {} failed: {other:?}", entry.display_name()),
    }

    save_frame(&renderer, &args.output)?;
    writeln!(w, "{}", args.output.display())?;
    Ok(())
}

fn save_frame(renderer: &PreviewRenderer<RasterBackend>, output: &Path) -> Result<()> {
    renderer
        .with_backend(|backend| backend.save_png(output))
        .ok_or_else(|| anyhow!("renderer busy"))?
}

fn run_alias(config: &BrowserConfig, args: AliasArgs, mut w: impl Write) -> Result<()> {
    let loaded = load_catalog(config, &args.sources);
    let entry = find_entry(&loaded.catalog, &args.font)?;

    let frames = alias::frame_length_or_fallback(config.alias_seconds, args.rate, args.scale);
    let sample = args.text.clone().unwrap_or_else(|| config.sample_text.clone());
    let text = alias::render_alias(
        args.template.into(),
        &AliasFields {
            entry,
            sample_text: &sample,
            frame_length: i64::from(frames),
        },
    )?;
    w.write_all(text.as_bytes())?;
    Ok(())
}
