//! smartex CLI
//!
//! Command-line interface for inspecting compressed texture containers and
//! running the capability-negotiating loader against a directory or server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use smartex_core::{EncodingId, TextureRecord};
use smartex_loader::{CapabilitySet, Fetcher, FilesystemFetcher, LoadedTexture, LoaderConfig, TextureLoader};
use smartex_parsers::logging::{init_with_config, TracingConfig};
use smartex_parsers::{detect_container, read_container, ContainerParser, ParseOptions, GLOBAL_REGISTRY};

/// smartex - compressed texture container inspector and loader
#[derive(Parser)]
#[command(name = "smartex")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for structured data
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a local container file and describe it
    Inspect(InspectArgs),

    /// Load a texture through the encoding fallback chain
    Load(LoadArgs),

    /// List registered encodings in priority order
    Encodings,
}

#[derive(Args)]
struct InspectArgs {
    /// Path to a .dds, .atc, .etc or .pvr file
    path: PathBuf,

    /// Only read the top mip level
    #[arg(long)]
    no_mipmaps: bool,
}

#[derive(Args)]
struct LoadArgs {
    /// Texture URL or path, e.g. textures/grass.png
    url: String,

    /// Root directory for local loads
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Loader configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Platform capability token (can be repeated)
    #[arg(long = "capability")]
    capabilities: Vec<String>,

    /// Explicit encoding order, overriding capabilities (can be repeated)
    #[arg(short, long = "encoding")]
    encodings: Vec<EncodingId>,

    /// Prefix prepended to every fetched URL
    #[arg(long)]
    path: Option<String>,

    /// Fetch over HTTP instead of the local filesystem
    #[cfg(feature = "http")]
    #[arg(long)]
    http: bool,
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn,smartex=info",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    init_with_config(TracingConfig {
        default_level: level.to_string(),
        show_target: verbosity >= 2,
        show_thread_ids: verbosity >= 3,
        show_file: verbosity >= 3,
        show_line_number: verbosity >= 3,
    });
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Inspect(args) => cmd_inspect(args, cli.format),
        Commands::Load(args) => cmd_load(args, cli.format),
        Commands::Encodings => cmd_encodings(cli.format),
    }
}

fn cmd_inspect(args: InspectArgs, format: OutputFormat) -> Result<()> {
    let path = &args.path;

    if !path.exists() {
        bail!("File not found: {:?}", path);
    }

    let options = ParseOptions {
        load_mipmaps: !args.no_mipmaps,
        ..ParseOptions::default()
    };

    let raw = read_container(path, &options).with_context(|| format!("Failed to read {:?}", path))?;
    let parser = pick_parser(path, &raw)?;
    debug!(parser = parser.name(), "Selected parser");

    let texture = parser
        .parse_with_options(raw, &options)
        .with_context(|| format!("Failed to parse {:?}", path))?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "path": path,
                "container": parser.name(),
                "texture": texture.summary(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("File:      {}", path.display());
            println!("Container: {}", parser.name());
            print_texture(&texture);
        }
    }

    Ok(())
}

/// Magic bytes first, extension second
fn pick_parser(path: &Path, raw: &[u8]) -> Result<&'static dyn ContainerParser> {
    if let Some(parser) = detect_container(raw) {
        return Ok(parser);
    }

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    GLOBAL_REGISTRY
        .parser_for_extension(ext)
        .with_context(|| format!("Unrecognized container: {:?}", path))
}

fn cmd_load(args: LoadArgs, format: OutputFormat) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read config {:?}", path))?;
            serde_json::from_str::<LoaderConfig>(&text).with_context(|| format!("Invalid config {:?}", path))?
        }
        None => LoaderConfig::default(),
    };

    if !args.capabilities.is_empty() {
        config = config.set_capabilities(args.capabilities.iter().cloned());
    }
    if let Some(prefix) = &args.path {
        config = config.set_path(prefix.clone());
    }
    config.validate()?;

    let mut loader = TextureLoader::with_config(build_fetcher(&args)?, config);
    if !args.encodings.is_empty() {
        loader = loader.with_capabilities(CapabilitySet::from_encodings(args.encodings.iter().copied()));
    }

    let encodings = loader.capabilities().ordered().to_vec();
    info!(url = %args.url, encodings = ?encodings, "Loading");

    let mut success: Option<LoadedTexture> = None;
    let mut failure = None;
    loader.load(
        &args.url,
        &encodings,
        |loaded| success = Some(loaded.clone()),
        |progress| debug!(loaded = progress.loaded, total = ?progress.total, "Progress"),
        |error| failure = Some(error),
    );

    if let Some(error) = failure {
        if let smartex_core::Error::NoSupportedEncoding { attempts, .. } = &error {
            for attempt in attempts {
                eprintln!("  {}", attempt);
            }
        }
        return Err(error.into());
    }
    let Some(loaded) = success else {
        bail!("Load finished without a result");
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "url": loaded.url,
                "encoding": loaded.encoding,
                "texture": loaded.texture.summary(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Loaded:    {}", loaded.url);
            println!("Encoding:  {}", loaded.encoding);
            print_texture(&loaded.texture);
        }
    }

    Ok(())
}

#[cfg(feature = "http")]
fn build_fetcher(args: &LoadArgs) -> Result<Arc<dyn Fetcher>> {
    if args.http {
        let fetcher = smartex_loader::HttpFetcher::new().context("Failed to create HTTP client")?;
        return Ok(Arc::new(fetcher));
    }
    Ok(Arc::new(FilesystemFetcher::new(&args.root)))
}

#[cfg(not(feature = "http"))]
fn build_fetcher(args: &LoadArgs) -> Result<Arc<dyn Fetcher>> {
    Ok(Arc::new(FilesystemFetcher::new(&args.root)))
}

fn cmd_encodings(format: OutputFormat) -> Result<()> {
    let encodings = GLOBAL_REGISTRY.list();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&encodings)?);
        }
        OutputFormat::Text => {
            println!(
                "{:<4} {:<8} {:<8} {:<20} {:<10} {}",
                "#", "ENCODING", "SUFFIX", "PARSER", "VERSIONS", "CAPABILITY"
            );
            for info in &encodings {
                println!(
                    "{:<4} {:<8} {:<8} {:<20} {:<10} {}",
                    info.priority,
                    info.id,
                    info.suffix,
                    info.parser,
                    format_versions(&info.versions),
                    info.capability
                );
            }
        }
    }

    Ok(())
}

fn format_versions(versions: &[u32]) -> String {
    if versions.is_empty() {
        return "-".to_string();
    }
    versions.iter().map(|v| format!("v{v}")).collect::<Vec<_>>().join(",")
}

fn print_texture(texture: &TextureRecord) {
    let kind = if texture.format.is_compressed() { "compressed" } else { "uncompressed" };
    println!("Format:    {} ({})", texture.format, kind);
    println!("Size:      {}x{}", texture.width, texture.height);
    println!("Cubemap:   {}", if texture.is_cubemap { "yes" } else { "no" });
    println!("Faces:     {}", texture.faces.len());
    println!("Mipmaps:   {}", texture.mip_count());
    println!("Data:      {}", format_size(texture.total_bytes() as u64));

    for (level, mip) in texture.mipmaps().iter().enumerate() {
        println!("  [{:>2}] {:>5}x{:<5} {}", level, mip.width, mip.height, format_size(mip.len() as u64));
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
