use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{error, info, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vizpart::fetchers::{AssetDirFetcher, PreloadedFetcher};
use vizpart::renderers::{HtmlRenderer, JsonRenderer, PageBuffer};
use vizpart::sources::{InlineRecordSource, JsonFileRecordSource};
use vizpart::{webparts, AppSettings, HostContext, PropertyStore, RenderOutcome, WebPartHost};
use vizpart_core::{
    global_resource_manager, list_visualizations, SharedRecordSource, SharedRenderer,
    SharedResourceFetcher,
};

/// vizpart - render chart and carousel web parts from their properties
#[derive(Parser, Debug)]
#[command(name = "vizpart")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0", global = true)]
    debug: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered web part kinds
    Kinds,
    /// Render one web part
    Render(RenderArgs),
    /// Change one property through the editor path, save it and re-render
    Set {
        #[command(flatten)]
        render: RenderArgs,
        /// Property to change
        #[arg(long)]
        field: String,
        /// New value as JSON; anything that is not valid JSON is taken as a string
        #[arg(long)]
        value: String,
    },
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Web part kind (see `vizpart kinds`)
    kind: String,

    /// Properties document (JSON object)
    #[arg(long, value_name = "FILE")]
    properties: PathBuf,

    /// List response document, or a directory of `<collection>.json` files
    #[arg(long, value_name = "PATH")]
    records: Option<PathBuf>,

    /// Local mirror of the CDN; without it every resource counts as preloaded
    #[arg(long, value_name = "DIR")]
    assets: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    format: OutputFormat,

    /// Write output here instead of stdout
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Application settings file
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Html,
    Json,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Level 0 (default): warn only
    // Level 1: info
    // Level 2: debug
    // Level 3+: trace
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    info!("Starting vizpart v{}", env!("CARGO_PKG_VERSION"));

    webparts::register_all();

    let trace_resources = cli.debug >= 3;
    let result = match cli.command {
        Command::Kinds => {
            for info in list_visualizations() {
                println!("{:<20} {}", info.id, info.name);
            }
            Ok(())
        }
        Command::Render(args) => render(&args, None).await,
        Command::Set {
            render: args,
            field,
            value,
        } => render(&args, Some((field, parse_value(&value)))).await,
    };

    // Load state of every shared resource
    if trace_resources {
        global_resource_manager().debug_print_resources();
    }

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("vizpart: {:#}", e);
        std::process::exit(1);
    }
}

fn parse_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn load_settings(path: Option<&Path>) -> AppSettings {
    match path {
        Some(path) => AppSettings::load_from_path(path).unwrap_or_else(|e| {
            warn!("Failed to load settings from {:?}: {}; using defaults", path, e);
            AppSettings::default()
        }),
        None => AppSettings::load(),
    }
}

async fn render(args: &RenderArgs, change: Option<(String, Value)>) -> Result<()> {
    let settings = load_settings(args.settings.as_deref());
    let store = Arc::new(PropertyStore::load_from_path(&args.properties)?);

    let source: SharedRecordSource = match &args.records {
        Some(path) => Arc::new(JsonFileRecordSource::new(path)),
        None => Arc::new(InlineRecordSource::empty()),
    };
    let fetcher: SharedResourceFetcher = match &args.assets {
        Some(dir) => Arc::new(AssetDirFetcher::new(dir)),
        None => Arc::new(PreloadedFetcher),
    };
    let page = PageBuffer::new();
    let renderer: SharedRenderer = match args.format {
        OutputFormat::Html => Arc::new(HtmlRenderer::new(page.clone())),
        OutputFormat::Json => Arc::new(JsonRenderer::new(page.clone())),
    };

    let ctx = HostContext::new(store.clone(), source, fetcher, renderer).with_settings(settings);
    let host = WebPartHost::new(&args.kind, ctx)?;

    let outcome = match change {
        Some((field, value)) => {
            let callback = host.change_callback();
            callback(&field, value);
            store.save()?;
            info!("Saved {:?}", args.properties);
            host.drain().await
        }
        None => Some(host.render().await),
    };

    if let Some(RenderOutcome::NotReady { error }) = &outcome {
        warn!("{} is not ready: {}", args.kind, error);
    }

    let content = page.get(host.mount()).unwrap_or_default();
    let mut output = content.body;
    if let Some(message) = content.message {
        output.push_str(&message);
        output.push('\n');
    }

    match &args.out {
        Some(path) => std::fs::write(path, output)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", output),
    }
    Ok(())
}
