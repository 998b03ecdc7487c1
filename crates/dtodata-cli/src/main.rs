//! dtodata CLI: preview OData queries for recorded table requests and
//! normalize saved service responses.

use clap::{Parser, Subcommand};
use dtodata_core::column::ColumnConfig;
use dtodata_core::config::{SettingsPatch, SettingsSource};
use dtodata_core::id::TableId;
use dtodata_core::request::TableRequest;
use dtodata_exec::{normalize, Envelope, Instance, RowMode, TableResult, NO_DATA_MESSAGE};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dtodata")]
#[command(about = "Table state → OData query adapter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Default)]
struct SettingsArgs {
    /// Settings file (YAML or JSON): null, a bare URL string, or a mapping
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Base service URL (overrides config)
    #[arg(long)]
    url: Option<String>,

    /// Pages fetched per request (overrides config)
    #[arg(long)]
    paging_cache: Option<u32>,

    /// Deliver rows as positional arrays
    #[arg(long)]
    arrays: bool,

    /// Omit $select
    #[arg(long)]
    no_select: bool,

    /// Omit $orderby
    #[arg(long)]
    no_order: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the query URL for a recorded table request
    Query {
        #[command(flatten)]
        settings: SettingsArgs,

        /// Table request JSON (server-side processing parameters)
        #[arg(short, long)]
        request: PathBuf,

        /// Column definitions JSON (declared types, search methods)
        #[arg(short, long)]
        columns: Option<PathBuf>,

        /// The table pages client-side; no $top/$skip
        #[arg(long)]
        client_side: bool,

        /// Print the percent-encoded URL
        #[arg(long)]
        encoded: bool,
    },

    /// Convert a saved service response into the table result shape
    Normalize {
        /// Response body JSON
        #[arg(short, long)]
        envelope: PathBuf,

        /// Draw number to echo
        #[arg(short, long, default_value_t = 1)]
        draw: u64,

        /// Deliver rows as positional arrays
        #[arg(long)]
        arrays: bool,
    },

    /// Validate a settings file
    Validate {
        #[arg(short, long)]
        settings: PathBuf,
    },

    /// Run one request against the live service
    #[cfg(feature = "http")]
    Fetch {
        #[command(flatten)]
        settings: SettingsArgs,

        #[arg(short, long)]
        request: PathBuf,

        #[arg(short, long)]
        columns: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Query {
            settings,
            request,
            columns,
            client_side,
            encoded,
        } => preview_query(&settings, &request, columns.as_ref(), client_side, encoded),
        Commands::Normalize {
            envelope,
            draw,
            arrays,
        } => normalize_envelope(&envelope, draw, arrays),
        Commands::Validate { settings } => validate_settings(&settings),
        #[cfg(feature = "http")]
        Commands::Fetch {
            settings,
            request,
            columns,
        } => fetch(&settings, &request, columns.as_ref()),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn preview_query(
    args: &SettingsArgs,
    request_path: &PathBuf,
    columns_path: Option<&PathBuf>,
    client_side: bool,
    encoded: bool,
) -> CliResult {
    let mut instance = load_instance(args, columns_path)?;
    instance.set_server_side(!client_side);
    let request = read_request(request_path)?;

    if encoded {
        println!("{}", instance.request_url(&request)?);
    } else {
        println!("{}", instance.query(true, Some(&request)));
    }
    Ok(())
}

fn normalize_envelope(path: &PathBuf, draw: u64, arrays: bool) -> CliResult {
    let body = fs::read_to_string(path)?;
    let mode = if arrays { RowMode::Arrays } else { RowMode::Objects };
    let result = match Envelope::from_body(&body) {
        Some(envelope) => normalize(envelope, draw, mode),
        None => TableResult::error(NO_DATA_MESSAGE),
    };
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn validate_settings(path: &PathBuf) -> CliResult {
    let source = SettingsSource::from_yaml_str(&fs::read_to_string(path)?)?;
    match source.resolve()? {
        Some(settings) => println!("✓ Settings are valid (url: {})", settings.url),
        None => println!("✓ Settings are empty; the table would not be bound"),
    }
    Ok(())
}

#[cfg(feature = "http")]
fn fetch(args: &SettingsArgs, request_path: &PathBuf, columns_path: Option<&PathBuf>) -> CliResult {
    let mut instance = load_instance(args, columns_path)?;
    let request = read_request(request_path)?;
    let result = instance.fetch(&request, &dtodata_exec::HttpTransport::new());
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn load_instance(args: &SettingsArgs, columns_path: Option<&PathBuf>) -> Result<Instance, Box<dyn std::error::Error>> {
    let file = match &args.settings {
        Some(path) => file_patch(SettingsSource::from_yaml_str(&fs::read_to_string(path)?)?),
        None => SettingsPatch::default(),
    };
    let patch = layered_patch(file, SettingsPatch::from_env(), args);

    let settings = SettingsSource::Full(patch)
        .resolve()?
        .ok_or("settings resolved to nothing")?;
    if settings.url.is_empty() {
        return Err("no service url; pass --url, DTODATA_URL, or a settings file".into());
    }
    tracing::debug!(url = %settings.url, paging_cache = settings.paging_cache, "resolved settings");

    let mut instance = Instance::new(TableId::from("cli"), settings)?;
    if let Some(path) = columns_path {
        let columns: Vec<ColumnConfig> = serde_json::from_str(&fs::read_to_string(path)?)?;
        instance.set_column_configs(columns);
    }
    Ok(instance)
}

fn read_request(path: &PathBuf) -> Result<TableRequest, Box<dyn std::error::Error>> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

fn file_patch(source: SettingsSource) -> SettingsPatch {
    match source {
        SettingsSource::None => SettingsPatch::default(),
        SettingsSource::UrlOnly(url) => SettingsPatch {
            url: Some(url),
            ..Default::default()
        },
        SettingsSource::Full(patch) => patch,
    }
}

/// Defaults < settings file < environment < command-line flags.
fn layered_patch(file: SettingsPatch, env: SettingsPatch, args: &SettingsArgs) -> SettingsPatch {
    let flags = SettingsPatch {
        url: args.url.clone(),
        paging_cache: args.paging_cache,
        use_objects: args.arrays.then_some(false),
        query_select: args.no_select.then_some(false),
        query_order: args.no_order.then_some(false),
        ..Default::default()
    };
    file.merge(env).merge(flags)
}
