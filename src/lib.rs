pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod ingest;
pub mod io_utils;
pub mod records;
pub mod render;
pub mod report;
pub mod response;
pub mod schema;
pub mod store;
pub mod validators;

use std::{env, path::Path, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, ReportKind, ReportOptions},
    config::StoreConfig,
    render::{ABOVE_AVERAGE_HEADERS, QUARTERLY_HEADERS},
    response::UploadAck,
    schema::EntityKind,
    store::Store,
};

pub use error::{CellFailure, Error, StoreError};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("hiring_ledger", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = StoreConfig::load(cli.config.as_deref())?;
    debug!("Store configuration: {config:?}");
    match cli.command {
        Commands::Init => handle_init(&config),
        Commands::Upload(args) => handle_upload(&config, &args),
        Commands::Schema(args) => handle_schema(&args),
        Commands::Report(args) => match args.report {
            ReportKind::Quarterly(options) => handle_quarterly(&config, &options),
            ReportKind::AboveAverage(options) => handle_above_average(&config, &options),
        },
    }
}

fn handle_init(config: &StoreConfig) -> Result<()> {
    let existed = store::database_exists(&config.database);
    Store::open(config)
        .map_err(Error::from)
        .with_context(|| format!("Initializing store at {:?}", config.database))?;
    info!(
        "Store tables ready at {:?}{}",
        config.database,
        if existed { "" } else { " (new database)" }
    );
    Ok(())
}

fn handle_upload(config: &StoreConfig, args: &cli::UploadArgs) -> Result<()> {
    let file_name = upload_file_name(&args.input, args.file_name.as_deref());
    info!("Uploading '{}' as {}", file_name, args.kind);
    // Format and kind are checked before the file is even read.
    ingest::ensure_csv_file_name(&file_name)?;
    let kind: EntityKind = args.kind.parse()?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let bytes = io_utils::read_input(&args.input)?;
    let batch = ingest::ingest_with_encoding(&file_name, &bytes, kind.as_str(), encoding)?;

    let mut store = Store::open(config).map_err(Error::from)?;
    store.upsert(&batch).map_err(Error::from)?;

    let ack = UploadAck::new(kind, batch.len());
    println!("{}", serde_json::to_string(&ack)?);
    Ok(())
}

fn upload_file_name(input: &Path, provided: Option<&str>) -> String {
    if let Some(name) = provided {
        return name.to_string();
    }
    if io_utils::is_dash(input) {
        return String::new();
    }
    input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn handle_schema(args: &cli::SchemaArgs) -> Result<()> {
    let schema = schema::get_schema(&args.kind)?;
    for (idx, column) in schema.columns.iter().enumerate() {
        println!("{idx}: {} ({})", column.name, column.validator);
    }
    Ok(())
}

fn handle_quarterly(config: &StoreConfig, options: &ReportOptions) -> Result<()> {
    let store = Store::open_read_only(config).map_err(Error::from)?;
    let rows = report::quarterly_hires(&store, options.year)?;
    let rendered = render::render(options.format, &QUARTERLY_HEADERS, &rows)?;
    io_utils::write_output(options.output.as_deref(), &rendered)
}

fn handle_above_average(config: &StoreConfig, options: &ReportOptions) -> Result<()> {
    let store = Store::open_read_only(config).map_err(Error::from)?;
    let rows = report::above_average_hiring(&store, options.year)?;
    let rendered = render::render(options.format, &ABOVE_AVERAGE_HEADERS, &rows)?;
    io_utils::write_output(options.output.as_deref(), &rendered)
}
