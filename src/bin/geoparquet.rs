//! Command-line tool to inspect GeoParquet files.
//!
//! - `inspect` prints the file metadata, the schema and the `geo` metadata document.
//! - `head` prints the first rows of a file.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tabled::builder::Builder;
use tabled::{Table, Tabled};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use geoparquet_table::io::parquet::{
    read_file_metadata, read_geo_metadata, read_geoparquet, GeoParquetReaderOptions,
    ParquetFileMetadata,
};
use geoparquet_table::{GeoParquetError, GeometryFormat};

#[derive(Parser)]
#[command(name = "geoparquet", version, about = "Inspect GeoParquet files")]
struct Cli {
    /// Enable verbose (INFO level) logging output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show row groups, schema and GeoParquet metadata of a file.
    Inspect {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print the first rows of a file.
    Head {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Number of rows to print.
        #[arg(short = 'n', long, default_value_t = 10)]
        rows: usize,

        /// Print geometries as WKT instead of hex-encoded WKB.
        #[arg(long)]
        wkt: bool,
    },
}

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "Row groups")]
    num_row_groups: usize,
    #[tabled(rename = "Rows")]
    num_rows: usize,
    #[tabled(rename = "Size (bytes)")]
    size: u64,
    #[tabled(rename = "Version")]
    version: i32,
    #[tabled(rename = "Created by")]
    created_by: String,
}

#[derive(Tabled)]
struct ColumnRow {
    #[tabled(rename = "Column")]
    name: String,
    #[tabled(rename = "Type")]
    data_type: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Inspect { input } => {
            info!("Inspecting {}", input.display());
            handle_inspect(&input)
        }
        Commands::Head { input, rows, wkt } => {
            info!("Reading {} rows of {}", rows, input.display());
            handle_head(&input, rows, wkt)
        }
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("cannot open {}", path.display()))
}

fn handle_inspect(path: &Path) -> Result<()> {
    let metadata = read_file_metadata(open(path)?)?;
    display_file_metadata(&metadata);

    match read_geo_metadata(open(path)?) {
        Ok(geo_meta) => {
            println!("\n=== GeoParquet metadata ===");
            println!("{}", serde_json::to_string_pretty(&geo_meta)?);
        }
        Err(GeoParquetError::GeoParquet(_)) => {
            println!("\nNo GeoParquet metadata; this is a plain Parquet file.");
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

fn display_file_metadata(metadata: &ParquetFileMetadata) {
    let file_row = FileRow {
        num_row_groups: metadata.num_row_groups,
        num_rows: metadata.num_rows,
        size: metadata.size,
        version: metadata.version,
        created_by: metadata
            .created_by
            .clone()
            .unwrap_or_else(|| "N/A".to_string()),
    };
    println!("\n=== File ===");
    println!("{}", Table::new([file_row]));

    let column_rows: Vec<ColumnRow> = metadata
        .columns
        .iter()
        .map(|(name, data_type)| ColumnRow {
            name: name.clone(),
            data_type: data_type.to_string(),
        })
        .collect();
    println!("\n=== Schema ===");
    println!("{}", Table::new(column_rows));
}

fn handle_head(path: &Path, rows: usize, wkt: bool) -> Result<()> {
    let format = if wkt {
        GeometryFormat::Wkt
    } else {
        GeometryFormat::Wkb
    };
    let options = GeoParquetReaderOptions::default().with_geometry_format(format);
    let table = read_geoparquet(open(path)?, &options)?;

    let mut builder = Builder::default();
    builder.push_record(table.column_names());
    for index in 0..rows.min(table.num_rows()) {
        if let Some(row) = table.row(index) {
            builder.push_record(row.iter().map(|value| value.to_string()));
        }
    }
    println!("{}", builder.build());
    println!("{} of {} rows", rows.min(table.num_rows()), table.num_rows());
    Ok(())
}
