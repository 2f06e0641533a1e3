//! undat64 - extract translated strings from Path of Exile .dat64 tables
//!
//! Usage:
//!   undat64 <data_dir>                   - Extract all known tables (quick mode)
//!   undat64 extract <data_dir> [-o out]  - Extract all known tables to JSON
//!   undat64 info <file.dat64> [--json]   - Show table information
//!   undat64 list <data_dir> [filter]     - List .dat64 files matching filter

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use undat64::{
    collect_dat_files, create_glob_matcher, format_size, korean_tables, matches_filter, save_json,
    Dat64Table, DatExtractor, DirSource,
};

const DEFAULT_OUTPUT: &str = "korean_dat_data.json";

#[derive(Parser)]
#[command(name = "undat64")]
#[command(version = "0.1.0")]
#[command(about = "Extract translated strings from Path of Exile .dat64 tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory containing .dat64 files (for quick extract mode)
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract all known translation tables to a JSON artifact
    Extract {
        /// Directory containing the .dat64 files
        data_dir: PathBuf,
        /// Output JSON path
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },
    /// Show information about a single .dat64 file
    Info {
        /// Path to the .dat64 file
        dat_file: PathBuf,
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List .dat64 files under a directory
    List {
        /// Directory to scan
        data_dir: PathBuf,
        /// Filter pattern (e.g., Korean, *.dat64)
        filter: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Extract { data_dir, output }) => extract_tables(&data_dir, &output),
        Some(Commands::Info { dat_file, json }) => show_info(&dat_file, json),
        Some(Commands::List { data_dir, filter }) => list_files(&data_dir, filter.as_deref()),
        None => {
            if let Some(data_dir) = cli.data_dir {
                extract_tables(&data_dir, Path::new(DEFAULT_OUTPUT))
            } else {
                eprintln!("Usage: undat64 <data_dir>");
                eprintln!("       undat64 extract <data_dir> [-o output.json]");
                eprintln!("       undat64 info <file.dat64> [--json]");
                eprintln!("       undat64 list <data_dir> [filter]");
                std::process::exit(1);
            }
        }
    }
}

fn extract_tables(data_dir: &Path, output: &Path) -> Result<()> {
    println!("Extracting tables from {}...", data_dir.display());

    let mut extractor = DatExtractor::new(DirSource::new(data_dir));

    let pb = ProgressBar::new_spinner();
    pb.set_message("Decoding tables...");
    pb.enable_steady_tick(Duration::from_millis(120));
    let tables = extractor.extract_all();
    pb.finish_and_clear();

    save_json(&tables, output).with_context(|| format!("Failed to write {}", output.display()))?;

    println!();
    println!("Summary:");
    for (name, entries) in &tables {
        println!("  {:>16}: {} entries", name, entries.len());
    }
    println!();
    println!("Saved {} tables to {}", tables.len(), output.display());

    Ok(())
}

#[derive(Serialize)]
struct TableReport {
    path: String,
    file_size: u64,
    row_count: i32,
    variable_data_start: usize,
    fixed_data_size: usize,
    estimated_row_width: Option<usize>,
}

fn show_info(dat_file: &Path, json: bool) -> Result<()> {
    let data =
        fs::read(dat_file).with_context(|| format!("Failed to read {}", dat_file.display()))?;
    let table = Dat64Table::parse(&data)
        .with_context(|| format!("Failed to parse {}", dat_file.display()))?;

    let estimated_row_width =
        (table.row_count() > 0).then(|| table.fixed_data_size() / table.row_count() as usize);

    let report = TableReport {
        path: dat_file.display().to_string(),
        file_size: data.len() as u64,
        row_count: table.row_count(),
        variable_data_start: table.variable_data_start(),
        fixed_data_size: table.fixed_data_size(),
        estimated_row_width,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("Table Information:");
    println!("  File: {}", report.path);
    println!("  Size: {}", format_size(report.file_size));
    println!("  Rows: {}", report.row_count);
    println!("  Fixed section: {} bytes", report.fixed_data_size);
    println!("  Heap starts at: {}", report.variable_data_start);
    match report.estimated_row_width {
        Some(width) => println!("  Estimated row width: {} bytes", width),
        None => println!("  Estimated row width: n/a (no rows)"),
    }

    // Batch specs this file name would match.
    for spec in korean_tables()
        .into_iter()
        .filter(|spec| Path::new(&spec.path).file_name() == dat_file.file_name())
    {
        println!(
            "  Known table: {} (default row width {} bytes)",
            spec.table_name, spec.default_row_width
        );
    }

    Ok(())
}

fn list_files(data_dir: &Path, filter: Option<&str>) -> Result<()> {
    let matcher = filter.map(create_glob_matcher).transpose()?;
    let files = collect_dat_files(data_dir)?;

    let mut count = 0u64;
    let mut total_size = 0u64;

    for path in &files {
        let name = path
            .strip_prefix(data_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        if !matches_filter(&name, matcher.as_ref()) {
            continue;
        }

        let size = fs::metadata(path)?.len();
        println!("{:>10} {}", format_size(size), name);

        count += 1;
        total_size += size;
    }

    println!();
    println!("Total: {} files, {}", count, format_size(total_size));

    Ok(())
}
