//! route-binder command line.
//!
//! ```text
//! route-binder scan [DIRS..] [--recursive] [--tag TAG] [--json]
//!     → list discovered route intents and scan diagnostics
//!
//! route-binder check --config FILE
//!     → load + validate config, scan its directories,
//!       exit non-zero when a `resolver.fail_on` kind is present
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};

use route_binder::config::{load_config, ObservabilityConfig};
use route_binder::observability::logging::init_logging;
use route_binder::scanner::{marker::DEFAULT_TAG, ScanReport, Scanner};

#[derive(Parser)]
#[command(name = "route-binder")]
#[command(about = "Discover annotated routes in Rust sources", long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan directories and print route intents
    Scan {
        /// Directories to scan, in order
        #[arg(default_value = ".")]
        dirs: Vec<PathBuf>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Annotation tag to look for
        #[arg(short, long, default_value = DEFAULT_TAG)]
        tag: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a config file and scan its directories
    Check {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging(&ObservabilityConfig {
        log_level: cli.log_level.clone(),
        ..ObservabilityConfig::default()
    });

    match cli.command {
        Commands::Scan {
            dirs,
            recursive,
            tag,
            json,
        } => {
            let report = Scanner::new().with_tag(tag).recursive(recursive).scan(&dirs);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { config } => {
            let config = load_config(&config)?;
            tracing::info!(
                directories = config.scanner.directories.len(),
                concurrent = config.scanner.concurrent,
                "Configuration loaded"
            );

            let scanner = Scanner::from_config(&config.scanner);
            let dirs: Vec<PathBuf> = config.scanner.directories.iter().map(PathBuf::from).collect();
            let report = if config.scanner.concurrent {
                scanner
                    .scan_concurrent(dirs, Duration::from_secs(config.scanner.timeout_secs))
                    .await
            } else {
                scanner.scan(&dirs)
            };
            print_report(&report);

            let fatal = report
                .diagnostics
                .iter()
                .find(|d| config.resolver.fail_on.contains(&d.kind));
            match fatal {
                Some(diagnostic) => {
                    eprintln!("check failed: {}", diagnostic);
                    Ok(ExitCode::FAILURE)
                }
                None => Ok(ExitCode::SUCCESS),
            }
        }
    }
}

fn print_report(report: &ScanReport) {
    for intent in &report.intents {
        println!("{}", intent);
    }
    for diagnostic in &report.diagnostics {
        println!("{}", diagnostic);
    }
    println!(
        "{} route(s), {} diagnostic(s)",
        report.intents.len(),
        report.diagnostics.len()
    );
}
