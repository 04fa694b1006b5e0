use aoi_site_core::config::{SiteLayout, DEFAULT_RUNS_DIR, DEFAULT_SITE_ROOT};
use aoi_site_core::error::CoreError;
use aoi_site_core::validator::dao::validate_dao_reports;
use aoi_site_core::validator::validate_runs;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "run_validator", version, about = "Post-build checks for published reports")]
struct Cli {
    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate AOI run artefacts and links
    Runs {
        #[arg(long, default_value = DEFAULT_RUNS_DIR, value_name = "DIR")]
        runs_dir: PathBuf,
    },
    /// Validate the DAO reports index and plot artefacts
    Dao {
        #[arg(long, default_value = DEFAULT_SITE_ROOT, value_name = "DIR")]
        site_root: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(level))
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn fail(e: CoreError) -> ! {
    tracing::debug!(kind = e.kind(), "run_validator failed");
    eprintln!("error: {}", e);
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Runs { runs_dir } => match validate_runs(&runs_dir) {
            Ok(summary) => match serde_json::to_string_pretty(&summary) {
                Ok(s) => println!("{}", s),
                Err(e) => fail(e.into()),
            },
            Err(e) => fail(e),
        },
        Commands::Dao { site_root } => {
            let report = validate_dao_reports(&SiteLayout::new(site_root)).unwrap_or_else(|e| fail(e));
            if report.passed() {
                println!("DAO reports validation passed");
                return;
            }
            tracing::debug!(errors = report.errors.len(), "DAO reports validation failed");
            println!("DAO reports validation failed:");
            for err in &report.errors {
                println!("- {}", err);
            }
            std::process::exit(1);
        }
    }
}
