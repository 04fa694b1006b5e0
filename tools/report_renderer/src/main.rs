use aoi_site_core::config::PublishOptions;
use aoi_site_core::publish::builder::RunPublisher;
use clap::Parser;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "report_renderer",
    version,
    about = "Render AOI summary HTML, JSON copy, metrics CSV and report.html from a run's report JSON"
)]
struct Cli {
    /// Path to site/aoi_reports/runs/<run_id>
    #[arg(long, value_name = "DIR")]
    run_dir: PathBuf,

    /// Report JSON file name inside the run dir (default: auto-detect)
    #[arg(long, value_name = "FILE")]
    report_json_name: Option<String>,

    /// Update evidence_artifacts hashes and sizes in the report JSON
    #[arg(long)]
    update_json: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
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

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let opts = PublishOptions {
        report_json_name: cli.report_json_name,
        update_json: cli.update_json,
    };
    match RunPublisher::render_run(&cli.run_dir, &opts) {
        Ok(outcome) => match serde_json::to_string_pretty(&outcome.artifacts) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            tracing::debug!(kind = e.kind(), "render failed");
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
