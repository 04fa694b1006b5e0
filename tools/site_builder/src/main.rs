use aoi_site_core::config::{PublishOptions, SiteLayout, DEFAULT_DTE_SOURCE, DEFAULT_SITE_ROOT};
use aoi_site_core::error::CoreResult;
use aoi_site_core::publish::builder::publish_run_in_site;
use aoi_site_core::render::dte::render_dte_to_site;
use aoi_site_core::site::index::rebuild_index_with_dte;
use aoi_site_core::site::nav::{check_nav_links, rebuild_site_nav};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "site_builder", version, about = "Static site maintenance for AOI reports")]
struct Cli {
    /// Root folder containing site HTML
    #[arg(long, global = true, default_value = DEFAULT_SITE_ROOT, value_name = "DIR")]
    site_root: PathBuf,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-render the DTE page if its source exists, then regenerate aoi_reports/index.html
    RebuildIndex(DteArgs),
    /// Rewrite the shared header nav on the home, index and run pages
    RebuildNav(RunArgs),
    /// Check nav links on the AOI index and run landing page
    CheckNav(RunArgs),
    /// Render the DTE instructions markdown into the site
    RenderDte(DteArgs),
    /// Render, hash, rebuild index and nav, then validate one run
    Publish(PublishArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Run id under aoi_reports/runs/
    #[arg(long)]
    run_id: String,
}

#[derive(clap::Args)]
struct DteArgs {
    /// Source markdown file
    #[arg(long, default_value = DEFAULT_DTE_SOURCE, value_name = "FILE")]
    source: PathBuf,
}

#[derive(clap::Args)]
struct PublishArgs {
    #[arg(long)]
    run_id: String,

    /// Report JSON file name inside the run dir (default: auto-detect)
    #[arg(long, value_name = "FILE")]
    report_json_name: Option<String>,

    /// Update evidence_artifacts hashes and sizes in the report JSON
    #[arg(long)]
    update_json: bool,
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

fn run(cli: Cli) -> CoreResult<()> {
    let layout = SiteLayout::new(cli.site_root);
    match cli.command {
        Commands::RebuildIndex(args) => {
            rebuild_index_with_dte(&layout, &args.source)?;
        }
        Commands::RebuildNav(args) => rebuild_site_nav(&layout, &args.run_id)?,
        Commands::CheckNav(args) => {
            check_nav_links(&layout, &args.run_id)?;
            println!("nav links ok");
        }
        Commands::RenderDte(args) => {
            render_dte_to_site(&args.source, &layout)?;
        }
        Commands::Publish(args) => {
            let opts = PublishOptions {
                report_json_name: args.report_json_name,
                update_json: args.update_json,
            };
            publish_run_in_site(&layout, &args.run_id, &opts)?;
            println!("published {}", args.run_id);
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(e) = run(cli) {
        tracing::debug!(kind = e.kind(), "site_builder failed");
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
