use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use sales_dashboard::cli::Cli;
use sales_dashboard::render::{ConsoleSurface, JsonSurface, Surface};
use sales_dashboard::{dashboard, DashboardError};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("SALESDASH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print the error the way the selected mode expects and pick an exit code.
fn report_error(err: &anyhow::Error, robot: bool) -> i32 {
    let (kind, code, retryable) = match err.downcast_ref::<DashboardError>() {
        Some(e) => (e.kind(), e.exit_code(), e.retryable()),
        None => ("internal", 1, false),
    };
    if robot {
        let payload = serde_json::json!({
            "error": {
                "kind": kind,
                "message": err.to_string(),
                "retryable": retryable,
            }
        });
        eprintln!("{payload}");
    } else {
        eprintln!("{} {err}", "error:".red().bold());
    }
    code
}

fn main() {
    // Load .env early; ignore if missing.
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let req = cli.request();

    if cli.list_filters {
        match dashboard::filter_options(&req) {
            Ok(options) => {
                if cli.json {
                    match serde_json::to_string_pretty(&options) {
                        Ok(doc) => println!("{doc}"),
                        Err(e) => {
                            eprintln!("error: {e}");
                            std::process::exit(1);
                        }
                    }
                } else {
                    println!("genders:       {}", options.genders.join(", "));
                    println!("countries:     {}", options.countries.join(", "));
                    println!("categories:    {}", options.categories.join(", "));
                    println!("product lines: {}", options.product_lines.join(", "));
                    if let (Some(min), Some(max)) =
                        (options.min_order_date, options.max_order_date)
                    {
                        println!("order dates:   {min} to {max}");
                    }
                }
                return;
            }
            Err(e) => {
                let code = report_error(&e.into(), cli.json);
                std::process::exit(code);
            }
        }
    }

    let mut console;
    let mut json;
    let surface: &mut dyn Surface = if cli.json {
        json = JsonSurface::default();
        &mut json
    } else {
        console = ConsoleSurface;
        &mut console
    };

    if let Err(err) = dashboard::run_interaction(&req, surface) {
        let code = report_error(&err, cli.json);
        std::process::exit(code);
    }
}
