//! Warden CLI
//!
//! Command-line interface for the warranty dashboard:
//! - Show summary counts, charts, and the warranty table
//! - Export the current view as CSV
//! - Generate a default config file

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warden::client::{HttpProvider, ProviderConfig, StaticTokenAuth};
use warden::config::{generate_default_config, Config, ConfigSource};
use warden::dashboard::Dashboard;
use warden::export::EXPORT_FILENAME;
use warden::render;
use warden::view::{SortColumn, SortDirection, SortState, StatusFilter};
use warden::WarrantyStatus;

#[derive(Parser)]
#[command(name = "warden")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Warranty status dashboard")]
#[command(long_about = "Warden fetches warranty statistics from your warranty service\nand renders status charts, a filterable table, and CSV exports.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Warranty service URL (overrides config)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Config file path (default: standard locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the dashboard and render it
    Show {
        /// Product name search (case-insensitive substring)
        #[arg(short, long, default_value = "")]
        search: String,
        /// Status filter (all, active, expiring, expired)
        #[arg(long, default_value = "all")]
        status: String,
        /// Sort column (product, purchase, expiration, status)
        #[arg(long, default_value = "expiration")]
        sort: String,
        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Export the current view as CSV
    Export {
        /// Output file (default: warranty_status_export.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Product name search (case-insensitive substring)
        #[arg(short, long, default_value = "")]
        search: String,
        /// Status filter (all, active, expiring, expired)
        #[arg(long, default_value = "all")]
        status: String,
        /// Sort column (product, purchase, expiration, status)
        #[arg(long, default_value = "expiration")]
        sort: String,
        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, config_source) = match &cli.config {
        Some(path) => (
            Config::load_with_env(path)?,
            ConfigSource {
                path: Some(path.clone()),
                errors: Vec::new(),
            },
        ),
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    // Logging first: config-load diagnostics would otherwise go nowhere
    init_logging(&config);
    report_config_source(&config_source);

    match cli.command {
        Commands::Show {
            search,
            status,
            sort,
            desc,
        } => {
            let mut dashboard = build_dashboard(&config);
            configure_view(&mut dashboard, &search, &status, &sort, desc);

            if let Err(e) = dashboard.load().await {
                print_error_panel(&e);
                std::process::exit(1);
            }

            let now = chrono::Utc::now();
            let today = now.date_naive();

            println!("Warranty Dashboard");
            println!("{}", "=".repeat(84));
            println!("{}", render::render_summary(dashboard.summary()));
            println!();
            println!("{}", render::render_doughnut(&dashboard.doughnut_series()));
            println!("{}", render::render_timeline(&dashboard.timeline_series(today)));
            println!(
                "{}",
                render::render_table(
                    &dashboard.current_view(now),
                    now,
                    dashboard.threshold_days(),
                    &config.export.date_format,
                )
            );
        }

        Commands::Export {
            output,
            search,
            status,
            sort,
            desc,
        } => {
            let mut dashboard = build_dashboard(&config);
            configure_view(&mut dashboard, &search, &status, &sort, desc);

            if let Err(e) = dashboard.load().await {
                print_error_panel(&e);
                std::process::exit(1);
            }

            let now = chrono::Utc::now();
            let path = output.unwrap_or_else(|| PathBuf::from(EXPORT_FILENAME));
            let view = dashboard.current_view(now);

            match warden::export::write_csv(
                &view,
                &path,
                now,
                dashboard.threshold_days(),
                &config.export.date_format,
            )? {
                Some(rows) => println!("Exported {} rows to {:?}", rows, path),
                None => eprintln!("No data to export based on current filters"),
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!("Wrote default config to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("warden={}", config.logging.level)),
    );

    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn report_config_source(source: &ConfigSource) {
    for error in &source.errors {
        tracing::warn!("Skipped config candidate: {}", error);
    }
    match &source.path {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("Using default config with environment overrides"),
    }
}

fn build_dashboard(config: &Config) -> Dashboard<HttpProvider> {
    let auth = StaticTokenAuth::new(config.api.token.clone());
    let provider = HttpProvider::new(
        ProviderConfig {
            base_url: config.api.base_url.clone(),
            request_timeout_ms: config.api.request_timeout_ms,
        },
        Some(Box::new(auth)),
    );

    Dashboard::new(provider).with_default_threshold(config.dashboard.expiring_soon_days)
}

fn configure_view(
    dashboard: &mut Dashboard<HttpProvider>,
    search: &str,
    status: &str,
    sort: &str,
    desc: bool,
) {
    dashboard.set_query(search);
    dashboard.set_status_filter(parse_status_filter(status));
    dashboard.set_sort(SortState {
        column: parse_sort_column(sort),
        direction: if desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        },
    });
}

fn parse_status_filter(s: &str) -> StatusFilter {
    match s.to_lowercase().as_str() {
        "all" => StatusFilter::All,
        "active" => StatusFilter::Only(WarrantyStatus::Active),
        "expiring" => StatusFilter::Only(WarrantyStatus::Expiring),
        "expired" => StatusFilter::Only(WarrantyStatus::Expired),
        other => {
            eprintln!("Unknown status filter: {} (expected all, active, expiring, expired)", other);
            std::process::exit(1);
        }
    }
}

fn parse_sort_column(s: &str) -> SortColumn {
    match s.to_lowercase().as_str() {
        "product" => SortColumn::Product,
        "purchase" => SortColumn::Purchase,
        "expiration" => SortColumn::Expiration,
        "status" => SortColumn::Status,
        other => {
            eprintln!("Unknown sort column: {} (expected product, purchase, expiration, status)", other);
            std::process::exit(1);
        }
    }
}

fn print_error_panel(e: &warden::LoadError) {
    eprintln!("Failed to load dashboard");
    eprintln!("  {}", e);
    eprintln!();
    eprintln!("Check that the warranty service is reachable and your token is set:");
    eprintln!("  export WARDEN_API_TOKEN=<token>");
}
