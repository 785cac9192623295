//! Command-line driver for the portfolio store.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};

use cloud_cost_advisor::adapters::tabular::{read_rows, write_projections, write_template};
use cloud_cost_advisor::adapters::{
    FileSnapshotStore, InMemorySnapshotStore, InMemorySyncBus, StaticCatalog,
};
use cloud_cost_advisor::application::{CostReport, PortfolioStore};
use cloud_cost_advisor::config::{AppConfig, LogFormat, StorageBackend};
use cloud_cost_advisor::domain::foundation::DomainError;
use cloud_cost_advisor::domain::instance::CloudProvider;
use cloud_cost_advisor::domain::mutation::{ReplaceField, ReplaceRule, ReplaceRules};
use cloud_cost_advisor::domain::projection::Scenario;
use cloud_cost_advisor::domain::sync::{NoticeLevel, SignalKind, SyncSignal};
use cloud_cost_advisor::ports::{InstanceCatalog, SignalHandler, SignalSubscriber, SnapshotStore};

#[derive(Parser)]
#[command(name = "cloud-cost-advisor", version, about = "Cloud VM portfolio cost projections")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a portfolio from a CSV file (region,size,quantity,hours,pricing_model)
    Import(ImportArgs),
    /// List saved portfolios
    List,
    /// Show cost projections for a portfolio
    Show(ShowArgs),
    /// Delete a portfolio and its snapshot
    Delete { name: String },
    /// Rename a portfolio
    Rename { from: String, to: String },
    /// Find and replace values across a portfolio's rows
    Replace(ReplaceArgs),
    /// Write the catalog template as CSV
    Template(TemplateArgs),
}

#[derive(Args)]
struct ImportArgs {
    name: String,
    file: PathBuf,
    #[arg(long)]
    provider: Option<CloudProvider>,
}

#[derive(Args)]
struct ShowArgs {
    name: String,
    /// Zero-based page of rows to print
    #[arg(long, default_value_t = 0)]
    page: usize,
    #[arg(long, default_value_t = 20)]
    page_size: usize,
    /// Also write every projection to this CSV file
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,
}

#[derive(Args)]
struct ReplaceArgs {
    name: String,
    /// FROM=TO
    #[arg(long, value_parser = parse_rule)]
    size: Option<ReplaceRule>,
    /// FROM=TO
    #[arg(long, value_parser = parse_rule)]
    region: Option<ReplaceRule>,
    /// FROM=TO
    #[arg(long, value_parser = parse_rule)]
    pricing_model: Option<ReplaceRule>,
}

#[derive(Args)]
struct TemplateArgs {
    /// Only this provider's entries
    #[arg(long)]
    provider: Option<CloudProvider>,
    /// Catalog JSON to use instead of the built-in data
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,
    /// Output file (stdout if omitted)
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,
}

fn parse_rule(raw: &str) -> Result<ReplaceRule, String> {
    match raw.split_once('=') {
        Some((from, to)) => Ok(ReplaceRule::new(from, to)),
        None => Err(format!("expected FROM=TO, got '{}'", raw)),
    }
}

/// Prints status notices to stderr.
struct NoticePrinter;

#[async_trait]
impl SignalHandler for NoticePrinter {
    async fn handle(&self, signal: &SyncSignal) -> Result<(), DomainError> {
        if let SyncSignal::Notice(notice) = signal {
            match notice.level {
                NoticeLevel::Success => eprintln!("ok: {}", notice.text),
                NoticeLevel::Error => eprintln!(
                    "error [{}]: {}",
                    notice.code.as_deref().unwrap_or("UNKNOWN"),
                    notice.text
                ),
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "NoticePrinter"
    }
}

fn init_tracing(config: &AppConfig) -> Result<()> {
    let filter = config.logging.env_filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    match config.logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))
}

async fn open_store(
    config: &AppConfig,
    bus: Arc<InMemorySyncBus>,
    catalog: Arc<StaticCatalog>,
) -> Result<PortfolioStore> {
    let snapshots: Arc<dyn SnapshotStore> = match config.storage.backend {
        StorageBackend::File => Arc::new(FileSnapshotStore::new(&config.storage.data_dir)),
        StorageBackend::Memory => Arc::new(InMemorySnapshotStore::new()),
    };
    let store = PortfolioStore::open(snapshots, bus, catalog, config.store_settings())
        .await
        .context("failed to open portfolio store")?;
    Ok(store)
}

fn print_report(report: &CostReport, page: usize, page_size: usize) {
    println!(
        "{:<24} {:<14} {:>5} {:>6} {:>14} {:>14} {:>14}",
        "instance", "region", "qty", "hours", "monthly", "annual", "savings"
    );
    for projection in report.page(page, page_size) {
        for (scenario, cost) in projection.scenarios() {
            let label = match scenario {
                Scenario::Current => cost.instance.clone(),
                _ => format!("  {}", cost.instance),
            };
            println!(
                "{:<24} {:<14} {:>5} {:>6} {:>14} {:>14} {:>14}",
                label,
                projection.region,
                cost.quantity,
                projection.hours,
                cost.monthly_cost.to_string(),
                cost.annual_cost.to_string(),
                cost.annual_savings.to_string()
            );
        }
    }

    let pages = report.page_count(page_size);
    if pages > 1 {
        println!("page {} of {}", page + 1, pages);
    }

    println!();
    println!("Totals over {} row(s)", report.totals().rows);
    for scenario in Scenario::ALL {
        let total = report.totals().scenario(scenario);
        println!(
            "{:<24} vCPU {:>6} monthly {:>14} annual {:>14} savings {:>14}",
            scenario.label(),
            total.vcpu,
            total.monthly_cost.to_string(),
            total.annual_cost.to_string(),
            total.annual_savings.to_string()
        );
    }
}

fn write_catalog_template(args: &TemplateArgs) -> Result<()> {
    let catalog = match &args.catalog {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            StaticCatalog::from_json(&json)?
        }
        None => StaticCatalog::default(),
    };
    let providers = match args.provider {
        Some(provider) => vec![provider],
        None => CloudProvider::ALL.to_vec(),
    };
    let entries: Vec<_> = providers
        .into_iter()
        .flat_map(|p| catalog.entries(p))
        .collect();

    match &args.output {
        Some(path) => write_template(&entries, File::create(path)?)?,
        None => write_template(&entries, io::stdout().lock())?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate()?;
    init_tracing(&config)?;

    let bus = Arc::new(InMemorySyncBus::new());
    bus.subscribe(&[SignalKind::Notice], Arc::new(NoticePrinter));

    match cli.command {
        Commands::Template(args) => write_catalog_template(&args)?,
        command => {
            let catalog = Arc::new(StaticCatalog::default());
            let mut store = open_store(&config, bus.clone(), catalog).await?;
            run(&mut store, command).await?;
        }
    }

    io::stdout().flush()?;
    Ok(())
}

async fn run(store: &mut PortfolioStore, command: Commands) -> Result<()> {
    match command {
        Commands::Import(args) => {
            let file = File::open(&args.file)
                .with_context(|| format!("failed to open {}", args.file.display()))?;
            let rows = read_rows(file)?;
            let provider = args.provider.unwrap_or(store.state().provider());
            store.add_portfolio(&args.name, provider, &rows).await?;
        }
        Commands::List => {
            for summary in store.list_portfolios() {
                println!(
                    "{:<32} {:<6} {}",
                    summary.name,
                    summary.provider,
                    summary.saved_at.as_datetime().format("%Y-%m-%d %H:%M")
                );
            }
        }
        Commands::Show(args) => {
            store.select_portfolio(&args.name).await?;
            let report = store.cost_report();
            print_report(&report, args.page, args.page_size);
            if let Some(path) = &args.export {
                write_projections(report.projections(), File::create(path)?)?;
            }
        }
        Commands::Delete { name } => {
            store.remove_portfolio(&name).await?;
        }
        Commands::Rename { from, to } => {
            store.rename_portfolio(&from, &to).await?;
        }
        Commands::Replace(args) => {
            let mut rules = ReplaceRules::new();
            for (field, rule) in [
                (ReplaceField::Size, args.size),
                (ReplaceField::Region, args.region),
                (ReplaceField::PricingModel, args.pricing_model),
            ] {
                if let Some(rule) = rule {
                    rules = rules.with(field, rule);
                }
            }
            store.select_portfolio(&args.name).await?;
            store.replace_all(&rules).await?;
        }
        Commands::Template(args) => write_catalog_template(&args)?,
    }
    Ok(())
}
