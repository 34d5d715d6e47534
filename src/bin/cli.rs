use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use geosearch_engine::{Dataset, EngineConfig, GeoPoint, SearchEngine, SearchQuery};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "geosearch-cli")]
#[command(about = "Multi-criteria city search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Tab-separated dataset path
    #[arg(short, long, default_value = "data/cities_canada-usa.tsv")]
    data: String,

    /// Engine config (YAML, or JSON with a .json extension); built-in city setup when omitted
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank records against a query
    Search {
        /// Text criterion value, as `criterion=value`
        #[arg(short, long = "text", value_name = "CRITERION=VALUE")]
        texts: Vec<String>,

        /// Distance criterion position, as `criterion=LAT,LON`
        #[arg(short, long = "near", value_name = "CRITERION=LAT,LON")]
        positions: Vec<String>,

        /// Minimum score (exclusive)
        #[arg(long)]
        score_min: Option<f64>,

        /// Maximum results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List configured criteria
    Criteria,
}

fn split_pair(raw: &str) -> anyhow::Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name, value)),
        _ => bail!("expected CRITERION=VALUE, got '{}'", raw),
    }
}

fn parse_position(raw: &str) -> anyhow::Result<GeoPoint> {
    let (lat, lon) = raw
        .split_once(',')
        .with_context(|| format!("expected LAT,LON, got '{}'", raw))?;
    Ok(GeoPoint::new(
        lat.trim().parse().context("invalid latitude")?,
        lon.trim().parse().context("invalid longitude")?,
    ))
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default_cities()?,
    };

    match cli.command {
        Commands::Criteria => {
            println!("📋 Criteria (in evaluation order):");
            for (i, criterion) in config.criteria.iter().enumerate() {
                println!("   {}. {}", i + 1, criterion);
            }
        }

        Commands::Search {
            texts,
            positions,
            score_min,
            limit,
        } => {
            let mut query = SearchQuery::new();
            for raw in &texts {
                let (name, value) = split_pair(raw)?;
                query = query.text(name, value);
            }
            for raw in &positions {
                let (name, value) = split_pair(raw)?;
                query = query.near(name, parse_position(value)?);
            }

            let mut dataset = Dataset::load_tsv(&cli.data)?;
            dataset.sort_by_attribute("name");

            let engine = SearchEngine::from_config(dataset.into_records(), &config)?;
            let mut options = *engine.options();
            if let Some(score_min) = score_min {
                options.score_min = score_min;
            }
            if let Some(limit) = limit {
                options.limit = limit;
            }

            let results = engine.compute_search(&query, &options)?;
            for result in &results {
                tracing::debug!("{}", result.display());
            }
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    Ok(())
}
