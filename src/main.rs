use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use veristat::cli::{Args, Command, OutputFormat};
use veristat::{
    format_json, format_recommendation_terminal, format_score_terminal, format_stats_terminal,
    read_audit_csv, Catalog, RiskEngine,
};

fn load_catalog(path: Option<&str>) -> Result<Catalog> {
    match path {
        Some(path) => {
            Catalog::from_yaml(path).with_context(|| format!("failed to load catalog from {path}"))
        }
        None => Ok(Catalog::builtin()),
    }
}

fn build_engine(args: &Args, data: &str) -> Result<RiskEngine> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let records = read_audit_csv(data)
        .with_context(|| format!("failed to load audit dataset from {data}"))?;

    let mut builder = RiskEngine::builder().catalog(catalog);
    if let Some(max_combinations) = args.max_combinations {
        builder = builder.max_combinations(max_combinations);
    }

    let start = Instant::now();
    let engine = builder.build(&records).context("engine build failed")?;
    info!("engine built in {:?}", start.elapsed());
    Ok(engine)
}

fn emit(args: &Args, text: String) -> Result<()> {
    match &args.output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write output to {path}"))?;
            info!("output written to {path}");
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    // Parse args early to get the verbose flag for logging initialization.
    let args = Args::parse();

    // RUST_LOG wins when set; otherwise the verbose flag picks the level.
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if args.verbose {
        EnvFilter::new("veristat=debug")
    } else {
        EnvFilter::new("veristat=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    debug!("logging initialized (verbose={})", args.verbose);

    let json = matches!(args.format, OutputFormat::Json);

    match &args.command {
        Command::Score { data, features } => {
            let engine = build_engine(&args, data)?;
            let report = engine
                .score_report(features)
                .with_context(|| format!("failed to score feature set {features:?}"))?;
            let text = if json {
                format_json(&report)?
            } else {
                format_score_terminal(&report)
            };
            emit(&args, text)?;
        }
        Command::Recommend { data, categories, features } => {
            let engine = build_engine(&args, data)?;
            let categories = (!categories.is_empty()).then_some(categories.as_slice());
            let recommendation = engine
                .recommend(features, categories)
                .with_context(|| format!("failed to build recommendation for {features:?}"))?;
            let text = if json {
                format_json(&recommendation)?
            } else {
                format_recommendation_terminal(&recommendation)
            };
            emit(&args, text)?;
        }
        Command::Inspect { data } => {
            let engine = build_engine(&args, data)?;
            let stats = engine.stats();
            let text = if json {
                format_json(&stats)?
            } else {
                format_stats_terminal(&stats)
            };
            emit(&args, text)?;
        }
    }

    Ok(())
}
