//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{self, CsvAssetAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_adapter::{JsonAssetAdapter, JsonReportAdapter};
use crate::domain::asset::{validate_assets, AssetRecord};
use crate::domain::config_validation::build_pipeline_config;
use crate::domain::error::{PortoptError, Warning};
use crate::domain::pipeline::{
    efficient_frontier, optimize_portfolio, FrontierResult, OptimizationResult, PipelineConfig,
};
use crate::domain::returns::{compute_statistics, ReturnStatistics};
use crate::ports::asset_port::AssetPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "portopt", about = "Mean-variance portfolio optimizer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Optimize a portfolio for a target return
    Optimize {
        #[arg(short, long)]
        assets: PathBuf,
        #[arg(short, long)]
        target: Option<f64>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the efficient frontier as CSV
    Frontier {
        #[arg(short, long)]
        assets: PathBuf,
        #[arg(short = 'n', long)]
        points: Option<usize>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate an asset file
    Validate {
        #[arg(short, long)]
        assets: PathBuf,
    },
    /// Derive return statistics from a closing-price history
    Stats {
        #[arg(short, long)]
        prices: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Optimize {
            assets,
            target,
            config,
            output,
        } => run_optimize(&assets, target, config.as_ref(), output.as_ref()),
        Command::Frontier {
            assets,
            points,
            config,
            output,
        } => run_frontier(&assets, points, config.as_ref(), output.as_ref()),
        Command::Validate { assets } => run_validate(&assets),
        Command::Stats { prices, name } => run_stats(&prices, name.as_deref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = PortoptError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Pipeline settings from an optional INI file; defaults when no file is given.
pub fn resolve_pipeline_config(path: Option<&PathBuf>) -> Result<PipelineConfig, ExitCode> {
    let adapter = match path {
        Some(p) => {
            eprintln!("Loading config from {}", p.display());
            load_config(p)?
        }
        None => FileConfigAdapter::empty(),
    };
    build_pipeline_config(&adapter).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

/// Pick the asset adapter by file extension: `.json` or CSV otherwise.
pub fn open_assets(path: &Path) -> Result<Box<dyn AssetPort>, PortoptError> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(Box::new(JsonAssetAdapter::from_file(path)?))
    } else {
        Ok(Box::new(CsvAssetAdapter::new(path.to_path_buf())))
    }
}

/// Load assets and run the full pipeline. An explicit `target` overrides one
/// carried by the input file.
pub fn optimize_file(
    assets_path: &Path,
    target: Option<f64>,
    config: &PipelineConfig,
) -> Result<OptimizationResult, PortoptError> {
    let source = open_assets(assets_path)?;
    let records = source.load_assets()?;
    let target = match target {
        Some(t) => t,
        None => source.target_return()?.ok_or_else(|| {
            PortoptError::invalid("no target return given (use --target or targetReturn)")
        })?,
    };
    eprintln!(
        "Optimizing {} assets for target return {target}",
        records.len()
    );
    optimize_portfolio(&records, target, config)
}

pub fn frontier_file(
    assets_path: &Path,
    config: &PipelineConfig,
) -> Result<FrontierResult, PortoptError> {
    let records = open_assets(assets_path)?.load_assets()?;
    eprintln!(
        "Sweeping {} frontier points over {} assets",
        config.frontier.num_points + 1,
        records.len()
    );
    efficient_frontier(&records, config)
}

fn load_records(path: &Path) -> Result<Vec<AssetRecord>, PortoptError> {
    open_assets(path)?.load_assets()
}

fn report_warnings(warnings: &[Warning]) {
    for w in warnings {
        eprintln!("warning: {w}");
    }
}

fn run_optimize(
    assets_path: &PathBuf,
    target: Option<f64>,
    config_path: Option<&PathBuf>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    let config = match resolve_pipeline_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    eprintln!("Loading assets from {}", assets_path.display());
    let result = match optimize_file(assets_path, target, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    report_warnings(&result.warnings);
    print_summary(&result);

    let report = JsonReportAdapter;
    match output_path {
        Some(path) => {
            if let Err(e) = report.write(&result, &path.display().to_string()) {
                eprintln!("error: {e}");
                return (&e).into();
            }
            eprintln!("Report written to {}", path.display());
        }
        None => match report.render(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        },
    }

    ExitCode::SUCCESS
}

fn print_summary(result: &OptimizationResult) {
    eprintln!("\nPortfolio value: {:.2}", result.portfolio_value);
    eprintln!("Target return:   {:.6}", result.target_return);
    eprintln!("Final return:    {:.6}", result.final_return);
    eprintln!("Final risk:      {:.6}", result.final_risk);
    eprintln!(
        "\n{:<12} {:>10} {:>10} {:>10} {:>10}",
        "asset", "initial", "optimized", "shares", "target"
    );
    for ((initial, optimized), holding) in result
        .initial_weights
        .iter()
        .zip(&result.optimized_weights)
        .zip(&result.adjusted_share_counts)
    {
        eprintln!(
            "{:<12} {:>10.4} {:>10.4} {:>10} {:>10}",
            initial.name,
            initial.weight,
            optimized.weight,
            holding.asset.share_count,
            holding.active_count
        );
    }
    eprintln!(
        "\nAllocated {:.2} (residue {:.2})",
        result.reconciliation.allocated_value, result.reconciliation.residue
    );
}

fn run_frontier(
    assets_path: &PathBuf,
    points: Option<usize>,
    config_path: Option<&PathBuf>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    let mut config = match resolve_pipeline_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Some(n) = points {
        config.frontier.num_points = n;
    }

    eprintln!("Loading assets from {}", assets_path.display());
    let frontier = match frontier_file(assets_path, &config) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    report_warnings(&frontier.warnings);

    let written = match output_path {
        Some(path) => fs::File::create(path)
            .map_err(PortoptError::from)
            .and_then(|file| csv_adapter::write_frontier(file, &frontier.points)),
        None => csv_adapter::write_frontier(io::stdout().lock(), &frontier.points),
    };
    if let Err(e) = written {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Some(path) = output_path {
        eprintln!("Frontier written to {}", path.display());
    }

    ExitCode::SUCCESS
}

fn run_validate(assets_path: &PathBuf) -> ExitCode {
    eprintln!("Validating assets: {}", assets_path.display());
    let portfolio = match load_records(assets_path).and_then(|r| validate_assets(&r)) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "\n{:<12} {:>10} {:>8} {:>10} {:>10} {:>6}",
        "asset", "price", "shares", "return", "vol", "obs"
    );
    for a in &portfolio.assets {
        eprintln!(
            "{:<12} {:>10.2} {:>8} {:>10.6} {:>10.6} {:>6}",
            a.name,
            a.price,
            a.share_count,
            a.expected_return,
            a.volatility,
            a.daily_returns.len()
        );
    }
    eprintln!(
        "\n{} assets are valid; portfolio value {:.2}",
        portfolio.len(),
        portfolio.current_value()
    );
    ExitCode::SUCCESS
}

/// Asset entry derived from a price history, in the JSON input shape.
pub fn stats_record(name: &str, last_close: f64, stats: &ReturnStatistics) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "price": last_close,
        "shareCount": 0,
        "expectedReturn": stats.expected_return,
        "volatility": stats.volatility,
        "annualizedVolatility": stats.annualized_volatility,
        "riskScore": stats.risk_score.to_string(),
        "dailyReturns": stats.daily_returns,
    })
}

fn run_stats(prices_path: &PathBuf, name: Option<&str>) -> ExitCode {
    eprintln!("Loading prices from {}", prices_path.display());
    let closes = match csv_adapter::read_closes(prices_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let stats = match compute_statistics(&closes) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let name = name.map(str::to_string).unwrap_or_else(|| {
        prices_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    eprintln!(
        "{name}: {} returns, mean {:.6}, volatility {:.6}, risk {}",
        stats.daily_returns.len(),
        stats.expected_return,
        stats.volatility,
        stats.risk_score
    );

    let last_close = closes.last().copied().unwrap_or_default();
    match serde_json::to_string_pretty(&stats_record(&name, last_close, &stats)) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(1);
        }
    }
    ExitCode::SUCCESS
}
