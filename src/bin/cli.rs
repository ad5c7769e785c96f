//! Gridpool CLI - Backtest and optimize grid pool strategies

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use gridpool::backtesting::{calculate_metrics, BacktestEngine};
use gridpool::config::{EngineConfig, SweepSpec};
use gridpool::core::grid::GridPolicy;
use gridpool::data::{load_rounds_dir, load_team_histories, RoundDataset, TeamFormLookup};
use gridpool::optimizer::{OptimizationReport, Trial};

/// Default data directory (relative to project root)
const DEFAULT_ROUNDS_DIR: &str = "data/rounds";

#[derive(Parser)]
#[command(name = "gridpool")]
#[command(author, version, about = "Grid pool strategy backtesting CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory of round JSON files
    #[arg(long, global = true)]
    rounds_dir: Option<PathBuf>,

    /// Directory of team history JSON files
    #[arg(long, global = true)]
    teams_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List loaded rounds
    Rounds {
        /// Only show settled rounds
        #[arg(long)]
        settled: bool,
    },

    /// Backtest a single strategy
    Backtest {
        /// Grid selection policy
        #[arg(long, value_enum)]
        grid: Option<PolicyArg>,

        /// Bets generated per round
        #[arg(long)]
        target: Option<usize>,

        /// First date to include (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Strategy parameter override, e.g. draw_boost=1.1
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, f64)>,

        /// Print per-day results
        #[arg(long)]
        days: bool,
    },

    /// Grid search over a sweep specification
    Optimize {
        /// Sweep specification file (TOML)
        #[arg(short, long)]
        spec: PathBuf,

        /// Override the number of top trials shown
        #[arg(long)]
        top: Option<usize>,

        /// Run trials on a single thread
        #[arg(long)]
        sequential: bool,

        /// Write the full report as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Fixed,
    Confidence,
}

impl From<PolicyArg> for GridPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Fixed => GridPolicy::Fixed,
            PolicyArg::Confidence => GridPolicy::Confidence,
        }
    }
}

fn parse_param(s: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for {}: {}", name, e))?;
    Ok((name.trim().to_string(), value))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info,gridpool=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    println!("{}", format!("Gridpool CLI v{}", env!("CARGO_PKG_VERSION")).cyan().bold());
    println!();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => EngineConfig::default(),
    };
    if cli.rounds_dir.is_some() {
        config.rounds_dir = cli.rounds_dir.clone();
    }
    if cli.teams_dir.is_some() {
        config.teams_dir = cli.teams_dir.clone();
    }

    match cli.command {
        Commands::Rounds { settled } => {
            let dataset = load_dataset(&config)?;
            list_rounds(&dataset, settled);
        }
        Commands::Backtest {
            grid,
            target,
            start,
            end,
            params,
            days,
        } => {
            if let Some(grid) = grid {
                config.backtest.grid_policy = grid.into();
            }
            if let Some(target) = target {
                config.backtest.generator.target_count = target;
            }
            if start.is_some() {
                config.backtest.start_date = start;
            }
            if end.is_some() {
                config.backtest.end_date = end;
            }
            config.validate().context("Invalid backtest configuration")?;
            run_backtest(&config, &params, days)?;
        }
        Commands::Optimize {
            spec,
            top,
            sequential,
            output,
        } => {
            run_optimize(&config, &spec, top, sequential, output.as_deref())?;
        }
    }

    Ok(())
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message);
    pb
}

fn load_dataset(config: &EngineConfig) -> Result<RoundDataset> {
    let dir = config
        .rounds_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ROUNDS_DIR));

    let pb = spinner("Loading rounds...");
    let dataset = load_rounds_dir(&dir)
        .with_context(|| format!("Failed to load rounds from {:?}", dir))?;
    pb.finish_and_clear();

    if dataset.is_empty() {
        bail!("No rounds found in {:?}", dir);
    }
    Ok(dataset)
}

fn build_engine(config: &EngineConfig) -> Result<BacktestEngine> {
    let engine = BacktestEngine::new(config.backtest.clone());
    match &config.teams_dir {
        Some(dir) => {
            let pb = spinner("Loading team histories...");
            let index = load_team_histories(dir)
                .with_context(|| format!("Failed to load team histories from {:?}", dir))?;
            pb.finish_and_clear();
            println!("Team histories: {}", index.len());
            Ok(engine.with_lookup(Arc::new(TeamFormLookup::new(index))))
        }
        None => Ok(engine),
    }
}

fn list_rounds(dataset: &RoundDataset, settled_only: bool) {
    println!("{}", "Rounds:".yellow().bold());
    println!("{:<12} {:>8} {:>8} {:>6}", "Date", "Matches", "Settled", "Teams");
    println!("{}", "-".repeat(40));

    let mut shown = 0;
    for round in dataset.iter().filter(|r| !settled_only || r.is_settled()) {
        let settled = if round.is_settled() {
            "yes".green()
        } else {
            "no".normal()
        };
        let teams = if round.teams.is_some() { "yes" } else { "-" };
        println!("{:<12} {:>8} {:>8} {:>6}", round.date, round.match_count(), settled, teams);
        shown += 1;
    }

    println!("{}", "-".repeat(40));
    println!("{} rounds ({} settled)", shown, dataset.settled().count());
}

fn run_backtest(config: &EngineConfig, params: &[(String, f64)], show_days: bool) -> Result<()> {
    let strategy = config
        .strategy
        .with_overrides(params)
        .context("Invalid strategy parameter")?;

    println!("{}", "Running backtest...".green());
    println!("Strategy: {}", strategy.name());
    println!("Grid policy: {}", config.backtest.grid_policy.name());
    match (&config.backtest.start_date, &config.backtest.end_date) {
        (None, None) => println!("Using all data"),
        (start, end) => println!(
            "Date window: {} .. {}",
            start.as_deref().unwrap_or("*"),
            end.as_deref().unwrap_or("*")
        ),
    }
    println!();

    let dataset = load_dataset(config)?;
    let engine = build_engine(config)?;

    let pb = spinner("Running backtest...");
    let summary = engine.run(&dataset, &strategy).context("Backtest failed")?;
    pb.finish_and_clear();

    engine.print_summary(&strategy, &summary);

    if show_days && !summary.days.is_empty() {
        println!("\n{}", "Per-day results:".yellow().bold());
        println!(
            "{:<12} {:>6} {:>10} {:>12} {:>12} {:>7}",
            "Date", "Bets", "Cost", "Winnings", "Profit", "Lines"
        );
        println!("{}", "-".repeat(64));
        for day in &summary.days {
            let profit = format!("{:>12.1}", day.profit());
            let profit = if day.is_profitable() {
                profit.green()
            } else {
                profit.red()
            };
            println!(
                "{:<12} {:>6} {:>10.0} {:>12.1} {} {:>7}",
                day.date, day.bets, day.cost, day.winnings, profit, day.winning_lines
            );
        }
    }

    let metrics = calculate_metrics(&summary);
    if metrics.avg_bets_per_round < config.backtest.generator.target_count as f64 {
        println!(
            "{} {:.1} bets per round on average (target {})",
            "Note:".yellow(),
            metrics.avg_bets_per_round,
            config.backtest.generator.target_count
        );
    }

    Ok(())
}

fn run_optimize(
    config: &EngineConfig,
    spec_path: &Path,
    top: Option<usize>,
    sequential: bool,
    output: Option<&Path>,
) -> Result<()> {
    let spec = SweepSpec::from_toml_file(spec_path)
        .with_context(|| format!("Failed to load sweep spec from {:?}", spec_path))?;
    let mut search = spec.into_search();
    if let Some(top) = top {
        search.config.top_k = top;
    }
    if sequential {
        search.config.parallel = false;
    }
    search.validate().context("Invalid sweep specification")?;

    let total = search.space.size();
    println!("{}", "Running grid search...".green());
    println!("Base strategy: {}", search.base.name());
    for axis in &search.space.axes {
        println!("  {:<24} {} values", axis.name, axis.values.len());
    }
    println!("Search space: {} combinations", total);
    println!();

    let dataset = load_dataset(config)?;
    let engine = build_engine(config)?;

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    let report = search
        .run_with_progress(&engine, &dataset, |_| pb.inc(1))
        .context("Grid search failed")?;
    pb.finish_and_clear();

    print_report(&report);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {:?}", path))?;
        println!("{}: {:?}", "Saved".green(), path);
    }

    Ok(())
}

fn print_trials(trials: &[Trial]) {
    println!(
        "{:>5} {:>9} {:>12} {:>6}  {}",
        "Trial", "ROI", "Profit", "Days+", "Parameters"
    );
    println!("{}", "-".repeat(72));
    for trial in trials {
        let roi = format!("{:>8.2}%", trial.roi);
        let roi = if trial.roi > 0.0 { roi.green() } else { roi.red() };
        println!(
            "{:>5} {} {:>12.1} {:>6}  {}",
            trial.index,
            roi,
            trial.profit,
            trial.profitable_days,
            trial.params.describe()
        );
    }
}

fn print_report(report: &OptimizationReport) {
    println!("\n{}", "=".repeat(72));
    println!("GRID SEARCH RESULTS ({})", report.strategy_kind);
    println!("{}", "=".repeat(72));
    println!("Trials: {}", report.search_space_size);

    if let Some(best) = &report.best {
        println!(
            "{} ROI {:.2}%, profit {:.1}, profitable days {}",
            "Best:".green().bold(),
            best.roi,
            best.profit,
            best.profitable_days
        );
        println!("  {}", best.params.describe());
    }

    println!("\n{}", "Top trials:".yellow().bold());
    print_trials(&report.top);

    println!("\n{}", "Diverse trials:".yellow().bold());
    print_trials(&report.diverse);
    println!("{}", "=".repeat(72));
}
