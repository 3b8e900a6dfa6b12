//! ou-pairs - Ornstein-Uhlenbeck pairs trading research tool
//!
//! Fits OU hedge ratios and replays the pairs state machine against a paper broker.

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

use ou_pairs::adapters::cli::{self, Command, FitCmd, OutputFormat, SimulateCmd};
use ou_pairs::adapters::paper::PaperBroker;
use ou_pairs::application::{run_paper_session, PairsEngine, SessionReport};
use ou_pairs::config::{load_config, Config};
use ou_pairs::domain::persistence::{EngineSnapshot, RecoveryStatus};
use ou_pairs::strategy::{CointegrationCheck, HedgeRatioSearch, PairsConfig};

fn main() -> Result<()> {
    // Load .env file if it exists (seed overrides go here)
    dotenvy::dotenv().ok();

    let app = cli::init();
    let config = load_config(app.config_path())
        .with_context(|| format!("Failed to load configuration from {}", app.config_path().display()))?;
    init_logging(app.verbose, app.debug, &config.logging.level)?;

    match app.command {
        Command::Simulate(cmd) => simulate_command(cmd, &config),
        Command::Fit(cmd) => fit_command(cmd, &config),
    }
}

fn init_logging(verbose: bool, debug: bool, config_level: &str) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level))
    };

    fmt().with_env_filter(filter).init();
    Ok(())
}

fn simulate_command(cmd: SimulateCmd, config: &Config) -> Result<()> {
    let sim = &config.simulation;
    let seed = cmd.seed.unwrap_or_else(|| sim.get_seed());
    let steps = cmd.steps.unwrap_or(sim.steps);
    let pairs_config = PairsConfig::from(config);

    tracing::info!(seed, steps, "Simulating cointegrated pair");
    let mut rng = StdRng::seed_from_u64(seed);
    let (leg0, leg1) = sim
        .pair()
        .generate(&mut rng, steps, pairs_config.dt)
        .context("Failed to simulate price paths")?;

    let model = config.spread_model().context("Failed to build spread model")?;
    let broker = PaperBroker::new(sim.starting_cash)
        .with_multipliers(pairs_config.sizing.leg0_multiplier, pairs_config.sizing.leg1_multiplier);

    let snapshot_path = cmd.snapshot.clone().or_else(|| sim.snapshot_file.clone());
    let mut engine = match (&snapshot_path, cmd.resume) {
        (Some(path), true) => match EngineSnapshot::try_recover(path) {
            RecoveryStatus::Recovered(snapshot) => {
                PairsEngine::restore(pairs_config, model, broker, *snapshot)
                    .context("Failed to restore session")?
            }
            RecoveryStatus::NoSnapshot => {
                tracing::warn!("No snapshot at {}, starting fresh", path.display());
                PairsEngine::new(pairs_config, model, broker)?
            }
            RecoveryStatus::Corrupted(reason) => {
                bail!("Snapshot {} is corrupted: {}", path.display(), reason)
            }
        },
        (None, true) => bail!("--resume needs --snapshot or [simulation] snapshot_file"),
        _ => PairsEngine::new(pairs_config, model, broker)?,
    };

    let leg0: Vec<Option<f64>> = leg0.into_iter().map(Some).collect();
    let leg1: Vec<Option<f64>> = leg1.into_iter().map(Some).collect();
    let report = run_paper_session(&mut engine, &leg0, &leg1);

    if let Some(path) = cmd.events.as_ref().or(config.logging.events_file.as_ref()) {
        engine
            .events()
            .write_json_lines(path)
            .with_context(|| format!("Failed to write events to {}", path.display()))?;
    }
    if let Some(path) = &snapshot_path {
        engine
            .snapshot()
            .save(path)
            .with_context(|| format!("Failed to save snapshot to {}", path.display()))?;
    }

    print_report(&report, cmd.format)
}

fn print_report(report: &SessionReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            println!("Ticks:            {}", report.ticks);
            println!("Retrains:         {} ({} failed)", report.retrains, report.retrain_failures);
            println!("Entries / exits:  {} / {}", report.entries, report.exits);
            println!("Suppressed:       {}", report.suppressed_entries);
            println!("Fills:            {}", report.fills);
            println!("Final position:   {:?}", report.final_position);
            println!("Final cash:       {:.2}", report.final_cash);
            println!("Final equity:     {:.2}", report.final_equity);
        }
    }
    Ok(())
}

/// Aligned price arrays read by `fit --prices`
#[derive(Debug, Deserialize)]
struct PriceFile {
    leg0: Vec<f64>,
    leg1: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct FitReport {
    a: f64,
    b: f64,
    alpha: f64,
    beta: f64,
    theta: f64,
    mu: f64,
    sigma: f64,
    log_likelihood: f64,
    half_life: f64,
    admissible: usize,
    rejected: usize,
    cointegrated: bool,
    top: Vec<(f64, f64)>,
}

fn load_prices(path: &Path) -> Result<(Vec<f64>, Vec<f64>)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read prices from {}", path.display()))?;
    let prices: PriceFile = serde_json::from_str(&content).context("Failed to parse price file")?;
    Ok((prices.leg0, prices.leg1))
}

fn fit_command(cmd: FitCmd, config: &Config) -> Result<()> {
    let pairs_config = PairsConfig::from(config);

    let (leg0, leg1) = match &cmd.prices {
        Some(path) => load_prices(path)?,
        None => {
            let seed = cmd.seed.unwrap_or_else(|| config.simulation.get_seed());
            let mut rng = StdRng::seed_from_u64(seed);
            config
                .simulation
                .pair()
                .generate(&mut rng, pairs_config.num_train_initial, pairs_config.dt)
                .context("Failed to simulate price paths")?
        }
    };

    let search = HedgeRatioSearch::with_grid(
        pairs_config.dt,
        pairs_config.notional_a,
        pairs_config.hedge_grid(),
        pairs_config.search.objective,
    )?;
    let outcome = search.optimise(&leg0, &leg1).context("Hedge search failed")?;
    let hedge = &outcome.hedge;
    let cointegrated = config
        .cointegration_check()
        .is_cointegrated(&hedge.spread(&leg0, &leg1));

    let mut ranked: Vec<(f64, f64)> = outcome
        .candidates
        .b_values()
        .into_iter()
        .zip(outcome.candidates.log_likelihoods())
        .collect();
    ranked.sort_by(|x, y| y.1.total_cmp(&x.1));
    ranked.truncate(cmd.top);

    let report = FitReport {
        a: hedge.a,
        b: hedge.b,
        alpha: hedge.alpha(),
        beta: hedge.beta(),
        theta: hedge.ou_params.theta,
        mu: hedge.ou_params.mu,
        sigma: hedge.ou_params.sigma,
        log_likelihood: hedge.ou_params.log_likelihood,
        half_life: hedge.ou_params.half_life(),
        admissible: outcome.candidates.admissible.len(),
        rejected: outcome.candidates.rejected.len(),
        cointegrated,
        top: ranked,
    };

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!("Hedge: A = {:.4}, B = {:.4} (alpha {:.6}, beta {:.6})", report.a, report.b, report.alpha, report.beta);
            println!("OU fit: theta {:.6}, mu {:.4}, sigma {:.6}", report.theta, report.mu, report.sigma);
            println!("Log-likelihood: {:.6}, half-life: {:.4}", report.log_likelihood, report.half_life);
            println!("Candidates: {} admissible, {} rejected", report.admissible, report.rejected);
            println!("Cointegrated: {}", report.cointegrated);
            for (b, ll) in &report.top {
                println!("  B = {:.4}  logL = {:.6}", b, ll);
            }
        }
    }

    Ok(())
}
