//! Main entry point for the Role Matchmaker simulation service
//!
//! Loads the character catalog, then keeps queueing randomly generated
//! players and attempting matches on an interval until shutdown.

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use role_matchmaker::config::AppConfig;
use role_matchmaker::{CharacterRoster, FormationConfig, Matchmaker, PlayerFactory};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::time::{interval, Duration};
use tracing::{error, info, warn};

/// Role Matchmaker - balanced 5v5 matches from per-role queues
#[derive(Parser)]
#[command(
    name = "role-matchmaker",
    version,
    about = "Forms role-complete, rating-balanced 5v5 matches from per-role queues",
    long_about = "Role Matchmaker holds waiting players in one queue per role (tank, healer, \
                 assassin, bruiser), assembles teams of one tank, one healer and three flex \
                 players, and pairs two teams into a match when their average ratings are \
                 within the balance threshold. This binary runs a simulation that keeps \
                 queueing random players from the character catalog."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Character catalog override
    #[arg(long, value_name = "FILE", help = "Override character catalog path")]
    catalog: Option<PathBuf>,

    /// Balance threshold override
    #[arg(long, value_name = "MMR", help = "Override the team balance threshold")]
    balance_threshold: Option<f64>,

    /// Allow flex slots to take surplus tanks and healers
    #[arg(long, help = "Let flex slots fall back to the tank and healer queues")]
    overflow_flex: bool,

    /// Stop after this many seconds
    #[arg(long, value_name = "SECONDS", help = "Stop the simulation after a fixed time")]
    duration_seconds: Option<u64>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and catalog, then exit without running"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Keep queueing random players from the catalog
async fn spawn_players_task(
    matchmaker: Matchmaker,
    factory: Arc<PlayerFactory>,
    every: Duration,
) {
    let mut ticker = interval(every);
    let mut rng = StdRng::from_entropy();

    loop {
        ticker.tick().await;

        let Some(character_id) = factory.random_character_id(&mut rng) else {
            warn!("Character catalog is empty, nothing to queue");
            continue;
        };

        match factory.create_player_with_rng(character_id, &mut rng) {
            Ok(player) => matchmaker.add_player(player),
            Err(e) => warn!("Failed to create player: {}", e),
        }
    }
}

/// Attempt matches on an interval, draining as many as the queues allow
async fn matchmaking_task(matchmaker: Matchmaker, every: Duration) {
    let mut ticker = interval(every);

    loop {
        ticker.tick().await;

        while let Ok(game) = matchmaker.try_create_match() {
            info!(
                "Match {} ready: {:?} vs {:?}",
                game.id,
                game.team_a
                    .players()
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect::<Vec<_>>(),
                game.team_b
                    .players()
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect::<Vec<_>>()
            );
        }
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig, formation: &FormationConfig) {
    info!("🚀 Role Matchmaker");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   Catalog: {}", config.roster.catalog_path.display());
    info!(
        "   Ratings: {}..={}",
        config.roster.mmr_min, config.roster.mmr_max
    );
    info!("   Flex roles: {:?}", formation.flex_roles);
    info!("   Balance threshold: {:.1}", formation.balance_threshold);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(catalog) = &args.catalog {
        config.roster.catalog_path = catalog.clone();
    }

    if let Some(threshold) = args.balance_threshold {
        config.matchmaking.balance_threshold = threshold;
    }

    if args.overflow_flex {
        config.matchmaking.flex_roles = FormationConfig::with_overflow_flex().flex_roles;
    }

    role_matchmaker::config::validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let formation = config.formation_config();
    display_startup_banner(&config, &formation);

    let roster = match CharacterRoster::from_file(&config.roster.catalog_path) {
        Ok(roster) => roster,
        Err(e) => {
            error!("Failed to load character catalog: {}", e);
            std::process::exit(1);
        }
    };
    let factory = Arc::new(PlayerFactory::new(
        Arc::new(roster),
        config.rating_range()?,
    ));
    let matchmaker = Matchmaker::new(formation)?;

    if args.dry_run {
        info!("Configuration and catalog validation successful");
        info!("Dry run completed - exiting without starting simulation");
        return Ok(());
    }

    let spawner = tokio::spawn(spawn_players_task(
        matchmaker.clone(),
        factory.clone(),
        config.spawn_interval(),
    ));
    let matcher = tokio::spawn(matchmaking_task(
        matchmaker.clone(),
        config.match_interval(),
    ));

    info!("✅ Role Matchmaker simulation is running");
    info!("Press Ctrl+C to shutdown gracefully...");

    match args.duration_seconds {
        Some(seconds) => {
            tokio::select! {
                _ = wait_for_shutdown_signal() => {},
                _ = tokio::time::sleep(Duration::from_secs(seconds)) => {
                    info!("Simulation duration of {}s elapsed", seconds);
                },
            }
        }
        None => wait_for_shutdown_signal().await,
    }

    info!("🛑 Shutting down...");
    spawner.abort();
    matcher.abort();

    let stats = matchmaker.stats();
    info!("   Players created: {}", factory.issued_count());
    info!("   Players queued: {}", stats.players_queued);
    info!("   Matches formed: {}", stats.matches_formed);
    info!("   Players matched: {}", stats.players_matched);
    info!("   Still waiting: {}", stats.total_waiting());
    for (reason, count) in &stats.failures {
        info!("   Failed attempts ({}): {}", reason, count);
    }

    info!("🛑 Role Matchmaker stopped");
    Ok(())
}
