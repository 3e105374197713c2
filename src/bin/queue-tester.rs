//! Queue Tester CLI Tool
//!
//! Command-line tool for exercising the matchmaker against scripted queue
//! scenarios, using characters from the catalog.
//!
//! Usage:
//!   cargo run --bin queue-tester -- --help
//!   cargo run --bin queue-tester run-scenario --scenario single-team
//!   cargo run --bin queue-tester run-all-scenarios
//!   cargo run --bin queue-tester try --roles TANK,HEALER,ASSASSIN,ASSASSIN,BRUISER
//!   cargo run --bin queue-tester catalog

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use role_matchmaker::config::parse_role_list;
use role_matchmaker::{
    CharacterCatalog, CharacterId, CharacterRoster, FormationConfig, FormationError, Matchmaker,
    PlayerFactory, RatingRange, Role,
};

#[derive(Parser)]
#[command(name = "queue-tester")]
#[command(about = "Scripted queue testing tool for role-matchmaker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Character catalog to draw players from
    #[arg(long, default_value = "data/characters.json")]
    catalog: PathBuf,

    /// Let flex slots take surplus tanks and healers
    #[arg(long)]
    overflow_flex: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a predefined test scenario
    RunScenario {
        /// Scenario name (single-team, missing-healer, full-match, single-healer, unbalanced)
        #[arg(short, long)]
        scenario: String,
    },
    /// Run all test scenarios
    RunAllScenarios,
    /// Queue players with the given roles and attempt a team or match
    Try {
        /// Comma separated roles in queue order
        #[arg(short, long)]
        roles: String,
        /// Attempt a full match instead of a single team
        #[arg(short, long)]
        r#match: bool,
        /// Rating for every queued player (random when omitted)
        #[arg(long)]
        mmr: Option<u32>,
    },
    /// List the characters in the catalog
    Catalog,
}

/// What a formation step is expected to produce
#[derive(Debug, Clone, Copy)]
enum Expect {
    Success,
    Failure(&'static str),
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Queue { role: Role, mmr: u32 },
    FormTeam(Expect),
    FormMatch(Expect),
    ExpectWaiting(usize),
}

struct Scenario {
    name: &'static str,
    description: &'static str,
    steps: Vec<Step>,
}

fn queue_all(roles: &[Role], mmr: u32) -> impl Iterator<Item = Step> + '_ {
    roles.iter().map(move |&role| Step::Queue { role, mmr })
}

/// Predefined scenarios
struct TestScenarios;

impl TestScenarios {
    const NAMES: [&'static str; 5] = [
        "single-team",
        "missing-healer",
        "full-match",
        "single-healer",
        "unbalanced",
    ];

    fn by_name(name: &str) -> Option<Scenario> {
        match name.to_lowercase().as_str() {
            "single-team" => Some(Self::single_team()),
            "missing-healer" => Some(Self::missing_healer()),
            "full-match" => Some(Self::full_match()),
            "single-healer" => Some(Self::single_healer()),
            "unbalanced" => Some(Self::unbalanced()),
            _ => None,
        }
    }

    /// Four players cannot form a team; a fifth completes it
    fn single_team() -> Scenario {
        let mut steps: Vec<Step> = queue_all(
            &[Role::Tank, Role::Healer, Role::Assassin, Role::Assassin],
            2000,
        )
        .collect();
        steps.push(Step::FormTeam(Expect::Failure("insufficient_players")));
        steps.push(Step::Queue {
            role: Role::Bruiser,
            mmr: 2000,
        });
        steps.push(Step::FormTeam(Expect::Success));
        steps.push(Step::ExpectWaiting(0));

        Scenario {
            name: "single-team",
            description: "4 players fail, the 5th completes a team",
            steps,
        }
    }

    fn missing_healer() -> Scenario {
        let mut steps: Vec<Step> = queue_all(
            &[
                Role::Tank,
                Role::Assassin,
                Role::Assassin,
                Role::Bruiser,
                Role::Bruiser,
            ],
            2000,
        )
        .collect();
        steps.push(Step::FormTeam(Expect::Failure("missing_required_role")));
        steps.push(Step::ExpectWaiting(5));

        Scenario {
            name: "missing-healer",
            description: "No healer queued, nobody leaves the queue",
            steps,
        }
    }

    fn full_match() -> Scenario {
        let mut steps: Vec<Step> = queue_all(
            &[
                Role::Tank,
                Role::Tank,
                Role::Healer,
                Role::Healer,
                Role::Assassin,
                Role::Assassin,
                Role::Assassin,
                Role::Assassin,
                Role::Bruiser,
                Role::Bruiser,
            ],
            2400,
        )
        .collect();
        steps.push(Step::FormMatch(Expect::Success));
        steps.push(Step::ExpectWaiting(0));

        Scenario {
            name: "full-match",
            description: "10 players with two of each required role form a match",
            steps,
        }
    }

    fn single_healer() -> Scenario {
        let mut steps: Vec<Step> = queue_all(
            &[
                Role::Tank,
                Role::Tank,
                Role::Healer,
                Role::Assassin,
                Role::Assassin,
                Role::Assassin,
                Role::Assassin,
                Role::Bruiser,
                Role::Bruiser,
                Role::Bruiser,
            ],
            2400,
        )
        .collect();
        steps.push(Step::FormMatch(Expect::Failure("missing_required_role")));
        steps.push(Step::ExpectWaiting(10));

        Scenario {
            name: "single-healer",
            description: "Team B has no healer, team A goes back to the queues",
            steps,
        }
    }

    fn unbalanced() -> Scenario {
        let mut steps = Vec::new();
        // Front of each queue is strong, second is weak
        for role in [Role::Tank, Role::Healer] {
            steps.push(Step::Queue { role, mmr: 3400 });
            steps.push(Step::Queue { role, mmr: 1600 });
        }
        steps.extend(queue_all(&[Role::Assassin; 3], 3400));
        steps.extend(queue_all(&[Role::Assassin; 3], 1600));
        steps.push(Step::FormMatch(Expect::Failure("unbalanced_teams")));
        steps.push(Step::ExpectWaiting(10));

        Scenario {
            name: "unbalanced",
            description: "Both teams form but the rating gap is too wide",
            steps,
        }
    }
}

/// Runs scenarios against a fresh matchmaker each time
struct QueueTester {
    catalog: Arc<CharacterRoster>,
    formation: FormationConfig,
    by_role: HashMap<Role, Vec<CharacterId>>,
}

impl QueueTester {
    fn new(catalog: CharacterRoster, formation: FormationConfig) -> Self {
        let mut by_role: HashMap<Role, Vec<CharacterId>> = HashMap::new();
        for template in catalog.all_characters() {
            by_role.entry(template.role).or_default().push(template.id);
        }

        Self {
            catalog: Arc::new(catalog),
            formation,
            by_role,
        }
    }

    fn fresh(&self) -> Result<(Matchmaker, PlayerFactory)> {
        let matchmaker = Matchmaker::new(self.formation.clone())?;
        let factory = PlayerFactory::new(self.catalog.clone(), RatingRange::default());
        Ok((matchmaker, factory))
    }

    /// Character for the `nth` player of `role`, cycling through the catalog
    fn character_for(&self, role: Role, nth: usize) -> Result<CharacterId> {
        self.by_role
            .get(&role)
            .filter(|ids| !ids.is_empty())
            .map(|ids| ids[nth % ids.len()])
            .ok_or_else(|| anyhow!("Catalog has no {} characters", role))
    }

    fn check<T>(
        operation: &str,
        result: std::result::Result<T, FormationError>,
        expect: Expect,
    ) -> Result<()> {
        match (result, expect) {
            (Ok(_), Expect::Success) => Ok(()),
            (Err(e), Expect::Failure(reason)) if e.reason() == reason => {
                println!("    {} failed as expected: {}", operation, e);
                Ok(())
            }
            (Ok(_), Expect::Failure(reason)) => Err(anyhow!(
                "{} succeeded but was expected to fail with {}",
                operation,
                reason
            )),
            (Err(e), _) => Err(anyhow!("{} failed unexpectedly: {}", operation, e)),
        }
    }

    fn run_scenario(&self, scenario: &Scenario) -> Result<()> {
        let (matchmaker, factory) = self.fresh()?;
        let mut per_role = HashMap::new();

        for step in &scenario.steps {
            match *step {
                Step::Queue { role, mmr } => {
                    let nth = per_role.entry(role).or_insert(0usize);
                    let character_id = self.character_for(role, *nth)?;
                    *nth += 1;
                    matchmaker.add_player(factory.create_player_with_mmr(character_id, mmr)?);
                }
                Step::FormTeam(expect) => {
                    let result = matchmaker.try_create_team();
                    if let Ok(team) = &result {
                        println!(
                            "    Team: {:?}",
                            team.players()
                                .iter()
                                .map(|p| format!("{} ({})", p.name, p.role))
                                .collect::<Vec<_>>()
                        );
                    }
                    Self::check("team", result, expect)?;
                }
                Step::FormMatch(expect) => {
                    let result = matchmaker.try_create_match();
                    if let Ok(game) = &result {
                        println!(
                            "    Match {}: avg {:.1} vs {:.1}",
                            game.id, game.avg_mmr_a, game.avg_mmr_b
                        );
                    }
                    Self::check("match", result, expect)?;
                }
                Step::ExpectWaiting(expected) => {
                    let waiting = matchmaker.total_queued();
                    if waiting != expected {
                        return Err(anyhow!(
                            "expected {} players waiting, found {}",
                            expected,
                            waiting
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn try_roles(&self, roles: &[Role], full_match: bool, mmr: Option<u32>) -> Result<()> {
        let (matchmaker, factory) = self.fresh()?;
        for (nth, &role) in roles.iter().enumerate() {
            let character_id = self.character_for(role, nth)?;
            let player = match mmr {
                Some(mmr) => factory.create_player_with_mmr(character_id, mmr)?,
                None => factory.create_player(character_id)?,
            };
            println!(
                "  + {} '{}' ({}) mmr {}",
                player.id, player.name, player.role, player.mmr
            );
            matchmaker.add_player(player);
        }

        if full_match {
            match matchmaker.try_create_match() {
                Ok(game) => {
                    println!("✅ Match {} formed", game.id);
                    for (label, team, avg) in [
                        ("A", &game.team_a, game.avg_mmr_a),
                        ("B", &game.team_b, game.avg_mmr_b),
                    ] {
                        println!("  Team {} (avg {:.1}):", label, avg);
                        for p in team.players() {
                            println!("    - {} ({}) {}", p.name, p.role, p.mmr);
                        }
                    }
                }
                Err(e) => println!("❌ No match: {}", e),
            }
        } else {
            match matchmaker.try_create_team() {
                Ok(team) => {
                    println!("✅ Team formed (avg {:.1}):", team.average_mmr());
                    for p in team.players() {
                        println!("    - {} ({}) {}", p.name, p.role, p.mmr);
                    }
                }
                Err(e) => println!("❌ No team: {}", e),
            }
        }

        let status = matchmaker.queue_status();
        println!("📊 Still waiting: {}", status.total());
        for role in Role::ALL {
            println!("  {:<10} {}", role.as_str(), status.role(role).len());
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let catalog = match CharacterRoster::from_file(&cli.catalog) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("❌ Failed to load catalog: {}", e);
            std::process::exit(1);
        }
    };
    let formation = if cli.overflow_flex {
        FormationConfig::with_overflow_flex()
    } else {
        FormationConfig::default()
    };
    let tester = QueueTester::new(catalog, formation);

    match cli.command {
        Commands::RunScenario { scenario } => {
            let Some(config) = TestScenarios::by_name(&scenario) else {
                eprintln!(
                    "❌ Unknown scenario '{}'. Available: {}",
                    scenario,
                    TestScenarios::NAMES.join(", ")
                );
                std::process::exit(1);
            };

            println!("🧪 Running scenario: {} - {}", config.name, config.description);
            match tester.run_scenario(&config) {
                Ok(()) => println!("✅ Scenario completed successfully!"),
                Err(e) => {
                    eprintln!("❌ Scenario failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::RunAllScenarios => {
            let mut passed = 0;
            let mut failed = 0;

            println!("🧪 Running all test scenarios...\n");

            for name in TestScenarios::NAMES {
                let Some(config) = TestScenarios::by_name(name) else {
                    continue;
                };
                println!("Running '{}' scenario...", name);
                match tester.run_scenario(&config) {
                    Ok(()) => {
                        println!("✅ PASSED");
                        passed += 1;
                    }
                    Err(e) => {
                        println!("❌ FAILED ({})", e);
                        failed += 1;
                    }
                }
            }

            println!("\n📊 Results: {} passed, {} failed", passed, failed);
            if failed > 0 {
                std::process::exit(1);
            }
        }

        Commands::Try {
            roles,
            r#match,
            mmr,
        } => {
            let roles = parse_role_list(&roles)?;
            tester.try_roles(&roles, r#match, mmr)?;
        }

        Commands::Catalog => {
            println!("📖 {} characters:", tester.catalog.character_count());
            for template in tester.catalog.all_characters() {
                println!("  {:>3}  {:<14} {}", template.id, template.name, template.role);
            }
        }
    }

    Ok(())
}
