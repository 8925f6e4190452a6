use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tilecity::{
    advisor::{Advisor, HttpAdvisor},
    scenario::ScenarioLoader,
    session::{Session, SessionSettings},
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Tile city growth simulation")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/starter_town.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override snapshot interval in ticks
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Serve the city over HTTP and tick in real time instead of running headless
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let settings = SessionSettings {
        scenario_name: scenario.name.clone(),
        seed: scenario.seed,
        snapshot_interval_ticks: cli
            .snapshot_interval
            .unwrap_or(scenario.snapshot_interval_ticks),
        snapshot_dir: cli
            .snapshot_dir
            .unwrap_or_else(|| PathBuf::from("snapshots")),
    };
    let mut session = Session::from_scenario(&scenario, settings);

    if cli.serve {
        let advisor = match HttpAdvisor::from_env() {
            Ok(advisor) => {
                info!(model = advisor.model(), format = ?advisor.format(), "city advisor configured");
                Some(Arc::new(advisor) as Arc<dyn Advisor>)
            }
            Err(err) => {
                warn!(error = %err, "city advisor disabled");
                None
            }
        };
        let runtime = tokio::runtime::Runtime::new()?;
        return runtime.block_on(web::run(WebServerConfig {
            session,
            tick_rate_ms: scenario.city.tick_rate_ms,
            host: cli.host,
            port: cli.port,
            advisor,
        }));
    }

    let ticks = scenario.ticks(cli.ticks);
    session.run(ticks)?;
    let stats = session.world().stats();
    println!(
        "Scenario '{}' finished on day {}. Population: {}, funds: {}",
        scenario.name, stats.day, stats.population, stats.funds
    );
    Ok(())
}
