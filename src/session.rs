use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::{
    advisor::CityBriefing,
    engine::SimulationEngine,
    error::PlacementError,
    rng::RngManager,
    scenario::{Scenario, ScheduledPlacement},
    snapshot::SnapshotWriter,
    tools::Tool,
    world::{World, WorldSnapshot},
};

pub struct SessionSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub snapshot_interval_ticks: u64,
    pub snapshot_dir: PathBuf,
}

/// Owns the authoritative city and serializes placements with ticks.
pub struct Session {
    world: World,
    engine: SimulationEngine,
    rng: RngManager,
    snapshot_writer: SnapshotWriter,
    schedule: Vec<ScheduledPlacement>,
    settings: SessionSettings,
}

impl Session {
    pub fn new(settings: SessionSettings, world: World, engine: SimulationEngine) -> Self {
        info!(
            scenario = %settings.scenario_name,
            seed = settings.seed,
            grid_size = engine.grid_size(),
            rules = ?engine.rule_names(),
            "session created"
        );
        Self {
            world,
            engine,
            rng: RngManager::new(settings.seed),
            snapshot_writer: SnapshotWriter::new(
                &settings.snapshot_dir,
                settings.snapshot_interval_ticks,
            ),
            schedule: Vec::new(),
            settings,
        }
    }

    pub fn from_scenario(scenario: &Scenario, settings: SessionSettings) -> Self {
        let engine = SimulationEngine::standard(scenario.city.grid_size);
        Self::new(settings, scenario.build_world(), engine).with_schedule(scenario.placements.clone())
    }

    pub fn with_schedule(mut self, schedule: Vec<ScheduledPlacement>) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    pub fn scenario_name(&self) -> &str {
        &self.settings.scenario_name
    }

    pub fn set_paused(&mut self, paused: bool) {
        if paused != self.world.is_paused() {
            info!(paused, day = self.world.stats().day, "pause toggled");
        }
        self.world.set_paused(paused);
    }

    pub fn place(&mut self, x: usize, y: usize, tool: Tool) -> Result<(), PlacementError> {
        match self.world.place(x, y, tool) {
            Ok(()) => {
                debug!(%tool, x, y, funds = self.world.stats().funds, "placed");
                Ok(())
            }
            Err(err) => {
                warn!(%tool, x, y, error = %err, "placement rejected");
                Err(err)
            }
        }
    }

    /// Runs one tick unless paused. Returns whether a tick happened.
    pub fn tick(&mut self) -> Result<bool> {
        if self.world.is_paused() {
            return Ok(false);
        }

        let day = self.world.stats().day;
        let due: Vec<ScheduledPlacement> = self
            .schedule
            .iter()
            .filter(|p| p.day == day)
            .copied()
            .collect();
        for placement in due {
            // Rejections are already logged; a bad schedule entry is not fatal.
            let _ = self.place(placement.x, placement.y, placement.tool);
        }

        let mut growth = self.rng.stream("growth");
        let (grid, stats) = self
            .engine
            .step(self.world.grid(), self.world.stats(), &mut growth)
            .with_context(|| format!("simulation step failed on day {day}"))?;
        self.world.replace(grid, stats);

        if let Some(path) = self
            .snapshot_writer
            .maybe_write(&self.world, &self.settings.scenario_name)?
        {
            debug!(path = %path.display(), "snapshot written");
        }
        Ok(true)
    }

    pub fn run(&mut self, ticks: u64) -> Result<()> {
        self.run_with_hook(ticks, |_| {})
    }

    /// Like `run`, calling `hook` with a snapshot after every completed tick.
    pub fn run_with_hook<F>(&mut self, ticks: u64, mut hook: F) -> Result<()>
    where
        F: FnMut(WorldSnapshot),
    {
        for _ in 0..ticks {
            if self.tick()? {
                hook(self.snapshot());
            }
        }
        let stats = self.world.stats();
        info!(
            scenario = %self.settings.scenario_name,
            day = stats.day,
            population = stats.population,
            funds = stats.funds,
            "run finished"
        );
        Ok(())
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        self.world.snapshot(&self.settings.scenario_name)
    }

    pub fn briefing(&self) -> CityBriefing {
        CityBriefing::new(self.world.stats(), self.world.grid())
    }
}
