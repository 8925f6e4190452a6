use serde::{Deserialize, Serialize};

use crate::{
    config::CityConfig,
    error::PlacementError,
    grid::{Grid, Tile, ZoneCensus},
    tools::Tool,
};

/// City-wide aggregates. Population and income are recomputed each tick;
/// funds accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityStats {
    pub day: u64,
    pub population: u64,
    pub income: i64,
    pub funds: i64,
}

impl CityStats {
    pub fn new(initial_funds: i64) -> Self {
        Self {
            day: 1,
            population: 0,
            income: 0,
            funds: initial_funds,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub scenario: String,
    pub stats: CityStats,
    pub paused: bool,
    pub census: ZoneCensus,
    pub grid_size: usize,
    pub tiles: Vec<Tile>,
}

/// The authoritative city state a driver holds between ticks.
pub struct World {
    grid: Grid,
    stats: CityStats,
    paused: bool,
}

impl World {
    pub fn new(config: &CityConfig) -> Self {
        Self {
            grid: Grid::create_initial(config.grid_size),
            stats: CityStats::new(config.initial_funds),
            paused: false,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn stats(&self) -> &CityStats {
        &self.stats
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Applies `tool` against the current funds and charges its cost only when
    /// the grid accepted it.
    pub fn place(&mut self, x: usize, y: usize, tool: Tool) -> Result<(), PlacementError> {
        self.grid.apply_tool(x, y, tool, self.stats.funds)?;
        self.stats.funds -= tool.cost();
        Ok(())
    }

    /// Swaps in the pair produced by a simulation step.
    pub fn replace(&mut self, grid: Grid, stats: CityStats) {
        self.grid = grid;
        self.stats = stats;
    }

    pub fn snapshot(&self, scenario: &str) -> WorldSnapshot {
        WorldSnapshot {
            scenario: scenario.to_string(),
            stats: self.stats,
            paused: self.paused,
            census: self.grid.census(),
            grid_size: self.grid.size(),
            tiles: self.grid.tiles().copied().collect(),
        }
    }
}
