use serde::{Deserialize, Serialize};

pub const GRID_SIZE: usize = 20;
pub const TICK_RATE_MS: u64 = 1000;
pub const INITIAL_FUNDS: i64 = 5000;

fn default_grid_size() -> usize {
    GRID_SIZE
}

fn default_tick_rate_ms() -> u64 {
    TICK_RATE_MS
}

fn default_initial_funds() -> i64 {
    INITIAL_FUNDS
}

/// Session constants supplied by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityConfig {
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    #[serde(default = "default_initial_funds")]
    pub initial_funds: i64,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            tick_rate_ms: default_tick_rate_ms(),
            initial_funds: default_initial_funds(),
        }
    }
}
