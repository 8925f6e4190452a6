use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::world::World;

/// Writes a JSON snapshot of the world every `interval_ticks` days.
pub struct SnapshotWriter {
    output_dir: PathBuf,
    interval_ticks: u64,
}

impl SnapshotWriter {
    pub fn new(output_dir: impl AsRef<Path>, interval_ticks: u64) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            interval_ticks,
        }
    }

    /// Snapshots are keyed by ticks completed, which is `day - 1`.
    pub fn maybe_write(&self, world: &World, scenario_name: &str) -> Result<Option<PathBuf>> {
        if self.interval_ticks == 0 {
            return Ok(None);
        }
        let tick = world.stats().day.saturating_sub(1);
        if tick == 0 || tick % self.interval_ticks != 0 {
            return Ok(None);
        }

        let dir = self.output_dir.join(scenario_name);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;
        let path = dir.join(format!("tick_{tick:06}.json"));
        let json = serde_json::to_string_pretty(&world.snapshot(scenario_name))?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        Ok(Some(path))
    }
}
