use crate::{
    engine::{TileContext, TileYield, ZoneRule},
    grid::{ZoneType, MAX_LEVEL},
    rng::RandomSource,
};

/// Housing grows next to roads and decays without them.
pub struct ResidentialRule {
    pub growth_chance: f64,
    pub decay_chance: f64,
}

impl ResidentialRule {
    pub fn new() -> Self {
        Self {
            growth_chance: 0.3,
            decay_chance: 0.2,
        }
    }
}

impl Default for ResidentialRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneRule for ResidentialRule {
    fn name(&self) -> &str {
        "residential"
    }

    fn zone(&self) -> ZoneType {
        ZoneType::Residential
    }

    fn evolve(&self, ctx: &TileContext<'_>, rng: &mut dyn RandomSource) -> u8 {
        let level = ctx.tile.level;
        if ctx.has_road_access() {
            if rng.chance(self.growth_chance) {
                return level.saturating_add(1).min(MAX_LEVEL);
            }
        } else if rng.chance(self.decay_chance) {
            return level.saturating_sub(1);
        }
        level
    }

    fn tile_yield(&self, level: u8) -> TileYield {
        TileYield {
            population: level as u64 * 2,
            income: level as i64,
        }
    }
}
