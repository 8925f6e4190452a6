use crate::{
    engine::{TileContext, TileYield, ZoneRule},
    grid::{ZoneType, MAX_LEVEL},
    rng::RandomSource,
};

pub struct IndustrialRule {
    pub growth_chance: f64,
}

impl IndustrialRule {
    pub fn new() -> Self {
        Self { growth_chance: 0.4 }
    }
}

impl Default for IndustrialRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneRule for IndustrialRule {
    fn name(&self) -> &str {
        "industrial"
    }

    fn zone(&self) -> ZoneType {
        ZoneType::Industrial
    }

    fn evolve(&self, ctx: &TileContext<'_>, rng: &mut dyn RandomSource) -> u8 {
        let level = ctx.tile.level;
        if ctx.has_road_access() && rng.chance(self.growth_chance) {
            return level.saturating_add(1).min(MAX_LEVEL);
        }
        level
    }

    fn tile_yield(&self, level: u8) -> TileYield {
        TileYield {
            population: 0,
            income: level as i64 * 2,
        }
    }
}
