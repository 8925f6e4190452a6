use crate::{
    engine::{TileContext, TileYield, ZoneRule},
    grid::{ZoneType, MAX_LEVEL},
    rng::RandomSource,
};

/// Shops need both a road and customers next door. They never shrink.
pub struct CommercialRule {
    pub growth_chance: f64,
}

impl CommercialRule {
    pub fn new() -> Self {
        Self { growth_chance: 0.4 }
    }
}

impl Default for CommercialRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneRule for CommercialRule {
    fn name(&self) -> &str {
        "commercial"
    }

    fn zone(&self) -> ZoneType {
        ZoneType::Commercial
    }

    fn evolve(&self, ctx: &TileContext<'_>, rng: &mut dyn RandomSource) -> u8 {
        let level = ctx.tile.level;
        if ctx.has_road_access()
            && ctx.near_developed(ZoneType::Residential)
            && rng.chance(self.growth_chance)
        {
            return level.saturating_add(1).min(MAX_LEVEL);
        }
        level
    }

    fn tile_yield(&self, level: u8) -> TileYield {
        TileYield {
            population: 0,
            income: level as i64 * 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::rng::{AlwaysSucceed, RecordingSource, ScriptedSource};
    use crate::tools::Tool;

    #[test]
    fn needs_road_and_residents() {
        let rule = CommercialRule::new();
        let mut grid = Grid::create_initial(4);
        grid.apply_tool_at(1, 1, Tool::Commercial, i64::MAX, 0).unwrap();
        grid.apply_tool_at(1, 0, Tool::Road, i64::MAX, 0).unwrap();

        let ctx = TileContext::new(&grid, grid.get(1, 1).unwrap());
        let mut source = ScriptedSource::new(std::iter::empty(), true);
        assert_eq!(rule.evolve(&ctx, &mut source), 1);
        assert_eq!(source.draws(), 0, "no draw without a residential neighbour");

        grid.apply_tool_at(1, 2, Tool::Residential, i64::MAX, 0).unwrap();
        let ctx = TileContext::new(&grid, grid.get(1, 1).unwrap());
        assert_eq!(rule.evolve(&ctx, &mut AlwaysSucceed), 2);
    }

    #[test]
    fn undeveloped_housing_does_not_count() {
        let rule = CommercialRule::new();
        let mut grid = Grid::create_initial(4);
        grid.apply_tool_at(1, 1, Tool::Commercial, i64::MAX, 0).unwrap();
        grid.apply_tool_at(1, 0, Tool::Road, i64::MAX, 0).unwrap();
        grid.apply_tool_at(1, 2, Tool::Residential, i64::MAX, 0).unwrap();
        grid.get_mut(1, 2).unwrap().level = 0;

        let ctx = TileContext::new(&grid, grid.get(1, 1).unwrap());
        assert_eq!(rule.evolve(&ctx, &mut AlwaysSucceed), 1);
    }

    fn connected_shop() -> Grid {
        let mut grid = Grid::create_initial(4);
        grid.apply_tool_at(1, 1, Tool::Commercial, i64::MAX, 0).unwrap();
        grid.apply_tool_at(1, 0, Tool::Road, i64::MAX, 0).unwrap();
        grid.apply_tool_at(1, 2, Tool::Residential, i64::MAX, 0).unwrap();
        grid
    }

    #[test]
    fn connected_shop_rolls_forty_percent() {
        let grid = connected_shop();
        let ctx = TileContext::new(&grid, grid.get(1, 1).unwrap());
        let mut source = RecordingSource::new(false);
        assert_eq!(CommercialRule::new().evolve(&ctx, &mut source), 1);
        assert_eq!(source.probabilities(), &[0.4]);
    }

    #[test]
    fn saturated_level_does_not_overflow() {
        let mut grid = connected_shop();
        grid.get_mut(1, 1).unwrap().level = u8::MAX;
        let ctx = TileContext::new(&grid, grid.get(1, 1).unwrap());
        assert_eq!(CommercialRule::new().evolve(&ctx, &mut AlwaysSucceed), MAX_LEVEL);
    }

    #[test]
    fn yield_is_three_per_level() {
        assert_eq!(CommercialRule::new().tile_yield(4).income, 12);
    }
}
