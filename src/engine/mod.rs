use std::collections::HashMap;
use std::ops::AddAssign;

use tracing::debug;

use crate::{
    error::SimulationError,
    grid::{Grid, Tile, ZoneType, MAX_LEVEL},
    rng::RandomSource,
    systems::{CommercialRule, IndustrialRule, ResidentialRule},
    world::CityStats,
};

/// A tile and its in-grid orthogonal neighbours, all taken from the pre-tick grid.
pub struct TileContext<'a> {
    pub tile: &'a Tile,
    pub neighbors: Vec<&'a Tile>,
}

impl<'a> TileContext<'a> {
    pub fn new(grid: &'a Grid, tile: &'a Tile) -> Self {
        Self {
            tile,
            neighbors: grid.neighbors_of(tile.x, tile.y),
        }
    }

    pub fn has_road_access(&self) -> bool {
        self.neighbors.iter().any(|n| n.zone == ZoneType::Road)
    }

    /// At least one neighbour of `zone` with a level above zero.
    pub fn near_developed(&self, zone: ZoneType) -> bool {
        self.neighbors.iter().any(|n| n.zone == zone && n.level > 0)
    }

    /// Only possible on a 1x1 grid.
    pub fn is_isolated(&self) -> bool {
        self.neighbors.is_empty()
    }
}

/// What one tile adds to the city totals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TileYield {
    pub population: u64,
    pub income: i64,
}

impl AddAssign for TileYield {
    fn add_assign(&mut self, rhs: Self) {
        self.population += rhs.population;
        self.income += rhs.income;
    }
}

/// Growth rule and yield table for one zone type.
pub trait ZoneRule: Send + Sync {
    fn name(&self) -> &str;
    fn zone(&self) -> ZoneType;
    /// Level the tile should have after this tick.
    fn evolve(&self, ctx: &TileContext<'_>, rng: &mut dyn RandomSource) -> u8;
    fn tile_yield(&self, level: u8) -> TileYield;
}

pub struct EngineBuilder {
    grid_size: usize,
    rules: HashMap<ZoneType, Box<dyn ZoneRule>>,
}

impl EngineBuilder {
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid_size,
            rules: HashMap::new(),
        }
    }

    /// Registers `rule`, replacing any earlier rule for the same zone.
    pub fn with_rule(mut self, rule: impl ZoneRule + 'static) -> Self {
        self.push_rule(rule);
        self
    }

    pub fn push_rule(&mut self, rule: impl ZoneRule + 'static) {
        self.rules.insert(rule.zone(), Box::new(rule));
    }

    pub fn build(self) -> SimulationEngine {
        SimulationEngine {
            grid_size: self.grid_size,
            rules: self.rules,
        }
    }
}

/// Stateless tick function over `(Grid, CityStats)`.
pub struct SimulationEngine {
    grid_size: usize,
    rules: HashMap<ZoneType, Box<dyn ZoneRule>>,
}

impl SimulationEngine {
    /// Residential, commercial and industrial rules for a `grid_size` city.
    pub fn standard(grid_size: usize) -> Self {
        EngineBuilder::new(grid_size)
            .with_rule(ResidentialRule::new())
            .with_rule(CommercialRule::new())
            .with_rule(IndustrialRule::new())
            .build()
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Registered rule names, sorted.
    pub fn rule_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.values().map(|rule| rule.name()).collect();
        names.sort_unstable();
        names
    }

    fn check_shape(&self, grid: &Grid) -> Result<(), SimulationError> {
        if grid.size() != self.grid_size {
            return Err(SimulationError::InvalidGridShape {
                expected: self.grid_size,
                found: format!("{}x{} ({} tiles)", grid.size(), grid.size(), grid.tiles().count()),
            });
        }
        match grid.defect() {
            Some(found) => Err(SimulationError::InvalidGridShape {
                expected: self.grid_size,
                found,
            }),
            None => Ok(()),
        }
    }

    /// Advances the city one tick. Neighbour checks read `grid` only and level
    /// changes land in a fresh copy, so tile order never leaks into the result
    /// except through the order of random draws (x-major, then y).
    pub fn step(
        &self,
        grid: &Grid,
        stats: &CityStats,
        rng: &mut dyn RandomSource,
    ) -> Result<(Grid, CityStats), SimulationError> {
        self.check_shape(grid)?;

        let mut next = grid.clone();
        let mut total = TileYield::default();
        for tile in grid.tiles() {
            let Some(rule) = self.rules.get(&tile.zone) else {
                continue;
            };
            let ctx = TileContext::new(grid, tile);
            if ctx.is_isolated() {
                continue;
            }
            let level = rule.evolve(&ctx, rng).min(MAX_LEVEL);
            if let Some(slot) = next.get_mut(tile.x, tile.y) {
                slot.level = level;
            }
            total += rule.tile_yield(level);
        }

        let next_stats = CityStats {
            day: stats.day + 1,
            population: total.population,
            income: total.income,
            funds: stats.funds + total.income,
        };
        debug!(
            day = next_stats.day,
            population = next_stats.population,
            income = next_stats.income,
            funds = next_stats.funds,
            "tick"
        );
        Ok((next, next_stats))
    }

    /// Population and income implied by the levels currently on `grid`.
    pub fn tally(&self, grid: &Grid) -> TileYield {
        let mut total = TileYield::default();
        for tile in grid.tiles() {
            let Some(rule) = self.rules.get(&tile.zone) else {
                continue;
            };
            if TileContext::new(grid, tile).is_isolated() {
                continue;
            }
            total += rule.tile_yield(tile.level);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{AlwaysSucceed, NeverSucceed, RecordingSource, ScriptedSource};
    use crate::tools::Tool;

    fn place(grid: &mut Grid, x: usize, y: usize, tool: Tool) {
        grid.apply_tool_at(x, y, tool, i64::MAX, 0).unwrap();
    }

    #[test]
    fn wrong_size_grid_is_rejected() {
        let engine = SimulationEngine::standard(20);
        let grid = Grid::create_initial(10);
        let err = engine
            .step(&grid, &CityStats::new(0), &mut AlwaysSucceed)
            .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::InvalidGridShape { expected: 20, .. }
        ));
    }

    #[test]
    fn out_of_range_level_is_rejected_before_any_draw() {
        let engine = SimulationEngine::standard(4);
        let mut grid = Grid::create_initial(4);
        place(&mut grid, 0, 0, Tool::Road);
        place(&mut grid, 0, 1, Tool::Industrial);
        grid.get_mut(0, 1).unwrap().level = u8::MAX;

        let mut source = ScriptedSource::new(std::iter::empty(), true);
        let err = engine
            .step(&grid, &CityStats::new(0), &mut source)
            .unwrap_err();
        let SimulationError::InvalidGridShape { expected, found } = err;
        assert_eq!(expected, 4);
        assert!(found.contains("level 255"), "{found}");
        assert_eq!(source.draws(), 0);

        grid.get_mut(0, 1).unwrap().level = 1;
        grid.get_mut(0, 0).unwrap().level = 3;
        assert!(engine.step(&grid, &CityStats::new(0), &mut AlwaysSucceed).is_err());
    }

    #[test]
    fn neighbor_checks_use_pre_tick_levels() {
        // Commercial at (0,1) needs a developed residential neighbour. The
        // residential at (0,0) starts at 0 and grows this tick, which must not
        // be visible to the commercial tile until the next tick.
        let engine = SimulationEngine::standard(3);
        let mut grid = Grid::create_initial(3);
        place(&mut grid, 1, 0, Tool::Road);
        place(&mut grid, 1, 1, Tool::Road);
        place(&mut grid, 0, 0, Tool::Residential);
        place(&mut grid, 0, 1, Tool::Commercial);
        grid.get_mut(0, 0).unwrap().level = 0;

        let (next, _) = engine
            .step(&grid, &CityStats::new(0), &mut AlwaysSucceed)
            .unwrap();
        assert_eq!(next.get(0, 0).unwrap().level, 1);
        assert_eq!(next.get(0, 1).unwrap().level, 1);

        let (after, _) = engine
            .step(&next, &CityStats::new(0), &mut AlwaysSucceed)
            .unwrap();
        assert_eq!(after.get(0, 1).unwrap().level, 2);
    }

    #[test]
    fn draws_follow_x_major_order() {
        let engine = SimulationEngine::standard(3);
        let mut grid = Grid::create_initial(3);
        place(&mut grid, 1, 1, Tool::Road);
        place(&mut grid, 0, 1, Tool::Industrial);
        place(&mut grid, 1, 0, Tool::Industrial);

        // (0,1) is visited before (1,0).
        let mut source = ScriptedSource::new([false, true], false);
        let (next, _) = engine.step(&grid, &CityStats::new(0), &mut source).unwrap();
        assert_eq!(next.get(0, 1).unwrap().level, 1);
        assert_eq!(next.get(1, 0).unwrap().level, 2);
        assert_eq!(source.draws(), 2);
    }

    #[test]
    fn standard_rules_roll_their_own_chances() {
        let engine = SimulationEngine::standard(3);
        let mut grid = Grid::create_initial(3);
        place(&mut grid, 1, 0, Tool::Road);
        place(&mut grid, 1, 1, Tool::Road);
        place(&mut grid, 0, 0, Tool::Residential);
        place(&mut grid, 0, 1, Tool::Commercial);
        place(&mut grid, 1, 2, Tool::Industrial);
        place(&mut grid, 2, 2, Tool::Residential);

        let mut source = RecordingSource::new(false);
        engine.step(&grid, &CityStats::new(0), &mut source).unwrap();
        assert_eq!(source.probabilities(), &[0.3, 0.4, 0.4, 0.2]);
    }

    #[test]
    fn isolated_tile_is_inert() {
        let engine = SimulationEngine::standard(1);
        let mut grid = Grid::create_initial(1);
        place(&mut grid, 0, 0, Tool::Residential);

        let (next, stats) = engine
            .step(&grid, &CityStats::new(10), &mut AlwaysSucceed)
            .unwrap();
        assert_eq!(next, grid);
        assert_eq!(stats.population, 0);
        assert_eq!(stats.income, 0);
        assert_eq!(stats.funds, 10);
        assert_eq!(engine.tally(&next), TileYield::default());
    }

    #[test]
    fn inputs_are_not_mutated() {
        let engine = SimulationEngine::standard(4);
        let mut grid = Grid::create_initial(4);
        place(&mut grid, 0, 0, Tool::Road);
        place(&mut grid, 0, 1, Tool::Residential);
        let before = grid.clone();
        let stats = CityStats::new(100);

        let _ = engine.step(&grid, &stats, &mut AlwaysSucceed).unwrap();
        assert_eq!(grid, before);
        assert_eq!(stats, CityStats::new(100));
    }

    #[test]
    fn custom_rule_replaces_standard_one() {
        struct Frozen;
        impl ZoneRule for Frozen {
            fn name(&self) -> &str {
                "frozen"
            }
            fn zone(&self) -> ZoneType {
                ZoneType::Residential
            }
            fn evolve(&self, ctx: &TileContext<'_>, _rng: &mut dyn RandomSource) -> u8 {
                ctx.tile.level
            }
            fn tile_yield(&self, level: u8) -> TileYield {
                TileYield {
                    population: level as u64,
                    income: 0,
                }
            }
        }

        let engine = EngineBuilder::new(4)
            .with_rule(ResidentialRule::new())
            .with_rule(Frozen)
            .build();
        let mut grid = Grid::create_initial(4);
        place(&mut grid, 0, 0, Tool::Residential);
        let (next, stats) = engine
            .step(&grid, &CityStats::new(0), &mut NeverSucceed)
            .unwrap();
        assert_eq!(next.get(0, 0).unwrap().level, 1);
        assert_eq!(stats.population, 1);
    }
}
