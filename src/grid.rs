use serde::{Deserialize, Serialize};

use crate::error::PlacementError;
use crate::tools::Tool;

pub const MAX_LEVEL: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    #[default]
    Empty,
    Residential,
    Commercial,
    Industrial,
    Road,
    Power,
}

impl ZoneType {
    /// Zones whose level is a development stage rather than a placed flag.
    pub fn is_growable(self) -> bool {
        matches!(
            self,
            ZoneType::Residential | ZoneType::Commercial | ZoneType::Industrial
        )
    }

    /// Highest level a tile of this zone may hold.
    pub fn max_level(self) -> u8 {
        if self.is_growable() {
            MAX_LEVEL
        } else {
            0
        }
    }

    /// Level a freshly placed tile of this zone starts at.
    pub fn initial_level(self) -> u8 {
        if self.is_growable() {
            1
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub x: usize,
    pub y: usize,
    pub zone: ZoneType,
    pub level: u8,
    /// Milliseconds since the Unix epoch of the last placement, 0 if never placed.
    pub updated_at: i64,
}

impl Tile {
    fn empty(x: usize, y: usize) -> Self {
        Self {
            x,
            y,
            zone: ZoneType::Empty,
            level: 0,
            updated_at: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GridRepr {
    size: usize,
    tiles: Vec<Tile>,
}

/// Square matrix of tiles, stored x-major (`index = x * size + y`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridRepr")]
pub struct Grid {
    size: usize,
    tiles: Vec<Tile>,
}

impl TryFrom<GridRepr> for Grid {
    type Error = String;

    fn try_from(repr: GridRepr) -> Result<Self, Self::Error> {
        let grid = Grid {
            size: repr.size,
            tiles: repr.tiles,
        };
        match grid.defect() {
            None => Ok(grid),
            Some(defect) => Err(defect),
        }
    }
}

impl Grid {
    pub fn create_initial(size: usize) -> Self {
        let mut tiles = Vec::with_capacity(size * size);
        for x in 0..size {
            for y in 0..size {
                tiles.push(Tile::empty(x, y));
            }
        }
        Self { size, tiles }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Every coordinate present exactly once, at its own index, and every
    /// level within what its zone allows.
    pub fn is_well_formed(&self) -> bool {
        self.defect().is_none()
    }

    /// First broken storage or level invariant, described for error messages.
    pub fn defect(&self) -> Option<String> {
        let expected = self.size * self.size;
        if self.tiles.len() != expected {
            return Some(format!(
                "{}x{} grid holds {} tiles instead of {expected}",
                self.size,
                self.size,
                self.tiles.len()
            ));
        }
        for (index, tile) in self.tiles.iter().enumerate() {
            let (x, y) = (index / self.size, index % self.size);
            if (tile.x, tile.y) != (x, y) {
                return Some(format!(
                    "tile at slot ({x}, {y}) claims coordinates ({}, {})",
                    tile.x, tile.y
                ));
            }
            if tile.level > tile.zone.max_level() {
                return Some(format!(
                    "{:?} tile at ({x}, {y}) has level {}, limit is {}",
                    tile.zone,
                    tile.level,
                    tile.zone.max_level()
                ));
            }
        }
        None
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Tile> {
        if x < self.size && y < self.size {
            self.tiles.get(x * self.size + y)
        } else {
            None
        }
    }

    pub(crate) fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut Tile> {
        if x < self.size && y < self.size {
            self.tiles.get_mut(x * self.size + y)
        } else {
            None
        }
    }

    /// Tiles in x-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Orthogonal neighbours inside the grid; nothing wraps around.
    pub fn neighbors_of(&self, x: usize, y: usize) -> Vec<&Tile> {
        const DIRS: [(isize, isize); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
        DIRS.iter()
            .filter_map(|&(dx, dy)| {
                let nx = x.checked_add_signed(dx)?;
                let ny = y.checked_add_signed(dy)?;
                self.get(nx, ny)
            })
            .collect()
    }

    /// Tries to apply `tool` at `(x, y)`. On error the grid is unchanged; the
    /// caller is responsible for charging `tool.cost()` on success.
    pub fn apply_tool(
        &mut self,
        x: usize,
        y: usize,
        tool: Tool,
        available_funds: i64,
    ) -> Result<(), PlacementError> {
        self.apply_tool_at(x, y, tool, available_funds, chrono::Utc::now().timestamp_millis())
    }

    pub fn apply_tool_at(
        &mut self,
        x: usize,
        y: usize,
        tool: Tool,
        available_funds: i64,
        now_ms: i64,
    ) -> Result<(), PlacementError> {
        let size = self.size;
        let tile = self
            .get_mut(x, y)
            .ok_or(PlacementError::OutOfBounds { x, y, size })?;

        if available_funds < tool.cost() {
            return Err(PlacementError::InsufficientFunds {
                tool,
                cost: tool.cost(),
                available: available_funds,
            });
        }

        let Some(zone) = tool.zone() else {
            tile.zone = ZoneType::Empty;
            tile.level = 0;
            tile.updated_at = now_ms;
            return Ok(());
        };

        match tile.zone {
            ZoneType::Empty => {}
            current if current == zone => {
                return Err(PlacementError::AlreadyZoned { x, y, zone });
            }
            current => {
                return Err(PlacementError::Occupied {
                    x,
                    y,
                    zone: current,
                });
            }
        }

        tile.zone = zone;
        tile.level = zone.initial_level();
        tile.updated_at = now_ms;
        Ok(())
    }

    pub fn census(&self) -> ZoneCensus {
        let mut census = ZoneCensus::default();
        for tile in &self.tiles {
            match tile.zone {
                ZoneType::Empty => census.empty += 1,
                ZoneType::Residential => census.residential += 1,
                ZoneType::Commercial => census.commercial += 1,
                ZoneType::Industrial => census.industrial += 1,
                ZoneType::Road => census.roads += 1,
                ZoneType::Power => census.power += 1,
            }
        }
        census
    }
}

/// Tile counts per zone type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneCensus {
    pub empty: usize,
    pub residential: usize,
    pub commercial: usize,
    pub industrial: usize,
    pub roads: usize,
    pub power: usize,
}
