pub mod advisor;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod rng;
pub mod scenario;
pub mod session;
pub mod snapshot;
pub mod systems;
pub mod tools;
pub mod web;
pub mod world;

pub use config::CityConfig;
pub use engine::{SimulationEngine, TileYield};
pub use error::{PlacementError, SimulationError};
pub use grid::{Grid, Tile, ZoneType};
pub use session::{Session, SessionSettings};
pub use tools::Tool;
pub use world::{CityStats, World};
