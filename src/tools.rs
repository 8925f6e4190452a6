use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::ZoneType;

/// Everything the player can apply to a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Bulldoze,
    Road,
    Residential,
    Commercial,
    Industrial,
    Power,
}

impl Tool {
    pub const ALL: [Tool; 6] = [
        Tool::Bulldoze,
        Tool::Road,
        Tool::Residential,
        Tool::Commercial,
        Tool::Industrial,
        Tool::Power,
    ];

    pub fn cost(self) -> i64 {
        match self {
            Tool::Bulldoze => 5,
            Tool::Road => 10,
            Tool::Residential => 50,
            Tool::Commercial => 100,
            Tool::Industrial => 150,
            Tool::Power => 500,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tool::Bulldoze => "Bulldoze",
            Tool::Road => "Road",
            Tool::Residential => "Residential",
            Tool::Commercial => "Commercial",
            Tool::Industrial => "Industrial",
            Tool::Power => "Power",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Tool::Bulldoze => "#ef4444",
            Tool::Road => "#374151",
            Tool::Residential => "#22c55e",
            Tool::Commercial => "#3b82f6",
            Tool::Industrial => "#eab308",
            Tool::Power => "#a855f7",
        }
    }

    /// Zone the tool lays down, `None` for the bulldozer.
    pub fn zone(self) -> Option<ZoneType> {
        match self {
            Tool::Bulldoze => None,
            Tool::Road => Some(ZoneType::Road),
            Tool::Residential => Some(ZoneType::Residential),
            Tool::Commercial => Some(ZoneType::Commercial),
            Tool::Industrial => Some(ZoneType::Industrial),
            Tool::Power => Some(ZoneType::Power),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Catalog entry handed to whatever draws the tool palette.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub tool: Tool,
    pub label: &'static str,
    pub cost: i64,
    pub color: &'static str,
}

pub fn catalog() -> Vec<ToolInfo> {
    Tool::ALL
        .iter()
        .map(|&tool| ToolInfo {
            tool,
            label: tool.label(),
            cost: tool.cost(),
            color: tool.color(),
        })
        .collect()
}
