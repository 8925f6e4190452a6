use tilecity::{Grid, PlacementError, Tool, ZoneType};

#[test]
fn unaffordable_tool_leaves_grid_untouched() {
    let mut grid = Grid::create_initial(20);
    let before = grid.clone();
    let err = grid.apply_tool(0, 0, Tool::Commercial, 50).unwrap_err();
    assert!(err.is_funds());
    assert_eq!(
        err,
        PlacementError::InsufficientFunds {
            tool: Tool::Commercial,
            cost: 100,
            available: 50,
        }
    );
    assert_eq!(grid, before);
}

#[test]
fn same_tool_twice_is_rejected_the_second_time() {
    for tool in Tool::ALL.into_iter().filter(|t| *t != Tool::Bulldoze) {
        let mut grid = Grid::create_initial(20);
        grid.apply_tool(2, 2, tool, 5000).unwrap();
        let placed = grid.clone();

        let err = grid.apply_tool(2, 2, tool, 5000).unwrap_err();
        assert!(matches!(err, PlacementError::AlreadyZoned { x: 2, y: 2, .. }));
        assert_eq!(grid, placed, "{tool} re-placement must not change the tile");
    }
}

#[test]
fn bulldoze_clears_any_tile() {
    let mut grid = Grid::create_initial(20);
    grid.apply_tool(1, 1, Tool::Residential, 5000).unwrap();
    grid.apply_tool(1, 2, Tool::Road, 5000).unwrap();

    for (x, y) in [(1, 1), (1, 2), (7, 7)] {
        grid.apply_tool(x, y, Tool::Bulldoze, 5).unwrap();
        let tile = grid.get(x, y).unwrap();
        assert_eq!(tile.zone, ZoneType::Empty);
        assert_eq!(tile.level, 0);
    }
    assert_eq!(grid.census().empty, 400);
}

#[test]
fn bulldoze_still_needs_funds() {
    let mut grid = Grid::create_initial(20);
    grid.apply_tool(1, 1, Tool::Road, 5000).unwrap();
    let err = grid.apply_tool(1, 1, Tool::Bulldoze, 4).unwrap_err();
    assert!(err.is_funds());
    assert_eq!(grid.get(1, 1).unwrap().zone, ZoneType::Road);
}

#[test]
fn bulldozed_tile_can_be_rezoned() {
    let mut grid = Grid::create_initial(20);
    grid.apply_tool(4, 4, Tool::Industrial, 5000).unwrap();
    assert!(matches!(
        grid.apply_tool(4, 4, Tool::Residential, 5000),
        Err(PlacementError::Occupied {
            zone: ZoneType::Industrial,
            ..
        })
    ));
    grid.apply_tool(4, 4, Tool::Bulldoze, 5000).unwrap();
    grid.apply_tool(4, 4, Tool::Residential, 5000).unwrap();
    let tile = grid.get(4, 4).unwrap();
    assert_eq!(tile.zone, ZoneType::Residential);
    assert_eq!(tile.level, 1);
    assert!(tile.updated_at > 0);
}
