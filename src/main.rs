//! Headless demo: a scripted player walks the maze while the agent hunts it

use std::env;

use labyrinth::ai::{PlanarSeek, planar_distance};
use labyrinth::prelude::*;

/// Fixed simulation step
const DT: f32 = 1.0 / 60.0;
/// Ten simulated minutes
const MAX_TICKS: u32 = 60 * 60 * 10;
/// Player walking speed in world units per second
const PLAYER_SPEED: f32 = 3.0;
/// Distance at which the scripted player moves on to its next waypoint
const PLAYER_REACH: f32 = 0.05;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {path}");
            GameConfig::load_ron(&path)?
        }
        None => GameConfig::default(),
    };

    let mut level = Level::new(config)?;
    println!("Seed {}", level.seed());
    println!("{}", level.grid());

    let route = player_route(&level)?;
    let mut player = route[0];
    let mut next = 1;
    let mut score = 0;

    for tick in 0..MAX_TICKS {
        if let Some(&waypoint) = route.get(next) {
            player = PlanarSeek::new(waypoint, PLAYER_SPEED).step(player, DT);
            if planar_distance(player, waypoint) < PLAYER_REACH {
                next += 1;
            }
        }

        if let Some(item) = level.collect_at(player) {
            score += item.kind.value();
        }

        for event in level.update(DT, player) {
            log::info!("[tick {tick}] {event:?}");
            match event {
                MazeEvent::PlayerExitedMaze => {
                    println!("Escaped after {tick} ticks with {score} points");
                    return Ok(());
                }
                MazeEvent::PlayerCaught { position } => {
                    println!("Caught at {position} after {tick} ticks with {score} points");
                    return Ok(());
                }
                _ => {}
            }
        }
    }

    println!("Stopped after {MAX_TICKS} ticks with {score} points");
    Ok(())
}

/// Entrance to exit along the shortest route, starting and ending one cell
/// outside the maze.
fn player_route(level: &Level) -> Result<Vec<Vec3>, PathError> {
    let grid = level.grid();
    let y = level.config().pursuit.spawn_height;
    let step = Vec3::new(grid.cell_size(), 0.0, 0.0);

    let path = Pathfinder::default().try_find_path(grid, grid.entrance(), grid.exit())?;
    log::info!("Player route: {} cells", path.len());

    let entrance = grid.entrance();
    let exit = grid.exit();
    let before = grid.local_to_world(grid.cell_center_local(entrance.row, entrance.col, y) - step);
    let after = grid.local_to_world(grid.cell_center_local(exit.row, exit.col, y) + step);

    let mut route = Vec::with_capacity(path.len() + 2);
    route.push(before);
    route.extend(path.to_waypoints(grid, y));
    route.push(after);
    Ok(route)
}
