use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tilenav::{
    demo_grid, level_from_file, read_level_file, save_level, CellCoord, CollisionType,
    Connectivity, Level, NavConfig, Vec2, DEFAULT_TILE_SIZE,
};
use tracing::info;

use super::cli::{Command, ToolOptions};

#[derive(Debug, Serialize)]
struct LevelSummary {
    width: u32,
    height: u32,
    tile_size: f32,
    connectivity: Connectivity,
    open_cells: usize,
    blocked_cells: usize,
    corner_tiles: usize,
    path_nodes: usize,
    path_edges: usize,
    components: usize,
    grid_sha256_hex: String,
}

#[derive(Debug, Serialize)]
struct ClassifyReport {
    x: f32,
    y: f32,
    cell: Option<CellCoord>,
    collision: CollisionType,
    blocked: bool,
}

#[derive(Debug, Serialize)]
struct PathReport {
    from: CellCoord,
    to: CellCoord,
    steps: usize,
    cost: f32,
    cells: Vec<CellCoord>,
    waypoints_world: Vec<Vec2>,
}

pub(crate) fn run_command<W: Write>(
    command: &Command,
    options: &ToolOptions,
    stdout: &mut W,
) -> Result<(), String> {
    match command {
        Command::Demo { out } => {
            let tile_size = options.tile_size.unwrap_or(DEFAULT_TILE_SIZE);
            let mut level = Level::new(demo_grid(), tile_size)
                .map_err(|error| error.to_string())?
                .with_config(NavConfig {
                    connectivity: options.connectivity.unwrap_or_default(),
                });
            level.rebuild();
            save_level(out, &level).map_err(|error| error.to_string())?;
            writeln!(stdout, "wrote demo level to {}", out.display())
                .map_err(|error| error.to_string())
        }
        Command::Export { input, out } => {
            let level = load_with_overrides(input, options)?;
            save_level(out, &level).map_err(|error| error.to_string())?;
            info!(input = %input.display(), out = %out.display(), "level_exported");
            writeln!(stdout, "exported {} to {}", input.display(), out.display())
                .map_err(|error| error.to_string())
        }
        Command::Inspect { input } => {
            let level = load_with_overrides(input, options)?;
            write_json(stdout, &summarize(&level)?)
        }
        Command::Classify { input, pos } => {
            let level = load_with_overrides(input, options)?;
            let collision = level.classify(*pos).map_err(|error| error.to_string())?;
            write_json(
                stdout,
                &ClassifyReport {
                    x: pos.x,
                    y: pos.y,
                    cell: level.world_to_cell_strict(*pos),
                    collision,
                    blocked: collision != CollisionType::Empty,
                },
            )
        }
        Command::Path { input, from, to } => {
            let level = load_with_overrides(input, options)?;
            let snapshot = level.nav_snapshot().map_err(|error| error.to_string())?;
            let query = snapshot.query();
            let cells = query
                .shortest_path(*from, *to)
                .map_err(|error| error.to_string())?;
            let cost = query.path_cost(&cells).unwrap_or_default();
            write_json(
                stdout,
                &PathReport {
                    from: *from,
                    to: *to,
                    steps: cells.len().saturating_sub(1),
                    cost,
                    waypoints_world: cells
                        .iter()
                        .map(|cell| level.cell_center_world(*cell))
                        .collect(),
                    cells,
                },
            )
        }
    }
}

fn load_with_overrides(input: &Path, options: &ToolOptions) -> Result<Level, String> {
    let mut file = read_level_file(input).map_err(|error| error.to_string())?;
    if let Some(tile_size) = options.tile_size {
        file.tile_size = tile_size;
    }
    if let Some(connectivity) = options.connectivity {
        file.connectivity = connectivity;
    }
    level_from_file(file).map_err(|error| error.to_string())
}

fn summarize(level: &Level) -> Result<LevelSummary, String> {
    let snapshot = level.nav_snapshot().map_err(|error| error.to_string())?;
    let grid = level.grid();
    let corner_tiles = grid
        .cells()
        .filter(|cell| grid.collision_at(*cell).is_some_and(CollisionType::is_corner))
        .count();
    let open_cells = snapshot.mesh().open_cell_count();

    let query = snapshot.query();
    let mut visited = BTreeSet::new();
    let mut components = 0usize;
    for (cell, _) in snapshot.graph().iter() {
        if visited.contains(&cell) {
            continue;
        }
        let component = query.reachable_from(cell).map_err(|error| error.to_string())?;
        visited.extend(component);
        components += 1;
    }

    Ok(LevelSummary {
        width: grid.width(),
        height: grid.height(),
        tile_size: level.tile_size(),
        connectivity: snapshot.config().connectivity,
        open_cells,
        blocked_cells: grid.cells().count() - open_cells,
        corner_tiles,
        path_nodes: snapshot.graph().node_count(),
        path_edges: snapshot.graph().edge_count(),
        components,
        grid_sha256_hex: snapshot.grid_fingerprint().to_string(),
    })
}

fn write_json<W: Write, T: Serialize>(stdout: &mut W, value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|error| format!("failed to encode output json: {error}"))?;
    writeln!(stdout, "{text}").map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use tempfile::TempDir;

    use super::*;

    fn run_to_json(command: Command, options: ToolOptions) -> Value {
        let mut out = Vec::new();
        run_command(&command, &options, &mut out).expect("command");
        serde_json::from_slice(&out).expect("json output")
    }

    fn write_demo(temp: &TempDir, options: ToolOptions) -> std::path::PathBuf {
        let path = temp.path().join("demo.json");
        let mut out = Vec::new();
        run_command(&Command::Demo { out: path.clone() }, &options, &mut out).expect("demo");
        path
    }

    fn write_split_level(temp: &TempDir) -> std::path::PathBuf {
        let path = temp.path().join("split.json");
        let raw = r#"{
            "format_version": 1,
            "grid": [
                [{}, {}],
                [{"collision": "Full"}, {"collision": "Full"}],
                [{}, {"collision": "CornerUpperLeft"}]
            ]
        }"#;
        std::fs::write(&path, raw).expect("write level");
        path
    }

    #[test]
    fn demo_then_inspect_reports_corner_cluster() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_demo(&temp, ToolOptions::default());
        let summary = run_to_json(Command::Inspect { input: path }, ToolOptions::default());
        assert_eq!(summary["width"], 10);
        assert_eq!(summary["height"], 10);
        assert_eq!(summary["corner_tiles"], 4);
        assert_eq!(summary["open_cells"], 100);
        assert_eq!(summary["blocked_cells"], 0);
        assert_eq!(summary["components"], 1);
        assert_eq!(summary["connectivity"], "Four");
    }

    #[test]
    fn inspect_counts_components_across_wall() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_split_level(&temp);
        let summary = run_to_json(Command::Inspect { input: path }, ToolOptions::default());
        assert_eq!(summary["components"], 2);
        assert_eq!(summary["path_nodes"], 4);
        assert_eq!(summary["path_edges"], 2);
    }

    #[test]
    fn classify_uses_tile_size_override() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_demo(&temp, ToolOptions::default());
        let options = ToolOptions {
            tile_size: Some(2.0),
            connectivity: None,
        };
        let report = run_to_json(
            Command::Classify {
                input: path,
                pos: Vec2::new(3.8, 3.8),
            },
            options,
        );
        assert_eq!(report["collision"], "CornerLowerRight");
        assert_eq!(report["blocked"], true);
        assert_eq!(report["cell"]["x"], 1);
    }

    #[test]
    fn path_reports_route_and_cost() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_demo(&temp, ToolOptions::default());
        let report = run_to_json(
            Command::Path {
                input: path,
                from: CellCoord::new(0, 0),
                to: CellCoord::new(3, 0),
            },
            ToolOptions::default(),
        );
        assert_eq!(report["steps"], 3);
        assert_eq!(report["cost"], 3.0);
        assert_eq!(report["cells"].as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn path_across_wall_fails() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_split_level(&temp);
        let mut out = Vec::new();
        let err = run_command(
            &Command::Path {
                input: path,
                from: CellCoord::new(0, 0),
                to: CellCoord::new(2, 0),
            },
            &ToolOptions::default(),
            &mut out,
        )
        .expect_err("no path");
        assert!(err.contains("no path"), "{err}");
    }

    #[test]
    fn export_rewrites_with_diagonal_connectivity() {
        let temp = TempDir::new().expect("tempdir");
        let input = write_split_level(&temp);
        let out_path = temp.path().join("out").join("split.json");
        let options = ToolOptions {
            tile_size: None,
            connectivity: Some(Connectivity::Eight),
        };
        let mut out = Vec::new();
        run_command(
            &Command::Export {
                input,
                out: out_path.clone(),
            },
            &options,
            &mut out,
        )
        .expect("export");
        let file = read_level_file(&out_path).expect("read export");
        assert_eq!(file.connectivity, Connectivity::Eight);
        assert_eq!(file.path_matrix.len(), 4);
        assert!(file.grid_sha256_hex.is_some());
    }
}
