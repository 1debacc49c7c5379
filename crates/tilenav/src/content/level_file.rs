use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::atomic_io::write_text_atomic;
use crate::level::{Level, LevelError, DEFAULT_TILE_SIZE};
use crate::nav::{Connectivity, NavConfig, NavError, PathEdge, PathGraph};
use crate::tile::{CellCoord, Grid, GridError, Tile};

pub const LEVEL_FILE_FORMAT_VERSION: u16 = 1;

/// On-disk level: the authored grid plus the derived data exported with it.
///
/// `grid` is column-major (`grid[x][y]`). The derived sections may be left
/// out of hand-authored files; loading always rebuilds them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelFile {
    pub format_version: u16,
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    #[serde(default)]
    pub connectivity: Connectivity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_sha256_hex: Option<String>,
    pub grid: Vec<Vec<Tile>>,
    #[serde(default)]
    pub collision_mesh: Vec<Vec<bool>>,
    #[serde(default)]
    pub path_matrix: Vec<PathMatrixEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathMatrixEntry {
    pub cell: CellCoord,
    pub edges: Vec<PathEdge>,
}

fn default_tile_size() -> f32 {
    DEFAULT_TILE_SIZE
}

#[derive(Debug, Error)]
pub enum LevelFileError {
    #[error("failed to read/write level file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse level file {path} at {json_path}: {source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode level file {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported level file format version {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },
    #[error("level has been edited since the last rebuild; rebuild before exporting")]
    StaleNavigation,
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Nav(#[from] NavError),
}

/// Snapshot of a built level in file form.
pub fn export_level(level: &Level) -> Result<LevelFile, LevelFileError> {
    let snapshot = level.nav_snapshot()?;
    if level.is_nav_stale() {
        return Err(LevelFileError::StaleNavigation);
    }
    Ok(LevelFile {
        format_version: LEVEL_FILE_FORMAT_VERSION,
        tile_size: level.tile_size(),
        connectivity: snapshot.config().connectivity,
        grid_sha256_hex: Some(snapshot.grid_fingerprint().to_string()),
        grid: level.grid().to_columns(),
        collision_mesh: snapshot.mesh().to_columns(),
        path_matrix: path_matrix_entries(snapshot.graph()),
    })
}

/// Rebuilds a level from its file form. Stored derived data is only checked
/// against the rebuild; the rebuilt data always wins.
pub fn level_from_file(file: LevelFile) -> Result<Level, LevelFileError> {
    if file.format_version != LEVEL_FILE_FORMAT_VERSION {
        return Err(LevelFileError::UnsupportedVersion {
            found: file.format_version,
            expected: LEVEL_FILE_FORMAT_VERSION,
        });
    }

    let grid = Grid::from_columns(file.grid)?;
    let mut level = Level::new(grid, file.tile_size)?.with_config(NavConfig {
        connectivity: file.connectivity,
    });
    let snapshot = level.rebuild();

    if let Some(stored) = file.grid_sha256_hex.as_deref() {
        if stored != snapshot.grid_fingerprint() {
            warn!(
                stored = %stored,
                rebuilt = %snapshot.grid_fingerprint(),
                "level_file_grid_hash_mismatch"
            );
        }
    }
    if !file.collision_mesh.is_empty() && file.collision_mesh != snapshot.mesh().to_columns() {
        warn!("level_file_collision_mesh_stale");
    }
    if !file.path_matrix.is_empty() && file.path_matrix != path_matrix_entries(snapshot.graph()) {
        warn!(
            stored_nodes = file.path_matrix.len(),
            rebuilt_nodes = snapshot.graph().node_count(),
            "level_file_path_matrix_stale"
        );
    }
    Ok(level)
}

pub fn parse_level_file(raw: &str, path: &Path) -> Result<LevelFile, LevelFileError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, LevelFile>(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        LevelFileError::Parse {
            path: path.to_path_buf(),
            json_path,
            source: error.into_inner(),
        }
    })
}

pub fn read_level_file(path: &Path) -> Result<LevelFile, LevelFileError> {
    let raw = fs::read_to_string(path).map_err(|source| LevelFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_level_file(&raw, path)
}

pub fn write_level_file(path: &Path, file: &LevelFile) -> Result<(), LevelFileError> {
    let text = serde_json::to_string_pretty(file).map_err(|source| LevelFileError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    write_text_atomic(path, &text).map_err(|source| LevelFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        width = file.grid.len(),
        path_nodes = file.path_matrix.len(),
        "level_file_written"
    );
    Ok(())
}

pub fn load_level(path: &Path) -> Result<Level, LevelFileError> {
    let level = level_from_file(read_level_file(path)?)?;
    info!(
        path = %path.display(),
        width = level.grid().width(),
        height = level.grid().height(),
        "level_loaded"
    );
    Ok(level)
}

pub fn save_level(path: &Path, level: &Level) -> Result<(), LevelFileError> {
    write_level_file(path, &export_level(level)?)
}

fn path_matrix_entries(graph: &PathGraph) -> Vec<PathMatrixEntry> {
    graph
        .iter()
        .map(|(cell, edges)| PathMatrixEntry {
            cell,
            edges: edges.to_vec(),
        })
        .collect()
}
