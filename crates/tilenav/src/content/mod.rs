mod atomic_io;
mod demo;
mod level_file;

pub use demo::{demo_grid, demo_level, DEMO_LEVEL_SIZE};
pub use level_file::{
    export_level, level_from_file, load_level, parse_level_file, read_level_file, save_level,
    write_level_file, LevelFile, LevelFileError, PathMatrixEntry, LEVEL_FILE_FORMAT_VERSION,
};
