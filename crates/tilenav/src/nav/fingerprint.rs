use sha2::{Digest, Sha256};

use crate::tile::Grid;

/// SHA-256 over the grid dimensions and every tile's collision type, in
/// canonical cell order. Asset references do not participate.
pub fn grid_fingerprint(grid: &Grid) -> String {
    let mut hasher = Sha256::new();
    hasher.update(grid.width().to_le_bytes());
    hasher.update(grid.height().to_le_bytes());
    for cell in grid.cells() {
        let byte = grid
            .collision_at(cell)
            .map(|collision| collision.fingerprint_byte())
            .unwrap_or(0);
        hasher.update([byte]);
    }
    to_hex_lower(&hasher.finalize())
}

fn to_hex_lower(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        use std::fmt::Write as _;
        let _ = write!(&mut output, "{byte:02x}");
    }
    output
}
