//! Tile grid geometry per generation.

/// Dimensions and addressing parameters of one silicon generation's array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Physical column count of the full device.
    pub cols: u32,
    /// Row count, shim row included.
    pub rows: u32,
    /// Row index holding the shim tiles.
    pub shim_row: u32,
    /// Number of memory-tile rows directly above the shim row.
    pub mem_tile_rows: u32,
    /// Bit position of the column index within a register address.
    pub col_shift: u32,
    /// Bit position of the row index within a register address.
    pub row_shift: u32,
}

impl Geometry {
    /// Offset of tile `(col, row)`'s register window from the device base
    /// address. `col` is absolute (partition start column already applied).
    pub const fn tile_offset(&self, col: u32, row: u32) -> u64 {
        ((col as u64) << self.col_shift) | ((row as u64) << self.row_shift)
    }
}
