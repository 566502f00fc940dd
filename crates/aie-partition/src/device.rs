//! Partition device instance and tile addressing.
//!
//! A [`DeviceInstance`] represents one claimed partition: a contiguous
//! column range of the tile grid, exclusively owned by the caller for the
//! lifetime of all lifecycle calls. All mutable state — including the
//! tiles-in-use bitmap — lives on the instance; there is no process-wide
//! state.

use aie_regs::{Generation, GenerationLayout};

use crate::error::{AieError, Result};
use crate::io::RegisterIo;
use crate::npi::{NpiTransport, ProtRegRequest};
use crate::ops::{self, DeviceOps};

/// A (column, row) tile coordinate, relative to the partition origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    /// Partition-relative column.
    pub col: u32,
    /// Row index; the shim row is row 0 on current generations.
    pub row: u32,
}

impl Location {
    /// Coordinate constructor.
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// Tile classification, derived per location from the generation layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileType {
    /// Compute tile with a processor core.
    Core,
    /// Shared-memory tile.
    MemTile,
    /// Shim tile with interconnect access only.
    ShimPl,
    /// Shim tile bridging to the NoC and host.
    ShimNoc,
}

/// Parameters of one claimed partition.
#[derive(Debug, Clone, Copy)]
pub struct PartitionConfig {
    /// Silicon generation of the device.
    pub generation: Generation,
    /// Physical base address of the partition's register window.
    pub base_addr: u64,
    /// First absolute column of the partition.
    pub start_col: u32,
    /// Number of columns claimed.
    pub num_cols: u32,
}

/// One claimed partition of the tile array.
///
/// Owns the register and NPI transports plus the tiles-in-use bitmap. The
/// caller must not run two lifecycle operations on the same partition
/// concurrently; `&mut self` enforces that for a single instance.
pub struct DeviceInstance {
    config: PartitionConfig,
    layout: &'static GenerationLayout,
    ops: &'static dyn DeviceOps,
    tiles_in_use: Bitmap,
    io: Box<dyn RegisterIo>,
    npi: Box<dyn NpiTransport>,
}

impl std::fmt::Debug for DeviceInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceInstance")
            .field("generation", &self.config.generation)
            .field("start_col", &self.config.start_col)
            .field("num_cols", &self.config.num_cols)
            .field("base_addr", &format_args!("{:#x}", self.config.base_addr))
            .finish_non_exhaustive()
    }
}

impl DeviceInstance {
    /// Claim a partition over the given transports.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the column range is empty or extends
    /// past the physical device.
    pub fn new(
        config: PartitionConfig,
        io: Box<dyn RegisterIo>,
        npi: Box<dyn NpiTransport>,
    ) -> Result<Self> {
        let layout = config.generation.layout();
        if config.num_cols == 0 {
            return Err(AieError::invalid_argument("partition must span at least one column"));
        }
        let end_col = config.start_col.checked_add(config.num_cols);
        match end_col {
            Some(end) if end <= layout.geometry.cols => {}
            _ => {
                return Err(AieError::invalid_argument(format!(
                    "columns {}..{} exceed device width {}",
                    config.start_col,
                    u64::from(config.start_col) + u64::from(config.num_cols),
                    layout.geometry.cols
                )))
            }
        }

        let clock_bits = (config.num_cols * (layout.geometry.rows - 1)) as usize;
        tracing::debug!(
            "Claimed partition: cols {}..{}, {:?}",
            config.start_col,
            config.start_col + config.num_cols,
            config.generation
        );

        Ok(Self {
            config,
            layout,
            ops: ops::for_generation(config.generation),
            tiles_in_use: Bitmap::new(clock_bits),
            io,
            npi,
        })
    }

    /// Silicon generation.
    pub fn generation(&self) -> Generation {
        self.config.generation
    }

    /// First absolute column of the partition.
    pub fn start_col(&self) -> u32 {
        self.config.start_col
    }

    /// Number of columns claimed.
    pub fn num_cols(&self) -> u32 {
        self.config.num_cols
    }

    /// Row count of the grid, shim row included.
    pub fn num_rows(&self) -> u32 {
        self.layout.geometry.rows
    }

    /// Row index holding the shim tiles.
    pub fn shim_row(&self) -> u32 {
        self.layout.geometry.shim_row
    }

    /// Static register layout of this generation.
    pub fn layout(&self) -> &'static GenerationLayout {
        self.layout
    }

    /// Generation-specific operation table.
    pub(crate) fn ops(&self) -> &'static dyn DeviceOps {
        self.ops
    }

    /// Reject locations outside the partition.
    pub fn validate_loc(&self, loc: Location) -> Result<()> {
        if loc.col >= self.config.num_cols || loc.row >= self.layout.geometry.rows {
            return Err(AieError::InvalidLocation {
                col: loc.col,
                row: loc.row,
            });
        }
        Ok(())
    }

    /// Absolute register address of the tile at `loc`.
    pub fn tile_addr(&self, loc: Location) -> u64 {
        self.config.base_addr
            + self
                .layout
                .geometry
                .tile_offset(self.config.start_col + loc.col, loc.row)
    }

    /// Tile type at `loc`, resolved through the generation operation table.
    pub fn tile_type(&self, loc: Location) -> TileType {
        self.ops.tile_type_of(self, loc)
    }

    /// Bit position of `loc` in the tiles-in-use bitmap.
    ///
    /// Only rows above the shim row are tracked; returns `None` for the
    /// shim row itself.
    pub(crate) fn tile_bit_pos(&self, loc: Location) -> Option<usize> {
        if loc.row == self.layout.geometry.shim_row {
            return None;
        }
        let rows_tracked = self.layout.geometry.rows - 1;
        Some((loc.col * rows_tracked + (loc.row - 1)) as usize)
    }

    /// Tiles activated since the last reset.
    pub fn tiles_in_use(&self) -> &Bitmap {
        &self.tiles_in_use
    }

    pub(crate) fn tiles_in_use_mut(&mut self) -> &mut Bitmap {
        &mut self.tiles_in_use
    }

    /// Read the register at `addr`.
    pub(crate) fn read32(&mut self, addr: u64) -> Result<u32> {
        self.io.read32(addr)
    }

    /// Write `value` to the register at `addr`.
    pub(crate) fn write32(&mut self, addr: u64, value: u32) -> Result<()> {
        self.io.write32(addr, value)
    }

    /// Read-modify-write the bits selected by `mask`.
    pub(crate) fn mask_write32(&mut self, addr: u64, mask: u32, value: u32) -> Result<()> {
        self.io.mask_write32(addr, mask, value)
    }

    pub(crate) fn npi_set_shim_reset(&mut self, enable: bool) -> Result<()> {
        self.npi.set_shim_reset(enable)
    }

    pub(crate) fn npi_set_protected_reg_enable(&mut self, req: ProtRegRequest) -> Result<()> {
        self.npi.set_protected_reg_enable(req)
    }
}

/// Fixed-size bit set tracking which tiles have been activated.
#[derive(Debug, Clone)]
pub struct Bitmap {
    words: Vec<u64>,
    len: usize,
}

impl Bitmap {
    /// All-clear bitmap holding `len` bits.
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
        }
    }

    /// Number of bits held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if the bitmap holds no bits.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Test bit `idx`. Out-of-range bits read as clear.
    pub fn test(&self, idx: usize) -> bool {
        idx < self.len && self.words[idx / 64] & (1u64 << (idx % 64)) != 0
    }

    /// Set bit `idx`.
    pub fn set(&mut self, idx: usize) {
        if idx < self.len {
            self.words[idx / 64] |= 1u64 << (idx % 64);
        }
    }

    /// Clear bit `idx`.
    pub fn clear(&mut self, idx: usize) {
        if idx < self.len {
            self.words[idx / 64] &= !(1u64 << (idx % 64));
        }
    }

    /// Set `count` bits starting at `start`.
    pub fn set_range(&mut self, start: usize, count: usize) {
        for idx in start..start.saturating_add(count) {
            self.set(idx);
        }
    }

    /// Clear `count` bits starting at `start`.
    pub fn clear_range(&mut self, start: usize, count: usize) {
        for idx in start..start.saturating_add(count) {
            self.clear(idx);
        }
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }
}
