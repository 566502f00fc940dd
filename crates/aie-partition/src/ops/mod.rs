//! Generation-specific operation tables.
//!
//! One [`DeviceOps`] implementation exists per silicon generation. Variants
//! differ in register layout and in which operations are meaningful — never
//! in call sequencing, which lives in the lifecycle controller
//! (`privilege`). The controller holds a `&'static dyn DeviceOps` selected
//! once at partition claim time.

mod aie;
mod aie2ps;
mod aieml;

use aie_regs::Generation;
use bitflags::bitflags;

use crate::device::{DeviceInstance, Location, TileType};
use crate::error::{AieError, Result};

/// Partition isolation policy applied after reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationMode {
    /// Clear all isolation edges.
    Clear,
    /// Isolate the partition: block west at the first column and east at
    /// the last column.
    Isolate,
}

/// Column-range clock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnClockRequest {
    /// First partition-relative column of the range.
    pub start_col: u32,
    /// Number of columns in the range.
    pub num_cols: u32,
    /// Enable or gate the clock for the range.
    pub enable: bool,
}

bitflags! {
    /// AXI-MM isolation edges. Construct from raw register values with
    /// [`IsolationFlags::from_bits`], which rejects bits outside the
    /// enumerated edge set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IsolationFlags: u8 {
        /// Block traffic crossing the south edge.
        const SOUTH = 1 << 0;
        /// Block traffic crossing the west edge.
        const WEST = 1 << 1;
        /// Block traffic crossing the north edge.
        const NORTH = 1 << 2;
        /// Block traffic crossing the east edge.
        const EAST = 1 << 3;
    }
}

/// Generation capability set.
///
/// Implementations only know how to touch registers for their generation;
/// they never decide *when* an operation runs.
pub trait DeviceOps: Sync {
    /// Tile type at `loc`. Callers validate `loc` first.
    fn tile_type_of(&self, dev: &DeviceInstance, loc: Location) -> TileType;

    /// Gate (`false`) or enable (`true`) the clock of every tile in the
    /// partition.
    fn set_partition_clock(&self, dev: &mut DeviceInstance, enable: bool) -> Result<()>;

    /// Assert or de-assert the per-column shim reset on every column.
    fn set_part_col_shim_reset(&self, dev: &mut DeviceInstance, enable: bool) -> Result<()>;

    /// Enable or gate the column clocks after a partition reset.
    fn set_part_col_clock_after_rst(&self, dev: &mut DeviceInstance, enable: bool) -> Result<()>;

    /// Apply the post-reset isolation policy to every tile.
    fn set_part_isolation_after_rst(
        &self,
        dev: &mut DeviceInstance,
        mode: IsolationMode,
    ) -> Result<()>;

    /// Trigger hardware zeroisation of every tile memory in the partition.
    fn zeroize_partition_memory(&self, dev: &mut DeviceInstance) -> Result<()>;

    /// Enable clocks for the given tiles; an empty slice enables the whole
    /// partition.
    fn request_tiles(&self, dev: &mut DeviceInstance, tiles: &[Location]) -> Result<()>;

    /// Enable or gate the clock of a column range.
    fn set_column_clock(&self, dev: &mut DeviceInstance, req: ColumnClockRequest) -> Result<()>;

    /// Program the partition AXI-MM isolation edges. A documented no-op
    /// success on generations without the feature.
    fn set_axi_mm_isolation(&self, dev: &mut DeviceInstance, flags: IsolationFlags) -> Result<()>;
}

static AIE_OPS: aie::AieOps = aie::AieOps;
static AIEML_OPS: aieml::AieMlOps = aieml::AieMlOps;
static AIE2PS_OPS: aie2ps::Aie2PsOps = aie2ps::Aie2PsOps;

/// Operation table for a generation.
pub(crate) fn for_generation(generation: Generation) -> &'static dyn DeviceOps {
    match generation {
        Generation::Aie => &AIE_OPS,
        Generation::AieMl => &AIEML_OPS,
        Generation::Aie2Ps => &AIE2PS_OPS,
    }
}

/// Shim NoC tiles sit at absolute columns 2, 3 of every group of four on
/// interleaved-shim generations.
pub(crate) fn shim_noc_interleaved(abs_col: u32) -> bool {
    matches!(abs_col % 4, 2 | 3)
}

// Helpers shared by the column-granular implementations. Each walks the
// partition column by column and stops at the first failed write.

/// Write one shim-row column register with a packed field value on every
/// column.
fn write_shim_col_field(
    dev: &mut DeviceInstance,
    reg_off: u32,
    value: u32,
) -> Result<()> {
    for col in 0..dev.num_cols() {
        let loc = Location::new(col, dev.shim_row());
        let addr = dev.tile_addr(loc) + u64::from(reg_off);
        dev.write32(addr, value)?;
    }
    Ok(())
}

/// Drive the column clock buffers of the whole partition.
fn write_col_clock(dev: &mut DeviceInstance, enable: bool) -> Result<()> {
    let shim = &dev.layout().shim;
    let value = shim.clk_buf_enable.set(u32::from(enable));
    write_shim_col_field(dev, shim.col_clk_off, value)
}

fn mark_all_tiles(dev: &mut DeviceInstance, in_use: bool) {
    let len = dev.tiles_in_use().len();
    if in_use {
        dev.tiles_in_use_mut().set_range(0, len);
    } else {
        dev.tiles_in_use_mut().clear_range(0, len);
    }
}

fn mark_column(dev: &mut DeviceInstance, col: u32, in_use: bool) {
    let rows = (dev.num_rows() - 1) as usize;
    if let Some(start) = dev.tile_bit_pos(Location::new(col, 1)) {
        if in_use {
            dev.tiles_in_use_mut().set_range(start, rows);
        } else {
            dev.tiles_in_use_mut().clear_range(start, rows);
        }
    }
}

/// Apply the isolation policy tile by tile: west edge blocked on the first
/// column, east edge on the last, everything cleared otherwise.
fn set_isolation_by_tiles(dev: &mut DeviceInstance, mode: IsolationMode) -> Result<()> {
    for col in 0..dev.num_cols() {
        let (east, west) = match mode {
            IsolationMode::Clear => (false, false),
            IsolationMode::Isolate => (col == dev.num_cols() - 1, col == 0),
        };
        for row in 0..dev.num_rows() {
            let loc = Location::new(col, row);
            let layout = dev.layout();
            let module = match dev.tile_type(loc) {
                TileType::Core => layout.core_isolation,
                TileType::MemTile => layout.mem_tile_isolation.ok_or(
                    AieError::UnsupportedFeature {
                        feature: "memory tile isolation",
                    },
                )?,
                TileType::ShimPl | TileType::ShimNoc => layout.shim_isolation,
            };
            let value = module.east.set(u32::from(east)) | module.west.set(u32::from(west));
            let addr = dev.tile_addr(loc) + u64::from(module.reg_off);
            dev.write32(addr, value)?;
        }
    }
    Ok(())
}

/// Trigger the memory-control zeroisation bit on every tile that has
/// memory; shim tiles are skipped.
fn zeroize_by_mem_ctrl(dev: &mut DeviceInstance) -> Result<()> {
    for col in 0..dev.num_cols() {
        for row in 0..dev.num_rows() {
            let loc = Location::new(col, row);
            let layout = dev.layout();
            let ctrl = match dev.tile_type(loc) {
                TileType::Core => Some(layout.core_mem_ctrl),
                TileType::MemTile => layout.mem_tile_mem_ctrl,
                TileType::ShimPl | TileType::ShimNoc => None,
            };
            let Some(ctrl) = ctrl else { continue };
            let addr = dev.tile_addr(loc) + u64::from(ctrl.reg_off);
            dev.mask_write32(addr, ctrl.zeroisation.mask, ctrl.zeroisation.set(1))?;
        }
    }
    Ok(())
}

/// Column-granular tile request: enabling any tile enables its column.
fn request_columns(dev: &mut DeviceInstance, tiles: &[Location]) -> Result<()> {
    if tiles.is_empty() {
        write_col_clock(dev, true)?;
        mark_all_tiles(dev, true);
        return Ok(());
    }

    for &loc in tiles {
        dev.validate_loc(loc)?;
    }

    let mut wanted = vec![false; dev.num_cols() as usize];
    for &loc in tiles {
        wanted[loc.col as usize] = true;
    }

    let shim = &dev.layout().shim;
    let value = shim.clk_buf_enable.set(1);
    for (col, _) in wanted.iter().enumerate().filter(|(_, w)| **w) {
        let col = col as u32;
        let addr =
            dev.tile_addr(Location::new(col, dev.shim_row())) + u64::from(shim.col_clk_off);
        dev.write32(addr, value)?;
        mark_column(dev, col, true);
    }
    Ok(())
}

/// Column-range clock control shared by the column-granular generations.
fn set_columns_clock(dev: &mut DeviceInstance, req: ColumnClockRequest) -> Result<()> {
    let end = req.start_col.checked_add(req.num_cols);
    match end {
        Some(end) if req.num_cols > 0 && end <= dev.num_cols() => {}
        _ => {
            return Err(AieError::invalid_argument(format!(
                "column range {}+{} outside partition of {} columns",
                req.start_col,
                req.num_cols,
                dev.num_cols()
            )))
        }
    }

    let shim = &dev.layout().shim;
    let value = shim.clk_buf_enable.set(u32::from(req.enable));
    for col in req.start_col..req.start_col + req.num_cols {
        let addr =
            dev.tile_addr(Location::new(col, dev.shim_row())) + u64::from(shim.col_clk_off);
        dev.write32(addr, value)?;
        mark_column(dev, col, req.enable);
    }
    Ok(())
}
