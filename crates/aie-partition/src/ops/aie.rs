//! First-generation (AIE) operation table.
//!
//! Clock gating is tile-granular: each tile's clock control register feeds
//! the clock of the tile above it, so enabling a tile means walking the
//! column from the shim row upward. There is no per-column shim reset
//! register (the NPI shim reset covers the whole partition) and no column
//! clock request support.

use crate::device::{DeviceInstance, Location, TileType};
use crate::error::{AieError, Result};
use crate::ops::{
    set_isolation_by_tiles, shim_noc_interleaved, zeroize_by_mem_ctrl, ColumnClockRequest,
    DeviceOps, IsolationFlags, IsolationMode,
};

pub(super) struct AieOps;

impl AieOps {
    fn tile_clock(dev: &DeviceInstance) -> Result<(u32, aie_regs::RegField)> {
        dev.layout()
            .tile_clock
            .ok_or(AieError::UnsupportedFeature {
                feature: "tile clock control",
            })
    }
}

impl DeviceOps for AieOps {
    fn tile_type_of(&self, dev: &DeviceInstance, loc: Location) -> TileType {
        if loc.row == dev.shim_row() {
            if shim_noc_interleaved(dev.start_col() + loc.col) {
                TileType::ShimNoc
            } else {
                TileType::ShimPl
            }
        } else {
            TileType::Core
        }
    }

    fn set_partition_clock(&self, dev: &mut DeviceInstance, enable: bool) -> Result<()> {
        let (clk_off, field) = Self::tile_clock(dev)?;
        if enable {
            // Feed the clock chain at every row so each tile's upstream
            // buffer is driven.
            for col in 0..dev.num_cols() {
                for row in dev.shim_row()..dev.num_rows() - 1 {
                    let addr = dev.tile_addr(Location::new(col, row)) + u64::from(clk_off);
                    dev.mask_write32(addr, field.mask, field.set(1))?;
                }
            }
        } else {
            // Cutting the chain at the shim row gates the whole column.
            for col in 0..dev.num_cols() {
                let addr =
                    dev.tile_addr(Location::new(col, dev.shim_row())) + u64::from(clk_off);
                dev.mask_write32(addr, field.mask, field.set(0))?;
            }
        }
        let len = dev.tiles_in_use().len();
        if enable {
            dev.tiles_in_use_mut().set_range(0, len);
        } else {
            dev.tiles_in_use_mut().clear_range(0, len);
        }
        Ok(())
    }

    fn set_part_col_shim_reset(&self, dev: &mut DeviceInstance, enable: bool) -> Result<()> {
        // Shim reset on this generation is driven entirely through the NPI
        // transport; there is no per-column field to toggle.
        let _ = dev;
        tracing::debug!("No per-column shim reset on AIE, skipping (enable={enable})");
        Ok(())
    }

    fn set_part_col_clock_after_rst(&self, dev: &mut DeviceInstance, enable: bool) -> Result<()> {
        self.set_partition_clock(dev, enable)
    }

    fn set_part_isolation_after_rst(
        &self,
        dev: &mut DeviceInstance,
        mode: IsolationMode,
    ) -> Result<()> {
        set_isolation_by_tiles(dev, mode)
    }

    fn zeroize_partition_memory(&self, dev: &mut DeviceInstance) -> Result<()> {
        zeroize_by_mem_ctrl(dev)
    }

    fn request_tiles(&self, dev: &mut DeviceInstance, tiles: &[Location]) -> Result<()> {
        if tiles.is_empty() {
            return self.set_partition_clock(dev, true);
        }

        let (clk_off, field) = Self::tile_clock(dev)?;
        for &loc in tiles {
            dev.validate_loc(loc)?;
        }
        for &loc in tiles {
            // Enable the clock chain from the shim row up to the requested
            // tile; everything below it must be clocked for it to run.
            for row in dev.shim_row()..loc.row {
                let addr = dev.tile_addr(Location::new(loc.col, row)) + u64::from(clk_off);
                dev.mask_write32(addr, field.mask, field.set(1))?;
            }
            if let Some(start) = dev.tile_bit_pos(Location::new(loc.col, 1)) {
                dev.tiles_in_use_mut().set_range(start, loc.row as usize);
            }
        }
        Ok(())
    }

    fn set_column_clock(&self, dev: &mut DeviceInstance, req: ColumnClockRequest) -> Result<()> {
        let _ = (dev, req);
        Err(AieError::UnsupportedFeature {
            feature: "column clock control",
        })
    }

    fn set_axi_mm_isolation(&self, dev: &mut DeviceInstance, flags: IsolationFlags) -> Result<()> {
        let _ = dev;
        tracing::debug!("AXI-MM isolation not present on AIE, ignoring {flags:?}");
        Ok(())
    }
}
