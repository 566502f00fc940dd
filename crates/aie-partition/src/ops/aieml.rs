//! ML-generation (AIE-ML) operation table.
//!
//! Everything is column-granular: one clock buffer, one reset line and one
//! shim reset line per column, all in the shim column control block.

use crate::device::{DeviceInstance, Location, TileType};
use crate::error::{AieError, Result};
use crate::ops::{
    mark_all_tiles, request_columns, set_columns_clock, set_isolation_by_tiles,
    shim_noc_interleaved, write_col_clock, write_shim_col_field, zeroize_by_mem_ctrl,
    ColumnClockRequest, DeviceOps, IsolationFlags, IsolationMode,
};

pub(super) struct AieMlOps;

impl DeviceOps for AieMlOps {
    fn tile_type_of(&self, dev: &DeviceInstance, loc: Location) -> TileType {
        let geo = dev.layout().geometry;
        if loc.row == geo.shim_row {
            if shim_noc_interleaved(dev.start_col() + loc.col) {
                TileType::ShimNoc
            } else {
                TileType::ShimPl
            }
        } else if loc.row <= geo.mem_tile_rows {
            TileType::MemTile
        } else {
            TileType::Core
        }
    }

    fn set_partition_clock(&self, dev: &mut DeviceInstance, enable: bool) -> Result<()> {
        write_col_clock(dev, enable)?;
        mark_all_tiles(dev, enable);
        Ok(())
    }

    fn set_part_col_shim_reset(&self, dev: &mut DeviceInstance, enable: bool) -> Result<()> {
        let (reg_off, field) = dev.layout().shim.shim_rst.ok_or(AieError::UnsupportedFeature {
            feature: "per-column shim reset",
        })?;
        write_shim_col_field(dev, reg_off, field.set(u32::from(enable)))
    }

    fn set_part_col_clock_after_rst(&self, dev: &mut DeviceInstance, enable: bool) -> Result<()> {
        write_col_clock(dev, enable)?;
        mark_all_tiles(dev, enable);
        Ok(())
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
        request_columns(dev, tiles)
    }

    fn set_column_clock(&self, dev: &mut DeviceInstance, req: ColumnClockRequest) -> Result<()> {
        set_columns_clock(dev, req)
    }

    fn set_axi_mm_isolation(&self, dev: &mut DeviceInstance, flags: IsolationFlags) -> Result<()> {
        let _ = dev;
        tracing::debug!("AXI-MM isolation not present on AIE-ML, ignoring {flags:?}");
        Ok(())
    }
}
