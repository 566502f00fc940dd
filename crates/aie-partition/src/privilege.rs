//! Partition privilege and lifecycle controller.
//!
//! Every operation here drives protected configuration registers, so each
//! one brackets its work in the NPI protected-register window: open once,
//! run the hardware sequence, close once — on every exit path. The
//! sequences themselves are order-critical; a column reset asserted while
//! its clock is running, or a clock buffer enabled after de-asserting
//! reset, corrupts tile state on silicon. Comments on the individual steps
//! call out the ordering constraints.
//!
//! Register layout differences are behind [`DeviceOps`]; the only explicit
//! generation checks in this module are sequencing differences (the
//! AIE2PS-only NMU switch step, and AIE skipping the protected window for
//! tile requests and carrying a post-init compatibility step).

use aie_regs::{Generation, ERROR_NOC_IRQ_ID};
use tracing::{debug, error, warn};

use crate::device::{DeviceInstance, Location, TileType};
use crate::error::{AieError, Result};
use crate::npi::ProtRegRequest;
use crate::ops::{ColumnClockRequest, IsolationFlags, IsolationMode};

/// Optional steps of partition initialization.
///
/// The default enables every step and activates all tiles, matching the
/// reference bring-up sequence.
#[derive(Debug, Clone)]
pub struct PartInitOptions {
    /// Reset every column (with clock gating around the reset pulse).
    pub column_reset: bool,
    /// Reset the NoC-facing shim tiles.
    pub shim_reset: bool,
    /// Block shim NoC AXI-MM slave/decode errors so they raise events
    /// instead of bus error responses.
    pub block_noc_axi_mm_error: bool,
    /// Isolate the partition from its neighbors.
    pub isolate: bool,
    /// Zero tile memories after reset.
    pub zeroize_memory: bool,
    /// Tiles to activate after bring-up; empty means every tile in the
    /// partition is eligible.
    pub tiles: Vec<Location>,
}

impl Default for PartInitOptions {
    fn default() -> Self {
        Self {
            column_reset: true,
            shim_reset: true,
            block_noc_axi_mm_error: true,
            isolate: true,
            zeroize_memory: true,
            tiles: Vec::new(),
        }
    }
}

/// Open or close the protected-register window for the whole partition.
fn set_part_protected_regs(dev: &mut DeviceInstance, enable: bool) -> Result<()> {
    let req = ProtRegRequest {
        num_cols: dev.num_cols(),
        enable,
    };
    dev.npi_set_protected_reg_enable(req).map_err(|e| {
        error!("Failed to set protected registers (enable={enable}): {e}");
        e
    })
}

/// Run `f` inside the protected-register window.
///
/// The window is opened and closed exactly once per call. If opening fails
/// the body never runs and no close is attempted. If the body fails, the
/// window is still closed and the body's error is returned; a close failure
/// on that path is logged but does not displace the original error. On the
/// success path the close result is the call's result.
pub(crate) fn with_protected_regs<F>(dev: &mut DeviceInstance, f: F) -> Result<()>
where
    F: FnOnce(&mut DeviceInstance) -> Result<()>,
{
    set_part_protected_regs(dev, true)?;
    let result = f(dev);
    let closed = set_part_protected_regs(dev, false);
    match result {
        Ok(()) => closed,
        Err(err) => {
            if let Err(close_err) = closed {
                warn!("Protected-register close also failed: {close_err}");
            }
            Err(err)
        }
    }
}

/// Assert or de-assert the column reset of one column.
fn set_col_reset(dev: &mut DeviceInstance, loc: Location, enable: bool) -> Result<()> {
    let shim = &dev.layout().shim;
    let addr = dev.tile_addr(loc) + u64::from(shim.col_rst_off);
    dev.write32(addr, shim.col_rst.set(u32::from(enable)))
}

/// Assert or de-assert the column reset on every column of the partition.
/// Stops at the first failed column.
fn set_part_col_reset(dev: &mut DeviceInstance, enable: bool) -> Result<()> {
    for col in 0..dev.num_cols() {
        let loc = Location::new(col, dev.shim_row());
        if let Err(e) = set_col_reset(dev, loc, enable) {
            error!("Failed to reset column {col}: {e}");
            return Err(e);
        }
    }
    Ok(())
}

/// Reset all NoC-facing shim tiles in the partition.
///
/// The chip-level NPI reset pulse must be bracketed by the partition-wide
/// column shim reset so that only this partition's shims observe it.
fn reset_part_shims(dev: &mut DeviceInstance) -> Result<()> {
    let ops = dev.ops();
    ops.set_part_col_shim_reset(dev, true)?;
    dev.npi_set_shim_reset(true)?;
    dev.npi_set_shim_reset(false)?;
    ops.set_part_col_shim_reset(dev, false)
}

/// Configure shim NoC AXI-MM slave/decode error blocking on one tile.
fn set_block_axi_mm_nsu_err(
    dev: &mut DeviceInstance,
    loc: Location,
    block_slave: bool,
    block_decode: bool,
) -> Result<()> {
    let cfg = dev.layout().shim.axi_mm_err.ok_or(AieError::UnsupportedFeature {
        feature: "shim NoC AXI-MM error control",
    })?;
    let value = cfg.slave_err.set(u32::from(block_slave))
        | cfg.decode_err.set(u32::from(block_decode));
    let addr = dev.tile_addr(loc) + u64::from(cfg.reg_off);
    dev.write32(addr, value)
}

/// Apply AXI-MM error blocking to every shim NoC tile in the partition;
/// other shim-row tiles are skipped.
fn set_part_block_axi_mm_nsu_err(
    dev: &mut DeviceInstance,
    block_slave: bool,
    block_decode: bool,
) -> Result<()> {
    for col in 0..dev.num_cols() {
        let loc = Location::new(col, dev.shim_row());
        if dev.tile_type(loc) != TileType::ShimNoc {
            continue;
        }
        if let Err(e) = set_block_axi_mm_nsu_err(dev, loc, block_slave, block_decode) {
            error!("Failed to set shim NoC AXI-MM errors at column {col}: {e}");
            return Err(e);
        }
    }
    Ok(())
}

/// Program the NMU switch of one shim tile.
fn set_nmu_switch(
    dev: &mut DeviceInstance,
    loc: Location,
    fwd_east: bool,
    from_west: bool,
) -> Result<()> {
    let tile_type = dev.tile_type(loc);
    if tile_type != TileType::ShimNoc {
        error!("NMU switch target ({}, {}) is not a shim NoC tile", loc.col, loc.row);
        return Err(AieError::InvalidTileType {
            tile_type,
            col: loc.col,
            row: loc.row,
        });
    }

    let cfg = dev.layout().shim.nmu_switch.ok_or(AieError::UnsupportedFeature {
        feature: "NMU switch configuration",
    })?;
    let value =
        cfg.fwd_east.set(u32::from(fwd_east)) | cfg.from_west.set(u32::from(from_west));
    let addr = dev.tile_addr(loc) + u64::from(cfg.reg_off);
    dev.write32(addr, value)
}

/// Configure the boundary NMU switches for the partition.
///
/// The switches at absolute columns 0 and 1 are shared chip resources;
/// only the partition that owns absolute column 0 touches them. Column 0
/// forwards its NoC traffic east, column 1 accepts from the west.
fn set_part_nmu_switch(dev: &mut DeviceInstance) -> Result<()> {
    if dev.start_col() != 0 {
        debug!("Partition does not start at column 0, not configuring NMU switches");
        return Ok(());
    }

    set_nmu_switch(dev, Location::new(0, dev.shim_row()), true, false).map_err(|e| {
        error!("Failed to set switch configuration for column 0: {e}");
        e
    })?;
    set_nmu_switch(dev, Location::new(1, dev.shim_row()), false, true).map_err(|e| {
        error!("Failed to set switch configuration for column 1: {e}");
        e
    })
}

/// Route one shim tile's L2 interrupt controller output to a NoC IRQ line.
fn set_l2_irq_id(dev: &mut DeviceInstance, loc: Location, noc_irq_id: u32) -> Result<()> {
    let reg_off = dev.layout().l2_intr.irq_reg_off;
    let addr = dev.tile_addr(loc) + u64::from(reg_off);
    dev.write32(addr, noc_irq_id)
}

/// Route error interrupts of every L2 controller in the partition to the
/// error NoC IRQ line. Non-NoC shim tiles have no L2 controller and are
/// skipped.
fn set_part_l2_err_irq(dev: &mut DeviceInstance) -> Result<()> {
    for col in 0..dev.num_cols() {
        let loc = Location::new(col, dev.shim_row());
        if dev.tile_type(loc) != TileType::ShimNoc {
            continue;
        }
        if let Err(e) = set_l2_irq_id(dev, loc, ERROR_NOC_IRQ_ID) {
            error!("Failed to configure L2 error IRQ channel at column {col}: {e}");
            return Err(e);
        }
    }
    Ok(())
}

/// Initialize the partition.
///
/// Steps, in hardware-mandated order (optional ones gated by `opts`):
/// column reset with clock gating around the pulse, shim reset (plus the
/// AIE2PS boundary NMU switches), AXI-MM error blocking, post-reset column
/// clock enable, isolation policy, memory zeroisation, L2 error IRQ
/// routing, and activation of the requested tiles. Any failure
/// short-circuits the remaining steps; the protected-register window is
/// closed on every path once opened.
///
/// # Errors
///
/// Returns the first failure encountered. The hardware is left as the
/// failed step left it — there is no automatic rollback beyond closing the
/// window; the caller decides between retrying and forcing a teardown.
pub fn initialize(dev: &mut DeviceInstance, opts: &PartInitOptions) -> Result<()> {
    with_protected_regs(dev, |dev| {
        let ops = dev.ops();

        if opts.column_reset {
            // Gate all tiles before asserting reset to quiet traffic, and
            // bring the clock buffers back up before releasing reset.
            ops.set_partition_clock(dev, false)?;
            set_part_col_reset(dev, true)?;
            ops.set_partition_clock(dev, true)?;
            set_part_col_reset(dev, false)?;
        }

        if opts.shim_reset {
            reset_part_shims(dev)?;
            if dev.generation() == Generation::Aie2Ps {
                set_part_nmu_switch(dev)?;
            }
        }

        if opts.block_noc_axi_mm_error {
            set_part_block_axi_mm_nsu_err(dev, true, true)?;
        }

        ops.set_part_col_clock_after_rst(dev, true)?;

        let mode = if opts.isolate {
            IsolationMode::Isolate
        } else {
            IsolationMode::Clear
        };
        ops.set_part_isolation_after_rst(dev, mode)?;

        if opts.zeroize_memory {
            ops.zeroize_partition_memory(dev)?;
        }

        set_part_l2_err_irq(dev)?;

        if !opts.tiles.is_empty() {
            ops.request_tiles(dev, &opts.tiles)?;
        }

        // Transitional compatibility step: first-generation parts come out
        // of initialization clock-gated, consistent with a post-reset
        // state, with no tiles marked active.
        if dev.generation() == Generation::Aie {
            ops.set_partition_clock(dev, false)?;
            for col in 0..dev.num_cols() {
                if let Some(start) = dev.tile_bit_pos(Location::new(col, 1)) {
                    let rows = (dev.num_rows() - 1) as usize;
                    dev.tiles_in_use_mut().clear_range(start, rows);
                }
            }
        }

        Ok(())
    })
}

/// Tear the partition down.
///
/// Quiet the clocks, pulse column reset with the clocks re-enabled in
/// between, reset the shims, re-enable the column clocks, zero the
/// memories and finally gate everything. Strictly sequential; the first
/// failure aborts the remaining steps but the window is still closed.
///
/// # Errors
///
/// Returns the first failure encountered, with the same no-rollback
/// contract as [`initialize`].
pub fn teardown(dev: &mut DeviceInstance) -> Result<()> {
    with_protected_regs(dev, |dev| {
        let ops = dev.ops();

        ops.set_partition_clock(dev, false)?;
        set_part_col_reset(dev, true)?;
        ops.set_partition_clock(dev, true)?;
        set_part_col_reset(dev, false)?;
        reset_part_shims(dev)?;
        ops.set_part_col_clock_after_rst(dev, true)?;
        ops.zeroize_partition_memory(dev)?;
        ops.set_partition_clock(dev, false)
    })
}

/// Activate (clock-enable) the given tiles, or every tile when `tiles` is
/// empty.
///
/// On generations with protected clock registers the call is bracketed in
/// the protected-register window; first-generation parts have no protected
/// clock registers, so the window is skipped entirely there.
///
/// # Errors
///
/// Returns the first failure from the window bracket or the clock writes.
pub fn request_tiles(dev: &mut DeviceInstance, tiles: &[Location]) -> Result<()> {
    let ops = dev.ops();
    if dev.generation() == Generation::Aie {
        return ops.request_tiles(dev, tiles).map_err(|e| {
            error!("Request tiles failed: {e}");
            e
        });
    }

    with_protected_regs(dev, |dev| {
        ops.request_tiles(dev, tiles).map_err(|e| {
            error!("Request tiles failed: {e}");
            e
        })
    })
}

/// Enable or gate the clock of a column range.
///
/// Same window policy as [`request_tiles`].
///
/// # Errors
///
/// Returns `UnsupportedFeature` on generations without column clock
/// control, otherwise the first failure encountered.
pub fn set_column_clock(dev: &mut DeviceInstance, req: ColumnClockRequest) -> Result<()> {
    let ops = dev.ops();
    if dev.generation() == Generation::Aie {
        return ops.set_column_clock(dev, req).map_err(|e| {
            error!("Set column clock failed: {e}");
            e
        });
    }

    with_protected_regs(dev, |dev| {
        ops.set_column_clock(dev, req).map_err(|e| {
            error!("Set column clock failed: {e}");
            e
        })
    })
}

/// Program the partition's AXI-MM isolation edges.
///
/// The window is always bracketed; the edge write itself only applies on
/// AIE2PS, and is accepted as a no-op success elsewhere (callers pass a
/// generation-appropriate policy).
///
/// # Errors
///
/// Returns the first failure from the window bracket or the isolation
/// write.
pub fn set_axi_mm_isolation(dev: &mut DeviceInstance, flags: IsolationFlags) -> Result<()> {
    with_protected_regs(dev, |dev| {
        if dev.generation() != Generation::Aie2Ps {
            debug!("AXI-MM isolation is a no-op on {:?}", dev.generation());
            return Ok(());
        }
        let ops = dev.ops();
        ops.set_axi_mm_isolation(dev, flags).map_err(|e| {
            error!("Failed to set the AXI-MM isolation: {e}");
            e
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::PartitionConfig;
    use crate::sim::SimBackend;

    fn open(sim: &SimBackend) -> DeviceInstance {
        DeviceInstance::new(
            PartitionConfig {
                generation: Generation::Aie2Ps,
                base_addr: 0,
                start_col: 0,
                num_cols: 2,
            },
            sim.io_handle(),
            sim.npi_handle(),
        )
        .unwrap()
    }

    #[test]
    fn default_options_enable_everything() {
        let opts = PartInitOptions::default();
        assert!(opts.column_reset);
        assert!(opts.shim_reset);
        assert!(opts.block_noc_axi_mm_error);
        assert!(opts.isolate);
        assert!(opts.zeroize_memory);
        assert!(opts.tiles.is_empty());
    }

    #[test]
    fn body_error_outranks_close_error() {
        let sim = SimBackend::new();
        let mut dev = open(&sim);

        sim.fail_protected_regs(false);
        let err = with_protected_regs(&mut dev, |_| {
            Err(AieError::invalid_argument("from the body"))
        })
        .unwrap_err();
        assert!(matches!(err, AieError::InvalidArgument { .. }));
    }

    #[test]
    fn window_spans_whole_partition() {
        let sim = SimBackend::new();
        let mut dev = open(&sim);

        with_protected_regs(&mut dev, |_| Ok(())).unwrap();
        let events = sim.npi_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            crate::sim::NpiEvent::ProtectedRegs {
                num_cols: 2,
                enable: true
            }
        ));
    }
}
