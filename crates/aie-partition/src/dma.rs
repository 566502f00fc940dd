//! DMA pause control for NoC-facing shim tiles.
//!
//! Pausing parks a DMA channel at its next task boundary without
//! disturbing queued descriptors, so traffic can be quiesced around
//! partition reconfiguration. The pause registers are protected, so every
//! call runs inside the protected-register window. A `None` target
//! broadcasts to every shim NoC tile in the partition; any failed write
//! aborts the broadcast and reports the failure.

use tracing::error;

use crate::device::{DeviceInstance, Location, TileType};
use crate::error::{AieError, Result};
use crate::privilege::with_protected_regs;

/// Shim NoC DMA transfer direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaDirection {
    /// Stream-to-memory-map (inbound).
    S2mm,
    /// Memory-map-to-stream (outbound).
    Mm2s,
}

/// Microcontroller DMA transfer direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UcDmaDirection {
    /// Data memory to memory map.
    Dm2mm,
    /// Memory map to data memory.
    Mm2dm,
}

fn require_shim_noc(dev: &DeviceInstance, loc: Location) -> Result<()> {
    dev.validate_loc(loc)?;
    let tile_type = dev.tile_type(loc);
    if tile_type != TileType::ShimNoc {
        error!(
            "DMA pause target ({}, {}) is not a shim NoC tile",
            loc.col, loc.row
        );
        return Err(AieError::InvalidTileType {
            tile_type,
            col: loc.col,
            row: loc.row,
        });
    }
    Ok(())
}

/// Pause or resume one NoC DMA channel.
///
/// `loc` of `None` applies the request to every shim NoC tile in the
/// partition. `channel` indexes the per-direction channel pair.
///
/// # Errors
///
/// `UnsupportedFeature` on generations without pausable NoC DMA,
/// `InvalidArgument` for an out-of-range channel, `InvalidTileType` when
/// an explicit target is not a shim NoC tile, and any register or window
/// failure otherwise.
pub fn pause_noc_dma(
    dev: &mut DeviceInstance,
    loc: Option<Location>,
    channel: u8,
    dir: DmaDirection,
    pause: bool,
) -> Result<()> {
    let module = dev.layout().noc_dma_pause.ok_or(AieError::UnsupportedFeature {
        feature: "NoC DMA pause",
    })?;
    let channels = match dir {
        DmaDirection::S2mm => &module.s2mm,
        DmaDirection::Mm2s => &module.mm2s,
    };
    let field = *channels.get(usize::from(channel)).ok_or_else(|| {
        AieError::invalid_argument(format!(
            "DMA channel {channel} out of range (max {})",
            channels.len() - 1
        ))
    })?;
    if let Some(loc) = loc {
        require_shim_noc(dev, loc)?;
    }

    with_protected_regs(dev, |dev| match loc {
        Some(loc) => {
            let addr = dev.tile_addr(loc) + u64::from(module.reg_off);
            dev.mask_write32(addr, field.mask, field.set(u32::from(pause)))
        }
        None => {
            for col in 0..dev.num_cols() {
                let loc = Location::new(col, dev.shim_row());
                if dev.tile_type(loc) != TileType::ShimNoc {
                    continue;
                }
                let addr = dev.tile_addr(loc) + u64::from(module.reg_off);
                dev.mask_write32(addr, field.mask, field.set(u32::from(pause)))?;
            }
            Ok(())
        }
    })
}

/// Pause or resume the shim microcontroller DMA in one direction.
///
/// Same targeting and window rules as [`pause_noc_dma`].
///
/// # Errors
///
/// `UnsupportedFeature` on generations without a shim microcontroller,
/// `InvalidTileType` when an explicit target is not a shim NoC tile, and
/// any register or window failure otherwise.
pub fn pause_uc_dma(
    dev: &mut DeviceInstance,
    loc: Option<Location>,
    dir: UcDmaDirection,
    pause: bool,
) -> Result<()> {
    let module = dev.layout().uc_dma_pause.ok_or(AieError::UnsupportedFeature {
        feature: "microcontroller DMA pause",
    })?;
    let field = match dir {
        UcDmaDirection::Dm2mm => module.dm2mm,
        UcDmaDirection::Mm2dm => module.mm2dm,
    };
    if let Some(loc) = loc {
        require_shim_noc(dev, loc)?;
    }

    with_protected_regs(dev, |dev| match loc {
        Some(loc) => {
            let addr = dev.tile_addr(loc) + u64::from(module.reg_off);
            dev.mask_write32(addr, field.mask, field.set(u32::from(pause)))
        }
        None => {
            for col in 0..dev.num_cols() {
                let loc = Location::new(col, dev.shim_row());
                if dev.tile_type(loc) != TileType::ShimNoc {
                    continue;
                }
                let addr = dev.tile_addr(loc) + u64::from(module.reg_off);
                dev.mask_write32(addr, field.mask, field.set(u32::from(pause)))?;
            }
            Ok(())
        }
    })
}
