//! Performance counter access.
//!
//! Counters live in unprotected register space, so none of this runs in
//! the protected-register window. Each tile type carries its own counter
//! bank; the per-generation layout decides how many counters exist and
//! which event ids a tile type can select.

use aie_regs::PerfModule;

use crate::device::{DeviceInstance, Location, TileType};
use crate::error::{AieError, Result};

fn perf_module(dev: &DeviceInstance, loc: Location) -> Result<&'static PerfModule> {
    dev.validate_loc(loc)?;
    let layout = dev.layout();
    match dev.tile_type(loc) {
        TileType::Core => Ok(&layout.core_perf),
        TileType::MemTile => layout
            .mem_tile_perf
            .as_ref()
            .ok_or(AieError::UnsupportedFeature {
                feature: "memory tile performance counters",
            }),
        TileType::ShimPl | TileType::ShimNoc => Ok(&layout.shim_perf),
    }
}

fn check_counter(module: &PerfModule, counter: u32) -> Result<()> {
    if counter >= module.count {
        return Err(AieError::invalid_argument(format!(
            "counter {counter} out of range (tile has {})",
            module.count
        )));
    }
    Ok(())
}

fn check_event(module: &PerfModule, what: &str, event: u32) -> Result<()> {
    if event < module.event_min || event > module.event_max {
        return Err(AieError::invalid_argument(format!(
            "{what} event {event} outside valid range {}..={}",
            module.event_min, module.event_max
        )));
    }
    Ok(())
}

/// Read the current value of a performance counter.
///
/// # Errors
///
/// `InvalidArgument` for a bad location or counter index,
/// `UnsupportedFeature` when the tile type has no counters, or the
/// register read failure.
pub fn counter_read(dev: &mut DeviceInstance, loc: Location, counter: u32) -> Result<u32> {
    let module = perf_module(dev, loc)?;
    check_counter(module, counter)?;
    let addr = dev.tile_addr(loc) + u64::from(module.base + counter * module.stride);
    dev.read32(addr)
}

/// Load a performance counter with a value.
///
/// # Errors
///
/// Same taxonomy as [`counter_read`].
pub fn counter_set(
    dev: &mut DeviceInstance,
    loc: Location,
    counter: u32,
    value: u32,
) -> Result<()> {
    let module = perf_module(dev, loc)?;
    check_counter(module, counter)?;
    let addr = dev.tile_addr(loc) + u64::from(module.base + counter * module.stride);
    dev.write32(addr, value)
}

/// Select the start and stop events of a performance counter.
///
/// # Errors
///
/// `InvalidArgument` when either event id is outside the tile type's
/// valid range, plus the [`counter_read`] taxonomy.
pub fn counter_control_set(
    dev: &mut DeviceInstance,
    loc: Location,
    counter: u32,
    start_event: u32,
    stop_event: u32,
) -> Result<()> {
    let module = perf_module(dev, loc)?;
    check_counter(module, counter)?;
    check_event(module, "start", start_event)?;
    check_event(module, "stop", stop_event)?;

    let addr = dev.tile_addr(loc) + u64::from(module.ctrl_off + counter * 4);
    let mask = module.start.mask | module.stop.mask;
    let value = module.start.set(start_event) | module.stop.set(stop_event);
    dev.mask_write32(addr, mask, value)
}

/// Select the event that resets a performance counter.
///
/// # Errors
///
/// Same taxonomy as [`counter_control_set`].
pub fn counter_reset_control_set(
    dev: &mut DeviceInstance,
    loc: Location,
    counter: u32,
    reset_event: u32,
) -> Result<()> {
    let module = perf_module(dev, loc)?;
    check_counter(module, counter)?;
    check_event(module, "reset", reset_event)?;

    let addr = dev.tile_addr(loc) + u64::from(module.rst_off + counter * 4);
    dev.mask_write32(addr, module.rst.mask, module.rst.set(reset_event))
}
