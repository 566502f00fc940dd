//! Userspace partition driver for AIE-style tile-array accelerators.
//!
//! A partition is a contiguous range of columns claimed from the tile
//! grid. This crate owns its privileged control plane: protected-register
//! gating, reset and clock sequencing, isolation, error masking, interrupt
//! routing, DMA pause, performance counters and core program loading.
//! Register layouts for each silicon generation come from the `aie-regs`
//! crate; everything here is generation-independent sequencing plus a
//! per-generation operation table.
//!
//! The data path (stream switches, buffer descriptors) is out of scope.
//!
//! # Example
//!
//! ```no_run
//! use aie_partition::{
//!     initialize, DeviceInstance, Generation, PartInitOptions, PartitionConfig, SimBackend,
//! };
//!
//! # fn main() -> aie_partition::Result<()> {
//! let sim = SimBackend::new();
//! let mut dev = DeviceInstance::new(
//!     PartitionConfig {
//!         generation: Generation::Aie2Ps,
//!         base_addr: 0x2000_0000,
//!         start_col: 0,
//!         num_cols: 4,
//!     },
//!     sim.io_handle(),
//!     sim.npi_handle(),
//! )?;
//! initialize(&mut dev, &PartInitOptions::default())?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod device;
pub mod dma;
pub mod error;
pub mod io;
pub mod loader;
#[cfg(unix)]
pub mod mmio;
pub mod npi;
mod ops;
pub mod perfcnt;
pub mod privilege;
pub mod sim;

pub use aie_regs::Generation;

pub use device::{Bitmap, DeviceInstance, Location, PartitionConfig, TileType};
pub use dma::{pause_noc_dma, pause_uc_dma, DmaDirection, UcDmaDirection};
pub use error::{AieError, Result};
pub use io::RegisterIo;
pub use loader::{load_elf, load_elf_mem, load_elf_section, ProgramHeader};
#[cfg(unix)]
pub use mmio::MappedMmio;
pub use npi::{NpiTransport, ProtRegRequest};
pub use ops::{ColumnClockRequest, IsolationFlags, IsolationMode};
pub use perfcnt::{counter_control_set, counter_read, counter_reset_control_set, counter_set};
pub use privilege::{
    initialize, request_tiles, set_axi_mm_isolation, set_column_clock, teardown, PartInitOptions,
};
pub use sim::{NpiEvent, RegWrite, SimBackend};
