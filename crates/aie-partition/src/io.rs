//! Memory-mapped register access seam.
//!
//! Every register touch in the driver funnels through this trait. Addresses
//! are absolute: the partition base and tile offset are already applied by
//! the caller. Accesses are synchronous and atomic at word granularity; the
//! transport either completes or fails each call before returning.

use crate::error::Result;

/// 32-bit register transport.
pub trait RegisterIo: Send {
    /// Read the register at `addr`.
    fn read32(&mut self, addr: u64) -> Result<u32>;

    /// Write `value` to the register at `addr`.
    fn write32(&mut self, addr: u64, value: u32) -> Result<()>;

    /// Read-modify-write the bits selected by `mask`.
    fn mask_write32(&mut self, addr: u64, mask: u32, value: u32) -> Result<()> {
        let current = self.read32(addr)?;
        self.write32(addr, (current & !mask) | (value & mask))
    }
}
