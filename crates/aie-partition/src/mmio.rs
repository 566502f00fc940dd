//! Memory-mapped register window backend.
//!
//! Maps the partition's physical register window (e.g. through `/dev/mem`
//! or a UIO node) and implements [`RegisterIo`] with volatile 32-bit
//! accesses. Register reads and writes must be volatile: the hardware
//! changes values underneath us and writes trigger side effects.

#![allow(clippy::cast_possible_truncation)]

use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::File;
use std::os::unix::io::AsFd;

use crate::error::{AieError, Result};
use crate::io::RegisterIo;

/// Mapped physical register window.
pub struct MappedMmio {
    ptr: *mut u8,
    size: usize,
    phys_base: u64,
}

impl std::fmt::Debug for MappedMmio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedMmio")
            .field("ptr", &format_args!("{:p}", self.ptr))
            .field("size", &self.size)
            .field("phys_base", &format_args!("{:#x}", self.phys_base))
            .finish()
    }
}

// SAFETY: Send - MappedMmio owns the mapping exclusively; mmap'd memory is
// process-wide, so moving the handle between threads does not invalidate it.
unsafe impl Send for MappedMmio {}

impl MappedMmio {
    /// Map `size` bytes of physical address space starting at `phys_base`
    /// from an already opened memory device node.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError` if the mapping fails.
    pub fn map(device: &File, phys_base: u64, size: usize) -> Result<Self> {
        // SAFETY: mmap necessary for MMIO - maps the register window into the
        // process address space. device is an open fd; phys_base/size come
        // from the caller's device description; the pointer is valid for
        // size bytes on success.
        let ptr = unsafe {
            mmap(
                std::ptr::null_mut(),
                size,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                device.as_fd(),
                phys_base,
            )
            .map_err(|e| {
                AieError::hardware_error(format!("failed to mmap window at {phys_base:#x}: {e}"))
            })?
        };

        tracing::info!("Mapped register window {phys_base:#x}+{size:#x} at {ptr:p}");

        Ok(Self {
            ptr: ptr.cast(),
            size,
            phys_base,
        })
    }

    fn offset(&self, addr: u64) -> Result<usize> {
        let in_window = self
            .phys_base
            .checked_add(self.size as u64)
            .zip(addr.checked_add(4))
            .is_some_and(|(end, last)| addr >= self.phys_base && last <= end);
        if !in_window {
            return Err(AieError::hardware_error(format!(
                "register {addr:#x} outside mapped window {:#x}+{:#x}",
                self.phys_base, self.size
            )));
        }
        if addr % 4 != 0 {
            return Err(AieError::hardware_error(format!(
                "register {addr:#x} is not word aligned"
            )));
        }
        Ok((addr - self.phys_base) as usize)
    }
}

impl RegisterIo for MappedMmio {
    fn read32(&mut self, addr: u64) -> Result<u32> {
        let off = self.offset(addr)?;
        // SAFETY: ptr is valid for self.size bytes from map(); offset() has
        // bounds- and alignment-checked off.
        Ok(unsafe { std::ptr::read_volatile(self.ptr.add(off).cast::<u32>()) })
    }

    fn write32(&mut self, addr: u64, value: u32) -> Result<()> {
        let off = self.offset(addr)?;
        // SAFETY: ptr is valid for self.size bytes from map(); offset() has
        // bounds- and alignment-checked off.
        unsafe {
            std::ptr::write_volatile(self.ptr.add(off).cast::<u32>(), value);
        }
        Ok(())
    }
}

impl Drop for MappedMmio {
    fn drop(&mut self) {
        // SAFETY: ptr+size were returned by mmap in map(); Drop runs at most
        // once and no references outlive self.
        unsafe {
            let _ = munmap(self.ptr.cast(), self.size);
        }
        tracing::debug!("Unmapped register window {:#x}", self.phys_base);
    }
}
