//! Simulated register and NPI backend.
//!
//! A sparse in-memory register file implementing both [`RegisterIo`] and
//! [`NpiTransport`], recording every access so tests can assert write
//! ordering, protected-window bracketing and per-tile targeting without
//! silicon. Single-shot failure injection covers both the register path
//! (by write index) and each NPI call kind.
//!
//! This is not a behavioral model: registers are plain storage with no
//! side effects.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{AieError, Result};
use crate::io::RegisterIo;
use crate::npi::{NpiTransport, ProtRegRequest};

/// One recorded register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegWrite {
    /// Absolute register address.
    pub addr: u64,
    /// Mask of the bits touched; a plain write records `0xFFFF_FFFF`.
    pub mask: u32,
    /// Value after masking into the register.
    pub value: u32,
}

/// One recorded NPI transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpiEvent {
    /// Shim reset assert/de-assert.
    ShimReset(bool),
    /// Protected-register window open/close.
    ProtectedRegs {
        /// Columns covered by the request.
        num_cols: u32,
        /// Open (`true`) or close (`false`).
        enable: bool,
    },
}

#[derive(Debug, Default)]
struct SimState {
    regs: HashMap<u64, u32>,
    writes: Vec<RegWrite>,
    npi_events: Vec<NpiEvent>,
    fail_write_at: Option<usize>,
    fail_shim_reset: Option<bool>,
    fail_protected_regs: Option<bool>,
}

/// Shared simulated device. Clone-cheap; [`Self::io_handle`] and
/// [`Self::npi_handle`] hand the transports to a `DeviceInstance` while the
/// original keeps inspection access.
#[derive(Debug, Clone, Default)]
pub struct SimBackend {
    state: Arc<Mutex<SimState>>,
}

impl SimBackend {
    /// Fresh backend with all registers reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        // A panicking test may poison the lock; the register file is still
        // coherent for inspection.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register transport handle for `DeviceInstance::new`.
    pub fn io_handle(&self) -> Box<dyn RegisterIo> {
        Box::new(SimIo(self.clone()))
    }

    /// NPI transport handle for `DeviceInstance::new`.
    pub fn npi_handle(&self) -> Box<dyn NpiTransport> {
        Box::new(SimNpi(self.clone()))
    }

    /// Current value of the register at `addr` (zero if never written).
    pub fn reg(&self, addr: u64) -> u32 {
        self.lock().regs.get(&addr).copied().unwrap_or(0)
    }

    /// Every register write so far, in order.
    pub fn writes(&self) -> Vec<RegWrite> {
        self.lock().writes.clone()
    }

    /// Number of writes that touched `addr`.
    pub fn writes_to(&self, addr: u64) -> usize {
        self.lock().writes.iter().filter(|w| w.addr == addr).count()
    }

    /// Every NPI call so far, in order.
    pub fn npi_events(&self) -> Vec<NpiEvent> {
        self.lock().npi_events.clone()
    }

    /// Number of protected-register requests with the given direction.
    pub fn protected_reg_calls(&self, enable: bool) -> usize {
        self.lock()
            .npi_events
            .iter()
            .filter(|e| matches!(e, NpiEvent::ProtectedRegs { enable: en, .. } if *en == enable))
            .count()
    }

    /// Fail the `index`-th register write (0-based), once.
    pub fn fail_write_at(&self, index: usize) {
        self.lock().fail_write_at = Some(index);
    }

    /// Fail the next shim-reset call with the given direction, once.
    pub fn fail_shim_reset(&self, enable: bool) {
        self.lock().fail_shim_reset = Some(enable);
    }

    /// Fail the next protected-register call with the given direction, once.
    pub fn fail_protected_regs(&self, enable: bool) {
        self.lock().fail_protected_regs = Some(enable);
    }

    /// Drop the recorded access logs, keeping register contents.
    pub fn clear_log(&self) {
        let mut st = self.lock();
        st.writes.clear();
        st.npi_events.clear();
    }
}

struct SimIo(SimBackend);

impl RegisterIo for SimIo {
    fn read32(&mut self, addr: u64) -> Result<u32> {
        Ok(self.0.lock().regs.get(&addr).copied().unwrap_or(0))
    }

    fn write32(&mut self, addr: u64, value: u32) -> Result<()> {
        let mut st = self.0.lock();
        if st.fail_write_at == Some(st.writes.len()) {
            st.fail_write_at = None;
            return Err(AieError::hardware_error(format!(
                "injected write failure at {addr:#x}"
            )));
        }
        st.regs.insert(addr, value);
        st.writes.push(RegWrite {
            addr,
            mask: u32::MAX,
            value,
        });
        Ok(())
    }

    fn mask_write32(&mut self, addr: u64, mask: u32, value: u32) -> Result<()> {
        let mut st = self.0.lock();
        if st.fail_write_at == Some(st.writes.len()) {
            st.fail_write_at = None;
            return Err(AieError::hardware_error(format!(
                "injected write failure at {addr:#x}"
            )));
        }
        let current = st.regs.get(&addr).copied().unwrap_or(0);
        let merged = (current & !mask) | (value & mask);
        st.regs.insert(addr, merged);
        st.writes.push(RegWrite {
            addr,
            mask,
            value: value & mask,
        });
        Ok(())
    }
}

struct SimNpi(SimBackend);

impl NpiTransport for SimNpi {
    fn set_shim_reset(&mut self, enable: bool) -> Result<()> {
        let mut st = self.0.lock();
        if st.fail_shim_reset == Some(enable) {
            st.fail_shim_reset = None;
            return Err(AieError::hardware_error("injected shim reset failure"));
        }
        st.npi_events.push(NpiEvent::ShimReset(enable));
        Ok(())
    }

    fn set_protected_reg_enable(&mut self, req: ProtRegRequest) -> Result<()> {
        let mut st = self.0.lock();
        if st.fail_protected_regs == Some(req.enable) {
            st.fail_protected_regs = None;
            return Err(AieError::hardware_error(
                "injected protected-register failure",
            ));
        }
        st.npi_events.push(NpiEvent::ProtectedRegs {
            num_cols: req.num_cols,
            enable: req.enable,
        });
        Ok(())
    }
}
