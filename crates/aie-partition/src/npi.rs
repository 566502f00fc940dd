//! NoC Programming Interface transport seam.
//!
//! The NPI lives outside the tile-grid register space; it gates access to
//! protected configuration registers and drives the chip-level shim reset.
//! The transport is trusted to be synchronous: each call completes or fails
//! before returning, and timeout detection (if any) is its responsibility.

use crate::error::Result;

/// Protected-register window request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtRegRequest {
    /// Number of columns the window covers.
    pub num_cols: u32,
    /// Open (`true`) or close (`false`) the window.
    pub enable: bool,
}

/// Chip-level NPI control transport.
pub trait NpiTransport: Send {
    /// Assert (`true`) or de-assert (`false`) the shim reset.
    fn set_shim_reset(&mut self, enable: bool) -> Result<()>;

    /// Open or close the protected-register access window.
    fn set_protected_reg_enable(&mut self, req: ProtRegRequest) -> Result<()>;
}
