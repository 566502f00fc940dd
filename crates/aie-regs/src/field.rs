//! Bitfield descriptor and pack/unpack codec.

/// Position of one hardware field within a 32-bit register.
///
/// A descriptor is pure data; packing and unpacking are the only operations.
/// One instance exists per field per module per generation, all `'static`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegField {
    /// Least significant bit of the field.
    pub lsb: u32,
    /// Mask of the field, already shifted into register position.
    pub mask: u32,
}

impl RegField {
    /// Descriptor for a `width`-bit field starting at `lsb`.
    pub const fn new(lsb: u32, width: u32) -> Self {
        debug_assert!(width > 0 && lsb + width <= 32);
        let mask = if width == 32 {
            u32::MAX
        } else {
            ((1u32 << width) - 1) << lsb
        };
        Self { lsb, mask }
    }

    /// Pack `value` into register position.
    pub const fn set(self, value: u32) -> u32 {
        (value << self.lsb) & self.mask
    }

    /// Unpack the field value from a register word.
    pub const fn get(self, reg: u32) -> u32 {
        (reg & self.mask) >> self.lsb
    }
}
