//! Register layout tables for AIE tile-array generations.
//!
//! Everything in this crate is immutable data: bitfield descriptors, tile
//! grid geometry, and per-generation module descriptor tables. The driver
//! crate (`aie-partition`) holds a `&'static GenerationLayout` and never
//! mutates it. No register is ever touched from here.
//!
//! Offsets are relative to a tile's register window; the driver computes the
//! absolute address from partition base, column and row (see
//! [`Geometry::tile_offset`]).

#![warn(missing_docs)]
#![warn(clippy::all)]

mod aie;
mod aie2ps;
mod aieml;
mod field;
mod geometry;
mod modules;

pub use field::RegField;
pub use geometry::Geometry;
pub use modules::{
    AxiMmErrorConfig, DmaPauseChannels, GenerationLayout, IsolationModule, L2IntrModule,
    MemoryControlModule, MemoryMap, NmuSwitchConfig, PerfModule, ShimColumnModule,
    UcDmaPauseModule,
};

/// Silicon generation of the tile array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generation {
    /// First-generation array (Versal AIE).
    Aie,
    /// ML-optimized second generation.
    AieMl,
    /// Second generation with PS integration (adds NMU switching, AXI-MM
    /// partition isolation and the microcontroller DMA).
    Aie2Ps,
}

impl Generation {
    /// Static layout table for this generation.
    pub const fn layout(self) -> &'static GenerationLayout {
        match self {
            Generation::Aie => &aie::LAYOUT,
            Generation::AieMl => &aieml::LAYOUT,
            Generation::Aie2Ps => &aie2ps::LAYOUT,
        }
    }
}

/// NoC IRQ index the L2 interrupt controllers route error interrupts to.
pub const ERROR_NOC_IRQ_ID: u32 = 0x1;
