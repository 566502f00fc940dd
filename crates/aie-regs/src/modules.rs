//! Module descriptor tables.
//!
//! Each struct mirrors one hardware module's register layout for a
//! generation. A field that a generation does not implement is `None` in its
//! [`GenerationLayout`]; the driver maps absence to a feature error or a
//! documented no-op depending on the operation.

use crate::field::RegField;
use crate::geometry::Geometry;

/// Shim-row column control registers (reset, clock, shim reset, NMU switch,
/// AXI-MM error blocking). One register window per column at the shim row.
#[derive(Debug, Clone, Copy)]
pub struct ShimColumnModule {
    /// Column reset control register offset.
    pub col_rst_off: u32,
    /// Column reset assert field.
    pub col_rst: RegField,
    /// Column clock control register offset.
    pub col_clk_off: u32,
    /// Clock buffer enable field.
    pub clk_buf_enable: RegField,
    /// Per-column shim reset control, absent where shim reset is driven
    /// solely through the NPI transport.
    pub shim_rst: Option<(u32, RegField)>,
    /// NMU switch configuration (boundary NoC routing).
    pub nmu_switch: Option<NmuSwitchConfig>,
    /// Shim NoC AXI-MM slave/decode error blocking.
    pub axi_mm_err: Option<AxiMmErrorConfig>,
}

/// NMU switch register: east-forward and west-accept selectors.
#[derive(Debug, Clone, Copy)]
pub struct NmuSwitchConfig {
    /// Register offset within the shim tile.
    pub reg_off: u32,
    /// NMU 0 selector: forward NoC traffic to the east neighbor.
    pub fwd_east: RegField,
    /// NMU 1 selector: accept NoC traffic from the west neighbor.
    pub from_west: RegField,
}

/// Shim NoC AXI-MM error control register.
#[derive(Debug, Clone, Copy)]
pub struct AxiMmErrorConfig {
    /// Register offset within the shim tile.
    pub reg_off: u32,
    /// Block NSU slave errors (raise events instead of bus errors).
    pub slave_err: RegField,
    /// Block NSU decode errors.
    pub decode_err: RegField,
}

/// Second-level interrupt controller on shim NoC tiles.
#[derive(Debug, Clone, Copy)]
pub struct L2IntrModule {
    /// IRQ destination register offset.
    pub irq_reg_off: u32,
}

/// Tile control AXI-MM isolation register for one tile type.
#[derive(Debug, Clone, Copy)]
pub struct IsolationModule {
    /// Tile control register offset.
    pub reg_off: u32,
    /// Block traffic crossing the east edge.
    pub east: RegField,
    /// Block traffic crossing the north edge.
    pub north: RegField,
    /// Block traffic crossing the west edge.
    pub west: RegField,
    /// Block traffic crossing the south edge.
    pub south: RegField,
}

/// Memory control register carrying the hardware zeroisation trigger.
#[derive(Debug, Clone, Copy)]
pub struct MemoryControlModule {
    /// Memory control register offset.
    pub reg_off: u32,
    /// Zeroise-memory trigger field.
    pub zeroisation: RegField,
}

/// NoC DMA pause register: one pause bit per (channel, direction).
#[derive(Debug, Clone, Copy)]
pub struct DmaPauseChannels {
    /// Pause register offset within the shim tile.
    pub reg_off: u32,
    /// S2MM pause bits, indexed by channel.
    pub s2mm: [RegField; 2],
    /// MM2S pause bits, indexed by channel.
    pub mm2s: [RegField; 2],
}

/// Microcontroller DMA pause register.
#[derive(Debug, Clone, Copy)]
pub struct UcDmaPauseModule {
    /// Pause register offset within the shim tile.
    pub reg_off: u32,
    /// Pause bit for the DM-to-MM direction.
    pub dm2mm: RegField,
    /// Pause bit for the MM-to-DM direction.
    pub mm2dm: RegField,
}

/// Performance counter block for one tile type.
#[derive(Debug, Clone, Copy)]
pub struct PerfModule {
    /// Offset of counter 0 within the tile.
    pub base: u32,
    /// Stride between consecutive counters.
    pub stride: u32,
    /// Number of counters implemented.
    pub count: u32,
    /// Counter control register offset.
    pub ctrl_off: u32,
    /// Start event selector field.
    pub start: RegField,
    /// Stop event selector field.
    pub stop: RegField,
    /// Counter reset control register offset.
    pub rst_off: u32,
    /// Reset event selector field.
    pub rst: RegField,
    /// First valid event id for this module.
    pub event_min: u32,
    /// Last valid event id for this module.
    pub event_max: u32,
}

/// Program/data memory windows of one tile type, both in ELF address space
/// and in register (tile window) space.
#[derive(Debug, Clone, Copy)]
pub struct MemoryMap {
    /// Program memory base in the core's ELF address space.
    pub prog_elf_base: u32,
    /// Program memory offset within the tile register window.
    pub prog_off: u32,
    /// Program memory size in bytes.
    pub prog_size: u32,
    /// Data memory base in the core's ELF address space.
    pub data_elf_base: u32,
    /// Data memory offset within the tile register window.
    pub data_off: u32,
    /// Data memory size in bytes.
    pub data_size: u32,
}

/// Everything one generation's driver needs, grouped.
#[derive(Debug, Clone, Copy)]
pub struct GenerationLayout {
    /// Grid dimensions and address shifts.
    pub geometry: Geometry,
    /// Shim-row column control registers.
    pub shim: ShimColumnModule,
    /// L2 interrupt controller (shim NoC tiles).
    pub l2_intr: L2IntrModule,
    /// Tile control isolation register per tile type.
    pub core_isolation: IsolationModule,
    /// Isolation register of memory tiles, absent on generations without
    /// memory tiles.
    pub mem_tile_isolation: Option<IsolationModule>,
    /// Isolation register of shim tiles.
    pub shim_isolation: IsolationModule,
    /// Core tile memory control (zeroisation).
    pub core_mem_ctrl: MemoryControlModule,
    /// Memory tile memory control, absent without memory tiles.
    pub mem_tile_mem_ctrl: Option<MemoryControlModule>,
    /// Per-tile clock control used for tile-granular clock gating, absent on
    /// generations with column-granular gating only.
    pub tile_clock: Option<(u32, RegField)>,
    /// NoC DMA pause register.
    pub noc_dma_pause: Option<DmaPauseChannels>,
    /// Microcontroller DMA pause register.
    pub uc_dma_pause: Option<UcDmaPauseModule>,
    /// Core tile performance counters.
    pub core_perf: PerfModule,
    /// Memory tile performance counters.
    pub mem_tile_perf: Option<PerfModule>,
    /// Shim tile performance counters.
    pub shim_perf: PerfModule,
    /// Core tile memory windows for the ELF loader.
    pub core_memory: MemoryMap,
}
