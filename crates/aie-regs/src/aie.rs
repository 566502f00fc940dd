//! First-generation (AIE) layout.
//!
//! 50 columns by 9 rows, no memory tiles, 23/18 address shifts. Clock gating
//! is tile-granular through the per-tile clock control register; shim reset
//! is driven entirely through the NPI transport, so there is no per-column
//! shim reset field.

use crate::field::RegField;
use crate::geometry::Geometry;
use crate::modules::*;

pub(crate) static LAYOUT: GenerationLayout = GenerationLayout {
    geometry: Geometry {
        cols: 50,
        rows: 9,
        shim_row: 0,
        mem_tile_rows: 0,
        col_shift: 23,
        row_shift: 18,
    },
    shim: ShimColumnModule {
        col_rst_off: 0x0003_6048,
        col_rst: RegField::new(0, 1),
        col_clk_off: 0x0003_604C,
        clk_buf_enable: RegField::new(0, 1),
        shim_rst: None,
        nmu_switch: None,
        axi_mm_err: Some(AxiMmErrorConfig {
            reg_off: 0x0001_E020,
            slave_err: RegField::new(1, 1),
            decode_err: RegField::new(0, 1),
        }),
    },
    l2_intr: L2IntrModule {
        irq_reg_off: 0x0001_5050,
    },
    core_isolation: IsolationModule {
        reg_off: 0x0003_2030,
        east: RegField::new(3, 1),
        north: RegField::new(2, 1),
        west: RegField::new(1, 1),
        south: RegField::new(0, 1),
    },
    mem_tile_isolation: None,
    shim_isolation: IsolationModule {
        reg_off: 0x0003_6030,
        east: RegField::new(3, 1),
        north: RegField::new(2, 1),
        west: RegField::new(1, 1),
        south: RegField::new(0, 1),
    },
    core_mem_ctrl: MemoryControlModule {
        reg_off: 0x0003_2038,
        zeroisation: RegField::new(0, 1),
    },
    mem_tile_mem_ctrl: None,
    tile_clock: Some((0x0003_6040, RegField::new(0, 1))),
    noc_dma_pause: None,
    uc_dma_pause: None,
    core_perf: PerfModule {
        base: 0x0003_1520,
        stride: 0x4,
        count: 4,
        ctrl_off: 0x0003_1500,
        start: RegField::new(0, 7),
        stop: RegField::new(8, 7),
        rst_off: 0x0003_1508,
        rst: RegField::new(0, 7),
        event_min: 0,
        event_max: 127,
    },
    mem_tile_perf: None,
    shim_perf: PerfModule {
        base: 0x0003_1020,
        stride: 0x4,
        count: 2,
        ctrl_off: 0x0003_1000,
        start: RegField::new(0, 7),
        stop: RegField::new(8, 7),
        rst_off: 0x0003_1008,
        rst: RegField::new(0, 7),
        event_min: 0,
        event_max: 127,
    },
    core_memory: MemoryMap {
        prog_elf_base: 0x0000_0000,
        prog_off: 0x0002_0000,
        prog_size: 0x4000,
        data_elf_base: 0x0007_0000,
        data_off: 0x0000_0000,
        data_size: 0x8000,
    },
};
