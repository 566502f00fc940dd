//! ML-generation (AIE-ML) layout.
//!
//! 38 columns by 11 rows with two memory-tile rows, 25/20 address shifts.
//! Clock gating and reset are column-granular through the shim column
//! control block at 0xFFF00+.

use crate::field::RegField;
use crate::geometry::Geometry;
use crate::modules::*;

pub(crate) static LAYOUT: GenerationLayout = GenerationLayout {
    geometry: Geometry {
        cols: 38,
        rows: 11,
        shim_row: 0,
        mem_tile_rows: 2,
        col_shift: 25,
        row_shift: 20,
    },
    shim: ShimColumnModule {
        col_rst_off: 0x000F_FF28,
        col_rst: RegField::new(0, 1),
        col_clk_off: 0x000F_FF20,
        clk_buf_enable: RegField::new(0, 1),
        shim_rst: Some((0x000F_FF10, RegField::new(0, 1))),
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
        reg_off: 0x0006_0030,
        east: RegField::new(3, 1),
        north: RegField::new(2, 1),
        west: RegField::new(1, 1),
        south: RegField::new(0, 1),
    },
    mem_tile_isolation: Some(IsolationModule {
        reg_off: 0x0009_6030,
        east: RegField::new(3, 1),
        north: RegField::new(2, 1),
        west: RegField::new(1, 1),
        south: RegField::new(0, 1),
    }),
    shim_isolation: IsolationModule {
        reg_off: 0x000F_FF30,
        east: RegField::new(3, 1),
        north: RegField::new(2, 1),
        west: RegField::new(1, 1),
        south: RegField::new(0, 1),
    },
    core_mem_ctrl: MemoryControlModule {
        reg_off: 0x0006_0038,
        zeroisation: RegField::new(0, 1),
    },
    mem_tile_mem_ctrl: Some(MemoryControlModule {
        reg_off: 0x0009_6038,
        zeroisation: RegField::new(0, 1),
    }),
    tile_clock: None,
    noc_dma_pause: None,
    uc_dma_pause: None,
    core_perf: PerfModule {
        base: 0x0003_4520,
        stride: 0x4,
        count: 4,
        ctrl_off: 0x0003_4500,
        start: RegField::new(0, 8),
        stop: RegField::new(8, 8),
        rst_off: 0x0003_4508,
        rst: RegField::new(0, 8),
        event_min: 0,
        event_max: 255,
    },
    mem_tile_perf: Some(PerfModule {
        base: 0x0009_1020,
        stride: 0x4,
        count: 4,
        ctrl_off: 0x0009_1000,
        start: RegField::new(0, 8),
        stop: RegField::new(8, 8),
        rst_off: 0x0009_1008,
        rst: RegField::new(0, 8),
        event_min: 0,
        event_max: 255,
    }),
    shim_perf: PerfModule {
        base: 0x0003_1020,
        stride: 0x4,
        count: 2,
        ctrl_off: 0x0003_1000,
        start: RegField::new(0, 8),
        stop: RegField::new(8, 8),
        rst_off: 0x0003_1008,
        rst: RegField::new(0, 8),
        event_min: 0,
        event_max: 255,
    },
    core_memory: MemoryMap {
        prog_elf_base: 0x0000_0000,
        prog_off: 0x0002_0000,
        prog_size: 0x4000,
        data_elf_base: 0x0007_0000,
        data_off: 0x0000_0000,
        data_size: 0x1_0000,
    },
};
