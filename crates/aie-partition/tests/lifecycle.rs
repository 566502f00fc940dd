//! Partition lifecycle sequencing tests against the simulated backend.

use aie_partition::{
    initialize, request_tiles, set_axi_mm_isolation, set_column_clock, teardown, AieError,
    ColumnClockRequest, DeviceInstance, Generation, IsolationFlags, Location, NpiEvent,
    PartInitOptions, PartitionConfig, SimBackend,
};

const COL_CLK: u64 = 0x000F_FF20;
const COL_RST: u64 = 0x000F_FF28;
const SHIM_RST: u64 = 0x000F_FF10;
const NMU_SWITCH: u64 = 0x000F_FF34;
const SHIM_ISOLATION: u64 = 0x000F_FF30;
const L2_IRQ: u64 = 0x0001_5050;

fn open(generation: Generation, start_col: u32, num_cols: u32, sim: &SimBackend) -> DeviceInstance {
    DeviceInstance::new(
        PartitionConfig {
            generation,
            base_addr: 0,
            start_col,
            num_cols,
        },
        sim.io_handle(),
        sim.npi_handle(),
    )
    .unwrap()
}

fn shim_addr(col: u64, reg: u64) -> u64 {
    (col << 25) + reg
}

#[test]
fn initialize_brackets_protected_window_once() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 0, 4, &sim);

    initialize(&mut dev, &PartInitOptions::default()).unwrap();

    assert_eq!(sim.protected_reg_calls(true), 1);
    assert_eq!(sim.protected_reg_calls(false), 1);

    let events = sim.npi_events();
    assert_eq!(
        events.first(),
        Some(&NpiEvent::ProtectedRegs {
            num_cols: 4,
            enable: true
        })
    );
    assert_eq!(
        events.last(),
        Some(&NpiEvent::ProtectedRegs {
            num_cols: 4,
            enable: false
        })
    );
}

#[test]
fn initialize_sequence_order() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 0, 4, &sim);

    initialize(&mut dev, &PartInitOptions::default()).unwrap();

    let writes = sim.writes();

    // Column reset pulse with clock gating around it: clocks off, reset
    // asserted, clocks on, reset released, one write per column each.
    for col in 0..4u64 {
        let i = col as usize;
        assert_eq!(writes[i].addr, shim_addr(col, COL_CLK));
        assert_eq!(writes[i].value, 0);
        assert_eq!(writes[4 + i].addr, shim_addr(col, COL_RST));
        assert_eq!(writes[4 + i].value, 1);
        assert_eq!(writes[8 + i].addr, shim_addr(col, COL_CLK));
        assert_eq!(writes[8 + i].value, 1);
        assert_eq!(writes[12 + i].addr, shim_addr(col, COL_RST));
        assert_eq!(writes[12 + i].value, 0);
    }

    // Shim reset bracket: per-column assert, NPI pulse, per-column release.
    for col in 0..4u64 {
        let i = col as usize;
        assert_eq!(writes[16 + i].addr, shim_addr(col, SHIM_RST));
        assert_eq!(writes[16 + i].value, 1);
        assert_eq!(writes[20 + i].addr, shim_addr(col, SHIM_RST));
        assert_eq!(writes[20 + i].value, 0);
    }
    assert_eq!(
        sim.npi_events()[1..3],
        [NpiEvent::ShimReset(true), NpiEvent::ShimReset(false)]
    );

    // NMU boundary switches: column 0 forwards east, column 1 accepts from
    // the west.
    assert_eq!(writes[24].addr, shim_addr(0, NMU_SWITCH));
    assert_eq!(writes[24].value, 0b01);
    assert_eq!(writes[25].addr, shim_addr(1, NMU_SWITCH));
    assert_eq!(writes[25].value, 0b10);

    // AXI-MM slave + decode error blocking on every shim NoC tile.
    for col in 0..4u64 {
        let i = 26 + col as usize;
        assert_eq!(writes[i].addr, shim_addr(col, 0x0001_E020));
        assert_eq!(writes[i].value, 0b11);
    }

    // Clocks re-enabled after reset.
    for col in 0..4u64 {
        let i = 30 + col as usize;
        assert_eq!(writes[i].addr, shim_addr(col, COL_CLK));
        assert_eq!(writes[i].value, 1);
    }

    // Isolation policy: 12 rows x 4 columns; the shim row of column 0
    // blocks its west edge, column 3 its east edge.
    assert_eq!(writes[34].addr, shim_addr(0, SHIM_ISOLATION));
    assert_eq!(writes[34].value, 1 << 1);
    assert_eq!(writes[34 + 36].addr, shim_addr(3, SHIM_ISOLATION));
    assert_eq!(writes[34 + 36].value, 1 << 3);
    // Interior columns have all edges clear.
    assert_eq!(writes[34 + 12].value, 0);

    // Zeroisation: 2 memory-tile rows + 9 core rows per column, masked
    // writes of the zeroisation bit.
    let zeroize = &writes[82..126];
    assert_eq!(zeroize.len(), 44);
    assert!(zeroize.iter().all(|w| w.mask == 1 && w.value == 1));

    // L2 error interrupts routed to the error NoC IRQ line.
    for col in 0..4u64 {
        let i = 126 + col as usize;
        assert_eq!(writes[i].addr, shim_addr(col, L2_IRQ));
        assert_eq!(writes[i].value, 0x1);
    }

    assert_eq!(writes.len(), 130);

    // Default options activate the whole partition: 4 columns x 11 rows.
    assert_eq!(dev.tiles_in_use().count_ones(), 44);
}

#[test]
fn initialize_optional_steps_can_be_skipped() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 0, 4, &sim);

    let opts = PartInitOptions {
        column_reset: false,
        shim_reset: false,
        block_noc_axi_mm_error: false,
        isolate: false,
        zeroize_memory: false,
        tiles: Vec::new(),
    };
    initialize(&mut dev, &opts).unwrap();

    let writes = sim.writes();
    assert!(writes.iter().all(|w| w.addr & 0xFF_FFFF != SHIM_RST));
    assert!(writes.iter().all(|w| w.addr & 0xFF_FFFF != COL_RST));
    assert_eq!(
        sim.npi_events()
            .iter()
            .filter(|e| matches!(e, NpiEvent::ShimReset(_)))
            .count(),
        0
    );
    // Clear isolation still writes every tile, with no edges blocked.
    assert!(writes
        .iter()
        .filter(|w| w.addr & 0xFF_FFFF == SHIM_ISOLATION)
        .all(|w| w.value == 0));
}

#[test]
fn open_failure_runs_no_steps_and_no_close() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 0, 4, &sim);

    sim.fail_protected_regs(true);
    let err = initialize(&mut dev, &PartInitOptions::default()).unwrap_err();
    assert!(matches!(err, AieError::HardwareError { .. }));

    assert!(sim.writes().is_empty());
    assert_eq!(sim.protected_reg_calls(false), 0);
}

#[test]
fn step_failure_still_closes_window_once() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 0, 4, &sim);

    // Fail the first register write (clock gating, first column).
    sim.fail_write_at(0);
    let err = initialize(&mut dev, &PartInitOptions::default()).unwrap_err();
    assert!(matches!(err, AieError::HardwareError { .. }));

    assert_eq!(sim.protected_reg_calls(true), 1);
    assert_eq!(sim.protected_reg_calls(false), 1);
    assert!(sim.writes().is_empty());
}

#[test]
fn close_failure_surfaces_after_successful_body() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 0, 4, &sim);

    sim.fail_protected_regs(false);
    let err = initialize(&mut dev, &PartInitOptions::default()).unwrap_err();
    assert!(matches!(err, AieError::HardwareError { .. }));

    // The whole sequence ran before the close was attempted.
    assert_eq!(sim.writes().len(), 130);
}

#[test]
fn nmu_switches_untouched_away_from_column_zero() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 4, 4, &sim);

    initialize(&mut dev, &PartInitOptions::default()).unwrap();

    assert!(sim
        .writes()
        .iter()
        .all(|w| w.addr & 0xFF_FFFF != NMU_SWITCH));
}

#[test]
fn aieml_skips_nmu_and_targets_only_noc_shims() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::AieMl, 0, 4, &sim);

    initialize(&mut dev, &PartInitOptions::default()).unwrap();

    let writes = sim.writes();
    assert!(writes.iter().all(|w| w.addr & 0xFF_FFFF != NMU_SWITCH));

    // Shim NoC tiles sit at absolute columns 2 and 3 of this range; only
    // they take AXI-MM error and L2 IRQ configuration.
    let axi: Vec<u64> = writes
        .iter()
        .filter(|w| w.addr & 0xFF_FFFF == 0x0001_E020)
        .map(|w| w.addr >> 25)
        .collect();
    assert_eq!(axi, vec![2, 3]);

    let l2: Vec<u64> = writes
        .iter()
        .filter(|w| w.addr & 0xFF_FFFF == L2_IRQ)
        .map(|w| w.addr >> 25)
        .collect();
    assert_eq!(l2, vec![2, 3]);
}

#[test]
fn teardown_sequence_and_shim_failure() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 0, 2, &sim);

    teardown(&mut dev).unwrap();
    assert_eq!(sim.protected_reg_calls(true), 1);
    assert_eq!(sim.protected_reg_calls(false), 1);
    // Clocks end up gated.
    assert_eq!(sim.reg(shim_addr(0, COL_CLK)), 0);
    assert_eq!(sim.reg(shim_addr(1, COL_CLK)), 0);
    assert_eq!(dev.tiles_in_use().count_ones(), 0);

    // An NPI shim-reset failure mid-teardown surfaces as the hardware
    // error and still closes the window exactly once.
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 0, 2, &sim);
    sim.fail_shim_reset(true);
    let err = teardown(&mut dev).unwrap_err();
    assert!(matches!(err, AieError::HardwareError { .. }));
    assert_eq!(sim.protected_reg_calls(false), 1);
}

#[test]
fn request_tiles_enables_requested_columns() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 0, 4, &sim);

    request_tiles(&mut dev, &[Location::new(1, 3), Location::new(3, 5)]).unwrap();

    assert_eq!(sim.protected_reg_calls(true), 1);
    assert_eq!(sim.protected_reg_calls(false), 1);
    assert_eq!(sim.reg(shim_addr(1, COL_CLK)), 1);
    assert_eq!(sim.reg(shim_addr(3, COL_CLK)), 1);
    assert_eq!(sim.reg(shim_addr(0, COL_CLK)), 0);
    // 11 tracked rows per enabled column.
    assert_eq!(dev.tiles_in_use().count_ones(), 22);
}

#[test]
fn request_tiles_rejects_bad_location_before_any_write() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 0, 4, &sim);

    let err = request_tiles(&mut dev, &[Location::new(9, 1)]).unwrap_err();
    assert!(matches!(err, AieError::InvalidLocation { col: 9, row: 1 }));
    assert!(sim.writes().is_empty());
}

#[test]
fn aie_request_tiles_skips_protected_window() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie, 0, 2, &sim);

    request_tiles(&mut dev, &[Location::new(0, 3)]).unwrap();

    assert!(sim.npi_events().is_empty());
    // Clock chain driven from the shim row up to (not including) row 3.
    assert_eq!(sim.writes().len(), 3);
    assert_eq!(dev.tiles_in_use().count_ones(), 3);
}

#[test]
fn aie_initialize_ends_clock_gated() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie, 0, 2, &sim);

    initialize(&mut dev, &PartInitOptions::default()).unwrap();

    assert_eq!(dev.tiles_in_use().count_ones(), 0);
    // The final clock write per column gates the chain at the shim row.
    let last = sim.writes().last().copied().unwrap();
    assert_eq!(last.value, 0);
}

#[test]
fn column_clock_range_checks_and_generation_gate() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 0, 4, &sim);

    set_column_clock(
        &mut dev,
        ColumnClockRequest {
            start_col: 1,
            num_cols: 2,
            enable: true,
        },
    )
    .unwrap();
    assert_eq!(sim.reg(shim_addr(1, COL_CLK)), 1);
    assert_eq!(sim.reg(shim_addr(2, COL_CLK)), 1);
    assert_eq!(sim.reg(shim_addr(3, COL_CLK)), 0);
    assert_eq!(sim.protected_reg_calls(true), 1);

    let err = set_column_clock(
        &mut dev,
        ColumnClockRequest {
            start_col: 3,
            num_cols: 2,
            enable: true,
        },
    )
    .unwrap_err();
    assert!(matches!(err, AieError::InvalidArgument { .. }));

    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie, 0, 4, &sim);
    let err = set_column_clock(
        &mut dev,
        ColumnClockRequest {
            start_col: 0,
            num_cols: 1,
            enable: true,
        },
    )
    .unwrap_err();
    assert!(matches!(err, AieError::UnsupportedFeature { .. }));
    assert!(sim.npi_events().is_empty());
}

#[test]
fn axi_mm_isolation_writes_every_noc_shim() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 0, 4, &sim);

    set_axi_mm_isolation(&mut dev, IsolationFlags::EAST | IsolationFlags::WEST).unwrap();

    for col in 0..4u64 {
        assert_eq!(sim.reg(shim_addr(col, SHIM_ISOLATION)), 0b1010);
    }
    assert_eq!(sim.protected_reg_calls(true), 1);
    assert_eq!(sim.protected_reg_calls(false), 1);

    // A no-op on generations without the feature, but still bracketed.
    let sim = SimBackend::new();
    let mut dev = open(Generation::AieMl, 0, 4, &sim);
    set_axi_mm_isolation(&mut dev, IsolationFlags::all()).unwrap();
    assert!(sim.writes().is_empty());
    assert_eq!(sim.protected_reg_calls(true), 1);
    assert_eq!(sim.protected_reg_calls(false), 1);
}
