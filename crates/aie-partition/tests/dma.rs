//! DMA pause targeting and window tests against the simulated backend.

use aie_partition::{
    pause_noc_dma, pause_uc_dma, AieError, DeviceInstance, DmaDirection, Generation, Location,
    PartitionConfig, SimBackend, UcDmaDirection,
};

const NOC_PAUSE: u64 = 0x0001_D840;
const UC_PAUSE: u64 = 0x000C_0120;

fn open(generation: Generation, num_cols: u32, sim: &SimBackend) -> DeviceInstance {
    DeviceInstance::new(
        PartitionConfig {
            generation,
            base_addr: 0,
            start_col: 0,
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
fn single_tile_pause_touches_one_register() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 4, &sim);

    let loc = Location::new(2, 0);
    pause_noc_dma(&mut dev, Some(loc), 1, DmaDirection::Mm2s, true).unwrap();

    // MM2S channel 1 is bit 3 of the pause register.
    let writes = sim.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].addr, shim_addr(2, NOC_PAUSE));
    assert_eq!(writes[0].mask, 1 << 3);
    assert_eq!(writes[0].value, 1 << 3);

    assert_eq!(sim.protected_reg_calls(true), 1);
    assert_eq!(sim.protected_reg_calls(false), 1);
}

#[test]
fn broadcast_pause_writes_every_shim_column() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 4, &sim);

    pause_noc_dma(&mut dev, None, 0, DmaDirection::S2mm, true).unwrap();

    let writes = sim.writes();
    assert_eq!(writes.len(), 4);
    for (col, w) in writes.iter().enumerate() {
        assert_eq!(w.addr, shim_addr(col as u64, NOC_PAUSE));
        assert_eq!(w.mask, 1 << 0);
        assert_eq!(w.value, 1 << 0);
    }
}

#[test]
fn pause_roundtrip_restores_field() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 2, &sim);
    let loc = Location::new(0, 0);

    // Another channel's pause bit survives the round trip untouched.
    pause_noc_dma(&mut dev, Some(loc), 1, DmaDirection::S2mm, true).unwrap();
    pause_noc_dma(&mut dev, Some(loc), 0, DmaDirection::S2mm, true).unwrap();
    assert_eq!(sim.reg(shim_addr(0, NOC_PAUSE)), 0b11);

    pause_noc_dma(&mut dev, Some(loc), 0, DmaDirection::S2mm, false).unwrap();
    assert_eq!(sim.reg(shim_addr(0, NOC_PAUSE)), 0b10);
}

#[test]
fn invalid_channel_rejected_before_window() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 2, &sim);

    let err = pause_noc_dma(&mut dev, None, 2, DmaDirection::S2mm, true).unwrap_err();
    assert!(matches!(err, AieError::InvalidArgument { .. }));
    assert!(sim.npi_events().is_empty());
}

#[test]
fn non_noc_target_rejected_before_window() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 2, &sim);

    // Row 3 is a core tile.
    let err =
        pause_noc_dma(&mut dev, Some(Location::new(0, 3)), 0, DmaDirection::S2mm, true)
            .unwrap_err();
    assert!(matches!(err, AieError::InvalidTileType { .. }));
    assert!(sim.npi_events().is_empty());
}

#[test]
fn unsupported_generation_rejected() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::AieMl, 2, &sim);

    let err = pause_noc_dma(&mut dev, None, 0, DmaDirection::S2mm, true).unwrap_err();
    assert!(matches!(err, AieError::UnsupportedFeature { .. }));

    let err = pause_uc_dma(&mut dev, None, UcDmaDirection::Dm2mm, true).unwrap_err();
    assert!(matches!(err, AieError::UnsupportedFeature { .. }));
    assert!(sim.npi_events().is_empty());
}

#[test]
fn broadcast_failure_propagates_and_closes_window() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 4, &sim);

    // Third column's write fails; the broadcast stops there.
    sim.fail_write_at(2);
    let err = pause_noc_dma(&mut dev, None, 0, DmaDirection::S2mm, true).unwrap_err();
    assert!(matches!(err, AieError::HardwareError { .. }));

    assert_eq!(sim.writes().len(), 2);
    assert_eq!(sim.protected_reg_calls(true), 1);
    assert_eq!(sim.protected_reg_calls(false), 1);
}

#[test]
fn uc_dma_direction_fields() {
    let sim = SimBackend::new();
    let mut dev = open(Generation::Aie2Ps, 2, &sim);
    let loc = Location::new(1, 0);

    pause_uc_dma(&mut dev, Some(loc), UcDmaDirection::Dm2mm, true).unwrap();
    pause_uc_dma(&mut dev, Some(loc), UcDmaDirection::Mm2dm, true).unwrap();
    assert_eq!(sim.reg(shim_addr(1, UC_PAUSE)), 0b11);

    pause_uc_dma(&mut dev, Some(loc), UcDmaDirection::Dm2mm, false).unwrap();
    assert_eq!(sim.reg(shim_addr(1, UC_PAUSE)), 0b10);
}
