//! Core program loading from ELF images.
//!
//! A core's program and data memories are windows in its tile register
//! space; loading means copying each `PT_LOAD` segment into the window
//! that covers its virtual address, then zero-filling the remainder up to
//! the segment's memory size. Loading targets core tiles only and does
//! not touch protected registers.

use std::fs;
use std::path::Path;

use goblin::elf::program_header::PT_LOAD;
use goblin::elf::Elf;
pub use goblin::elf::ProgramHeader;
use tracing::debug;

use crate::device::{DeviceInstance, Location, TileType};
use crate::error::{AieError, Result};

fn require_core(dev: &DeviceInstance, loc: Location) -> Result<()> {
    dev.validate_loc(loc)?;
    let tile_type = dev.tile_type(loc);
    if tile_type != TileType::Core {
        return Err(AieError::InvalidTileType {
            tile_type,
            col: loc.col,
            row: loc.row,
        });
    }
    Ok(())
}

/// Map a segment's virtual address range onto the tile window that holds
/// it. The whole segment must fit one window.
fn window_offset(dev: &DeviceInstance, vaddr: u64, memsz: u64) -> Result<u64> {
    let mem = &dev.layout().core_memory;
    let windows = [
        (mem.prog_elf_base, mem.prog_off, mem.prog_size),
        (mem.data_elf_base, mem.data_off, mem.data_size),
    ];
    for (elf_base, reg_off, size) in windows {
        let base = u64::from(elf_base);
        let end = base + u64::from(size);
        if vaddr >= base && vaddr < end {
            let seg_end = vaddr.checked_add(memsz).ok_or_else(|| {
                AieError::invalid_elf(format!(
                    "segment {vaddr:#x}+{memsz:#x} wraps the address space"
                ))
            })?;
            if seg_end > end {
                return Err(AieError::invalid_elf(format!(
                    "segment {vaddr:#x}+{memsz:#x} overruns memory window {base:#x}..{end:#x}"
                )));
            }
            return Ok(u64::from(reg_off) + (vaddr - base));
        }
    }
    Err(AieError::invalid_elf(format!(
        "segment address {vaddr:#x} maps to no core memory window"
    )))
}

/// Write one loadable segment into the core's memory window.
fn load_segment(
    dev: &mut DeviceInstance,
    loc: Location,
    vaddr: u64,
    data: &[u8],
    memsz: u64,
) -> Result<()> {
    // The window check bounds memsz; file contents beyond memsz would land
    // past the window end.
    if data.len() as u64 > memsz {
        return Err(AieError::invalid_elf(format!(
            "segment file size {:#x} exceeds memory size {memsz:#x}",
            data.len()
        )));
    }
    let reg_off = window_offset(dev, vaddr, memsz)?;
    let base = dev.tile_addr(loc) + reg_off;

    debug!(
        "Loading segment: vaddr {vaddr:#x}, filesz {:#x}, memsz {memsz:#x}",
        data.len()
    );

    let mut addr = base;
    for chunk in data.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        dev.write32(addr, u32::from_le_bytes(word))?;
        addr += 4;
    }

    // BSS portion of the segment.
    let filled = (data.len() as u64).div_ceil(4) * 4;
    let mut addr = base + filled;
    while addr < base + memsz {
        dev.write32(addr, 0)?;
        addr += 4;
    }
    Ok(())
}

/// Load an in-memory ELF image into a core tile.
///
/// # Errors
///
/// `InvalidTileType` when `loc` is not a core tile, `InvalidElf` for a
/// malformed image or a segment outside the core's memory windows, or any
/// register write failure.
pub fn load_elf_mem(dev: &mut DeviceInstance, loc: Location, bytes: &[u8]) -> Result<()> {
    require_core(dev, loc)?;
    let elf = Elf::parse(bytes).map_err(|e| AieError::invalid_elf(e.to_string()))?;

    for ph in elf.program_headers.iter().filter(|ph| ph.p_type == PT_LOAD) {
        if ph.p_memsz == 0 {
            continue;
        }
        let file_range = ph.file_range();
        let data = bytes.get(file_range).ok_or_else(|| {
            AieError::invalid_elf(format!(
                "segment file range {:#x}+{:#x} outside image",
                ph.p_offset, ph.p_filesz
            ))
        })?;
        load_segment(dev, loc, ph.p_vaddr, data, ph.p_memsz)?;
    }
    Ok(())
}

/// Load an ELF file into a core tile.
///
/// # Errors
///
/// The [`load_elf_mem`] taxonomy, plus I/O errors reading the file.
pub fn load_elf(dev: &mut DeviceInstance, loc: Location, path: &Path) -> Result<()> {
    let bytes = fs::read(path)?;
    load_elf_mem(dev, loc, &bytes)
}

/// Load a single parsed program header's segment into a core tile.
///
/// Useful for replaying one segment (restoring a memory region after
/// zeroisation, say) without walking the whole image. The header must come
/// from the same `bytes` image.
///
/// # Errors
///
/// `InvalidElf` when the header is not a loadable segment or its file
/// range lies outside the image, plus the [`load_elf_mem`] taxonomy.
pub fn load_elf_section(
    dev: &mut DeviceInstance,
    loc: Location,
    bytes: &[u8],
    phdr: &ProgramHeader,
) -> Result<()> {
    require_core(dev, loc)?;
    if phdr.p_type != PT_LOAD {
        return Err(AieError::invalid_elf(format!(
            "program header type {:#x} is not loadable",
            phdr.p_type
        )));
    }
    let data = bytes.get(phdr.file_range()).ok_or_else(|| {
        AieError::invalid_elf(format!(
            "segment file range {:#x}+{:#x} outside image",
            phdr.p_offset, phdr.p_filesz
        ))
    })?;
    load_segment(dev, loc, phdr.p_vaddr, data, phdr.p_memsz)
}
