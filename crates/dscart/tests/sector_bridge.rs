//! Behavior of the minimal sector-bridge cartridge.

use dscart::{
    CartCommand, CartResponder, CartSlot, CommandStatus, MemVolume, RomImage, SectorBridge,
};
use dscart_hw::specs::card::SECTOR_SIZE;

/// A volume where sector `s` byte `i` is `(s * 31 + i) & 0xFF`.
fn patterned_volume(sectors: u32, read_only: bool) -> MemVolume {
    let mut data = vec![0u8; sectors as usize * SECTOR_SIZE];
    for (i, byte) in data.iter_mut().enumerate() {
        let sector = i / SECTOR_SIZE;
        *byte = ((sector * 31 + i % SECTOR_SIZE) & 0xFF) as u8;
    }
    MemVolume::new(data, read_only)
}

fn sector_byte(sector: u32, offset: usize) -> u8 {
    ((sector as usize * 31 + offset) & 0xFF) as u8
}

fn bridge_with(volume: MemVolume) -> SectorBridge {
    let mut bridge = SectorBridge::new(RomImage::empty(), Some(Box::new(volume)));
    bridge.set_protocol_active(true);
    bridge
}

fn set_sector_cmd(sector: u32) -> CartCommand {
    let a = sector.to_be_bytes();
    [0xE3, 0, 0, 0, a[0], a[1], a[2], a[3]]
}

fn write_sector_cmd(sector: u32) -> CartCommand {
    let a = sector.to_be_bytes();
    [0xF6, 0xE1, 0x0D, 0x98, a[0], a[1], a[2], a[3]]
}

const READ_SECTOR: CartCommand = [0xE5, 0, 0, 0, 0, 0, 0, 0];
const POLL_READY: CartCommand = [0xE4, 0, 0, 0, 0, 0, 0, 0];

fn start(bridge: &mut SectorBridge, cmd: &CartCommand, len: usize) -> (CommandStatus, Vec<u8>) {
    let mut response = vec![0u8; len];
    let status = bridge.command_start(cmd, &mut response).unwrap();
    (status, response)
}

#[test]
fn set_sector_then_read_matches_volume() {
    let mut bridge = bridge_with(patterned_volume(8, false));
    start(&mut bridge, &set_sector_cmd(5), 0);
    let (status, response) = start(&mut bridge, &READ_SECTOR, SECTOR_SIZE);
    assert_eq!(status, CommandStatus::Complete);
    for (i, &byte) in response.iter().enumerate() {
        assert_eq!(byte, sector_byte(5, i));
    }
}

#[test]
fn short_read_is_a_sector_prefix() {
    let mut bridge = bridge_with(patterned_volume(8, false));
    start(&mut bridge, &set_sector_cmd(2), 0);
    let (_, response) = start(&mut bridge, &READ_SECTOR, 100);
    assert_eq!(response.len(), 100);
    for (i, &byte) in response.iter().enumerate() {
        assert_eq!(byte, sector_byte(2, i));
    }
}

#[test]
fn long_read_wraps_modulo_sector_size() {
    let mut bridge = bridge_with(patterned_volume(8, false));
    start(&mut bridge, &set_sector_cmd(3), 0);
    let (_, response) = start(&mut bridge, &READ_SECTOR, 1030);
    assert_eq!(response.len(), 1030);
    for (i, &byte) in response.iter().enumerate() {
        assert_eq!(byte, sector_byte(3, i % SECTOR_SIZE));
    }
}

#[test]
fn poll_ready_is_always_ready() {
    let mut bridge = bridge_with(patterned_volume(1, false));
    let (_, response) = start(&mut bridge, &POLL_READY, 1);
    assert_ne!(response[0], 0);
}

#[test]
fn write_commits_on_finish() {
    let mut bridge = bridge_with(patterned_volume(8, false));
    let payload = vec![0xA5u8; SECTOR_SIZE];

    let (status, _) = start(&mut bridge, &write_sector_cmd(7), 0);
    assert_eq!(status, CommandStatus::PendingFinish);
    bridge.command_finish(&write_sector_cmd(7), &payload);

    start(&mut bridge, &set_sector_cmd(7), 0);
    let (_, response) = start(&mut bridge, &READ_SECTOR, SECTOR_SIZE);
    assert_eq!(response, payload);
}

#[test]
fn write_to_read_only_volume_is_dropped() {
    let mut bridge = bridge_with(patterned_volume(8, true));
    let payload = vec![0xA5u8; SECTOR_SIZE];

    let (status, _) = start(&mut bridge, &write_sector_cmd(4), 0);
    assert_eq!(status, CommandStatus::PendingFinish);
    bridge.command_finish(&write_sector_cmd(4), &payload);

    start(&mut bridge, &set_sector_cmd(4), 0);
    let (_, response) = start(&mut bridge, &READ_SECTOR, SECTOR_SIZE);
    for (i, &byte) in response.iter().enumerate() {
        assert_eq!(byte, sector_byte(4, i));
    }
}

#[test]
fn missing_volume_reads_zeros_and_drops_writes() {
    let mut bridge = SectorBridge::new(RomImage::empty(), None);
    bridge.set_protocol_active(true);

    let (_, response) = start(&mut bridge, &READ_SECTOR, SECTOR_SIZE);
    assert!(response.iter().all(|&b| b == 0));

    let (status, _) = start(&mut bridge, &write_sector_cmd(0), 0);
    assert_eq!(status, CommandStatus::PendingFinish);
    bridge.command_finish(&write_sector_cmd(0), &[0xFFu8; SECTOR_SIZE]);
}

#[test]
fn unknown_opcode_zeroes_response_and_preserves_state() {
    let mut bridge = bridge_with(patterned_volume(8, false));
    start(&mut bridge, &set_sector_cmd(6), 0);

    let unknown: CartCommand = [0xAB, 1, 2, 3, 4, 5, 6, 7];
    let (status, response) = start(&mut bridge, &unknown, 32);
    assert_eq!(status, CommandStatus::Complete);
    assert!(response.iter().all(|&b| b == 0));

    // The latched sector address survived the unknown command.
    let (_, response) = start(&mut bridge, &READ_SECTOR, SECTOR_SIZE);
    for (i, &byte) in response.iter().enumerate() {
        assert_eq!(byte, sector_byte(6, i));
    }
}

#[test]
fn rom_reads_served_while_protocol_inactive() {
    let rom: Vec<u8> = (0u32..256).map(|i| (i & 0xFF) as u8).collect();
    let mut bridge = SectorBridge::new(RomImage::new(rom), Some(Box::new(patterned_volume(1, false))));

    let read_rom: CartCommand = [0x00, 0, 0, 0, 0x10, 0, 0, 0];
    let (_, response) = start(&mut bridge, &read_rom, 8);
    assert_eq!(response, vec![0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17]);

    // Overlay opcodes are not honored until the protocol mode is active.
    let (_, response) = start(&mut bridge, &READ_SECTOR, 16);
    assert!(response.iter().all(|&b| b == 0));
}

#[test]
fn slot_runs_the_two_phase_protocol_in_order() {
    let bridge = bridge_with(patterned_volume(8, false));
    let mut slot = CartSlot::new(Box::new(bridge));

    slot.write_command(&write_sector_cmd(1), &vec![0x66u8; SECTOR_SIZE])
        .unwrap();
    slot.read_command(&set_sector_cmd(1), 0).unwrap();
    let data = slot.read_command(&READ_SECTOR, SECTOR_SIZE).unwrap();
    assert!(data.iter().all(|&b| b == 0x66));

    // Reset deactivates the protocol overlay; the read opcode now takes
    // the baseline path and comes back zeroed.
    slot.reset();
    let data = slot.read_command(&READ_SECTOR, 16).unwrap();
    assert!(data.iter().all(|&b| b == 0));
}

#[test]
fn reset_clears_the_latched_sector() {
    let mut bridge = bridge_with(patterned_volume(8, false));
    start(&mut bridge, &set_sector_cmd(5), 0);
    bridge.reset();
    bridge.set_protocol_active(true);

    let (_, response) = start(&mut bridge, &READ_SECTOR, SECTOR_SIZE);
    for (i, &byte) in response.iter().enumerate() {
        assert_eq!(byte, sector_byte(0, i));
    }
}
