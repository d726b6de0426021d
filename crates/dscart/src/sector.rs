//! Minimal sector-bridge cartridge (DSpico family).
//!
//! The simplest of the flash-cart protocols: one latched sector address,
//! a ready poll that is always ready (the emulation never models busy
//! latency), a sector read, and a two-phase sector write.

use tracing::debug;

use dscart_hw::opcodes::{rom, sector_bridge};

use crate::device::{CartCommand, CartError, CartResponder, CommandStatus, ack, be_address};
use crate::rom::{RomImage, baseline_command};
use crate::storage::{StorageVolume, commit_sector, copy_staged_sector};

/// Cartridge bridging slot commands straight onto sector reads and writes.
pub struct SectorBridge {
    rom: RomImage,
    volume: Option<Box<dyn StorageVolume>>,
    requested_sector: u32,
    protocol_active: bool,
}

impl SectorBridge {
    pub fn new(rom: RomImage, volume: Option<Box<dyn StorageVolume>>) -> Self {
        Self {
            rom,
            volume,
            requested_sector: 0,
            protocol_active: false,
        }
    }

    /// Activate or deactivate the storage protocol overlay. While inactive
    /// only the baseline ROM command set is served.
    pub fn set_protocol_active(&mut self, active: bool) {
        self.protocol_active = active;
    }
}

impl CartResponder for SectorBridge {
    fn command_start(
        &mut self,
        cmd: &CartCommand,
        response: &mut [u8],
    ) -> Result<CommandStatus, CartError> {
        if !self.protocol_active {
            baseline_command(&self.rom, "sector-bridge", cmd, response);
            return Ok(CommandStatus::Complete);
        }

        debug!(
            "sector-bridge: command {:02X} {:02X} {:02X} {:02X} {:02X} {:02X} {:02X} {:02X} ({})",
            cmd[0],
            cmd[1],
            cmd[2],
            cmd[3],
            cmd[4],
            cmd[5],
            cmd[6],
            cmd[7],
            response.len()
        );

        match cmd[0] {
            rom::READ_DATA | rom::READ_DATA_B7 => {
                self.rom.serve_command(cmd, response);
            }
            sector_bridge::SET_SECTOR => {
                self.requested_sector = be_address(&cmd[4..8]);
                debug!(
                    "sector-bridge: sector read requested at {:08X}",
                    self.requested_sector
                );
            }
            sector_bridge::POLL_READY => {
                // Never busy
                ack(response, 1);
            }
            sector_bridge::READ_SECTOR => {
                copy_staged_sector(self.volume.as_mut(), self.requested_sector, response);
            }
            sector_bridge::WRITE_SECTOR => {
                self.requested_sector = be_address(&cmd[4..8]);
                debug!(
                    "sector-bridge: sector write requested at {:08X}",
                    self.requested_sector
                );
                return Ok(CommandStatus::PendingFinish);
            }
            _ => crate::device::unknown_command("sector-bridge", cmd, response),
        }
        Ok(CommandStatus::Complete)
    }

    fn command_finish(&mut self, cmd: &CartCommand, data: &[u8]) {
        if !self.protocol_active {
            return;
        }
        if cmd[0] == sector_bridge::WRITE_SECTOR {
            self.requested_sector = be_address(&cmd[4..8]);
            commit_sector(self.volume.as_mut(), self.requested_sector, data);
        }
    }

    fn reset(&mut self) {
        self.requested_sector = 0;
        self.protocol_active = false;
    }
}
