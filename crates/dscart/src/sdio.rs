//! SDIO-host emulation cartridge (DSTT family).
//!
//! This cart family exposes a full SD host to the guest: the driver issues
//! generic SD commands (CMD8, ACMD41, CMD24/25, ...) through a latched
//! two-phase session and expects protocol-correct replies. The session is
//! primed by a set-mode command and drained by a fetch-response command;
//! data movement goes through a one-sector FIFO.
//!
//! # References
//! - <https://problemkaputt.de/gbatek.htm#dscartridgeprotocol>

use tracing::{debug, warn};

use dscart_hw::opcodes::{rom, sdio_bridge};
use dscart_hw::sd::{cmd as sd_cmd, ocr};
use dscart_hw::specs::card::SECTOR_SIZE;

use crate::device::{CartCommand, CartError, CartResponder, CommandStatus, ack, be_address};
use crate::geometry::VolumeGeometry;
use crate::rom::{RomImage, baseline_command};
use crate::storage::{StorageVolume, commit_sector, copy_staged_sector};
use crate::translate::SectorTranslator;

/// SD host mode byte of the set-mode command.
mod host_mode {
    /// No response pending
    pub const NO_RESPONSE: u8 = 0;
    /// Stop the SD clock; terminates the session
    pub const STOP_CLOCK: u8 = 1;
    /// Advance to the next data block
    pub const NEXT_BLOCK: u8 = 2;
    /// One 4-byte response, then the session resets
    pub const RESPOND_4B: u8 = 3;
    /// 4-byte responses until told otherwise
    pub const RESPOND_REPEAT_4B: u8 = 4;
}

/// The latched SDIO command/response session.
///
/// The latched command and parameter only exist while a response is
/// pending; outside that window they are unreadable by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SdioSession {
    /// No SDIO reply pending.
    Idle,
    /// A 4-byte reply to `command` is pending.
    Responding {
        command: u8,
        parameter: u32,
        /// Keep the session open after delivering one reply.
        repeat: bool,
    },
}

/// Cartridge emulating an SDIO host in front of the storage volume.
pub struct SdioBridge {
    rom: RomImage,
    volume: Option<Box<dyn StorageVolume>>,
    geometry: VolumeGeometry,
    translator: SectorTranslator,
    session: SdioSession,
    requested_sector: u32,
    protocol_active: bool,
}

impl SdioBridge {
    /// Build the cartridge, deriving volume geometry from the boot sector.
    /// Geometry is computed here once and survives resets.
    pub fn new(rom: RomImage, mut volume: Option<Box<dyn StorageVolume>>) -> Self {
        let geometry = match volume.as_mut() {
            Some(volume) => {
                let mut boot = [0u8; SECTOR_SIZE];
                volume.read_sectors(0, 1, &mut boot);
                VolumeGeometry::parse(&boot, volume.sector_count())
            }
            None => VolumeGeometry::default(),
        };
        let translator = SectorTranslator::for_geometry(&geometry);
        Self {
            rom,
            volume,
            geometry,
            translator,
            session: SdioSession::Idle,
            requested_sector: 0,
            protocol_active: false,
        }
    }

    /// Activate or deactivate the storage protocol overlay. While inactive
    /// only the baseline ROM command set is served.
    pub fn set_protocol_active(&mut self, active: bool) {
        self.protocol_active = active;
    }

    /// Geometry derived from the volume's boot sector at construction.
    pub fn geometry(&self) -> &VolumeGeometry {
        &self.geometry
    }

    /// Latch an SDIO command/parameter pair and the host mode (set-mode
    /// command payload: parameter in bytes 1-4 BE, command in byte 5, mode
    /// in byte 6).
    fn set_host_mode(&mut self, cmd: &CartCommand) {
        let parameter = be_address(&cmd[1..5]);
        let command = cmd[5];
        let mode = cmd[6];
        debug!(
            "sdio-bridge: host mode {:02X}, CMD{}, parameter {:08X}",
            mode, command, parameter
        );

        self.session = match mode {
            host_mode::NO_RESPONSE => SdioSession::Idle,
            host_mode::STOP_CLOCK => {
                // Session termination: drop the latched command outright.
                SdioSession::Idle
            }
            host_mode::NEXT_BLOCK => {
                // Next data block requested; advance the addressed sector.
                self.requested_sector = self.requested_sector.wrapping_add(1);
                SdioSession::Idle
            }
            host_mode::RESPOND_4B => SdioSession::Responding {
                command,
                parameter,
                repeat: false,
            },
            host_mode::RESPOND_REPEAT_4B => SdioSession::Responding {
                command,
                parameter,
                repeat: true,
            },
            _ => {
                warn!("sdio-bridge: unknown host mode {:02X}", mode);
                SdioSession::Idle
            }
        };
    }

    /// Deliver the 4-byte reply to the latched SDIO command. Outside a
    /// responding session this produces nothing.
    fn send_response(&mut self, response: &mut [u8]) {
        let SdioSession::Responding {
            command,
            parameter,
            repeat,
        } = self.session
        else {
            return;
        };

        let reply = match command {
            sd_cmd::SEND_IF_COND => {
                // SD 2.0 voltage check: the reply echoes the parameter.
                parameter
            }
            sd_cmd::SD_SEND_OP_COND => {
                // Synthetic OCR; high-capacity cards get the HCS bit.
                if self.geometry.is_fat32 {
                    ocr::HIGH_CAPACITY
                } else {
                    0
                }
            }
            sd_cmd::WRITE_BLOCK | sd_cmd::WRITE_MULTIPLE_BLOCK => {
                self.requested_sector = self.translator.translate(parameter);
                debug!(
                    "sdio-bridge: write addressed at sector {:08X}",
                    self.requested_sector
                );
                0
            }
            sd_cmd::ALL_SEND_CID
            | sd_cmd::SEND_RELATIVE_ADDR
            | sd_cmd::SWITCH_FUNC
            | sd_cmd::SELECT_CARD
            | sd_cmd::STOP_TRANSMISSION
            | sd_cmd::SET_BLOCKLEN
            | sd_cmd::APP_CMD => 0,
            _ => {
                // Acknowledged without effect; handling not necessary.
                0
            }
        };

        if response.len() >= 4 {
            response[..4].copy_from_slice(&reply.to_le_bytes());
        } else if let Some(first) = response.first_mut() {
            *first = reply as u8;
        }

        // A single-response session is done after one reply.
        if !repeat {
            self.session = SdioSession::Idle;
        }
    }
}

impl CartResponder for SdioBridge {
    fn command_start(
        &mut self,
        cmd: &CartCommand,
        response: &mut [u8],
    ) -> Result<CommandStatus, CartError> {
        if !self.protocol_active {
            baseline_command(&self.rom, "sdio-bridge", cmd, response);
            return Ok(CommandStatus::Complete);
        }

        match cmd[0] {
            rom::READ_DATA | rom::READ_DATA_B7 => {
                self.rom.serve_command(cmd, response);
            }
            sdio_bridge::SET_HOST_REGISTER => {
                // Host clock speed / SDHC mode switches; nothing to model.
                debug!("sdio-bridge: set host register to {:02X}", cmd[1]);
                ack(response, 0);
            }
            sdio_bridge::HOST_BUSY | sdio_bridge::FIFO_WAIT => {
                // Never busy, data always ready
                ack(response, 0);
            }
            sdio_bridge::SET_HOST_MODE => {
                self.set_host_mode(cmd);
                ack(response, 0);
            }
            sdio_bridge::SEND_RESPONSE => {
                self.send_response(response);
            }
            sdio_bridge::READ_SINGLE_BLOCK | sdio_bridge::READ_MULTI_BLOCK => {
                self.requested_sector = self.translator.translate(be_address(&cmd[1..5]));
                debug!(
                    "sdio-bridge: read addressed at sector {:08X}",
                    self.requested_sector
                );
                ack(response, 0);
            }
            sdio_bridge::FLUSH_FIFO => {
                // Writes are committed at FIFO-write completion; nothing
                // is left to flush here.
                ack(response, 0);
            }
            sdio_bridge::FIFO_READ => {
                copy_staged_sector(self.volume.as_mut(), self.requested_sector, response);
            }
            sdio_bridge::FIFO_WRITE => {
                return Ok(CommandStatus::PendingFinish);
            }
            _ => crate::device::unknown_command("sdio-bridge", cmd, response),
        }
        Ok(CommandStatus::Complete)
    }

    fn command_finish(&mut self, cmd: &CartCommand, data: &[u8]) {
        if !self.protocol_active {
            return;
        }
        if cmd[0] == sdio_bridge::FIFO_WRITE {
            commit_sector(self.volume.as_mut(), self.requested_sector, data);
            // Sequential multi-block writes have no re-addressing command
            // between blocks; advancing here is what moves them forward.
            self.requested_sector = self.requested_sector.wrapping_add(1);
        }
    }

    fn reset(&mut self) {
        self.session = SdioSession::Idle;
        self.requested_sector = 0;
        self.protocol_active = false;
        // Geometry and the translator derived from it are kept.
    }
}
