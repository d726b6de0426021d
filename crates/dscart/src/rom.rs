//! Baseline ROM-image reads.
//!
//! Even with the storage protocol active, guest software keeps issuing
//! ordinary ROM data reads (opcodes 0x00/0xB7); those address the cartridge
//! ROM image directly, wrapping at the image size the way the address lines
//! wrap on real hardware.

use crate::device::be_address;

/// The cartridge's ROM image.
pub struct RomImage {
    data: Vec<u8>,
}

impl RomImage {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// An empty image; all baseline reads return 0xFF like an unpopulated bus.
    pub fn empty() -> Self {
        Self { data: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Copy `out.len()` bytes starting at `addr`, wrapping at the image size.
    pub fn read_into(&self, addr: u32, out: &mut [u8]) {
        if self.data.is_empty() {
            out.fill(0xFF);
            return;
        }
        let base = addr as usize % self.data.len();
        for (pos, byte) in out.iter_mut().enumerate() {
            *byte = self.data[(base + pos) % self.data.len()];
        }
    }

    /// Serve a baseline ROM read command (BE address in bytes 1-4).
    pub(crate) fn serve_command(&self, cmd: &crate::device::CartCommand, response: &mut [u8]) {
        let addr = be_address(&cmd[1..5]);
        self.read_into(addr, response);
    }
}

/// Baseline dispatch used while the storage protocol mode is not active:
/// ROM reads are served, everything else takes the unknown-opcode path.
pub(crate) fn baseline_command(
    image: &RomImage,
    tag: &str,
    cmd: &crate::device::CartCommand,
    response: &mut [u8],
) {
    use dscart_hw::opcodes::rom;

    match cmd[0] {
        rom::READ_DATA | rom::READ_DATA_B7 => image.serve_command(cmd, response),
        _ => crate::device::unknown_command(tag, cmd, response),
    }
}
