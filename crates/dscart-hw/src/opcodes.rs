//! Cartridge command opcodes (first byte of the 8-byte slot command).
//!
//! Flash carts overlay their storage protocol on top of the ordinary ROM
//! command set; the overlay opcodes below are only honored once the cart's
//! storage protocol mode is active.
//!
//! # References
//! - <https://problemkaputt.de/gbatek.htm#dscartridgeprotocol>

/// Baseline ROM command set, served in every mode
pub mod rom {
    /// Read ROM data (main data read)
    pub const READ_DATA: u8 = 0x00;
    /// Read ROM data (key2-encrypted data read, same payload here)
    pub const READ_DATA_B7: u8 = 0xB7;
}

/// Minimal sector-bridge command set (DSpico family)
pub mod sector_bridge {
    /// Latch the sector address for the next data read (BE address in bytes 4-7)
    pub const SET_SECTOR: u8 = 0xE3;
    /// Poll storage ready; replies non-zero when ready
    pub const POLL_READY: u8 = 0xE4;
    /// Read the latched sector's data
    pub const READ_SECTOR: u8 = 0xE5;
    /// Begin a sector write (BE address in bytes 4-7); data follows in the
    /// finish phase of the transaction
    pub const WRITE_SECTOR: u8 = 0xF6;
}

/// SDIO-host command set (DSTT family)
pub mod sdio_bridge {
    /// SD host busy poll; replies 0 when idle
    pub const HOST_BUSY: u8 = 0x50;
    /// Latch an SDIO command, its 32-bit parameter, and the host mode
    pub const SET_HOST_MODE: u8 = 0x51;
    /// Fetch the 4-byte response to the latched SDIO command
    pub const SEND_RESPONSE: u8 = 0x52;
    /// Request a single-block read at the addressed sector
    pub const READ_SINGLE_BLOCK: u8 = 0x53;
    /// Request a multi-block read starting at the addressed sector
    pub const READ_MULTI_BLOCK: u8 = 0x54;
    /// Flush the SD FIFO to disk
    pub const FLUSH_FIFO: u8 = 0x56;
    /// Set an SD host control register (clock speed, SDHC mode)
    pub const SET_HOST_REGISTER: u8 = 0x5F;
    /// Wait for the SD FIFO to have data ready; replies 0 when ready
    pub const FIFO_WAIT: u8 = 0x80;
    /// Read one sector of data out of the SD FIFO
    pub const FIFO_READ: u8 = 0x81;
    /// Write one sector of data into the SD FIFO (data in the finish phase)
    pub const FIFO_WRITE: u8 = 0x82;
}
