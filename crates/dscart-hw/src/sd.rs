//! SD/SDIO protocol command numbers and response bits.
//!
//! Only the subset of the SD command set that DS flash-cart firmware is
//! observed to issue is listed here.
//!
//! # References
//! - <https://www.sdcard.org/downloads/pls/> (SD Physical Layer Simplified Spec)

/// SD command numbers (the CMD index, not the cartridge opcode)
pub mod cmd {
    /// CMD2: ALL_SEND_CID
    pub const ALL_SEND_CID: u8 = 2;
    /// CMD3: SEND_RELATIVE_ADDR
    pub const SEND_RELATIVE_ADDR: u8 = 3;
    /// CMD6: SWITCH_FUNC
    pub const SWITCH_FUNC: u8 = 6;
    /// CMD7: SELECT_CARD
    pub const SELECT_CARD: u8 = 7;
    /// CMD8: SEND_IF_COND
    pub const SEND_IF_COND: u8 = 8;
    /// CMD12: STOP_TRANSMISSION
    pub const STOP_TRANSMISSION: u8 = 12;
    /// CMD16: SET_BLOCKLEN
    pub const SET_BLOCKLEN: u8 = 16;
    /// CMD24: WRITE_BLOCK
    pub const WRITE_BLOCK: u8 = 24;
    /// CMD25: WRITE_MULTIPLE_BLOCK
    pub const WRITE_MULTIPLE_BLOCK: u8 = 25;
    /// ACMD41: SD_SEND_OP_COND
    pub const SD_SEND_OP_COND: u8 = 41;
    /// CMD55: APP_CMD
    pub const APP_CMD: u8 = 55;
}

/// OCR (Operation Conditions Register) bits
pub mod ocr {
    /// Card Capacity Status: set for high-capacity (SDHC/SDXC) cards, which
    /// are sector-addressed on the bus instead of byte-addressed
    pub const HIGH_CAPACITY: u32 = 1 << 30;
}
