//! USB HID wire format of the pass-through cartridge dongle.
//!
//! The dongle exposes a real cartridge slot over USB HID. Every outgoing
//! message is one fixed-size report:
//!
//! ```text
//! byte 0        report ID (always 0)
//! byte 1        message type
//! bytes 2-3     payload length, little-endian
//! bytes 4-5     expected response length, little-endian
//! bytes 6-64    payload
//! ```

/// Full report size; the HID limit is 64 bytes plus one leading report-ID byte
pub const REPORT_SIZE: usize = 65;

/// Byte offset of the payload inside a report
pub const PAYLOAD_OFFSET: usize = 6;

/// Maximum payload a single report can carry
pub const MAX_PAYLOAD: usize = REPORT_SIZE - PAYLOAD_OFFSET;

/// Message types understood by the dongle
pub mod message {
    /// Switch the dongle to raw cartridge (NTR ROM) mode
    pub const ROM_MODE: u8 = 0x11;
    /// Forward an 8-byte NTR cartridge command
    pub const NTR_COMMAND: u8 = 0x13;
    /// Test/echo message
    pub const TEST: u8 = 0x02;
}

/// USB identity of the supported dongle
pub mod usb_id {
    /// Datel vendor ID
    pub const VENDOR: u16 = 0x1C1A;
    /// PowerSaves product ID
    pub const PRODUCT: u16 = 0x03D5;
}
