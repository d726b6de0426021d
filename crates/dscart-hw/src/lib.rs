//! Hardware-level protocol definitions for DS flash-cart emulation.
//!
//! This crate carries no logic, only the constant surface shared between the
//! emulation core and its tools: cartridge opcode tables for the supported
//! flash-cart families, SD/SDIO command numbers, card specs, and the USB HID
//! report layout used by the pass-through dongle.

pub mod opcodes;
pub mod passthrough;
pub mod sd;
pub mod specs;
