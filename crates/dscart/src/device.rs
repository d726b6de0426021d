//! Cartridge command responder contract.
//!
//! The cartridge slot delivers 8-byte commands and drains response bytes;
//! each cartridge variant (emulated bridge or hardware pass-through) answers
//! them behind the same contract so the slot never cares which one it is
//! driving. Some commands are two-phase: `command_start` signals
//! `PendingFinish` and the slot later calls `command_finish` with the bytes
//! it accumulated during the transaction.

use thiserror::Error;
use tracing::warn;

/// Every slot command is exactly 8 bytes.
pub type CartCommand = [u8; dscart_hw::specs::slot::COMMAND_SIZE];

/// Outcome of `command_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// The response buffer is fully populated; the transaction is done.
    Complete,
    /// The command consumes data; `command_finish` must follow with the
    /// bytes the slot collected for this transaction.
    PendingFinish,
}

/// Errors a cartridge responder can surface to the slot.
///
/// The emulated bridges never fail: unknown opcodes are answered with a
/// zeroed response and a warning so undocumented commands future guest
/// software might probe don't stall it. Only the hardware pass-through
/// path produces errors.
#[derive(Debug, Error)]
pub enum CartError {
    /// No compatible pass-through device was found at construction.
    #[error("no pass-through device attached")]
    DeviceMissing,
    /// The payload does not fit in a single transport report.
    #[error("payload of {0} bytes exceeds the transport report capacity")]
    PayloadTooLarge(usize),
    /// The transport write or read failed mid-transaction.
    #[error("transport i/o failed: {0}")]
    Transport(String),
}

/// A cartridge that answers slot commands.
pub trait CartResponder {
    /// Process a command, filling `response` with exactly its length in bytes.
    fn command_start(
        &mut self,
        cmd: &CartCommand,
        response: &mut [u8],
    ) -> Result<CommandStatus, CartError>;

    /// Deliver the data the slot accumulated for a command whose
    /// `command_start` returned [`CommandStatus::PendingFinish`].
    ///
    /// The slot invokes this in issue order with no intervening
    /// `command_start` for the same transaction.
    fn command_finish(&mut self, cmd: &CartCommand, data: &[u8]);

    /// Reinitialize session state. Derived facts (volume geometry) survive.
    fn reset(&mut self);
}

/// Decode a big-endian 32-bit address from four command bytes.
pub(crate) fn be_address(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Write a one-byte acknowledgment, tolerating a zero-length response buffer.
pub(crate) fn ack(response: &mut [u8], value: u8) {
    if let Some(first) = response.first_mut() {
        *first = value;
    }
}

/// Shared unknown-opcode path: warn and zero the response in 4-byte strides.
pub(crate) fn unknown_command(tag: &str, cmd: &CartCommand, response: &mut [u8]) {
    warn!(
        "{}: unknown command {:02X} {:02X} {:02X} {:02X} {:02X} {:02X} {:02X} {:02X} ({})",
        tag,
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
    for word in response.chunks_mut(4) {
        word.fill(0);
    }
}
