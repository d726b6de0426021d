//! Cartridge slot driver.
//!
//! The slot owns one cartridge and runs the two-phase command protocol on
//! its behalf: `command_start` first, and for commands that consume data,
//! `command_finish` with the accumulated transaction bytes — in that exact
//! order, with no interleaving. Everything is synchronous on the caller's
//! thread; commands complete strictly in issue order.

use crate::device::{CartCommand, CartError, CartResponder, CommandStatus};

/// Drives one cartridge through the slot command protocol.
pub struct CartSlot {
    device: Box<dyn CartResponder>,
}

impl CartSlot {
    pub fn new(device: Box<dyn CartResponder>) -> Self {
        Self { device }
    }

    /// Issue a command expecting `response_len` bytes back.
    pub fn read_command(
        &mut self,
        cmd: &CartCommand,
        response_len: usize,
    ) -> Result<Vec<u8>, CartError> {
        let mut response = vec![0u8; response_len];
        match self.device.command_start(cmd, &mut response)? {
            CommandStatus::Complete => {}
            CommandStatus::PendingFinish => {
                // A data-consuming command issued without payload still
                // gets its finish call so the transaction closes.
                self.device.command_finish(cmd, &[]);
            }
        }
        Ok(response)
    }

    /// Issue a command carrying outgoing data (a two-phase write).
    pub fn write_command(&mut self, cmd: &CartCommand, payload: &[u8]) -> Result<(), CartError> {
        let mut response = [0u8; 0];
        if self.device.command_start(cmd, &mut response)? == CommandStatus::PendingFinish {
            self.device.command_finish(cmd, payload);
        }
        Ok(())
    }

    /// Reset the cartridge's session state.
    pub fn reset(&mut self) {
        self.device.reset();
    }
}
