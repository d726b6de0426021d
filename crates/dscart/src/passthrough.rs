//! Pass-through bridge to a real cartridge over a USB HID dongle.
//!
//! Instead of emulating the cart, every slot command is wrapped in a
//! fixed-size HID report, sent to the dongle, and answered by the genuine
//! hardware. The transport sits behind [`HidTransport`] so the framing and
//! dispatch logic is testable without a physical device; the `powersaves`
//! cargo feature supplies a `hidapi`-backed implementation.
//!
//! The read loop blocks with no timeout. A stalled dongle stalls the
//! emulated slot with it, which is acceptable for this off-mainline path.

use tracing::{debug, error};

use dscart_hw::passthrough::{MAX_PAYLOAD, PAYLOAD_OFFSET, REPORT_SIZE, message};

use crate::device::{CartCommand, CartError, CartResponder, CommandStatus};

/// Blocking byte transport to the dongle.
pub trait HidTransport {
    /// Send one full report. The first byte is the report ID.
    fn write_report(&mut self, report: &[u8]) -> Result<(), CartError>;

    /// Read up to `buf.len()` response bytes, returning how many arrived.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CartError>;
}

/// Cartridge forwarding slot commands to real hardware.
pub struct PassthroughBridge {
    transport: Option<Box<dyn HidTransport>>,
}

impl PassthroughBridge {
    /// Wrap a transport and switch the dongle to raw cartridge mode.
    pub fn new(transport: Box<dyn HidTransport>) -> Result<Self, CartError> {
        let mut bridge = Self {
            transport: Some(transport),
        };
        bridge.send_message(message::ROM_MODE, &[], 0)?;
        Ok(bridge)
    }

    /// A bridge with no device attached. Every forward fails with
    /// [`CartError::DeviceMissing`]; construction itself never does.
    pub fn disconnected() -> Self {
        Self { transport: None }
    }

    /// Discover the dongle by its USB identity. Logs and returns a
    /// disconnected bridge when none is attached.
    #[cfg(feature = "powersaves")]
    pub fn open() -> Self {
        match HidApiTransport::open() {
            Ok(transport) => match Self::new(Box::new(transport)) {
                Ok(bridge) => bridge,
                Err(e) => {
                    error!("Pass-through mode switch failed: {}", e);
                    Self::disconnected()
                }
            },
            Err(e) => {
                error!("Pass-through device not found: {}", e);
                Self::disconnected()
            }
        }
    }

    /// Frame and send one message: `[0, type, len lo/hi, resp-len lo/hi,
    /// payload...]`, zero-padded to the full report size.
    ///
    /// Payloads larger than the report capacity are rejected before any
    /// I/O is attempted.
    pub fn send_message(
        &mut self,
        message_type: u8,
        payload: &[u8],
        response_len: u16,
    ) -> Result<(), CartError> {
        if payload.len() > MAX_PAYLOAD {
            return Err(CartError::PayloadTooLarge(payload.len()));
        }
        let transport = self.transport.as_mut().ok_or(CartError::DeviceMissing)?;

        let mut report = [0u8; REPORT_SIZE];
        report[1] = message_type;
        report[2] = (payload.len() & 0xFF) as u8;
        report[3] = ((payload.len() >> 8) & 0xFF) as u8;
        report[4] = (response_len & 0xFF) as u8;
        report[5] = ((response_len >> 8) & 0xFF) as u8;
        report[PAYLOAD_OFFSET..PAYLOAD_OFFSET + payload.len()].copy_from_slice(payload);

        transport.write_report(&report)
    }

    /// Forward an 8-byte cartridge command and block until the full
    /// response has been accumulated.
    pub fn forward(&mut self, cmd: &CartCommand, response: &mut [u8]) -> Result<(), CartError> {
        debug!(
            "pass-through: command {:02X} {:02X} {:02X} {:02X} {:02X} {:02X} {:02X} {:02X} ({})",
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
        self.send_message(message::NTR_COMMAND, cmd, response.len() as u16)?;

        let transport = self.transport.as_mut().ok_or(CartError::DeviceMissing)?;
        let mut received = 0;
        while received < response.len() {
            match transport.read(&mut response[received..]) {
                Ok(n) => received += n,
                Err(e) => {
                    error!("Pass-through read failed: {}", e);
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

impl CartResponder for PassthroughBridge {
    fn command_start(
        &mut self,
        cmd: &CartCommand,
        response: &mut [u8],
    ) -> Result<CommandStatus, CartError> {
        self.forward(cmd, response)?;
        Ok(CommandStatus::Complete)
    }

    fn command_finish(&mut self, _cmd: &CartCommand, _data: &[u8]) {
        // The hardware path has no two-phase commands.
    }

    fn reset(&mut self) {
        // Session state lives in the real cartridge.
    }
}

/// Transport backed by the `hidapi` library.
#[cfg(feature = "powersaves")]
pub struct HidApiTransport {
    device: hidapi::HidDevice,
}

#[cfg(feature = "powersaves")]
impl HidApiTransport {
    /// Open the single supported dongle by vendor/product identity.
    pub fn open() -> Result<Self, CartError> {
        use dscart_hw::passthrough::usb_id;

        let api = hidapi::HidApi::new().map_err(|e| CartError::Transport(e.to_string()))?;
        let device = api
            .open(usb_id::VENDOR, usb_id::PRODUCT)
            .map_err(|_| CartError::DeviceMissing)?;
        Ok(Self { device })
    }
}

#[cfg(feature = "powersaves")]
impl HidTransport for HidApiTransport {
    fn write_report(&mut self, report: &[u8]) -> Result<(), CartError> {
        self.device
            .write(report)
            .map(|_| ())
            .map_err(|e| CartError::Transport(e.to_string()))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CartError> {
        self.device
            .read(buf)
            .map_err(|e| CartError::Transport(e.to_string()))
    }
}
