//! Behavior of the hardware pass-through bridge, driven through a fake
//! transport so no dongle is needed.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use dscart::{CartCommand, CartError, CartSlot, HidTransport, PassthroughBridge};

#[derive(Default)]
struct FakeState {
    /// Every report written, in order.
    reports: Vec<Vec<u8>>,
    /// Scripted results for successive reads.
    reads: VecDeque<Result<Vec<u8>, ()>>,
}

#[derive(Clone)]
struct FakeTransport(Rc<RefCell<FakeState>>);

impl FakeTransport {
    fn new() -> Self {
        Self(Rc::new(RefCell::new(FakeState::default())))
    }
}

impl HidTransport for FakeTransport {
    fn write_report(&mut self, report: &[u8]) -> Result<(), CartError> {
        self.0.borrow_mut().reports.push(report.to_vec());
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CartError> {
        match self.0.borrow_mut().reads.pop_front() {
            Some(Ok(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Some(Err(())) => Err(CartError::Transport("injected failure".to_string())),
            None => panic!("transport read past the scripted responses"),
        }
    }
}

#[test]
fn construction_switches_the_dongle_to_rom_mode() {
    let transport = FakeTransport::new();
    PassthroughBridge::new(Box::new(transport.clone())).unwrap();

    let state = transport.0.borrow();
    assert_eq!(state.reports.len(), 1);
    let report = &state.reports[0];
    assert_eq!(report.len(), 65);
    assert_eq!(report[0], 0); // report ID
    assert_eq!(report[1], 0x11); // ROM mode message
    assert_eq!(&report[2..6], &[0, 0, 0, 0]); // no payload, no response
}

#[test]
fn forward_frames_the_command_and_accumulates_the_reply() {
    let transport = FakeTransport::new();
    let mut bridge = PassthroughBridge::new(Box::new(transport.clone())).unwrap();

    transport
        .0
        .borrow_mut()
        .reads
        .extend([Ok(vec![0xAA; 10]), Ok(vec![0xBB; 6])]);

    let cmd: CartCommand = [0xB7, 1, 2, 3, 4, 0, 0, 0];
    let mut response = [0u8; 16];
    bridge.forward(&cmd, &mut response).unwrap();

    assert_eq!(&response[..10], &[0xAA; 10]);
    assert_eq!(&response[10..], &[0xBB; 6]);

    let state = transport.0.borrow();
    let report = &state.reports[1];
    assert_eq!(report[1], 0x13); // NTR command message
    assert_eq!(&report[2..4], &[8, 0]); // payload length, little-endian
    assert_eq!(&report[4..6], &[16, 0]); // expected response length
    assert_eq!(&report[6..14], &cmd);
}

#[test]
fn read_failure_aborts_even_after_partial_data() {
    let transport = FakeTransport::new();
    let mut bridge = PassthroughBridge::new(Box::new(transport.clone())).unwrap();

    transport
        .0
        .borrow_mut()
        .reads
        .extend([Ok(vec![0u8; 4]), Err(())]);

    let cmd: CartCommand = [0x00, 0, 0, 0, 0, 0, 0, 0];
    let mut response = [0u8; 16];
    let err = bridge.forward(&cmd, &mut response).unwrap_err();
    assert!(matches!(err, CartError::Transport(_)));
}

#[test]
fn oversized_payload_is_rejected_before_io() {
    let transport = FakeTransport::new();
    let mut bridge = PassthroughBridge::new(Box::new(transport.clone())).unwrap();

    let payload = [0u8; 60];
    let err = bridge.send_message(0x02, &payload, 0).unwrap_err();
    assert!(matches!(err, CartError::PayloadTooLarge(60)));

    // Only the construction-time mode switch ever hit the wire.
    assert_eq!(transport.0.borrow().reports.len(), 1);
}

#[test]
fn maximum_payload_still_fits() {
    let transport = FakeTransport::new();
    let mut bridge = PassthroughBridge::new(Box::new(transport.clone())).unwrap();

    let payload = [0x5Au8; 59];
    bridge.send_message(0x02, &payload, 0).unwrap();

    let state = transport.0.borrow();
    let report = state.reports.last().unwrap();
    assert_eq!(&report[6..65], &payload);
}

#[test]
fn disconnected_bridge_fails_every_forward() {
    let mut bridge = PassthroughBridge::disconnected();
    let cmd: CartCommand = [0x00, 0, 0, 0, 0, 0, 0, 0];
    let mut response = [0u8; 4];
    assert!(matches!(
        bridge.forward(&cmd, &mut response),
        Err(CartError::DeviceMissing)
    ));
}

#[test]
fn slot_surfaces_transport_errors_to_the_caller() {
    let transport = FakeTransport::new();
    let bridge = PassthroughBridge::new(Box::new(transport.clone())).unwrap();
    transport.0.borrow_mut().reads.push_back(Err(()));

    let mut slot = CartSlot::new(Box::new(bridge));
    let cmd: CartCommand = [0xB7, 0, 0, 0, 0, 0, 0, 0];
    assert!(slot.read_command(&cmd, 8).is_err());
}
