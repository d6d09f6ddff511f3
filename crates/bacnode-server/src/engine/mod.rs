//! Protocol engine boundary.
//!
//! An engine decodes raw NPDUs, drives the [`Device`] API, and queues its
//! replies in an [`Outbox`] that the driver flushes to the transport. Engines
//! never touch the transport directly, so the driver decides when frames go
//! out (a warm-start acknowledgement is flushed before the restart).

mod basic;
mod cov;

pub use basic::BasicEngine;
pub use cov::{should_notify, CovTable, Subscription};

use bacnode_datalink::ConnectionString;
use tokio::time::Instant;

use crate::device::{Device, ValueUpdate};

/// A frame queued for transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub payload: Vec<u8>,
    pub destination: ConnectionString,
    pub broadcast: bool,
}

#[derive(Debug, Default)]
pub struct Outbox {
    messages: Vec<OutboundMessage>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_unicast(&mut self, payload: Vec<u8>, destination: ConnectionString) {
        self.messages.push(OutboundMessage {
            payload,
            destination,
            broadcast: false,
        });
    }

    /// Queues a local broadcast. The transport picks the broadcast address.
    pub fn push_broadcast(&mut self, payload: Vec<u8>) {
        self.messages.push(OutboundMessage {
            payload,
            destination: ConnectionString::from_bytes([0; 6]),
            broadcast: true,
        });
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, OutboundMessage> {
        self.messages.drain(..)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// The protocol side of the server, driven once per tick.
pub trait ProtocolEngine {
    /// Decodes and answers one inbound NPDU from `source`.
    fn process(
        &mut self,
        device: &mut Device,
        frame: &[u8],
        source: ConnectionString,
        now: Instant,
        outbox: &mut Outbox,
    );

    /// Periodic work such as expiring subscriptions.
    fn tick(&mut self, _device: &mut Device, _now: Instant, _outbox: &mut Outbox) {}

    /// Called for every value-updated signal the device raised.
    fn value_updated(
        &mut self,
        device: &Device,
        update: ValueUpdate,
        now: Instant,
        outbox: &mut Outbox,
    );

    /// Queues an I-Am broadcast for this device.
    fn send_i_am(&mut self, device: &Device, outbox: &mut Outbox);
}
