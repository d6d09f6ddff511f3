//! Tick-driven server loop.
//!
//! Each tick drains the transport into the engine, runs periodic engine work,
//! applies the scheduled value updates once per update interval, delivers
//! value-updated signals, and flushes every queued frame. Network activation,
//! communication-control expiry and transport maintenance follow the flush.

use std::future::Future;
use std::time::Duration;

use bacnode_core::types::{ObjectId, ObjectType, PropertyId, PropertyValue};
use bacnode_datalink::Transport;
use log::{debug, info, warn};
use tokio::time::{Instant, MissedTickBehavior};

use crate::device::Device;
use crate::engine::{Outbox, ProtocolEngine};
use crate::error::AccessError;
use crate::network_port::NetworkPortConfig;

const RECEIVE_BUFFER_LEN: usize = 1600;

/// Why [`Driver::run`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverExit {
    Shutdown,
    /// A warm start was acknowledged; restart with this network
    /// configuration.
    Restart(Option<NetworkPortConfig>),
}

/// A property advanced by `step` every update interval.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledIncrement {
    pub object_type: ObjectType,
    pub instance: u32,
    pub property: PropertyId,
    pub step: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverConfig {
    pub tick: Duration,
    pub update_interval: Duration,
    pub schedule: Vec<ScheduledIncrement>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            update_interval: Duration::from_secs(1),
            schedule: Vec::new(),
        }
    }
}

pub struct Driver<T, E> {
    device: Device,
    transport: T,
    engine: E,
    config: DriverConfig,
    outbox: Outbox,
    last_update: Instant,
    buf: Vec<u8>,
}

impl<T: Transport, E: ProtocolEngine> Driver<T, E> {
    pub fn new(device: Device, transport: T, engine: E, config: DriverConfig) -> Self {
        Self {
            device,
            transport,
            engine,
            config,
            outbox: Outbox::new(),
            last_update: Instant::now(),
            buf: vec![0; RECEIVE_BUFFER_LEN],
        }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut Device {
        &mut self.device
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Announces the device with an I-Am broadcast.
    pub async fn startup(&mut self) {
        info!("device {} starting", self.device.instance());
        self.engine.send_i_am(&self.device, &mut self.outbox);
        self.flush().await;
    }

    /// Runs one tick. Returns `Some` when the driver must stop.
    pub async fn tick(&mut self, now: Instant) -> Option<DriverExit> {
        self.receive_all(now);
        self.engine.tick(&mut self.device, now, &mut self.outbox);
        if now.saturating_duration_since(self.last_update) >= self.config.update_interval {
            self.last_update = now;
            self.apply_schedule();
        }
        for update in self.device.take_value_updates() {
            self.engine
                .value_updated(&self.device, update, now, &mut self.outbox);
        }
        self.flush().await;

        if self.device.restart_pending() {
            info!("warm start acknowledged, restarting");
            return Some(DriverExit::Restart(
                self.device.active_network_config().cloned(),
            ));
        }
        self.device.expire_communication_control(now);
        if let Some(config) = self.device.take_network_activation() {
            if let Err(err) = self.transport.reconfigure(&config.to_bip_settings()).await {
                warn!("applying network configuration failed: {err}");
            }
        }
        if let Err(err) = self.transport.maintain(now).await {
            warn!("transport maintenance failed: {err}");
        }
        None
    }

    /// Announces the device, then ticks until `shutdown` resolves or a
    /// restart is requested.
    pub async fn run<F: Future<Output = ()>>(&mut self, shutdown: F) -> DriverExit {
        self.startup().await;
        let mut interval = tokio::time::interval(self.config.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    return DriverExit::Shutdown;
                }
                now = interval.tick() => {
                    if let Some(exit) = self.tick(now).await {
                        return exit;
                    }
                }
            }
        }
    }

    fn receive_all(&mut self, now: Instant) {
        loop {
            match self.transport.receive(&mut self.buf) {
                Ok(Some((len, source))) => {
                    debug!("{len} bytes from {source}");
                    self.engine.process(
                        &mut self.device,
                        &self.buf[..len],
                        source,
                        now,
                        &mut self.outbox,
                    );
                }
                Ok(None) => break,
                Err(err) => {
                    warn!("receive failed: {err}");
                    break;
                }
            }
        }
    }

    fn apply_schedule(&mut self) {
        let instance = self.device.instance();
        for step in &self.config.schedule {
            match advance(&mut self.device, instance, step) {
                Ok(id) => self.device.value_updated(id, step.property),
                Err(err) => warn!(
                    "scheduled update of {:?} {} {:?} failed: {err}",
                    step.object_type, step.instance, step.property
                ),
            }
        }
    }

    async fn flush(&mut self) {
        for message in self.outbox.drain() {
            if let Err(err) = self
                .transport
                .send(&message.payload, message.destination, message.broadcast)
                .await
            {
                warn!("send to {} failed: {err}", message.destination);
            }
        }
    }
}

fn advance(
    device: &mut Device,
    instance: u32,
    step: &ScheduledIncrement,
) -> Result<ObjectId, AccessError> {
    let id = device.resolve(instance, step.object_type, step.instance)?;
    let current = device.get_property(instance, step.object_type, step.instance, step.property, None)?;
    let next = match current {
        PropertyValue::Real(v) => PropertyValue::Real(v + step.step as f32),
        PropertyValue::Double(v) => PropertyValue::Double(v + step.step),
        PropertyValue::Unsigned(v) => {
            PropertyValue::Unsigned((f64::from(v) + step.step).clamp(0.0, f64::from(u32::MAX)) as u32)
        }
        PropertyValue::Signed(v) => PropertyValue::Signed(
            (f64::from(v) + step.step).clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32,
        ),
        _ => return Err(AccessError::TypeMismatch),
    };
    device.set_initial_value(instance, step.object_type, step.instance, step.property, next)?;
    Ok(id)
}
