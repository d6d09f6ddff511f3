use std::time::Duration;

use bacnode_core::encoding::writer::MAX_APDU_LEN;
use bacnode_core::types::object_id::WILDCARD_INSTANCE;
use bacnode_core::types::{
    CommunicationState, NetworkType, ObjectId, ObjectType, PropertyId, PropertyValue,
    ProtocolLevel, ReinitializeState, Segmentation, SystemStatus,
};
use log::{debug, info};
use tokio::time::Instant;

use crate::dispatch::{self, WriteAccess};
use crate::error::{AccessError, ReinitError, StoreError};
use crate::lifecycle::{Lifecycle, LifecycleState, ReinitOutcome};
use crate::network_port::NetworkPortConfig;
use crate::store::ObjectStore;
use crate::table::Presence;

pub const PROTOCOL_VERSION: u32 = 1;
pub const PROTOCOL_REVISION: u32 = 22;

/// Identity of the hosted device.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DeviceInfo {
    pub instance: u32,
    pub name: String,
    pub vendor_name: String,
    pub vendor_id: u16,
    pub model_name: String,
    pub firmware_revision: String,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            instance: 389001,
            name: "Device Rainbow".into(),
            vendor_name: "Example Chipkin Automation Systems".into(),
            vendor_id: 0,
            model_name: "bacnode".into(),
            firmware_revision: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

/// A property whose value changed and may need a COV notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueUpdate {
    pub object_id: ObjectId,
    pub property: PropertyId,
}

/// The hosted device: its object store, lifecycle state and the active
/// network configuration.
///
/// Property operations name the device instance they address and fail with
/// [`AccessError::NotFound`] when it is not this device.
#[derive(Debug)]
pub struct Device {
    store: ObjectStore,
    lifecycle: Lifecycle,
    active_network: Option<NetworkPortConfig>,
    pending_activation: Option<NetworkPortConfig>,
    value_updates: Vec<ValueUpdate>,
}

impl Device {
    pub fn new(info: &DeviceInfo, password: &str) -> Result<Self, StoreError> {
        let mut store = ObjectStore::new(info.instance)?;
        let id = store.device_id();
        let values = [
            (
                PropertyId::ObjectName,
                PropertyValue::CharacterString(info.name.clone()),
            ),
            (
                PropertyId::SystemStatus,
                PropertyValue::Enumerated(SystemStatus::Operational.to_u32()),
            ),
            (
                PropertyId::VendorName,
                PropertyValue::CharacterString(info.vendor_name.clone()),
            ),
            (
                PropertyId::VendorIdentifier,
                PropertyValue::Unsigned(u32::from(info.vendor_id)),
            ),
            (
                PropertyId::ModelName,
                PropertyValue::CharacterString(info.model_name.clone()),
            ),
            (
                PropertyId::FirmwareRevision,
                PropertyValue::CharacterString(info.firmware_revision.clone()),
            ),
            (
                PropertyId::ApplicationSoftwareVersion,
                PropertyValue::CharacterString(env!("CARGO_PKG_VERSION").into()),
            ),
            (
                PropertyId::ProtocolVersion,
                PropertyValue::Unsigned(PROTOCOL_VERSION),
            ),
            (
                PropertyId::ProtocolRevision,
                PropertyValue::Unsigned(PROTOCOL_REVISION),
            ),
            (
                PropertyId::MaxApduLengthAccepted,
                PropertyValue::Unsigned(MAX_APDU_LEN as u32),
            ),
            (
                PropertyId::SegmentationSupported,
                PropertyValue::Enumerated(Segmentation::NoSegmentation.to_u32()),
            ),
            (PropertyId::ApduTimeout, PropertyValue::Unsigned(3000)),
            (PropertyId::NumberOfApduRetries, PropertyValue::Unsigned(3)),
            (PropertyId::DatabaseRevision, PropertyValue::Unsigned(1)),
        ];
        for (property, value) in values {
            put(&mut store, id, property, value)?;
        }
        info!("device {} \"{}\" created", info.instance, info.name);
        Ok(Self {
            store,
            lifecycle: Lifecycle::new(password)?,
            active_network: None,
            pending_activation: None,
            value_updates: Vec::new(),
        })
    }

    pub fn instance(&self) -> u32 {
        self.store.device_instance()
    }

    pub fn device_id(&self) -> ObjectId {
        self.store.device_id()
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn vendor_id(&self) -> u32 {
        match self.own_property(PropertyId::VendorIdentifier) {
            Ok(PropertyValue::Unsigned(id)) => id,
            _ => 0,
        }
    }

    pub fn max_apdu(&self) -> u32 {
        MAX_APDU_LEN as u32
    }

    pub fn add_object(
        &mut self,
        device_instance: u32,
        object_type: ObjectType,
        instance: u32,
    ) -> Result<(), StoreError> {
        self.store.add_object(device_instance, object_type, instance)
    }

    pub fn add_network_port_object(
        &mut self,
        device_instance: u32,
        instance: u32,
        network_type: NetworkType,
        protocol_level: ProtocolLevel,
    ) -> Result<(), StoreError> {
        self.store
            .add_network_port_object(device_instance, instance, network_type, protocol_level)
    }

    /// Adds the IPv4 NetworkPort object, loads `config` into it and makes it
    /// the active configuration.
    pub fn install_network_port(&mut self, config: &NetworkPortConfig) -> Result<(), StoreError> {
        self.store.add_network_port_object(
            self.instance(),
            config.instance,
            NetworkType::Ipv4,
            ProtocolLevel::BacnetApplication,
        )?;
        let id = ObjectId::new(ObjectType::NetworkPort, config.instance);
        for (property, value) in config.property_values() {
            put(&mut self.store, id, property, value)?;
        }
        self.active_network = Some(config.clone());
        Ok(())
    }

    pub fn set_property_enabled(
        &mut self,
        device_instance: u32,
        object_type: ObjectType,
        instance: u32,
        property: PropertyId,
        enabled: bool,
    ) -> Result<(), StoreError> {
        self.store
            .set_property_enabled(device_instance, object_type, instance, property, enabled)
    }

    pub fn set_property_writable(
        &mut self,
        device_instance: u32,
        object_type: ObjectType,
        instance: u32,
        property: PropertyId,
        writable: bool,
    ) -> Result<(), StoreError> {
        self.store
            .set_property_writable(device_instance, object_type, instance, property, writable)
    }

    pub fn set_property_subscribable(
        &mut self,
        device_instance: u32,
        object_type: ObjectType,
        instance: u32,
        property: PropertyId,
        subscribable: bool,
    ) -> Result<(), StoreError> {
        self.store.set_property_subscribable(
            device_instance,
            object_type,
            instance,
            property,
            subscribable,
        )
    }

    /// Writes a value without checking the writable flag. Used by startup
    /// configuration and scheduled updates; raises no value-updated signal.
    pub fn set_initial_value(
        &mut self,
        device_instance: u32,
        object_type: ObjectType,
        instance: u32,
        property: PropertyId,
        value: PropertyValue,
    ) -> Result<(), AccessError> {
        let id = self.resolve(device_instance, object_type, instance)?;
        dispatch::write_property(&mut self.store, id, property, value, None, WriteAccess::Initial)
            .map(|_| ())
    }

    /// Maps the Device wildcard instance to this device.
    pub fn resolve(
        &self,
        device_instance: u32,
        object_type: ObjectType,
        instance: u32,
    ) -> Result<ObjectId, AccessError> {
        if device_instance != self.instance() {
            return Err(AccessError::NotFound);
        }
        if object_type == ObjectType::Device && instance == WILDCARD_INSTANCE {
            return Ok(self.device_id());
        }
        Ok(ObjectId::new(object_type, instance))
    }

    pub fn get_property(
        &self,
        device_instance: u32,
        object_type: ObjectType,
        instance: u32,
        property: PropertyId,
        array_index: Option<u32>,
    ) -> Result<PropertyValue, AccessError> {
        let id = self.resolve(device_instance, object_type, instance)?;
        dispatch::read_property(&self.store, id, property, array_index)
    }

    /// Writes a value on behalf of a remote client. `priority` is recorded in
    /// the log only; commandable priority arrays are not modelled.
    #[allow(clippy::too_many_arguments)]
    pub fn set_property(
        &mut self,
        device_instance: u32,
        object_type: ObjectType,
        instance: u32,
        property: PropertyId,
        value: PropertyValue,
        array_index: Option<u32>,
        priority: u8,
    ) -> Result<(), AccessError> {
        let id = self.resolve(device_instance, object_type, instance)?;
        debug!("write {id} {property:?}[{array_index:?}] = {value:?} @ priority {priority}");
        let outcome = dispatch::write_property(
            &mut self.store,
            id,
            property,
            value,
            array_index,
            WriteAccess::Remote,
        )?;
        if outcome.network {
            info!("{id} {property:?} staged, changes pending");
        }
        if outcome.subscribable {
            self.value_updated(id, property);
        }
        Ok(())
    }

    /// Enabled properties of `object_id` matching a ReadPropertyMultiple
    /// selector (`All`, `Required` or `Optional`).
    pub fn selected_properties(
        &self,
        object_id: ObjectId,
        selector: PropertyId,
    ) -> Result<Vec<PropertyId>, AccessError> {
        let object = self.store.object(object_id).ok_or(AccessError::NotFound)?;
        let presence = match selector {
            PropertyId::All => None,
            PropertyId::Required => Some(Presence::Required),
            PropertyId::Optional => Some(Presence::Optional),
            _ => return Err(AccessError::Unsupported),
        };
        Ok(object
            .slots()
            .filter(|slot| slot.enabled && presence.map_or(true, |p| slot.spec.presence == p))
            .map(|slot| slot.spec.id)
            .collect())
    }

    pub fn value_updated(&mut self, object_id: ObjectId, property: PropertyId) {
        self.value_updates.push(ValueUpdate {
            object_id,
            property,
        });
    }

    pub fn take_value_updates(&mut self) -> Vec<ValueUpdate> {
        std::mem::take(&mut self.value_updates)
    }

    pub fn reinitialize_device(
        &mut self,
        state: ReinitializeState,
        password: Option<&str>,
    ) -> Result<ReinitOutcome, ReinitError> {
        self.lifecycle.authorize(password)?;
        match state {
            ReinitializeState::ActivateChanges => {
                self.activate_network_changes()?;
                Ok(ReinitOutcome::ChangesActivated)
            }
            ReinitializeState::Warmstart => {
                self.activate_network_changes()?;
                self.lifecycle.schedule_restart();
                info!("warm start scheduled");
                Ok(ReinitOutcome::RestartScheduled)
            }
            other => {
                debug!("reinitialize {other:?} not supported");
                Err(ReinitError::OptionalFunctionalityNotSupported)
            }
        }
    }

    pub fn set_communication_control(
        &mut self,
        state: CommunicationState,
        password: Option<&str>,
        duration: Option<Duration>,
        now: Instant,
    ) -> Result<(), ReinitError> {
        self.lifecycle.authorize(password)?;
        self.lifecycle.set_communication(state, duration, now);
        Ok(())
    }

    pub fn communication_state(&self) -> CommunicationState {
        self.lifecycle.communication_state()
    }

    pub fn expire_communication_control(&mut self, now: Instant) -> bool {
        self.lifecycle.expire_communication(now)
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn restart_pending(&self) -> bool {
        self.lifecycle.state() == LifecycleState::PendingReinitialization
    }

    /// Configuration the transport currently runs with.
    pub fn active_network_config(&self) -> Option<&NetworkPortConfig> {
        self.active_network.as_ref()
    }

    /// Newly activated configuration not yet handed to the transport.
    pub fn take_network_activation(&mut self) -> Option<NetworkPortConfig> {
        self.pending_activation.take()
    }

    pub fn changes_pending(&self) -> bool {
        self.network_port_id()
            .and_then(|id| dispatch::read_property(&self.store, id, PropertyId::ChangesPending, None).ok())
            == Some(PropertyValue::Boolean(true))
    }

    fn network_port_id(&self) -> Option<ObjectId> {
        self.store
            .object_ids()
            .find(|id| id.object_type() == ObjectType::NetworkPort)
    }

    fn own_property(&self, property: PropertyId) -> Result<PropertyValue, AccessError> {
        dispatch::read_property(&self.store, self.device_id(), property, None)
    }

    /// Validates the staged NetworkPort values and makes them active. An
    /// invalid staging leaves changes pending.
    fn activate_network_changes(&mut self) -> Result<(), ReinitError> {
        let Some(id) = self.network_port_id() else {
            return Ok(());
        };
        let config = match self.store.object(id) {
            Some(object) => NetworkPortConfig::from_object(object)?,
            None => return Ok(()),
        };
        put(
            &mut self.store,
            id,
            PropertyId::ChangesPending,
            PropertyValue::Boolean(false),
        )?;
        put(&mut self.store, id, PropertyId::MacAddress, config.mac_address())?;
        info!(
            "network changes activated: {}:{} mode {:?}",
            config.ip_address, config.udp_port, config.ip_mode
        );
        self.active_network = Some(config.clone());
        self.pending_activation = Some(config);
        Ok(())
    }
}

/// Internal write that ignores the enabled and writable flags.
fn put(
    store: &mut ObjectStore,
    id: ObjectId,
    property: PropertyId,
    value: PropertyValue,
) -> Result<(), StoreError> {
    dispatch::write_property(store, id, property, value, None, WriteAccess::Internal)
        .map(|_| ())
        .map_err(|err| StoreError::InvalidConfiguration(format!("{id} {property:?}: {err}")))
}
