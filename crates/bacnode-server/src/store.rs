use std::collections::BTreeMap;

use bacnode_core::types::object_id::WILDCARD_INSTANCE;
use bacnode_core::types::{
    NetworkType, ObjectId, ObjectType, PropertyId, PropertyValue, ProtocolLevel,
};
use log::{debug, info};

use crate::error::StoreError;
use crate::object::{BacnetObject, PropertySlot};

/// Highest assignable instance number; 4194303 is reserved as the wildcard.
pub const MAX_INSTANCE: u32 = WILDCARD_INSTANCE - 1;

/// In-memory registry of the objects hosted by one device.
///
/// Objects are populated at startup and never removed. Every mutation names
/// the owning device instance and is rejected when it does not match.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    device_id: ObjectId,
    objects: BTreeMap<ObjectId, BacnetObject>,
}

impl ObjectStore {
    /// Creates a store holding only the Device object itself.
    pub fn new(device_instance: u32) -> Result<Self, StoreError> {
        let device_id = ObjectId::new(ObjectType::Device, checked_instance(device_instance)?);
        let mut store = Self {
            device_id,
            objects: BTreeMap::new(),
        };
        store.insert(device_id)?;
        Ok(store)
    }

    pub fn device_id(&self) -> ObjectId {
        self.device_id
    }

    pub fn device_instance(&self) -> u32 {
        self.device_id.instance()
    }

    pub fn object(&self, id: ObjectId) -> Option<&BacnetObject> {
        self.objects.get(&id)
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> Option<&mut BacnetObject> {
        self.objects.get_mut(&id)
    }

    pub fn object_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.keys().copied()
    }

    pub fn objects(&self) -> impl Iterator<Item = &BacnetObject> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Adds an object of a hosted type. NetworkPort objects go through
    /// [`add_network_port_object`](Self::add_network_port_object).
    pub fn add_object(
        &mut self,
        device_instance: u32,
        object_type: ObjectType,
        instance: u32,
    ) -> Result<(), StoreError> {
        self.check_device(device_instance)?;
        match object_type {
            ObjectType::NetworkPort => Err(StoreError::InvalidConfiguration(
                "network port objects need add_network_port_object".into(),
            )),
            ObjectType::Device => Err(StoreError::InvalidConfiguration(
                "a device hosts exactly one device object".into(),
            )),
            _ => {
                let id = ObjectId::new(object_type, checked_instance(instance)?);
                self.insert(id)?;
                info!("added object {id}");
                Ok(())
            }
        }
    }

    pub fn add_network_port_object(
        &mut self,
        device_instance: u32,
        instance: u32,
        network_type: NetworkType,
        protocol_level: ProtocolLevel,
    ) -> Result<(), StoreError> {
        self.check_device(device_instance)?;
        let id = ObjectId::new(ObjectType::NetworkPort, checked_instance(instance)?);
        self.insert(id)?;
        let object = self.objects.get_mut(&id).ok_or(StoreError::NotFound)?;
        for (property, value) in [
            (
                PropertyId::NetworkType,
                PropertyValue::Enumerated(network_type.to_u32()),
            ),
            (
                PropertyId::ProtocolLevel,
                PropertyValue::Enumerated(protocol_level.to_u32()),
            ),
        ] {
            if let Some(slot) = object.slot_mut(property) {
                slot.value = value;
            }
        }
        info!("added network port {id} ({network_type:?})");
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
        self.update_slot(device_instance, object_type, instance, property, |slot| {
            slot.enabled = enabled;
        })
    }

    pub fn set_property_writable(
        &mut self,
        device_instance: u32,
        object_type: ObjectType,
        instance: u32,
        property: PropertyId,
        writable: bool,
    ) -> Result<(), StoreError> {
        self.update_slot(device_instance, object_type, instance, property, |slot| {
            slot.writable = writable;
        })
    }

    pub fn set_property_subscribable(
        &mut self,
        device_instance: u32,
        object_type: ObjectType,
        instance: u32,
        property: PropertyId,
        subscribable: bool,
    ) -> Result<(), StoreError> {
        self.update_slot(device_instance, object_type, instance, property, |slot| {
            slot.subscribable = subscribable;
        })
    }

    fn update_slot(
        &mut self,
        device_instance: u32,
        object_type: ObjectType,
        instance: u32,
        property: PropertyId,
        update: impl FnOnce(&mut PropertySlot),
    ) -> Result<(), StoreError> {
        self.check_device(device_instance)?;
        let id = ObjectId::new(object_type, instance);
        let slot = self
            .objects
            .get_mut(&id)
            .and_then(|object| object.slot_mut(property))
            .ok_or(StoreError::NotFound)?;
        update(&mut *slot);
        debug!(
            "{id} {property:?}: enabled={} writable={} subscribable={}",
            slot.enabled, slot.writable, slot.subscribable
        );
        Ok(())
    }

    fn check_device(&self, device_instance: u32) -> Result<(), StoreError> {
        if device_instance == self.device_instance() {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    fn insert(&mut self, id: ObjectId) -> Result<(), StoreError> {
        if self.objects.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        let mut object = BacnetObject::new(id).ok_or_else(|| {
            StoreError::InvalidConfiguration(format!("object type {:?} is not hosted", id.object_type()))
        })?;
        if let Some(slot) = object.slot_mut(PropertyId::ObjectName) {
            slot.value = PropertyValue::CharacterString(format!(
                "{:?} {}",
                id.object_type(),
                id.instance()
            ));
        }
        self.objects.insert(id, object);
        Ok(())
    }
}

fn checked_instance(instance: u32) -> Result<u32, StoreError> {
    if instance > MAX_INSTANCE {
        return Err(StoreError::InvalidConfiguration(format!(
            "instance {instance} exceeds {MAX_INSTANCE}"
        )));
    }
    Ok(instance)
}
