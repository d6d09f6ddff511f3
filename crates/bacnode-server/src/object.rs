use bacnode_core::types::{ObjectId, PropertyId, PropertyValue};

use crate::table::{self, Presence, PropertySpec};

/// One property of a hosted object: its table entry, stored value and flags.
#[derive(Debug, Clone)]
pub struct PropertySlot {
    pub spec: &'static PropertySpec,
    /// Stored value. Unused for computed properties.
    pub value: PropertyValue,
    pub enabled: bool,
    pub writable: bool,
    pub subscribable: bool,
}

impl PropertySlot {
    fn new(spec: &'static PropertySpec) -> Self {
        Self {
            spec,
            value: spec.initial_value(),
            enabled: spec.presence == Presence::Required,
            writable: false,
            subscribable: false,
        }
    }
}

/// A BACnet object hosted by the device. Its slots follow the order of the
/// type's table entry.
#[derive(Debug, Clone)]
pub struct BacnetObject {
    id: ObjectId,
    slots: Vec<PropertySlot>,
}

impl BacnetObject {
    /// Creates an object with every property of its type's table, or `None`
    /// for types the server does not host.
    pub fn new(id: ObjectId) -> Option<Self> {
        let specs = table::properties(id.object_type())?;
        Some(Self {
            id,
            slots: specs.iter().map(PropertySlot::new).collect(),
        })
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn slot(&self, property: PropertyId) -> Option<&PropertySlot> {
        self.slots.iter().find(|slot| slot.spec.id == property)
    }

    pub fn slot_mut(&mut self, property: PropertyId) -> Option<&mut PropertySlot> {
        self.slots.iter_mut().find(|slot| slot.spec.id == property)
    }

    pub fn slots(&self) -> impl Iterator<Item = &PropertySlot> {
        self.slots.iter()
    }

    pub fn enabled_properties(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.slots
            .iter()
            .filter(|slot| slot.enabled)
            .map(|slot| slot.spec.id)
    }

    pub fn name(&self) -> Option<&str> {
        match &self.slot(PropertyId::ObjectName)?.value {
            PropertyValue::CharacterString(name) => Some(name),
            _ => None,
        }
    }
}
