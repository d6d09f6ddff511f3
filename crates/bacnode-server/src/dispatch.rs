//! Property reads and writes resolved through the static table.

use std::ops::RangeInclusive;

use bacnode_core::types::{ObjectId, ObjectType, PropertyId, PropertyValue, ValueKind};

use crate::error::AccessError;
use crate::object::BacnetObject;
use crate::store::ObjectStore;
use crate::table::{PropertySpec, Source};

/// Which checks a write goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteAccess {
    /// A network request: the property must be enabled and writable, and a
    /// network-config write marks the port's changes pending.
    Remote,
    /// Startup configuration and scheduled updates: bypasses the writable
    /// flag only.
    Initial,
    /// Internal bookkeeping: bypasses the enabled and writable flags.
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WriteOutcome {
    pub subscribable: bool,
    pub network: bool,
}

pub(crate) fn read_property(
    store: &ObjectStore,
    id: ObjectId,
    property: PropertyId,
    array_index: Option<u32>,
) -> Result<PropertyValue, AccessError> {
    let object = store.object(id).ok_or(AccessError::NotFound)?;
    let slot = object
        .slot(property)
        .filter(|slot| slot.enabled)
        .ok_or(AccessError::Unsupported)?;
    let spec = slot.spec;
    let value = match spec.source {
        Source::Stored if array_index.is_none() || !spec.array => slot.value.clone(),
        Source::Stored => return select_element(spec, slot.value.as_array(), array_index),
        Source::Computed(compute) => compute(store, object),
    };
    match array_index {
        None => Ok(value),
        Some(_) => select_element(spec, value.as_array(), array_index),
    }
}

/// Index 0 is the element count; `n > 0` is the 1-based element.
fn select_element(
    spec: &PropertySpec,
    items: Option<&[PropertyValue]>,
    array_index: Option<u32>,
) -> Result<PropertyValue, AccessError> {
    if !spec.array {
        return Err(AccessError::Unsupported);
    }
    let items = items.unwrap_or_default();
    match array_index {
        None => Ok(PropertyValue::Array(items.to_vec())),
        Some(0) => Ok(PropertyValue::Unsigned(
            u32::try_from(items.len()).map_err(|_| AccessError::IndexOutOfRange)?,
        )),
        Some(n) => usize::try_from(n - 1)
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .ok_or(AccessError::IndexOutOfRange),
    }
}

pub(crate) fn write_property(
    store: &mut ObjectStore,
    id: ObjectId,
    property: PropertyId,
    value: PropertyValue,
    array_index: Option<u32>,
    access: WriteAccess,
) -> Result<WriteOutcome, AccessError> {
    let object = store.object_mut(id).ok_or(AccessError::NotFound)?;
    let range = match property {
        PropertyId::PresentValue => present_value_range(object),
        _ => None,
    };
    let slot = object
        .slot_mut(property)
        .filter(|slot| slot.enabled || access == WriteAccess::Internal)
        .ok_or(AccessError::Unsupported)?;
    let spec = slot.spec;
    if spec.is_computed() || (access == WriteAccess::Remote && !slot.writable) {
        return Err(AccessError::NotWritable);
    }
    let value = coerce_for(spec, &slot.value, value, array_index)?;
    if let (Some(range), PropertyValue::Enumerated(v) | PropertyValue::Unsigned(v)) =
        (&range, &value)
    {
        if !range.contains(v) {
            return Err(AccessError::ValueOutOfRange);
        }
    }
    slot.value = value;
    let outcome = WriteOutcome {
        subscribable: slot.subscribable,
        network: spec.network,
    };
    if spec.network && access == WriteAccess::Remote {
        if let Some(pending) = object.slot_mut(PropertyId::ChangesPending) {
            pending.value = PropertyValue::Boolean(true);
        }
    }
    Ok(outcome)
}

/// Binary objects take 0 or 1. Multi-state objects take 1 up to the number
/// of state texts, or any positive value while no state text is set.
fn present_value_range(object: &BacnetObject) -> Option<RangeInclusive<u32>> {
    match object.id().object_type() {
        ObjectType::BinaryInput | ObjectType::BinaryOutput | ObjectType::BinaryValue => {
            Some(0..=1)
        }
        ObjectType::MultiStateInput | ObjectType::MultiStateOutput | ObjectType::MultiStateValue => {
            let states = object
                .slot(PropertyId::StateText)
                .filter(|slot| slot.enabled)
                .and_then(|slot| slot.value.as_array())
                .map_or(0, <[PropertyValue]>::len);
            let max = match u32::try_from(states) {
                Ok(0) | Err(_) => u32::MAX,
                Ok(n) => n,
            };
            Some(1..=max)
        }
        _ => None,
    }
}

fn coerce_for(
    spec: &PropertySpec,
    current: &PropertyValue,
    value: PropertyValue,
    array_index: Option<u32>,
) -> Result<PropertyValue, AccessError> {
    match (spec.array, array_index) {
        (false, None) => coerce_scalar(value, spec.kind),
        (false, Some(_)) | (true, Some(0)) => Err(AccessError::Unsupported),
        (true, None) => match value {
            PropertyValue::Array(items) => items
                .into_iter()
                .map(|item| coerce_scalar(item, spec.kind))
                .collect::<Result<Vec<_>, _>>()
                .map(PropertyValue::Array),
            scalar => Ok(PropertyValue::Array(vec![coerce_scalar(scalar, spec.kind)?])),
        },
        (true, Some(n)) => {
            let mut items = current.as_array().map(<[_]>::to_vec).unwrap_or_default();
            let element = usize::try_from(n - 1)
                .ok()
                .and_then(|i| items.get_mut(i))
                .ok_or(AccessError::IndexOutOfRange)?;
            *element = coerce_scalar(value, spec.kind)?;
            Ok(PropertyValue::Array(items))
        }
    }
}

fn coerce_scalar(value: PropertyValue, kind: ValueKind) -> Result<PropertyValue, AccessError> {
    value.coerce(kind).ok_or(AccessError::TypeMismatch)
}
