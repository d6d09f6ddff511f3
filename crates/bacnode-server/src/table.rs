//! Static property table keyed by object type.
//!
//! Every property an object can expose is listed here with its value kind,
//! whether it is an array, whether it starts enabled, and where its value
//! comes from. The dispatcher consults this table instead of branching on
//! object types.

use core::fmt;

use bacnode_core::types::{
    BitString, ObjectType, PropertyId, PropertyValue, Reliability, ValueKind,
};

use crate::object::BacnetObject;
use crate::store::ObjectStore;

/// Reads a property that is derived from other state rather than stored.
pub type ComputeFn = fn(&ObjectStore, &BacnetObject) -> PropertyValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Enabled as soon as the object is created.
    Required,
    /// Disabled until configuration enables it.
    Optional,
}

#[derive(Clone, Copy)]
pub enum Source {
    Stored,
    Computed(ComputeFn),
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stored => f.write_str("Stored"),
            Self::Computed(_) => f.write_str("Computed"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PropertySpec {
    pub id: PropertyId,
    /// Kind of the value, or of each element for array properties.
    pub kind: ValueKind,
    pub array: bool,
    pub presence: Presence,
    pub source: Source,
    /// Part of the NetworkPort configuration staged until activation.
    pub network: bool,
}

impl PropertySpec {
    const fn required(id: PropertyId, kind: ValueKind) -> Self {
        Self {
            id,
            kind,
            array: false,
            presence: Presence::Required,
            source: Source::Stored,
            network: false,
        }
    }

    const fn optional(id: PropertyId, kind: ValueKind) -> Self {
        Self {
            presence: Presence::Optional,
            ..Self::required(id, kind)
        }
    }

    const fn computed(id: PropertyId, kind: ValueKind, compute: ComputeFn) -> Self {
        Self {
            source: Source::Computed(compute),
            ..Self::required(id, kind)
        }
    }

    const fn array(self) -> Self {
        Self {
            array: true,
            ..self
        }
    }

    const fn network(self) -> Self {
        Self {
            network: true,
            ..self
        }
    }

    pub const fn is_computed(&self) -> bool {
        matches!(self.source, Source::Computed(_))
    }

    /// Value a freshly created object holds for this property.
    pub fn initial_value(&self) -> PropertyValue {
        if self.array {
            PropertyValue::Array(Vec::new())
        } else {
            self.kind.default_value()
        }
    }
}

/// Property specs for `object_type`, or `None` for types the server does not
/// host.
pub fn properties(object_type: ObjectType) -> Option<&'static [PropertySpec]> {
    Some(match object_type {
        ObjectType::AnalogInput | ObjectType::AnalogOutput | ObjectType::AnalogValue => ANALOG,
        ObjectType::LargeAnalogValue => LARGE_ANALOG_VALUE,
        ObjectType::BinaryInput | ObjectType::BinaryOutput => BINARY_IO,
        ObjectType::BinaryValue => BINARY_VALUE,
        ObjectType::MultiStateInput
        | ObjectType::MultiStateOutput
        | ObjectType::MultiStateValue => MULTI_STATE,
        ObjectType::CharacterStringValue => CHARACTER_STRING_VALUE,
        ObjectType::IntegerValue => INTEGER_VALUE,
        ObjectType::PositiveIntegerValue => POSITIVE_INTEGER_VALUE,
        ObjectType::Device => DEVICE,
        ObjectType::NetworkPort => NETWORK_PORT,
        ObjectType::Other(_) => return None,
    })
}

pub fn lookup(object_type: ObjectType, property: PropertyId) -> Option<&'static PropertySpec> {
    properties(object_type)?.iter().find(|spec| spec.id == property)
}

fn object_identifier(_: &ObjectStore, object: &BacnetObject) -> PropertyValue {
    PropertyValue::ObjectId(object.id())
}

fn object_type(_: &ObjectStore, object: &BacnetObject) -> PropertyValue {
    PropertyValue::Enumerated(u32::from(object.id().object_type().to_u16()))
}

/// Enabled properties other than the four every object must carry.
fn property_list(_: &ObjectStore, object: &BacnetObject) -> PropertyValue {
    PropertyValue::Array(
        object
            .enabled_properties()
            .filter(|id| {
                !matches!(
                    id,
                    PropertyId::ObjectIdentifier
                        | PropertyId::ObjectName
                        | PropertyId::ObjectType
                        | PropertyId::PropertyList
                )
            })
            .map(|id| PropertyValue::Enumerated(id.to_u32()))
            .collect(),
    )
}

/// The device first, then every other object in identifier order.
fn object_list(store: &ObjectStore, _: &BacnetObject) -> PropertyValue {
    let device = store.device_id();
    let mut ids = vec![PropertyValue::ObjectId(device)];
    ids.extend(
        store
            .object_ids()
            .filter(|id| *id != device)
            .map(PropertyValue::ObjectId),
    );
    PropertyValue::Array(ids)
}

/// in-alarm, fault, overridden, out-of-service.
fn status_flags(_: &ObjectStore, object: &BacnetObject) -> PropertyValue {
    let fault = object
        .slot(PropertyId::Reliability)
        .filter(|slot| slot.enabled)
        .is_some_and(|slot| {
            slot.value != PropertyValue::Enumerated(Reliability::NoFaultDetected.to_u32())
        });
    let out_of_service = object
        .slot(PropertyId::OutOfService)
        .is_some_and(|slot| slot.value == PropertyValue::Boolean(true));
    PropertyValue::BitString(BitString::from_bits(&[false, fault, false, out_of_service]))
}

fn number_of_states(_: &ObjectStore, object: &BacnetObject) -> PropertyValue {
    let count = object
        .slot(PropertyId::StateText)
        .and_then(|slot| slot.value.as_array())
        .map_or(0, <[PropertyValue]>::len);
    PropertyValue::Unsigned(u32::try_from(count).unwrap_or(u32::MAX))
}

const OBJECT_IDENTIFIER: PropertySpec =
    PropertySpec::computed(PropertyId::ObjectIdentifier, ValueKind::ObjectId, object_identifier);
const OBJECT_NAME: PropertySpec =
    PropertySpec::required(PropertyId::ObjectName, ValueKind::CharacterString);
const OBJECT_TYPE: PropertySpec =
    PropertySpec::computed(PropertyId::ObjectType, ValueKind::Enumerated, object_type);
const PROPERTY_LIST: PropertySpec =
    PropertySpec::computed(PropertyId::PropertyList, ValueKind::Enumerated, property_list).array();
const DESCRIPTION: PropertySpec =
    PropertySpec::optional(PropertyId::Description, ValueKind::CharacterString);
const STATUS_FLAGS: PropertySpec =
    PropertySpec::computed(PropertyId::StatusFlags, ValueKind::BitString, status_flags);
const EVENT_STATE: PropertySpec =
    PropertySpec::required(PropertyId::EventState, ValueKind::Enumerated);
const OUT_OF_SERVICE: PropertySpec =
    PropertySpec::required(PropertyId::OutOfService, ValueKind::Boolean);
const RELIABILITY: PropertySpec =
    PropertySpec::optional(PropertyId::Reliability, ValueKind::Enumerated);
const UNITS: PropertySpec = PropertySpec::required(PropertyId::Units, ValueKind::Enumerated);

static ANALOG: &[PropertySpec] = &[
    OBJECT_IDENTIFIER,
    OBJECT_NAME,
    OBJECT_TYPE,
    PROPERTY_LIST,
    DESCRIPTION,
    PropertySpec::required(PropertyId::PresentValue, ValueKind::Real),
    STATUS_FLAGS,
    EVENT_STATE,
    OUT_OF_SERVICE,
    UNITS,
    RELIABILITY,
    PropertySpec::optional(PropertyId::CovIncrement, ValueKind::Real),
];

static LARGE_ANALOG_VALUE: &[PropertySpec] = &[
    OBJECT_IDENTIFIER,
    OBJECT_NAME,
    OBJECT_TYPE,
    PROPERTY_LIST,
    DESCRIPTION,
    PropertySpec::required(PropertyId::PresentValue, ValueKind::Double),
    STATUS_FLAGS,
    EVENT_STATE,
    OUT_OF_SERVICE,
    UNITS,
    RELIABILITY,
    PropertySpec::optional(PropertyId::CovIncrement, ValueKind::Double),
];

static BINARY_IO: &[PropertySpec] = &[
    OBJECT_IDENTIFIER,
    OBJECT_NAME,
    OBJECT_TYPE,
    PROPERTY_LIST,
    DESCRIPTION,
    PropertySpec::required(PropertyId::PresentValue, ValueKind::Enumerated),
    STATUS_FLAGS,
    EVENT_STATE,
    OUT_OF_SERVICE,
    PropertySpec::required(PropertyId::Polarity, ValueKind::Enumerated),
    PropertySpec::optional(PropertyId::ActiveText, ValueKind::CharacterString),
    PropertySpec::optional(PropertyId::InactiveText, ValueKind::CharacterString),
    RELIABILITY,
];

static BINARY_VALUE: &[PropertySpec] = &[
    OBJECT_IDENTIFIER,
    OBJECT_NAME,
    OBJECT_TYPE,
    PROPERTY_LIST,
    DESCRIPTION,
    PropertySpec::required(PropertyId::PresentValue, ValueKind::Enumerated),
    STATUS_FLAGS,
    EVENT_STATE,
    OUT_OF_SERVICE,
    PropertySpec::optional(PropertyId::ActiveText, ValueKind::CharacterString),
    PropertySpec::optional(PropertyId::InactiveText, ValueKind::CharacterString),
    RELIABILITY,
];

static MULTI_STATE: &[PropertySpec] = &[
    OBJECT_IDENTIFIER,
    OBJECT_NAME,
    OBJECT_TYPE,
    PROPERTY_LIST,
    DESCRIPTION,
    PropertySpec::required(PropertyId::PresentValue, ValueKind::Unsigned),
    STATUS_FLAGS,
    EVENT_STATE,
    OUT_OF_SERVICE,
    PropertySpec::computed(PropertyId::NumberOfStates, ValueKind::Unsigned, number_of_states),
    PropertySpec::optional(PropertyId::StateText, ValueKind::CharacterString).array(),
    RELIABILITY,
];

static CHARACTER_STRING_VALUE: &[PropertySpec] = &[
    OBJECT_IDENTIFIER,
    OBJECT_NAME,
    OBJECT_TYPE,
    PROPERTY_LIST,
    DESCRIPTION,
    PropertySpec::required(PropertyId::PresentValue, ValueKind::CharacterString),
    STATUS_FLAGS,
    PropertySpec::optional(PropertyId::EventState, ValueKind::Enumerated),
    PropertySpec::optional(PropertyId::OutOfService, ValueKind::Boolean),
    RELIABILITY,
];

static INTEGER_VALUE: &[PropertySpec] = &[
    OBJECT_IDENTIFIER,
    OBJECT_NAME,
    OBJECT_TYPE,
    PROPERTY_LIST,
    DESCRIPTION,
    PropertySpec::required(PropertyId::PresentValue, ValueKind::Signed),
    STATUS_FLAGS,
    UNITS,
    PropertySpec::optional(PropertyId::EventState, ValueKind::Enumerated),
    PropertySpec::optional(PropertyId::OutOfService, ValueKind::Boolean),
    RELIABILITY,
    PropertySpec::optional(PropertyId::CovIncrement, ValueKind::Unsigned),
];

static POSITIVE_INTEGER_VALUE: &[PropertySpec] = &[
    OBJECT_IDENTIFIER,
    OBJECT_NAME,
    OBJECT_TYPE,
    PROPERTY_LIST,
    DESCRIPTION,
    PropertySpec::required(PropertyId::PresentValue, ValueKind::Unsigned),
    STATUS_FLAGS,
    UNITS,
    PropertySpec::optional(PropertyId::EventState, ValueKind::Enumerated),
    PropertySpec::optional(PropertyId::OutOfService, ValueKind::Boolean),
    RELIABILITY,
    PropertySpec::optional(PropertyId::CovIncrement, ValueKind::Unsigned),
];

static DEVICE: &[PropertySpec] = &[
    OBJECT_IDENTIFIER,
    OBJECT_NAME,
    OBJECT_TYPE,
    PROPERTY_LIST,
    DESCRIPTION,
    PropertySpec::required(PropertyId::SystemStatus, ValueKind::Enumerated),
    PropertySpec::required(PropertyId::VendorName, ValueKind::CharacterString),
    PropertySpec::required(PropertyId::VendorIdentifier, ValueKind::Unsigned),
    PropertySpec::required(PropertyId::ModelName, ValueKind::CharacterString),
    PropertySpec::required(PropertyId::FirmwareRevision, ValueKind::CharacterString),
    PropertySpec::required(
        PropertyId::ApplicationSoftwareVersion,
        ValueKind::CharacterString,
    ),
    PropertySpec::required(PropertyId::ProtocolVersion, ValueKind::Unsigned),
    PropertySpec::required(PropertyId::ProtocolRevision, ValueKind::Unsigned),
    PropertySpec::computed(PropertyId::ObjectList, ValueKind::ObjectId, object_list).array(),
    PropertySpec::required(PropertyId::MaxApduLengthAccepted, ValueKind::Unsigned),
    PropertySpec::required(PropertyId::SegmentationSupported, ValueKind::Enumerated),
    PropertySpec::required(PropertyId::ApduTimeout, ValueKind::Unsigned),
    PropertySpec::required(PropertyId::NumberOfApduRetries, ValueKind::Unsigned),
    PropertySpec::required(PropertyId::DatabaseRevision, ValueKind::Unsigned),
    PropertySpec::optional(PropertyId::LocalDate, ValueKind::Date),
    PropertySpec::optional(PropertyId::LocalTime, ValueKind::Time),
];

static NETWORK_PORT: &[PropertySpec] = &[
    OBJECT_IDENTIFIER,
    OBJECT_NAME,
    OBJECT_TYPE,
    PROPERTY_LIST,
    DESCRIPTION,
    STATUS_FLAGS,
    PropertySpec::required(PropertyId::Reliability, ValueKind::Enumerated),
    OUT_OF_SERVICE,
    PropertySpec::required(PropertyId::NetworkType, ValueKind::Enumerated),
    PropertySpec::required(PropertyId::ProtocolLevel, ValueKind::Enumerated),
    PropertySpec::required(PropertyId::ChangesPending, ValueKind::Boolean),
    PropertySpec::required(PropertyId::MacAddress, ValueKind::OctetString),
    PropertySpec::required(PropertyId::MaxApduLengthAccepted, ValueKind::Unsigned),
    PropertySpec::required(PropertyId::BacnetIpMode, ValueKind::Enumerated).network(),
    PropertySpec::required(PropertyId::IpAddress, ValueKind::OctetString).network(),
    PropertySpec::required(PropertyId::BacnetIpUdpPort, ValueKind::Unsigned).network(),
    PropertySpec::required(PropertyId::IpSubnetMask, ValueKind::OctetString).network(),
    PropertySpec::required(PropertyId::IpDefaultGateway, ValueKind::OctetString).network(),
    PropertySpec::required(PropertyId::IpDnsServer, ValueKind::OctetString)
        .array()
        .network(),
    PropertySpec::optional(PropertyId::FdBbmdAddress, ValueKind::HostNPort).network(),
    PropertySpec::optional(PropertyId::FdSubscriptionLifetime, ValueKind::Unsigned).network(),
];
