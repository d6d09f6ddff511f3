use core::fmt;

use crate::types::ObjectType;

/// Largest valid object instance number (22 bits).
pub const MAX_INSTANCE: u32 = 0x3F_FFFF;

/// Instance number that addresses "this device" in a Device object identifier.
pub const WILDCARD_INSTANCE: u32 = MAX_INSTANCE;

/// A packed BACnet object identifier: 10-bit type, 22-bit instance.
///
/// Ordering follows the packed representation, so identifiers sort by type and
/// then by instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectId(u32);

impl ObjectId {
    pub const fn new(object_type: ObjectType, instance: u32) -> Self {
        Self((((object_type.to_u16() as u32) & 0x03FF) << 22) | (instance & MAX_INSTANCE))
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn object_type(self) -> ObjectType {
        ObjectType::from_u16(((self.0 >> 22) & 0x03FF) as u16)
    }

    pub const fn instance(self) -> u32 {
        self.0 & MAX_INSTANCE
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{}", self.object_type(), self.instance())
    }
}
