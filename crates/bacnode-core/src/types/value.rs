use crate::types::{BitString, Date, HostNPort, ObjectId, Time};

/// An owned, typed property value.
///
/// Array-valued properties (state text, DNS servers, object lists) are held as
/// [`Array`](Self::Array) of single-kind elements.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyValue {
    Null,
    Boolean(bool),
    Unsigned(u32),
    Signed(i32),
    Real(f32),
    Double(f64),
    OctetString(Vec<u8>),
    CharacterString(String),
    BitString(BitString),
    Enumerated(u32),
    Date(Date),
    Time(Time),
    ObjectId(ObjectId),
    HostNPort(HostNPort),
    Array(Vec<PropertyValue>),
}

/// The scalar kind a property (or each element of an array property) holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Unsigned,
    Signed,
    Real,
    Double,
    OctetString,
    CharacterString,
    BitString,
    Enumerated,
    Date,
    Time,
    ObjectId,
    HostNPort,
}

impl ValueKind {
    /// Zero value a freshly created property of this kind starts with.
    pub fn default_value(self) -> PropertyValue {
        match self {
            Self::Null => PropertyValue::Null,
            Self::Boolean => PropertyValue::Boolean(false),
            Self::Unsigned => PropertyValue::Unsigned(0),
            Self::Signed => PropertyValue::Signed(0),
            Self::Real => PropertyValue::Real(0.0),
            Self::Double => PropertyValue::Double(0.0),
            Self::OctetString => PropertyValue::OctetString(Vec::new()),
            Self::CharacterString => PropertyValue::CharacterString(String::new()),
            Self::BitString => PropertyValue::BitString(BitString::default()),
            Self::Enumerated => PropertyValue::Enumerated(0),
            Self::Date => PropertyValue::Date(Date::UNSPECIFIED),
            Self::Time => PropertyValue::Time(Time::default()),
            Self::ObjectId => PropertyValue::ObjectId(ObjectId::from_raw(0)),
            Self::HostNPort => PropertyValue::HostNPort(HostNPort::default()),
        }
    }
}

impl PropertyValue {
    /// Kind of a scalar value; `None` for arrays.
    pub fn kind(&self) -> Option<ValueKind> {
        Some(match self {
            Self::Null => ValueKind::Null,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Unsigned(_) => ValueKind::Unsigned,
            Self::Signed(_) => ValueKind::Signed,
            Self::Real(_) => ValueKind::Real,
            Self::Double(_) => ValueKind::Double,
            Self::OctetString(_) => ValueKind::OctetString,
            Self::CharacterString(_) => ValueKind::CharacterString,
            Self::BitString(_) => ValueKind::BitString,
            Self::Enumerated(_) => ValueKind::Enumerated,
            Self::Date(_) => ValueKind::Date,
            Self::Time(_) => ValueKind::Time,
            Self::ObjectId(_) => ValueKind::ObjectId,
            Self::HostNPort(_) => ValueKind::HostNPort,
            Self::Array(_) => return None,
        })
    }

    /// Converts a scalar to `kind`. Integer conversions must be exact, and an
    /// unsigned becomes a Real only when it fits the 24-bit mantissa. A Double
    /// narrows to Real with rounding as long as it stays finite. Returns `None`
    /// when the value cannot be represented as `kind`.
    pub fn coerce(self, kind: ValueKind) -> Option<PropertyValue> {
        if self.kind() == Some(kind) {
            return Some(self);
        }
        match (self, kind) {
            (Self::Unsigned(v), ValueKind::Real) => {
                let real = v as f32;
                (f64::from(real) == f64::from(v)).then_some(Self::Real(real))
            }
            (Self::Unsigned(v), ValueKind::Double) => Some(Self::Double(f64::from(v))),
            (Self::Unsigned(v), ValueKind::Signed) => i32::try_from(v).ok().map(Self::Signed),
            (Self::Unsigned(v), ValueKind::Enumerated) => Some(Self::Enumerated(v)),
            (Self::Signed(v), ValueKind::Unsigned) => u32::try_from(v).ok().map(Self::Unsigned),
            (Self::Enumerated(v), ValueKind::Unsigned) => Some(Self::Unsigned(v)),
            (Self::Real(v), ValueKind::Double) => Some(Self::Double(f64::from(v))),
            (Self::Double(v), ValueKind::Real) => {
                let narrowed = v as f32;
                (narrowed.is_finite() || !v.is_finite()).then_some(Self::Real(narrowed))
            }
            _ => None,
        }
    }

    /// Numeric view used for change-of-value comparisons.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Unsigned(v) | Self::Enumerated(v) => Some(f64::from(*v)),
            Self::Signed(v) => Some(f64::from(*v)),
            Self::Real(v) => Some(f64::from(*v)),
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PropertyValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }
}
