/// BACnet object types hosted by a bacnode device.
///
/// Standard types the server does not model are carried as
/// [`Other`](Self::Other) so they survive a decode/encode cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectType {
    AnalogInput,
    AnalogOutput,
    AnalogValue,
    BinaryInput,
    BinaryOutput,
    BinaryValue,
    Device,
    MultiStateInput,
    MultiStateOutput,
    MultiStateValue,
    CharacterStringValue,
    IntegerValue,
    LargeAnalogValue,
    PositiveIntegerValue,
    NetworkPort,
    Other(u16),
}

impl ObjectType {
    /// Converts this object type to its numeric BACnet identifier.
    pub const fn to_u16(self) -> u16 {
        match self {
            Self::AnalogInput => 0,
            Self::AnalogOutput => 1,
            Self::AnalogValue => 2,
            Self::BinaryInput => 3,
            Self::BinaryOutput => 4,
            Self::BinaryValue => 5,
            Self::Device => 8,
            Self::MultiStateInput => 13,
            Self::MultiStateOutput => 14,
            Self::MultiStateValue => 19,
            Self::CharacterStringValue => 40,
            Self::IntegerValue => 45,
            Self::LargeAnalogValue => 46,
            Self::PositiveIntegerValue => 48,
            Self::NetworkPort => 56,
            Self::Other(v) => v,
        }
    }

    pub const fn from_u16(value: u16) -> Self {
        match value {
            0 => Self::AnalogInput,
            1 => Self::AnalogOutput,
            2 => Self::AnalogValue,
            3 => Self::BinaryInput,
            4 => Self::BinaryOutput,
            5 => Self::BinaryValue,
            8 => Self::Device,
            13 => Self::MultiStateInput,
            14 => Self::MultiStateOutput,
            19 => Self::MultiStateValue,
            40 => Self::CharacterStringValue,
            45 => Self::IntegerValue,
            46 => Self::LargeAnalogValue,
            48 => Self::PositiveIntegerValue,
            56 => Self::NetworkPort,
            v => Self::Other(v),
        }
    }
}
