use core::fmt;

use crate::types::RejectReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The encoded frame would exceed the writer's limit.
    FrameTooLarge,
    ValueOutOfRange,
    InvalidLength,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrameTooLarge => f.write_str("encoded frame exceeds limit"),
            Self::ValueOutOfRange => f.write_str("value out of range"),
            Self::InvalidLength => f.write_str("invalid length"),
        }
    }
}

impl std::error::Error for EncodeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    UnexpectedEof,
    InvalidTag,
    InvalidLength,
    InvalidValue,
    Unsupported,
    /// A required parameter was absent from the request.
    MissingParameter,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => f.write_str("unexpected end of input"),
            Self::InvalidTag => f.write_str("invalid tag"),
            Self::InvalidLength => f.write_str("invalid length"),
            Self::InvalidValue => f.write_str("invalid value"),
            Self::Unsupported => f.write_str("operation unsupported"),
            Self::MissingParameter => f.write_str("missing required parameter"),
        }
    }
}

impl DecodeError {
    /// Reject reason reported when a confirmed request fails to decode.
    pub const fn reject_reason(self) -> RejectReason {
        match self {
            Self::MissingParameter => RejectReason::MissingRequiredParameter,
            Self::InvalidTag => RejectReason::InvalidTag,
            Self::InvalidValue => RejectReason::ParameterOutOfRange,
            Self::Unsupported => RejectReason::InvalidParameterDataType,
            Self::UnexpectedEof | Self::InvalidLength => RejectReason::Other,
        }
    }
}

impl std::error::Error for DecodeError {}
