use bacnode_core::types::{ErrorClass, ErrorCode, ObjectId, PropertyId};
use bacnode_core::EncodeError;
use bacnode_datalink::TransportError;
use thiserror::Error;

/// Failures while building or reconfiguring the object store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("object {0} already exists")]
    AlreadyExists(ObjectId),
    #[error("unknown device, object or property")]
    NotFound,
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl StoreError {
    pub const fn error_class_code(&self) -> (ErrorClass, ErrorCode) {
        match self {
            Self::AlreadyExists(_) => (ErrorClass::Object, ErrorCode::ServiceRequestDenied),
            Self::NotFound => (ErrorClass::Object, ErrorCode::UnknownObject),
            Self::InvalidConfiguration(_) => {
                (ErrorClass::Device, ErrorCode::InvalidConfigurationData)
            }
        }
    }
}

/// Failures of a single property read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("unknown device or object")]
    NotFound,
    #[error("property is not supported by this object")]
    Unsupported,
    #[error("property is not writable")]
    NotWritable,
    #[error("value kind does not match the property")]
    TypeMismatch,
    #[error("array index out of range")]
    IndexOutOfRange,
    #[error("value out of range for the property")]
    ValueOutOfRange,
}

impl AccessError {
    pub const fn error_class_code(self) -> (ErrorClass, ErrorCode) {
        match self {
            Self::NotFound => (ErrorClass::Object, ErrorCode::UnknownObject),
            Self::Unsupported => (ErrorClass::Property, ErrorCode::UnknownProperty),
            Self::NotWritable => (ErrorClass::Property, ErrorCode::WriteAccessDenied),
            Self::TypeMismatch => (ErrorClass::Property, ErrorCode::InvalidDataType),
            Self::IndexOutOfRange => (ErrorClass::Property, ErrorCode::InvalidArrayIndex),
            Self::ValueOutOfRange => (ErrorClass::Property, ErrorCode::ValueOutOfRange),
        }
    }
}

/// Failures of ReinitializeDevice and DeviceCommunicationControl.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReinitError {
    #[error("password failure")]
    PasswordFailure,
    #[error("requested state is not supported")]
    OptionalFunctionalityNotSupported,
    #[error("staged network configuration is invalid: {0}")]
    InvalidConfiguration(String),
}

impl ReinitError {
    pub const fn error_class_code(&self) -> (ErrorClass, ErrorCode) {
        match self {
            Self::PasswordFailure => (ErrorClass::Security, ErrorCode::PasswordFailure),
            Self::OptionalFunctionalityNotSupported => (
                ErrorClass::Services,
                ErrorCode::OptionalFunctionalityNotSupported,
            ),
            Self::InvalidConfiguration(_) => {
                (ErrorClass::Device, ErrorCode::InvalidConfigurationData)
            }
        }
    }
}

impl From<StoreError> for ReinitError {
    fn from(err: StoreError) -> Self {
        Self::InvalidConfiguration(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("access error: {0}")]
    Access(#[from] AccessError),
    #[error("reinitialization error: {0}")]
    Reinit(#[from] ReinitError),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    #[error("cannot configure {property:?} of {object}: {source}")]
    Configure {
        object: ObjectId,
        property: PropertyId,
        #[source]
        source: AccessError,
    },
}

impl ServerError {
    pub fn error_class_code(&self) -> (ErrorClass, ErrorCode) {
        match self {
            Self::Store(err) => err.error_class_code(),
            Self::Access(err) | Self::Configure { source: err, .. } => err.error_class_code(),
            Self::Reinit(err) => err.error_class_code(),
            Self::Transport(_) => (ErrorClass::Communication, ErrorCode::Other),
            Self::Encode(_) => (ErrorClass::Resources, ErrorCode::Other),
        }
    }
}
