pub mod bit_string;
pub mod date_time;
pub mod enums;
pub mod host_n_port;
pub mod object_id;
pub mod object_type;
pub mod property_id;
pub mod value;

pub use bit_string::BitString;
pub use date_time::{Date, Time};
pub use enums::{
    AbortReason, BipMode, CommunicationState, ErrorClass, ErrorCode, NetworkType, ProtocolLevel,
    ReinitializeState, RejectReason, Reliability, Segmentation, SystemStatus,
};
pub use host_n_port::{HostAddress, HostNPort};
pub use object_id::ObjectId;
pub use object_type::ObjectType;
pub use property_id::PropertyId;
pub use value::{PropertyValue, ValueKind};
