/// BACnet property identifiers used by the bacnode object model.
///
/// `All`, `Required` and `Optional` are the ReadPropertyMultiple selectors;
/// unrecognised identifiers use [`Other`](Self::Other).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyId {
    ActiveText,
    All,
    ApduTimeout,
    ApplicationSoftwareVersion,
    BacnetIpMode,
    BacnetIpUdpPort,
    ChangesPending,
    CovIncrement,
    DatabaseRevision,
    Description,
    EventState,
    FdBbmdAddress,
    FdSubscriptionLifetime,
    FirmwareRevision,
    InactiveText,
    IpAddress,
    IpDefaultGateway,
    IpDnsServer,
    IpSubnetMask,
    LocalDate,
    LocalTime,
    MacAddress,
    MaxApduLengthAccepted,
    ModelName,
    NetworkType,
    NumberOfApduRetries,
    NumberOfStates,
    ObjectIdentifier,
    ObjectList,
    ObjectName,
    ObjectType,
    Optional,
    OutOfService,
    Polarity,
    PresentValue,
    PropertyList,
    ProtocolLevel,
    ProtocolRevision,
    ProtocolVersion,
    Reliability,
    Required,
    SegmentationSupported,
    StateText,
    StatusFlags,
    SystemStatus,
    Units,
    VendorIdentifier,
    VendorName,
    Other(u32),
}

impl PropertyId {
    pub const fn to_u32(self) -> u32 {
        match self {
            Self::ActiveText => 4,
            Self::All => 8,
            Self::ApduTimeout => 11,
            Self::ApplicationSoftwareVersion => 12,
            Self::CovIncrement => 22,
            Self::Description => 28,
            Self::EventState => 36,
            Self::FirmwareRevision => 44,
            Self::InactiveText => 46,
            Self::LocalDate => 56,
            Self::LocalTime => 57,
            Self::MaxApduLengthAccepted => 62,
            Self::ModelName => 70,
            Self::NumberOfApduRetries => 73,
            Self::NumberOfStates => 74,
            Self::ObjectIdentifier => 75,
            Self::ObjectList => 76,
            Self::ObjectName => 77,
            Self::ObjectType => 79,
            Self::Optional => 80,
            Self::OutOfService => 81,
            Self::Polarity => 84,
            Self::PresentValue => 85,
            Self::ProtocolVersion => 98,
            Self::Reliability => 103,
            Self::Required => 105,
            Self::SegmentationSupported => 107,
            Self::StateText => 110,
            Self::StatusFlags => 111,
            Self::SystemStatus => 112,
            Self::Units => 117,
            Self::VendorIdentifier => 120,
            Self::VendorName => 121,
            Self::ProtocolRevision => 139,
            Self::DatabaseRevision => 155,
            Self::PropertyList => 371,
            Self::IpAddress => 400,
            Self::IpDefaultGateway => 401,
            Self::IpDnsServer => 406,
            Self::BacnetIpMode => 408,
            Self::IpSubnetMask => 411,
            Self::BacnetIpUdpPort => 412,
            Self::ChangesPending => 416,
            Self::FdBbmdAddress => 418,
            Self::FdSubscriptionLifetime => 419,
            Self::MacAddress => 423,
            Self::NetworkType => 427,
            Self::ProtocolLevel => 482,
            Self::Other(v) => v,
        }
    }

    pub const fn from_u32(value: u32) -> Self {
        match value {
            4 => Self::ActiveText,
            8 => Self::All,
            11 => Self::ApduTimeout,
            12 => Self::ApplicationSoftwareVersion,
            22 => Self::CovIncrement,
            28 => Self::Description,
            36 => Self::EventState,
            44 => Self::FirmwareRevision,
            46 => Self::InactiveText,
            56 => Self::LocalDate,
            57 => Self::LocalTime,
            62 => Self::MaxApduLengthAccepted,
            70 => Self::ModelName,
            73 => Self::NumberOfApduRetries,
            74 => Self::NumberOfStates,
            75 => Self::ObjectIdentifier,
            76 => Self::ObjectList,
            77 => Self::ObjectName,
            79 => Self::ObjectType,
            80 => Self::Optional,
            81 => Self::OutOfService,
            84 => Self::Polarity,
            85 => Self::PresentValue,
            98 => Self::ProtocolVersion,
            103 => Self::Reliability,
            105 => Self::Required,
            107 => Self::SegmentationSupported,
            110 => Self::StateText,
            111 => Self::StatusFlags,
            112 => Self::SystemStatus,
            117 => Self::Units,
            120 => Self::VendorIdentifier,
            121 => Self::VendorName,
            139 => Self::ProtocolRevision,
            155 => Self::DatabaseRevision,
            371 => Self::PropertyList,
            400 => Self::IpAddress,
            401 => Self::IpDefaultGateway,
            406 => Self::IpDnsServer,
            408 => Self::BacnetIpMode,
            411 => Self::IpSubnetMask,
            412 => Self::BacnetIpUdpPort,
            416 => Self::ChangesPending,
            418 => Self::FdBbmdAddress,
            419 => Self::FdSubscriptionLifetime,
            423 => Self::MacAddress,
            427 => Self::NetworkType,
            482 => Self::ProtocolLevel,
            v => Self::Other(v),
        }
    }
}
