use std::net::{Ipv4Addr, SocketAddrV4};

use bacnode_core::encoding::writer::MAX_APDU_LEN;
use bacnode_core::types::{BipMode, HostNPort, PropertyId, PropertyValue};
use bacnode_datalink::{BipSettings, ForeignDevice};
use log::warn;

use crate::error::StoreError;
use crate::object::BacnetObject;

/// IPv4 configuration carried by the NetworkPort object.
///
/// The device keeps the *active* copy that the transport runs with; writes
/// over the network only change the object's stored values until they are
/// activated.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct NetworkPortConfig {
    pub instance: u32,
    pub name: String,
    pub ip_address: Ipv4Addr,
    pub subnet_mask: Ipv4Addr,
    pub default_gateway: Ipv4Addr,
    pub dns_servers: Vec<Ipv4Addr>,
    pub udp_port: u16,
    pub ip_mode: BipMode,
    pub fd_bbmd_address: HostNPort,
    pub fd_subscription_lifetime: u16,
}

impl Default for NetworkPortConfig {
    fn default() -> Self {
        Self {
            instance: 50,
            name: "NetworkPort Vermillion".into(),
            ip_address: Ipv4Addr::UNSPECIFIED,
            subnet_mask: Ipv4Addr::UNSPECIFIED,
            default_gateway: Ipv4Addr::UNSPECIFIED,
            dns_servers: Vec::new(),
            udp_port: 47808,
            ip_mode: BipMode::Normal,
            fd_bbmd_address: HostNPort::ip(Ipv4Addr::new(192, 168, 1, 4), 47808),
            fd_subscription_lifetime: 3000,
        }
    }
}

impl NetworkPortConfig {
    /// Transport settings for this configuration. Foreign-device mode needs
    /// a BBMD given as an IPv4 address; host names are not resolved.
    pub fn to_bip_settings(&self) -> BipSettings {
        let foreign = match (self.ip_mode, self.fd_bbmd_address.ipv4()) {
            (BipMode::Foreign, Some(bbmd)) => Some(ForeignDevice {
                bbmd: SocketAddrV4::new(bbmd, self.fd_bbmd_address.port),
                ttl_seconds: self.fd_subscription_lifetime,
            }),
            (BipMode::Foreign, None) => {
                warn!(
                    "foreign device mode without an IPv4 BBMD ({}), staying local",
                    self.fd_bbmd_address
                );
                None
            }
            _ => None,
        };
        BipSettings {
            local_ip: self.ip_address,
            subnet_mask: self.subnet_mask,
            port: self.udp_port,
            foreign,
        }
    }

    /// B/IP MAC: the IPv4 address followed by the UDP port.
    pub fn mac_address(&self) -> PropertyValue {
        let mut mac = self.ip_address.octets().to_vec();
        mac.extend_from_slice(&self.udp_port.to_be_bytes());
        PropertyValue::OctetString(mac)
    }

    /// Property values of the NetworkPort object that mirror this
    /// configuration.
    pub fn property_values(&self) -> Vec<(PropertyId, PropertyValue)> {
        vec![
            (
                PropertyId::ObjectName,
                PropertyValue::CharacterString(self.name.clone()),
            ),
            (
                PropertyId::BacnetIpMode,
                PropertyValue::Enumerated(self.ip_mode.to_u32()),
            ),
            (PropertyId::MacAddress, self.mac_address()),
            (PropertyId::IpAddress, octets(self.ip_address)),
            (
                PropertyId::BacnetIpUdpPort,
                PropertyValue::Unsigned(u32::from(self.udp_port)),
            ),
            (PropertyId::IpSubnetMask, octets(self.subnet_mask)),
            (PropertyId::IpDefaultGateway, octets(self.default_gateway)),
            (
                PropertyId::IpDnsServer,
                PropertyValue::Array(self.dns_servers.iter().copied().map(octets).collect()),
            ),
            (
                PropertyId::FdBbmdAddress,
                PropertyValue::HostNPort(self.fd_bbmd_address.clone()),
            ),
            (
                PropertyId::FdSubscriptionLifetime,
                PropertyValue::Unsigned(u32::from(self.fd_subscription_lifetime)),
            ),
            (
                PropertyId::MaxApduLengthAccepted,
                PropertyValue::Unsigned(MAX_APDU_LEN as u32),
            ),
            (PropertyId::ChangesPending, PropertyValue::Boolean(false)),
        ]
    }

    /// Reads the configuration back from the object's stored values.
    pub fn from_object(object: &BacnetObject) -> Result<Self, StoreError> {
        let value = move |property: PropertyId| {
            object
                .slot(property)
                .map(|slot| &slot.value)
                .ok_or(StoreError::NotFound)
        };
        let dns_servers = match value(PropertyId::IpDnsServer)? {
            PropertyValue::Array(items) => items
                .iter()
                .map(|item| ipv4(item, PropertyId::IpDnsServer))
                .collect::<Result<Vec<_>, _>>()?,
            other => return Err(invalid(PropertyId::IpDnsServer, other)),
        };
        let mode = value(PropertyId::BacnetIpMode)?;
        let ip_mode = match mode {
            PropertyValue::Enumerated(raw) => BipMode::from_u32(*raw),
            _ => None,
        }
        .ok_or_else(|| invalid(PropertyId::BacnetIpMode, mode))?;
        let fd_bbmd_address = match value(PropertyId::FdBbmdAddress)? {
            PropertyValue::HostNPort(hnp) => hnp.clone(),
            other => return Err(invalid(PropertyId::FdBbmdAddress, other)),
        };
        Ok(Self {
            instance: object.id().instance(),
            name: object.name().unwrap_or_default().to_owned(),
            ip_address: ipv4(value(PropertyId::IpAddress)?, PropertyId::IpAddress)?,
            subnet_mask: ipv4(value(PropertyId::IpSubnetMask)?, PropertyId::IpSubnetMask)?,
            default_gateway: ipv4(
                value(PropertyId::IpDefaultGateway)?,
                PropertyId::IpDefaultGateway,
            )?,
            dns_servers,
            udp_port: unsigned_u16(
                value(PropertyId::BacnetIpUdpPort)?,
                PropertyId::BacnetIpUdpPort,
            )?,
            ip_mode,
            fd_bbmd_address,
            fd_subscription_lifetime: unsigned_u16(
                value(PropertyId::FdSubscriptionLifetime)?,
                PropertyId::FdSubscriptionLifetime,
            )?,
        })
    }
}

fn octets(addr: Ipv4Addr) -> PropertyValue {
    PropertyValue::OctetString(addr.octets().to_vec())
}

fn ipv4(value: &PropertyValue, property: PropertyId) -> Result<Ipv4Addr, StoreError> {
    match value {
        PropertyValue::OctetString(bytes) => <[u8; 4]>::try_from(bytes.as_slice())
            .map(Ipv4Addr::from)
            .map_err(|_| invalid(property, value)),
        other => Err(invalid(property, other)),
    }
}

fn unsigned_u16(value: &PropertyValue, property: PropertyId) -> Result<u16, StoreError> {
    match value {
        PropertyValue::Unsigned(v) => u16::try_from(*v).map_err(|_| invalid(property, value)),
        other => Err(invalid(property, other)),
    }
}

fn invalid(property: PropertyId, value: &PropertyValue) -> StoreError {
    StoreError::InvalidConfiguration(format!("{property:?} cannot hold {value:?}"))
}
