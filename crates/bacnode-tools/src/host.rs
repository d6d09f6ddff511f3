//! IPv4 settings of the machine the server runs on.

use std::net::Ipv4Addr;

use bacnode_server::NetworkPortConfig;
use if_addrs::IfAddr;
use log::{debug, warn};

const PROC_NET_ROUTE: &str = "/proc/net/route";
const RESOLV_CONF: &str = "/etc/resolv.conf";

/// Host network values used for a NetworkPort the configuration leaves unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostNetwork {
    /// Address and netmask of the first routable IPv4 interface.
    pub interface: Option<(Ipv4Addr, Ipv4Addr)>,
    pub gateway: Option<Ipv4Addr>,
    pub dns_servers: Vec<Ipv4Addr>,
}

impl HostNetwork {
    /// Reads the interface list, the default route and the resolver
    /// configuration. Anything unavailable is left empty.
    pub fn discover() -> Self {
        let interfaces = match if_addrs::get_if_addrs() {
            Ok(interfaces) => interfaces
                .into_iter()
                .filter_map(|iface| match iface.addr {
                    IfAddr::V4(v4) => Some((v4.ip, v4.netmask)),
                    _ => None,
                })
                .collect(),
            Err(err) => {
                warn!("cannot list network interfaces: {err}");
                Vec::new()
            }
        };
        let host = Self {
            interface: first_routable(interfaces),
            gateway: std::fs::read_to_string(PROC_NET_ROUTE)
                .ok()
                .and_then(|table| default_gateway(&table)),
            dns_servers: std::fs::read_to_string(RESOLV_CONF)
                .map(|conf| nameservers(&conf))
                .unwrap_or_default(),
        };
        debug!("host network: {host:?}");
        host
    }

    /// Copies host values into the fields of `port` that are still unset.
    pub fn fill(&self, port: &mut NetworkPortConfig) {
        if port.ip_address.is_unspecified() {
            if let Some((ip, mask)) = self.interface {
                port.ip_address = ip;
                if port.subnet_mask.is_unspecified() {
                    port.subnet_mask = mask;
                }
            }
        }
        if port.default_gateway.is_unspecified() {
            if let Some(gateway) = self.gateway {
                port.default_gateway = gateway;
            }
        }
        if port.dns_servers.is_empty() {
            port.dns_servers.clone_from(&self.dns_servers);
        }
    }
}

fn first_routable(
    interfaces: impl IntoIterator<Item = (Ipv4Addr, Ipv4Addr)>,
) -> Option<(Ipv4Addr, Ipv4Addr)> {
    interfaces
        .into_iter()
        .find(|(ip, _)| !ip.is_loopback() && !ip.is_unspecified() && !ip.is_link_local())
}

/// Gateway of the default route in a Linux `/proc/net/route` table. Addresses
/// there are hex in host byte order.
fn default_gateway(table: &str) -> Option<Ipv4Addr> {
    table
        .lines()
        .skip(1)
        .find_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [_, "00000000", gateway, ..] => u32::from_str_radix(gateway, 16)
                    .ok()
                    .map(|raw| Ipv4Addr::from(raw.to_ne_bytes())),
                _ => None,
            }
        })
        .filter(|gateway| !gateway.is_unspecified())
}

fn nameservers(conf: &str) -> Vec<Ipv4Addr> {
    conf.lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some("nameserver"), Some(addr)) => addr.parse().ok(),
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{default_gateway, first_routable, nameservers, HostNetwork};
    use bacnode_server::NetworkPortConfig;
    use std::net::Ipv4Addr;

    fn host() -> HostNetwork {
        HostNetwork {
            interface: Some((Ipv4Addr::new(192, 168, 1, 30), Ipv4Addr::new(255, 255, 255, 0))),
            gateway: Some(Ipv4Addr::new(192, 168, 1, 1)),
            dns_servers: vec![Ipv4Addr::new(192, 168, 1, 1)],
        }
    }

    #[test]
    fn unset_port_takes_host_values() {
        let mut port = NetworkPortConfig::default();
        host().fill(&mut port);
        assert_eq!(port.ip_address, Ipv4Addr::new(192, 168, 1, 30));
        assert_eq!(port.subnet_mask, Ipv4Addr::new(255, 255, 255, 0));
        assert_eq!(port.default_gateway, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(port.dns_servers, vec![Ipv4Addr::new(192, 168, 1, 1)]);
        assert_eq!(
            port.to_bip_settings().broadcast_addr(),
            "192.168.1.255:47808".parse().unwrap()
        );
    }

    #[test]
    fn configured_values_are_kept() {
        let mut port = NetworkPortConfig {
            ip_address: Ipv4Addr::new(10, 0, 0, 8),
            subnet_mask: Ipv4Addr::new(255, 0, 0, 0),
            dns_servers: vec![Ipv4Addr::new(9, 9, 9, 9)],
            ..NetworkPortConfig::default()
        };
        host().fill(&mut port);
        assert_eq!(port.ip_address, Ipv4Addr::new(10, 0, 0, 8));
        assert_eq!(port.subnet_mask, Ipv4Addr::new(255, 0, 0, 0));
        assert_eq!(port.default_gateway, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(port.dns_servers, vec![Ipv4Addr::new(9, 9, 9, 9)]);

        let mut untouched = NetworkPortConfig::default();
        HostNetwork::default().fill(&mut untouched);
        assert_eq!(untouched, NetworkPortConfig::default());
    }

    #[test]
    fn loopback_and_link_local_are_skipped() {
        let mask = Ipv4Addr::new(255, 255, 0, 0);
        let interfaces = [
            (Ipv4Addr::LOCALHOST, Ipv4Addr::new(255, 0, 0, 0)),
            (Ipv4Addr::new(169, 254, 3, 4), mask),
            (Ipv4Addr::new(172, 16, 5, 6), mask),
        ];
        assert_eq!(first_routable(interfaces), Some((Ipv4Addr::new(172, 16, 5, 6), mask)));
        assert_eq!(first_routable([(Ipv4Addr::LOCALHOST, mask)]), None);
    }

    #[test]
    fn resolver_lists_ipv4_nameservers() {
        let conf = "# generated\nsearch lan\nnameserver 192.168.1.1\nnameserver fe80::1\nnameserver 8.8.8.8\n";
        assert_eq!(
            nameservers(conf),
            vec![Ipv4Addr::new(192, 168, 1, 1), Ipv4Addr::new(8, 8, 8, 8)]
        );
    }

    #[cfg(target_endian = "little")]
    #[test]
    fn default_route_gateway() {
        let table = "Iface\tDestination\tGateway\tFlags\n\
                     eth0\t0001A8C0\t00000000\t0001\n\
                     eth0\t00000000\t0101A8C0\t0003\n";
        assert_eq!(default_gateway(table), Some(Ipv4Addr::new(192, 168, 1, 1)));
        assert_eq!(default_gateway("Iface\tDestination\tGateway\n"), None);
    }
}
