//! Interface collector.

use crate::error::CollectError;
use crate::metrics::data::InterfaceRecord;
use crate::metrics::traits::{AddressFamily, HostSource, InterfaceAddress, InterfaceCounters};
use std::collections::{HashMap, HashSet};

pub fn collect(host: &dyn HostSource) -> Result<Vec<InterfaceRecord>, CollectError> {
    let counters = host.interface_counters()?;
    let addresses = host.interface_addresses()?;
    Ok(merge(counters, &addresses))
}

/// Join IO counters with address lists by interface name.
///
/// The counters decide which interfaces exist: one record per distinct name,
/// in counter order. Interfaces without addresses get null address fields.
pub fn merge(
    counters: Vec<InterfaceCounters>,
    addresses: &HashMap<String, Vec<InterfaceAddress>>,
) -> Vec<InterfaceRecord> {
    let mut seen = HashSet::new();

    counters
        .into_iter()
        .filter(|c| seen.insert(c.name.clone()))
        .map(|c| {
            let known = addresses.get(&c.name).map(Vec::as_slice).unwrap_or_default();
            InterfaceRecord {
                ipv4: first_of(known, AddressFamily::Inet),
                ipv6: first_of(known, AddressFamily::Inet6),
                mac: first_of(known, AddressFamily::Link),
                name: c.name,
                bytes_sent: c.bytes_sent,
                bytes_recv: c.bytes_recv,
                packets_sent: c.packets_sent,
                packets_recv: c.packets_recv,
                errin: c.errin,
                errout: c.errout,
                dropin: c.dropin,
                dropout: c.dropout,
            }
        })
        .collect()
}

fn first_of(addresses: &[InterfaceAddress], family: AddressFamily) -> Option<String> {
    addresses
        .iter()
        .find(|a| a.family == family)
        .map(|a| a.address.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(name: &str, bytes_recv: u64) -> InterfaceCounters {
        InterfaceCounters {
            name: name.to_string(),
            bytes_recv,
            ..Default::default()
        }
    }

    fn addr(family: AddressFamily, address: &str) -> InterfaceAddress {
        InterfaceAddress {
            family,
            address: address.to_string(),
        }
    }

    #[test]
    fn test_interface_without_addresses_has_null_fields() {
        let addresses = HashMap::from([(
            "eth0".to_string(),
            vec![
                addr(AddressFamily::Inet, "192.168.1.10"),
                addr(AddressFamily::Link, "aa:bb:cc:dd:ee:ff"),
            ],
        )]);

        let records = merge(vec![counters("eth0", 10), counters("tun0", 20)], &addresses);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ipv4.as_deref(), Some("192.168.1.10"));
        assert_eq!(records[0].ipv6, None);
        assert_eq!(records[0].mac.as_deref(), Some("aa:bb:cc:dd:ee:ff"));

        assert_eq!(records[1].name, "tun0");
        assert_eq!(records[1].bytes_recv, 20);
        assert!(records[1].ipv4.is_none() && records[1].ipv6.is_none() && records[1].mac.is_none());
    }

    #[test]
    fn test_first_address_of_each_family_wins() {
        let addresses = HashMap::from([(
            "wlan0".to_string(),
            vec![
                addr(AddressFamily::Inet6, "fe80::1"),
                addr(AddressFamily::Inet, "10.0.0.5"),
                addr(AddressFamily::Inet6, "2001:db8::5"),
                addr(AddressFamily::Inet, "10.0.0.6"),
            ],
        )]);

        let records = merge(vec![counters("wlan0", 0)], &addresses);

        assert_eq!(records[0].ipv4.as_deref(), Some("10.0.0.5"));
        assert_eq!(records[0].ipv6.as_deref(), Some("fe80::1"));
    }

    #[test]
    fn test_addresses_alone_do_not_create_records() {
        let addresses = HashMap::from([(
            "docker0".to_string(),
            vec![addr(AddressFamily::Inet, "172.17.0.1")],
        )]);
        assert!(merge(Vec::new(), &addresses).is_empty());
    }

    #[test]
    fn test_duplicate_counter_names_collapse() {
        let records = merge(
            vec![counters("lo", 1), counters("lo", 2), counters("eth0", 3)],
            &HashMap::new(),
        );
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["lo", "eth0"]);
        assert_eq!(records[0].bytes_recv, 1);
    }
}
