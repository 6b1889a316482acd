//! Parsers for Linux `/proc` files.
//!
//! Pure functions over file contents; reading the files is left to the caller.

use crate::error::CollectError;
use crate::metrics::traits::InterfaceCounters;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// One row of `/proc/net/{tcp,tcp6,udp,udp6}`.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketLine {
    pub local: Option<SocketAddr>,
    pub remote: Option<SocketAddr>,
    pub state: u8,
    pub inode: u64,
}

/// Decode a kernel `ADDR:PORT` pair such as `0100007F:0035`.
///
/// The address is printed as the in-memory words of a network-order value,
/// so each 32-bit group is reinterpreted with native byte order. A port of
/// zero means "no address" and yields `None`.
pub fn decode_address(raw: &str) -> Result<Option<SocketAddr>, CollectError> {
    let (addr, port) = raw
        .split_once(':')
        .ok_or_else(|| CollectError::parse(format!("missing ':' in address {raw}")))?;

    let port = u16::from_str_radix(port, 16)
        .map_err(|_| CollectError::parse(format!("invalid port in {raw}")))?;
    if port == 0 {
        return Ok(None);
    }

    let word = |chunk: &str| {
        u32::from_str_radix(chunk, 16)
            .map(u32::to_ne_bytes)
            .map_err(|_| CollectError::parse(format!("invalid address in {raw}")))
    };

    let ip = match addr.len() {
        8 => IpAddr::V4(Ipv4Addr::from(word(addr)?)),
        32 => {
            let mut octets = [0u8; 16];
            for i in 0..4 {
                octets[i * 4..i * 4 + 4].copy_from_slice(&word(&addr[i * 8..i * 8 + 8])?);
            }
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        _ => return Err(CollectError::parse(format!("unexpected address length in {raw}"))),
    };

    Ok(Some(SocketAddr::new(ip, port)))
}

/// Parse a socket table. Malformed rows are skipped.
pub fn parse_socket_table(content: &str) -> Vec<SocketLine> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 10 {
                return None;
            }
            let local = decode_address(fields[1]).ok()?;
            let remote = decode_address(fields[2]).ok()?;
            let state = u8::from_str_radix(fields[3], 16).ok()?;
            let inode = fields[9].parse().ok()?;
            Some(SocketLine {
                local,
                remote,
                state,
                inode,
            })
        })
        .collect()
}

/// Conventional name of a kernel TCP state. Unknown states map to "NONE".
pub fn tcp_state_name(state: u8) -> &'static str {
    match state {
        0x01 => "ESTABLISHED",
        0x02 => "SYN_SENT",
        0x03 => "SYN_RECV",
        0x04 => "FIN_WAIT1",
        0x05 => "FIN_WAIT2",
        0x06 => "TIME_WAIT",
        0x07 => "CLOSE",
        0x08 => "CLOSE_WAIT",
        0x09 => "LAST_ACK",
        0x0A => "LISTEN",
        0x0B => "CLOSING",
        _ => "NONE",
    }
}

/// Extract the inode from an fd link target like `socket:[12345]`.
pub fn parse_socket_inode(link: &str) -> Option<u64> {
    link.strip_prefix("socket:[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}

/// Parse `/proc/net/dev`.
pub fn parse_net_dev(content: &str) -> Vec<InterfaceCounters> {
    let mut devices = Vec::new();

    for line in content.lines() {
        // Header lines
        if line.contains('|') || line.trim().is_empty() {
            continue;
        }

        let Some((name, rest)) = line.split_once(':') else {
            continue;
        };
        let values: Vec<u64> = rest
            .split_whitespace()
            .map(|v| v.parse().unwrap_or(0))
            .collect();
        if values.len() < 16 {
            continue;
        }

        devices.push(InterfaceCounters {
            name: name.trim().to_string(),
            bytes_recv: values[0],
            packets_recv: values[1],
            errin: values[2],
            dropin: values[3],
            bytes_sent: values[8],
            packets_sent: values[9],
            errout: values[10],
            dropout: values[11],
        });
    }

    devices
}

/// Scheduling fields of `/proc/[pid]/stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatFields {
    pub nice: i32,
    pub num_threads: u32,
}

/// Parse nice and thread count from `/proc/[pid]/stat`.
pub fn parse_stat_fields(content: &str) -> Result<StatFields, CollectError> {
    // comm may contain spaces and parentheses
    let close_paren = content
        .rfind(')')
        .ok_or_else(|| CollectError::parse("missing ')' in stat"))?;
    let fields: Vec<&str> = content[close_paren + 1..].split_whitespace().collect();

    // fields[0] is the state (field 3 in proc(5)); nice is field 19
    let field = |idx: usize, name: &str| {
        fields
            .get(idx)
            .ok_or_else(|| CollectError::parse(format!("missing {name} in stat")))
    };

    let nice = field(16, "nice")?
        .parse()
        .map_err(|_| CollectError::parse("invalid nice in stat"))?;
    let num_threads = field(17, "num_threads")?
        .parse()
        .map_err(|_| CollectError::parse("invalid num_threads in stat"))?;

    Ok(StatFields { nice, num_threads })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TCP: &str = "  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 0100007F:0CEA 00000000:0000 0A 00000000:00000000 00:00000000 00000000   999        0 23817 1 0000000000000000 100 0 0 10 0
   1: 0F02000A:0016 0202000A:D2A4 01 00000000:00000000 02:0009A7B3 00000000     0        0 34211 4 0000000000000000 20 4 31 10 -1
";

    #[test]
    fn test_decode_ipv4() {
        if cfg!(target_endian = "little") {
            let addr = decode_address("0100007F:0035").unwrap().unwrap();
            assert_eq!(addr, "127.0.0.1:53".parse().unwrap());
        }
    }

    #[test]
    fn test_decode_zero_port_is_absent() {
        assert_eq!(decode_address("00000000:0000").unwrap(), None);
    }

    #[test]
    fn test_decode_ipv6_loopback() {
        if cfg!(target_endian = "little") {
            let addr = decode_address("00000000000000000000000001000000:1F90")
                .unwrap()
                .unwrap();
            assert_eq!(addr, "[::1]:8080".parse().unwrap());
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_address("nonsense").is_err());
        assert!(decode_address("0100007F:zz").is_err());
    }

    #[test]
    fn test_parse_socket_table() {
        let rows = parse_socket_table(TCP);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].state, 0x0A);
        assert_eq!(rows[0].inode, 23817);
        assert!(rows[0].remote.is_none());
        assert_eq!(rows[0].local.unwrap().port(), 3306);

        assert_eq!(tcp_state_name(rows[1].state), "ESTABLISHED");
        assert_eq!(rows[1].remote.unwrap().port(), 53924);
    }

    #[test]
    fn test_tcp_state_names() {
        assert_eq!(tcp_state_name(0x0A), "LISTEN");
        assert_eq!(tcp_state_name(0x06), "TIME_WAIT");
        assert_eq!(tcp_state_name(0x0C), "NONE");
    }

    #[test]
    fn test_parse_socket_inode() {
        assert_eq!(parse_socket_inode("socket:[23817]"), Some(23817));
        assert_eq!(parse_socket_inode("pipe:[1234]"), None);
        assert_eq!(parse_socket_inode("/dev/null"), None);
    }

    #[test]
    fn test_parse_net_dev() {
        let content = "Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1000 10 0 0 0 0 0 0 1000 10 0 0 0 0 0 0
  eth0: 5000 50 1 2 0 0 0 0 3000 30 3 4 0 0 0 0
";
        let devices = parse_net_dev(content);
        assert_eq!(devices.len(), 2);

        let eth0 = &devices[1];
        assert_eq!(eth0.name, "eth0");
        assert_eq!(eth0.bytes_recv, 5000);
        assert_eq!(eth0.packets_sent, 30);
        assert_eq!(eth0.errin, 1);
        assert_eq!(eth0.dropin, 2);
        assert_eq!(eth0.errout, 3);
        assert_eq!(eth0.dropout, 4);
    }

    #[test]
    fn test_parse_stat_fields() {
        let stat = "1234 (my (weird) proc) S 1 1234 1234 0 -1 4194560 100 0 0 0 5 3 0 0 20 -5 7 0 12345 1000000 250 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0";
        let fields = parse_stat_fields(stat).unwrap();
        assert_eq!(fields.nice, -5);
        assert_eq!(fields.num_threads, 7);
    }

    #[test]
    fn test_parse_stat_fields_truncated() {
        assert!(parse_stat_fields("1 (init) S 0 1").is_err());
    }
}
