use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use chrono::{DateTime, Utc};
use crate::network::Location;

/// True for addresses that are not globally routable and therefore cannot be
/// found in a geolocation database.
pub fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => is_private_ipv4(ipv4),
        IpAddr::V6(ipv6) => {
            if let Some(mapped) = ipv6.to_ipv4_mapped() {
                return is_private_ipv4(&mapped);
            }
            ipv6.is_loopback()
                || ipv6.is_unspecified()
                || is_unique_local(ipv6)
                || is_unicast_link_local(ipv6)
        }
    }
}

fn is_private_ipv4(ipv4: &Ipv4Addr) -> bool {
    let octets = ipv4.octets();
    ipv4.is_private()
        || ipv4.is_loopback()
        || ipv4.is_link_local()
        || ipv4.is_unspecified()
        || ipv4.is_broadcast()
        // 100.64.0.0/10 shared address space (carrier-grade NAT)
        || (octets[0] == 100 && (octets[1] & 0xc0) == 64)
        // 198.18.0.0/15 benchmarking
        || (octets[0] == 198 && (octets[1] & 0xfe) == 18)
        // 240.0.0.0/4 reserved
        || octets[0] >= 240
}

fn is_unique_local(ipv6: &Ipv6Addr) -> bool {
    (ipv6.segments()[0] & 0xfe00) == 0xfc00
}

fn is_unicast_link_local(ipv6: &Ipv6Addr) -> bool {
    (ipv6.segments()[0] & 0xffc0) == 0xfe80
}

pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn format_location(location: &Location) -> String {
    match location.coordinates() {
        Some(coordinates) => format!("{:.4}, {:.4}", coordinates.latitude, coordinates.longitude),
        None => "unresolved".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_ip_detection() {
        assert!(is_private_ip(&IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1))));
        assert!(is_private_ip(&IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))));
        assert!(is_private_ip(&IpAddr::V4(Ipv4Addr::new(172, 16, 0, 1))));
        assert!(is_private_ip(&IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))));
        assert!(is_private_ip(&IpAddr::V4(Ipv4Addr::new(169, 254, 10, 1))));
        assert!(is_private_ip(&IpAddr::V4(Ipv4Addr::new(100, 64, 0, 1))));
        assert!(is_private_ip(&IpAddr::V4(Ipv4Addr::new(255, 255, 255, 255))));
        assert!(!is_private_ip(&IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8))));
        assert!(!is_private_ip(&IpAddr::V4(Ipv4Addr::new(100, 128, 0, 1))));
        assert!(!is_private_ip(&IpAddr::V4(Ipv4Addr::new(172, 32, 0, 1))));
    }

    #[test]
    fn test_private_ipv6_detection() {
        assert!(is_private_ip(&"::1".parse().unwrap()));
        assert!(is_private_ip(&"::".parse().unwrap()));
        assert!(is_private_ip(&"fe80::1".parse().unwrap()));
        assert!(is_private_ip(&"fd12:3456::1".parse().unwrap()));
        assert!(is_private_ip(&"::ffff:192.168.0.1".parse().unwrap()));
        assert!(!is_private_ip(&"2001:4860:4860::8888".parse().unwrap()));
        assert!(!is_private_ip(&"::ffff:8.8.8.8".parse().unwrap()));
    }

    #[test]
    fn test_location_formatting() {
        assert_eq!(format_location(&Location::new(51.5, -0.1)), "51.5000, -0.1000");
        assert_eq!(format_location(&Location::unresolved()), "unresolved");
    }

    #[test]
    fn test_timestamp_formatting() {
        let dt = DateTime::from_timestamp(0, 0).unwrap();
        assert_eq!(format_timestamp(dt), "1970-01-01 00:00:00 UTC");
    }
}
