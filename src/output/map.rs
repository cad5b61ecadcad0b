use log::{debug, warn};
use super::{format_coordinate, DocumentEncoder};
use crate::network::{Address, Coordinates, PacketCollection};

pub const DEFAULT_ZOOM: u8 = 3;
const LINE_COLOR: &str = "red";
const LINE_WEIGHT: u32 = 3;

/// Interactive HTML map (Leaflet) with one polyline per localized packet,
/// centred on the local network's public address.
#[derive(Debug, Clone, Copy)]
pub struct MapEncoder {
    center: Coordinates,
    zoom: u8,
}

impl MapEncoder {
    pub fn new(center: Coordinates, zoom: u8) -> Self {
        Self { center, zoom }
    }

    /// Centres the map on `public_address`, or on 0,0 if it could not be located.
    pub fn centered_on(public_address: &Address, zoom: u8) -> Self {
        let center = public_address.coordinates().unwrap_or_else(|| {
            warn!("Public address {} has no location, centring map on 0,0", public_address);
            Coordinates { latitude: 0.0, longitude: 0.0 }
        });
        Self::new(center, zoom)
    }

    pub fn center(&self) -> Coordinates {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    fn polyline(src: Coordinates, dst: Coordinates) -> String {
        format!(
            "L.polyline([[{}, {}], [{}, {}]], {{color: '{}', weight: {}}}).addTo(map);\n",
            format_coordinate(src.latitude),
            format_coordinate(src.longitude),
            format_coordinate(dst.latitude),
            format_coordinate(dst.longitude),
            LINE_COLOR,
            LINE_WEIGHT,
        )
    }
}

impl DocumentEncoder for MapEncoder {
    fn encode(&self, packets: &PacketCollection) -> String {
        let mut lines = String::new();
        for packet in packets {
            match packet.coordinates() {
                Some((src, dst)) => lines.push_str(&Self::polyline(src, dst)),
                None => debug!(
                    "Skipping {} --> {}: endpoint location unknown",
                    packet.source(),
                    packet.destination()
                ),
            }
        }

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="initial-scale=1.0, user-scalable=no">
<title>Packet Tracker</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; padding: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map('map').setView([{}, {}], {});
L.tileLayer('https://tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
    maxZoom: 19,
    attribution: '&copy; OpenStreetMap contributors'
}}).addTo(map);
{}</script>
</body>
</html>
"#,
            format_coordinate(self.center.latitude),
            format_coordinate(self.center.longitude),
            self.zoom,
            lines,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Location, Packet};

    fn located(ip: &str, location: Location) -> Address {
        let mut address: Address = ip.parse().unwrap();
        address.assign_location(location);
        address
    }

    #[test]
    fn test_centred_on_public_address() {
        let public = located("203.0.113.5", Location::new(51.5, -0.1));
        let encoder = MapEncoder::centered_on(&public, DEFAULT_ZOOM);

        let html = encoder.encode(&PacketCollection::default());
        assert!(html.contains("setView([51.5, -0.1], 3)"));
        assert!(!html.contains("L.polyline"));
    }

    #[test]
    fn test_unlocated_public_address_centres_on_origin() {
        let public: Address = "203.0.113.5".parse().unwrap();
        let encoder = MapEncoder::centered_on(&public, 5);
        assert_eq!(encoder.center(), Coordinates { latitude: 0.0, longitude: 0.0 });
        assert_eq!(encoder.zoom(), 5);
    }

    #[test]
    fn test_polylines_skip_unresolved_packets() {
        let packets: PacketCollection = vec![
            Packet::new(
                located("192.168.1.10", Location::new(51.5, -0.1)),
                located("8.8.8.8", Location::new(37.4, -122.1)),
            ),
            Packet::new(
                located("8.8.8.8", Location::new(37.4, -122.1)),
                located("1.2.3.4", Location::unresolved()),
            ),
        ]
        .into_iter()
        .collect();

        let html = MapEncoder::new(Coordinates { latitude: 51.5, longitude: -0.1 }, 3).encode(&packets);
        assert_eq!(html.matches("L.polyline").count(), 1);
        assert!(html.contains("L.polyline([[51.5, -0.1], [37.4, -122.1]], {color: 'red', weight: 3})"));
    }
}
