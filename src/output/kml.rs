use log::debug;
use super::{format_coordinate, DocumentEncoder};
use crate::network::{Packet, PacketCollection};

const KML_HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?> \n",
    "<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n",
    "<Document>\n",
    "\t<Style id=\"transBluePoly\">\n",
    "\t<LineStyle><width>1.5</width><color>501400E6</color></LineStyle>\n",
    "\t</Style>\n",
);

const KML_FOOTER: &str = "</Document>\n</kml>\n";

/// KML path document: one line segment per packet, drawn from destination to
/// source.
#[derive(Debug, Clone, Copy, Default)]
pub struct KmlEncoder;

impl KmlEncoder {
    pub fn header() -> &'static str {
        KML_HEADER
    }

    pub fn footer() -> &'static str {
        KML_FOOTER
    }

    /// `None` when either endpoint has no coordinates.
    pub fn encode_packet(packet: &Packet) -> Option<String> {
        let (src, dst) = packet.coordinates()?;

        Some(format!(
            concat!(
                "\t\t<Placemark>\n",
                "\t\t\t<name>{} --> {}</name>\n",
                "\t\t\t<extrude>1</extrude>\n",
                "\t\t\t<tessellate>1</tessellate>\n",
                "\t\t\t<styleUrl>#transBluePoly</styleUrl>\n",
                "\t\t\t<LineString>\n",
                "\t\t\t<coordinates>{},{}\n",
                "\t\t\t{},{}</coordinates>\n",
                "\t\t\t</LineString>\n",
                "\t\t</Placemark>\n",
            ),
            packet.source(),
            packet.destination(),
            format_coordinate(dst.longitude),
            format_coordinate(dst.latitude),
            format_coordinate(src.longitude),
            format_coordinate(src.latitude),
        ))
    }
}

impl DocumentEncoder for KmlEncoder {
    fn encode(&self, packets: &PacketCollection) -> String {
        let mut kml = String::from(KML_HEADER);

        for packet in packets {
            match Self::encode_packet(packet) {
                Some(placemark) => kml.push_str(&placemark),
                None => debug!(
                    "Skipping {} --> {}: endpoint location unknown",
                    packet.source(),
                    packet.destination()
                ),
            }
        }

        kml.push_str(KML_FOOTER);
        kml
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Address, Location};

    fn located(ip: &str, location: Location) -> Address {
        let mut address: Address = ip.parse().unwrap();
        address.assign_location(location);
        address
    }

    #[test]
    fn test_empty_collection() {
        let kml = KmlEncoder.encode(&PacketCollection::default());
        assert_eq!(kml, format!("{}{}", KmlEncoder::header(), KmlEncoder::footer()));
        assert!(!kml.contains("<Placemark>"));
    }

    #[test]
    fn test_placemark_layout() {
        let packet = Packet::new(
            located("192.168.1.10", Location::new(51.5, -0.1)),
            located("8.8.8.8", Location::new(37.4, -122.1)),
        );

        let expected = "\t\t<Placemark>\n\
                        \t\t\t<name>192.168.1.10 --> 8.8.8.8</name>\n\
                        \t\t\t<extrude>1</extrude>\n\
                        \t\t\t<tessellate>1</tessellate>\n\
                        \t\t\t<styleUrl>#transBluePoly</styleUrl>\n\
                        \t\t\t<LineString>\n\
                        \t\t\t<coordinates>-122.1,37.4\n\
                        \t\t\t-0.1,51.5</coordinates>\n\
                        \t\t\t</LineString>\n\
                        \t\t</Placemark>\n";
        assert_eq!(KmlEncoder::encode_packet(&packet).unwrap(), expected);
    }

    #[test]
    fn test_unresolved_endpoint_is_skipped() {
        let packets: PacketCollection = vec![
            Packet::new(
                located("8.8.8.8", Location::new(37.4, -122.1)),
                located("1.2.3.4", Location::unresolved()),
            ),
            Packet::new(
                "8.8.8.8".parse().unwrap(),
                "9.9.9.9".parse().unwrap(),
            ),
            Packet::new(
                located("8.8.8.8", Location::new(37.4, -122.1)),
                located("9.9.9.9", Location::new(47.0, 8.0)),
            ),
        ]
        .into_iter()
        .collect();

        let kml = KmlEncoder.encode(&packets);
        assert_eq!(kml.matches("<Placemark>").count(), 1);
        assert!(kml.contains("<coordinates>8.0,47.0\n"));
        assert!(kml.starts_with(KmlEncoder::header()));
        assert!(kml.ends_with(KmlEncoder::footer()));
    }
}
