use pcap_file::pcap::PcapReader;
use pcap_file::DataLink;
use pnet::packet::ethernet::{EtherType, EtherTypes, EthernetPacket};
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::ipv6::Ipv6Packet;
use pnet::packet::vlan::VlanPacket;
use std::fs::File;
use std::io::BufReader;
use std::net::IpAddr;
use std::ops::Range;
use std::path::{Path, PathBuf};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use super::address::{Address, Coordinates};
use crate::{Result, TrackerError};

const IPV4_SOURCE: Range<usize> = 12..16;
const IPV4_DESTINATION: Range<usize> = 16..20;
const IPV6_SOURCE: Range<usize> = 8..24;
const IPV6_DESTINATION: Range<usize> = 24..40;

/// Source and destination of one captured IP frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    source: Address,
    destination: Address,
}

impl Packet {
    pub fn new(source: Address, destination: Address) -> Self {
        Self { source, destination }
    }

    pub fn source(&self) -> &Address {
        &self.source
    }

    pub fn destination(&self) -> &Address {
        &self.destination
    }

    pub(crate) fn endpoints_mut(&mut self) -> [&mut Address; 2] {
        [&mut self.source, &mut self.destination]
    }

    /// Both endpoints have been through localization.
    pub fn is_localized(&self) -> bool {
        self.source.location().is_some() && self.destination.location().is_some()
    }

    /// `(source, destination)` coordinates when both endpoints were found.
    pub fn coordinates(&self) -> Option<(Coordinates, Coordinates)> {
        Some((self.source.coordinates()?, self.destination.coordinates()?))
    }
}

/// Packets of one capture, in capture order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PacketCollection {
    packets: Vec<Packet>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkType {
    Ethernet,
    RawIp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IpVersion {
    V4,
    V6,
}

impl PacketCollection {
    pub fn new(packets: Vec<Packet>) -> Self {
        Self { packets }
    }

    /// Reads a pcap file and keeps one [`Packet`] per IP frame.
    pub fn parse<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TrackerError::NotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let mut reader = PcapReader::new(BufReader::new(file))?;
        let link = match reader.header().datalink {
            DataLink::ETHERNET => LinkType::Ethernet,
            DataLink::RAW | DataLink::IPV4 | DataLink::IPV6 => LinkType::RawIp,
            other => return Err(TrackerError::UnsupportedLinkType(format!("{:?}", other))),
        };

        let mut packets = Vec::new();
        let mut frame_count = 0usize;

        while let Some(frame) = reader.next_packet() {
            let frame = frame?;
            frame_count += 1;

            match parse_frame(link, &frame.data)? {
                Some(packet) => packets.push(packet),
                None => debug!("Dropping non-IP frame #{}", frame_count),
            }
        }

        info!(
            "Parsed {}: {} frames, {} IP packets",
            path.display(),
            frame_count,
            packets.len()
        );

        Ok(Self { packets })
    }

    /// Runs [`PacketCollection::parse`] on the blocking thread pool.
    pub async fn parse_async(path: PathBuf) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::parse(path))
            .await
            .map_err(|e| TrackerError::Task(format!("Capture parsing task failed: {}", e)))?
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Packet> {
        self.packets.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Packet> {
        self.packets.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Number of packets with both endpoints resolved to coordinates.
    pub fn resolved_count(&self) -> usize {
        self.packets.iter().filter(|p| p.coordinates().is_some()).count()
    }
}

impl FromIterator<Packet> for PacketCollection {
    fn from_iter<I: IntoIterator<Item = Packet>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PacketCollection {
    type Item = &'a Packet;
    type IntoIter = std::slice::Iter<'a, Packet>;

    fn into_iter(self) -> Self::IntoIter {
        self.packets.iter()
    }
}

fn parse_frame(link: LinkType, data: &[u8]) -> Result<Option<Packet>> {
    let (version, payload) = match link {
        LinkType::Ethernet => match ethernet_payload(data) {
            Some((ethertype, payload)) if ethertype == EtherTypes::Ipv4 => (IpVersion::V4, payload),
            Some((ethertype, payload)) if ethertype == EtherTypes::Ipv6 => (IpVersion::V6, payload),
            _ => return Ok(None),
        },
        LinkType::RawIp => match data.first().map(|b| b >> 4) {
            Some(4) => (IpVersion::V4, data),
            Some(6) => (IpVersion::V6, data),
            _ => return Ok(None),
        },
    };

    let (source, destination) = match version {
        IpVersion::V4 => {
            if Ipv4Packet::new(payload).is_none() {
                return Err(TrackerError::Decode(format!(
                    "truncated IPv4 header ({} bytes)",
                    payload.len()
                )));
            }
            (&payload[IPV4_SOURCE], &payload[IPV4_DESTINATION])
        }
        IpVersion::V6 => {
            if Ipv6Packet::new(payload).is_none() {
                return Err(TrackerError::Decode(format!(
                    "truncated IPv6 header ({} bytes)",
                    payload.len()
                )));
            }
            (&payload[IPV6_SOURCE], &payload[IPV6_DESTINATION])
        }
    };

    Ok(Some(Packet::new(
        Address::new(decode_address(source)?),
        Address::new(decode_address(destination)?),
    )))
}

/// Ethertype and payload of an Ethernet frame, looking through one 802.1Q tag.
fn ethernet_payload(data: &[u8]) -> Option<(EtherType, &[u8])> {
    let ethernet = EthernetPacket::new(data)?;
    let mut ethertype = ethernet.get_ethertype();
    let mut offset = EthernetPacket::minimum_packet_size();

    if ethertype == EtherTypes::Vlan {
        let vlan = VlanPacket::new(&data[offset..])?;
        ethertype = vlan.get_ethertype();
        offset += VlanPacket::minimum_packet_size();
    }

    Some((ethertype, &data[offset..]))
}

/// Decodes a raw address field, trying IPv4 first and IPv6 second.
pub fn decode_address(bytes: &[u8]) -> Result<IpAddr> {
    if let Ok(octets) = <[u8; 4]>::try_from(bytes) {
        return Ok(IpAddr::from(octets));
    }
    if let Ok(octets) = <[u8; 16]>::try_from(bytes) {
        return Ok(IpAddr::from(octets));
    }
    Err(TrackerError::Decode(format!(
        "{} byte address field is neither IPv4 nor IPv6",
        bytes.len()
    )))
}
