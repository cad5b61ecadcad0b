use std::net::IpAddr;
use std::path::PathBuf;
use log::info;
use serde::Serialize;
use super::address::Address;
use super::geo::GeoLookup;
use super::localize::{localize, localize_address, PrivateToPublicMap};
use super::packet_capture::PacketCollection;
use super::public_ip::PublicIpResolver;
use crate::Result;

/// A capture whose endpoints, and the local network's public address, have
/// been localized.
#[derive(Debug, Clone, Serialize)]
pub struct TrackedCapture {
    pub public_address: Address,
    pub packets: PacketCollection,
}

/// Parses the capture while discovering the public address, then localizes
/// every endpoint.
///
/// The geolocation source is only opened once both the packets and the
/// public address are available, and is dropped before returning. If either
/// branch fails the other is abandoned and nothing is localized.
pub async fn track<L, F>(
    capture_path: PathBuf,
    resolver: &PublicIpResolver,
    overrides: &[(IpAddr, IpAddr)],
    open_database: F,
) -> Result<TrackedCapture>
where
    L: GeoLookup,
    F: FnOnce() -> Result<L>,
{
    let (mut public_address, mut packets) = tokio::try_join!(
        resolver.resolve(),
        PacketCollection::parse_async(capture_path),
    )?;

    let mut substitutes = PrivateToPublicMap::new(public_address.clone());
    for (private, public) in overrides {
        substitutes.insert(*private, *public);
    }

    info!(
        "Private addresses without an override resolve through {}",
        substitutes.default_address()
    );

    let database = open_database()?;
    localize_address(&mut public_address, &database, &substitutes)?;
    localize(&mut packets, &database, &substitutes)?;
    drop(database);

    info!(
        "Localized {} packets, {} with both endpoints resolved",
        packets.len(),
        packets.resolved_count()
    );

    Ok(TrackedCapture {
        public_address,
        packets,
    })
}
