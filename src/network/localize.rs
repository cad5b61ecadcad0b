use std::collections::HashMap;
use std::net::IpAddr;
use super::address::Address;
use super::geo::GeoLookup;
use super::packet_capture::PacketCollection;
use crate::Result;

/// Public addresses to look up in place of private ones.
///
/// Private addresses without an explicit override fall back to the default,
/// normally the discovered public address of the local network.
#[derive(Debug, Clone)]
pub struct PrivateToPublicMap {
    overrides: HashMap<IpAddr, Address>,
    default: Address,
}

impl PrivateToPublicMap {
    pub fn new(default: Address) -> Self {
        Self {
            overrides: HashMap::new(),
            default,
        }
    }

    pub fn insert(&mut self, private: IpAddr, public: IpAddr) {
        self.overrides.insert(private, Address::public(public));
    }

    pub fn with_override(mut self, private: IpAddr, public: IpAddr) -> Self {
        self.insert(private, public);
        self
    }

    pub fn get<'a>(&'a self, key: &IpAddr, default: &'a Address) -> &'a Address {
        self.overrides.get(key).unwrap_or(default)
    }

    pub fn resolve(&self, key: &IpAddr) -> &Address {
        self.get(key, &self.default)
    }

    pub fn default_address(&self) -> &Address {
        &self.default
    }
}

/// Resolves the location of every endpoint in `packets`.
///
/// Private endpoints are looked up through their public substitute but the
/// result is stored on the endpoint itself. Endpoints that already carry a
/// location are left alone.
pub fn localize<L>(packets: &mut PacketCollection, lookup: &L, substitutes: &PrivateToPublicMap) -> Result<()>
where
    L: GeoLookup + ?Sized,
{
    for packet in packets.iter_mut() {
        for endpoint in packet.endpoints_mut() {
            localize_address(endpoint, lookup, substitutes)?;
        }
    }
    Ok(())
}

pub fn localize_address<L>(address: &mut Address, lookup: &L, substitutes: &PrivateToPublicMap) -> Result<()>
where
    L: GeoLookup + ?Sized,
{
    if address.location().is_some() {
        return Ok(());
    }

    let query = if address.is_private() {
        substitutes.resolve(&address.ip())
    } else {
        &*address
    };
    let location = lookup.lookup(query)?;

    address.assign_location(location);
    Ok(())
}
