use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;
use log::warn;
use maxminddb::{MaxMindDBError, Reader};
use super::address::{Address, Coordinates, Location};
use crate::{Result, TrackerError};

/// A source of IP geolocation data.
///
/// An address missing from the source yields an unresolved [`Location`];
/// only faults of the source itself are errors.
pub trait GeoLookup {
    fn lookup(&self, address: &Address) -> Result<Location>;
}

/// MaxMind GeoLite2 City database, opened read-only for the lifetime of the value.
pub struct GeoLite2Database {
    reader: Reader<Vec<u8>>,
}

impl GeoLite2Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TrackerError::NotFound(path.to_path_buf()));
        }

        let reader = Reader::open_readfile(path)
            .map_err(|e| TrackerError::Database(format!("Failed to open city database: {}", e)))?;

        log::debug!(
            "Opened {} database built at epoch {}",
            reader.metadata.database_type,
            reader.metadata.build_epoch
        );

        Ok(Self { reader })
    }
}

impl GeoLookup for GeoLite2Database {
    fn lookup(&self, address: &Address) -> Result<Location> {
        let record = self
            .reader
            .lookup::<maxminddb::geoip2::City>(address.ip())
            .map(|city| city.location.map(|l| (l.latitude, l.longitude)));
        location_from_record(address, record)
    }
}

type CityRecord = std::result::Result<Option<(Option<f64>, Option<f64>)>, MaxMindDBError>;

/// Maps a city record lookup onto a [`Location`]. Only "not found" is
/// forgiven; every other reader error is fatal.
fn location_from_record(address: &Address, record: CityRecord) -> Result<Location> {
    match record {
        Ok(coordinates) => {
            let location = coordinates
                .map(|(latitude, longitude)| Location::from_parts(latitude, longitude))
                .unwrap_or_default();
            if !location.is_resolved() {
                warn!("Address {} has no coordinates in the GeoLite2 City database.", address);
            }
            Ok(location)
        }
        Err(MaxMindDBError::AddressNotFoundError(_)) => {
            warn!("Address {} not found in the GeoLite2 City database.", address);
            Ok(Location::unresolved())
        }
        Err(e) => Err(TrackerError::Database(format!("Lookup of {} failed: {}", address, e))),
    }
}

/// In-memory table of known coordinates.
#[derive(Debug, Clone, Default)]
pub struct StaticDatabase {
    records: HashMap<IpAddr, Coordinates>,
}

impl StaticDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ip: IpAddr, latitude: f64, longitude: f64) {
        self.records.insert(ip, Coordinates { latitude, longitude });
    }

    pub fn with_record(mut self, ip: IpAddr, latitude: f64, longitude: f64) -> Self {
        self.insert(ip, latitude, longitude);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl GeoLookup for StaticDatabase {
    fn lookup(&self, address: &Address) -> Result<Location> {
        match self.records.get(&address.ip()) {
            Some(c) => Ok(Location::new(c.latitude, c.longitude)),
            None => {
                warn!("Address {} not found in the static location table.", address);
                Ok(Location::unresolved())
            }
        }
    }
}
