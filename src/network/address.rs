use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::utils::is_private_ip;
use crate::TrackerError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Coordinates> for (f64, f64) {
    fn from(coordinates: Coordinates) -> Self {
        (coordinates.latitude, coordinates.longitude)
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(coordinates: Coordinates) -> Self {
        [coordinates.latitude, coordinates.longitude]
    }
}

/// Geographic position of an address. Either both coordinates are known or
/// neither is.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(Option<Coordinates>);

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self(Some(Coordinates { latitude, longitude }))
    }

    pub fn unresolved() -> Self {
        Self(None)
    }

    /// Builds a location from optional database fields; a half-populated pair
    /// is treated as unresolved.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Self {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Self::new(latitude, longitude),
            _ => Self::unresolved(),
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.0
    }

    pub fn latitude(&self) -> Option<f64> {
        self.0.map(|c| c.latitude)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.0.map(|c| c.longitude)
    }

    pub fn is_resolved(&self) -> bool {
        self.0.is_some()
    }
}

/// An IP endpoint and, once localized, where it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    ip: IpAddr,
    private: bool,
    location: Option<Location>,
}

impl Address {
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            private: is_private_ip(&ip),
            location: None,
        }
    }

    /// An address known to be public regardless of its range, such as the
    /// one reported by a public-IP discovery service.
    pub fn public(ip: IpAddr) -> Self {
        Self {
            ip,
            private: false,
            location: None,
        }
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn text(&self) -> String {
        self.ip.to_string()
    }

    pub fn is_private(&self) -> bool {
        self.private
    }

    /// `None` until the address has been localized.
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// Coordinates, if the address was localized and found.
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.location.and_then(|l| l.coordinates())
    }

    /// Assigns the location once. Returns `false` and keeps the existing value
    /// if a location was already assigned.
    pub fn assign_location(&mut self, location: Location) -> bool {
        if self.location.is_some() {
            return false;
        }
        self.location = Some(location);
        true
    }
}

impl FromStr for Address {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ip: IpAddr = s.trim().parse()
            .map_err(|_| TrackerError::Parse(format!("Invalid IP: {}", s)))?;
        Ok(Self::new(ip))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ip)
    }
}
