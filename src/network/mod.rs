pub mod address;
pub mod geo;
pub mod localize;
pub mod packet_capture;
pub mod public_ip;
pub mod tracker;

pub use address::{Address, Coordinates, Location};
pub use geo::{GeoLite2Database, GeoLookup, StaticDatabase};
pub use localize::{localize, PrivateToPublicMap};
pub use packet_capture::{Packet, PacketCollection};
pub use public_ip::PublicIpResolver;
pub use tracker::{track, TrackedCapture};
