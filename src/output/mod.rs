pub mod kml;
pub mod map;

use std::path::Path;
use log::info;
use crate::network::PacketCollection;
use crate::Result;

pub use kml::KmlEncoder;
pub use map::MapEncoder;

/// Renders a localized packet collection as a text document.
pub trait DocumentEncoder {
    fn encode(&self, packets: &PacketCollection) -> String;
}

/// Encodes `packets` and writes the document to `path`.
pub fn write_document<E, P>(encoder: &E, packets: &PacketCollection, path: P) -> Result<()>
where
    E: DocumentEncoder + ?Sized,
    P: AsRef<Path>,
{
    write_output(path, encoder.encode(packets))
}

/// Writes `contents` to `path` in one go, creating parent directories as
/// needed. A failed write may leave a partial file behind.
pub fn write_output<P, C>(path: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(path, contents)?;

    info!("Wrote {}", path.display());
    Ok(())
}

/// Formats a coordinate the way the documents expect: shortest
/// representation, but always with a fractional part.
pub(crate) fn format_coordinate(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
