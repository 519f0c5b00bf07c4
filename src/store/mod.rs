// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use crate::geometry::{Point, Srid};
use crate::model::{Intersection, LocatedObject, NodeId, Street, StreetId};

mod memory;
mod xml;

pub use memory::{MemoryStore, DEFAULT_SNAP_TOLERANCE};

/// Error raised by a [Storage] backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid network data: {0}")]
    InvalidData(String),

    /// The backend could not be reached; retrying later might help.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Read access to persisted street network records.
///
/// Absent records are reported with `None` or by omission, never as errors.
/// Errors are reserved for failures of the backend itself.
pub trait Storage: Send + Sync {
    /// Working projection of all coordinates returned by this storage.
    fn srid(&self) -> Srid;

    fn get_street(&self, id: StreetId) -> Result<Option<Street>, StorageError>;

    /// Retrieves multiple streets at once, in the order of `ids`.
    /// Unknown ids are skipped.
    fn get_streets(&self, ids: &[StreetId]) -> Result<Vec<Street>, StorageError>;

    /// Retrieves an intersection together with all streets starting or ending at it,
    /// ordered by ascending street id.
    fn get_intersection(&self, id: NodeId) -> Result<Option<(Intersection, Vec<Street>)>, StorageError>;

    /// Finds the network object nearest to `point`, and the distance to it.
    fn nearest(&self, point: Point) -> Result<Option<(LocatedObject, f64)>, StorageError>;

    /// Finds intersections where a street matching `a` meets a street matching `b`.
    /// Names are matched with [crate::StreetName::matches].
    fn intersections_named(&self, a: &str, b: &str) -> Result<Vec<Intersection>, StorageError>;

    /// Returns every intersection, used to build graph snapshots.
    fn intersections(&self) -> Result<Vec<Intersection>, StorageError>;

    /// Returns every street, used to build graph snapshots.
    fn streets(&self) -> Result<Vec<Street>, StorageError>;

    /// Sets the distance under which [Storage::nearest] prefers an intersection
    /// over a closer street. Backends without such a notion ignore it.
    fn set_snap_tolerance(&mut self, _snap_tolerance: f64) {}
}

/// Format of the input street network file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content
    #[default]
    Unknown,

    /// Force uncompressed XML
    Xml,

    /// Force XML with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// Force XML with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,
}

impl FileFormat {
    /// Guesses the format of a file from its extension,
    /// returning [FileFormat::Unknown] if it is not recognized.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some("xml") => Self::Xml,
            Some("gz") => Self::XmlGz,
            Some("bz2") => Self::XmlBz2,
            _ => Self::Unknown,
        }
    }

    /// Guesses the format from the first bytes of a file.
    fn sniff(head: &[u8]) -> Self {
        if head.starts_with(&[0x1f, 0x8b]) {
            Self::XmlGz
        } else if head.starts_with(b"BZh") {
            Self::XmlBz2
        } else {
            Self::Xml
        }
    }
}

/// Loads a street network from a reader.
///
/// The provided stream will be automatically wrapped in a buffered reader when needed.
pub fn load_from_io<R: io::Read>(reader: R, format: FileFormat) -> Result<MemoryStore, StorageError> {
    let mut b = io::BufReader::new(reader);
    let format = match format {
        FileFormat::Unknown => FileFormat::sniff(b.fill_buf()?),
        f => f,
    };

    match format {
        FileFormat::Unknown | FileFormat::Xml => MemoryStore::from_records(xml::Reader::from_io(b)),

        FileFormat::XmlGz => {
            let d = flate2::read::MultiGzDecoder::new(b);
            let b = io::BufReader::new(d);
            MemoryStore::from_records(xml::Reader::from_io(b))
        }

        FileFormat::XmlBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(b);
            let b = io::BufReader::new(d);
            MemoryStore::from_records(xml::Reader::from_io(b))
        }
    }
}

/// Loads a street network from a file at the provided path.
/// [FileFormat::Unknown] is first resolved using the file extension.
pub fn load_from_file<P: AsRef<Path>>(path: P, format: FileFormat) -> Result<MemoryStore, StorageError> {
    let path = path.as_ref();
    let format = match format {
        FileFormat::Unknown => FileFormat::from_path(path),
        f => f,
    };

    log::info!("loading street network from {}", path.display());
    let f = File::open(path)?;
    load_from_io(f, format)
}

/// Loads a street network from a static buffer.
pub fn load_from_buffer(data: &[u8], format: FileFormat) -> Result<MemoryStore, StorageError> {
    let format = match format {
        FileFormat::Unknown => FileFormat::sniff(data),
        f => f,
    };

    if format == FileFormat::Xml {
        // Fast path is available for in-memory XML data
        MemoryStore::from_records(xml::Reader::from_buffer(data))
    } else {
        load_from_io(data, format)
    }
}
