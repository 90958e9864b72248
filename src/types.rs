use chrono::{DateTime, NaiveDate, Utc};
use geo_types::Polygon;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// One repeat cycle (12 days) divided by the 175 relative orbits, in seconds.
/// Azimuth-ANX times beyond one orbital period wrap around this value.
pub const ORBITAL_PERIOD_SECONDS: f64 = 12.0 * 24.0 * 60.0 * 60.0 / 175.0;

/// Sentinel-1 IW sub-swath identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subswath {
    IW1,
    IW2,
    IW3,
}

impl Subswath {
    /// All three sub-swaths in their fixed order
    pub const ALL: [Subswath; 3] = [Subswath::IW1, Subswath::IW2, Subswath::IW3];
}

impl fmt::Display for Subswath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subswath::IW1 => write!(f, "IW1"),
            Subswath::IW2 => write!(f, "IW2"),
            Subswath::IW3 => write!(f, "IW3"),
        }
    }
}

impl FromStr for Subswath {
    type Err = S1Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "IW1" => Ok(Subswath::IW1),
            "IW2" => Ok(Subswath::IW2),
            "IW3" => Ok(Subswath::IW3),
            _ => Err(S1Error::InvalidFormat(format!("invalid sub-swath: {}", s))),
        }
    }
}

/// Orbit direction of an acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrbitDirection {
    Ascending,
    Descending,
}

impl OrbitDirection {
    /// Single-letter code used in burst ids ("A"/"D")
    pub fn letter(&self) -> char {
        match self {
            OrbitDirection::Ascending => 'A',
            OrbitDirection::Descending => 'D',
        }
    }
}

impl fmt::Display for OrbitDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrbitDirection::Ascending => write!(f, "ASCENDING"),
            OrbitDirection::Descending => write!(f, "DESCENDING"),
        }
    }
}

impl FromStr for OrbitDirection {
    type Err = S1Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ASCENDING" => Ok(OrbitDirection::Ascending),
            "DESCENDING" => Ok(OrbitDirection::Descending),
            _ => Err(S1Error::InvalidFormat(format!(
                "invalid orbit direction: {}",
                s
            ))),
        }
    }
}

/// Polarisation modes as reported by the search providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PolarisationMode {
    VV,
    VH,
    HH,
    HV,
    VVVH,
    HHHV,
}

impl fmt::Display for PolarisationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolarisationMode::VV => write!(f, "VV"),
            PolarisationMode::VH => write!(f, "VH"),
            PolarisationMode::HH => write!(f, "HH"),
            PolarisationMode::HV => write!(f, "HV"),
            PolarisationMode::VVVH => write!(f, "VV VH"),
            PolarisationMode::HHHV => write!(f, "HH HV"),
        }
    }
}

impl FromStr for PolarisationMode {
    type Err = S1Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "VV" => Ok(PolarisationMode::VV),
            "VH" => Ok(PolarisationMode::VH),
            "HH" => Ok(PolarisationMode::HH),
            "HV" => Ok(PolarisationMode::HV),
            "VV VH" => Ok(PolarisationMode::VVVH),
            "HH HV" => Ok(PolarisationMode::HHHV),
            _ => Err(S1Error::InvalidFormat(format!(
                "invalid polarisation mode: {}",
                s
            ))),
        }
    }
}

/// Sentinel-1 product type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    SLC,
    GRD,
    OCN,
    RAW,
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductType::SLC => write!(f, "SLC"),
            ProductType::GRD => write!(f, "GRD"),
            ProductType::OCN => write!(f, "OCN"),
            ProductType::RAW => write!(f, "RAW"),
        }
    }
}

impl FromStr for ProductType {
    type Err = S1Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SLC" => Ok(ProductType::SLC),
            "GRD" => Ok(ProductType::GRD),
            "OCN" => Ok(ProductType::OCN),
            "RAW" => Ok(ProductType::RAW),
            _ => Err(S1Error::InvalidFormat(format!("invalid product type: {}", s))),
        }
    }
}

/// Relative orbit (track) number, optionally split into a continuity segment.
///
/// Swath-continuity repair renames a track with missing slices into
/// `"{track}.1"`, `"{track}.2"`, ... so that downstream per-track merging
/// never spans a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Track {
    pub orbit: u16,
    pub segment: Option<u16>,
}

impl Track {
    pub fn new(orbit: u16) -> Self {
        Track {
            orbit,
            segment: None,
        }
    }

    pub fn with_segment(orbit: u16, segment: u16) -> Self {
        Track {
            orbit,
            segment: Some(segment),
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.segment {
            Some(n) => write!(f, "{}.{}", self.orbit, n),
            None => write!(f, "{}", self.orbit),
        }
    }
}

impl FromStr for Track {
    type Err = S1Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = || S1Error::InvalidFormat(format!("invalid track: {}", s));
        match s.split_once('.') {
            Some((orbit, segment)) => Ok(Track {
                orbit: orbit.parse().map_err(|_| parse_err())?,
                segment: Some(segment.parse().map_err(|_| parse_err())?),
            }),
            None => Ok(Track {
                orbit: s.parse().map_err(|_| parse_err())?,
                segment: None,
            }),
        }
    }
}

/// One row of a scene search result: a whole acquisition footprint
/// with the provider metadata needed for coverage refinement.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRecord {
    pub identifier: String,
    pub uuid: String,
    pub polarisation: PolarisationMode,
    pub orbit_direction: OrbitDirection,
    pub acquisition_date: NaiveDate,
    pub relative_orbit: Track,
    pub last_relative_orbit: u16,
    pub product_type: ProductType,
    pub slice_number: u32,
    pub size: String,
    pub begin_position: DateTime<Utc>,
    pub end_position: DateTime<Utc>,
    pub ingestion_date: DateTime<Utc>,
    pub footprint: Polygon<f64>,
}

/// One physical SAR burst within one acquisition
#[derive(Debug, Clone, PartialEq)]
pub struct BurstFootprint {
    pub scene_id: String,
    pub track: u16,
    pub date: NaiveDate,
    pub swath: Subswath,
    /// Deci-seconds since ascending-node crossing, wrapped to one orbital period
    pub anx_time: i64,
    /// 1-based burst position within the sub-swath
    pub burst_nr: u32,
    pub geometry: Polygon<f64>,
}

/// One row of the cross-temporal burst catalogue: a burst identity at one date
#[derive(Debug, Clone, PartialEq)]
pub struct BurstRecord {
    /// Stable cross-temporal burst id: direction letter + track + swath + anx time
    pub bid: String,
    pub scene_id: String,
    pub track: u16,
    pub direction: OrbitDirection,
    pub date: NaiveDate,
    pub swath: Subswath,
    pub anx_time: i64,
    pub burst_nr: u32,
    pub geometry: Polygon<f64>,
}

/// Slave half of a processing-chain entry. Absent at the last date of a
/// burst's time series.
#[derive(Debug, Clone, PartialEq)]
pub struct SlaveInfo {
    pub date: NaiveDate,
    pub scene_id: String,
    pub file_location: PathBuf,
    pub burst_nr: u32,
    pub prefix: String,
}

/// One master→slave step of a per-burst interferometric processing chain
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingChainEntry {
    pub bid: String,
    pub date: NaiveDate,
    pub scene_id: String,
    pub burst_nr: u32,
    pub file_location: PathBuf,
    pub master_prefix: String,
    pub out_directory: PathBuf,
    pub slave: Option<SlaveInfo>,
}

/// Error types for inventory and coverage processing
#[derive(Debug, thiserror::Error)]
pub enum S1Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("XML parsing error: {0}")]
    XmlParsing(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Required input missing: {0}")]
    MissingInput(String),

    #[error("Invalid inventory: {0}")]
    InvalidInventory(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

/// Result type for inventory and coverage operations
pub type S1Result<T> = Result<T, S1Error>;
