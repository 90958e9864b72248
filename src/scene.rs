//! Metadata derived from a Sentinel-1 scene identifier.
//!
//! A product identifier such as
//! `S1A_IW_SLC__1SDV_20200103T170815_20200103T170842_030639_0382D5_DADE`
//! encodes mission, mode, product type, polarisation, sensing times and the
//! absolute orbit. The relative orbit (track) is derived from the absolute
//! orbit with the per-satellite offset.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::types::{PolarisationMode, ProductType, S1Error, S1Result};

const SCENE_ID_PATTERN: &str = r"^S1[AB]_(IW|EW|WV|S[1-6])_(SLC_|GRD[FHM]|OCN_|RAW_)_[0-2]S(SH|SV|DH|DV)_\d{8}T\d{6}_\d{8}T\d{6}_\d{6}_[0-9A-F]{6}_[0-9A-F]{4}$";

/// Relative-orbit offsets per satellite, from the absolute-orbit convention
/// published on the ESA STEP forum.
const S1A_ORBIT_OFFSET: u32 = 73;
const S1B_ORBIT_OFFSET: u32 = 27;

/// Metadata carried by a Sentinel-1 scene identifier
#[derive(Debug, Clone, PartialEq)]
pub struct SceneInfo {
    pub scene_id: String,
    pub mission: String,
    pub mode: String,
    pub product_type: ProductType,
    pub polarisation: PolarisationMode,
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    pub absolute_orbit: u32,
    pub relative_orbit: u16,
    pub data_take_id: String,
    /// Reprocessing-dependent suffix; everything before it identifies
    /// the physical acquisition
    pub unique_id: String,
}

impl SceneInfo {
    /// Parse a scene identifier into its metadata fields
    pub fn from_id(scene_id: &str) -> S1Result<Self> {
        let pattern = Regex::new(SCENE_ID_PATTERN)
            .map_err(|e| S1Error::InvalidFormat(format!("scene id pattern: {}", e)))?;
        if !pattern.is_match(scene_id) {
            return Err(S1Error::InvalidFormat(format!(
                "not a Sentinel-1 scene identifier: {}",
                scene_id
            )));
        }

        let mission = &scene_id[0..3];
        let mode = &scene_id[4..6];
        let product_type: ProductType = scene_id[7..10].parse()?;
        let polarisation = match &scene_id[14..16] {
            "SV" => PolarisationMode::VV,
            "SH" => PolarisationMode::HH,
            "DV" => PolarisationMode::VVVH,
            "DH" => PolarisationMode::HHHV,
            other => {
                return Err(S1Error::InvalidFormat(format!(
                    "unknown polarisation code: {}",
                    other
                )))
            }
        };

        let start = parse_compact_timestamp(&scene_id[17..32])?;
        let stop = parse_compact_timestamp(&scene_id[33..48])?;

        let absolute_orbit: u32 = scene_id[49..55]
            .parse()
            .map_err(|_| S1Error::InvalidFormat(format!("invalid orbit in {}", scene_id)))?;

        let orbit_offset = match mission {
            "S1A" => S1A_ORBIT_OFFSET,
            _ => S1B_ORBIT_OFFSET,
        };
        let relative_orbit = ((absolute_orbit + 175 - orbit_offset) % 175 + 1) as u16;

        Ok(SceneInfo {
            scene_id: scene_id.to_string(),
            mission: mission.to_string(),
            mode: mode.to_string(),
            product_type,
            polarisation,
            start,
            stop,
            absolute_orbit,
            relative_orbit,
            data_take_id: scene_id[57..62].to_string(),
            unique_id: scene_id[63..].to_string(),
        })
    }

    /// Acquisition date (start of sensing)
    pub fn acquisition_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Expected download location of the scene archive, following the
    /// `SAR/{product_type}/{year}/{month}/{day}` download layout
    pub fn file_location(&self, download_dir: &Path) -> PathBuf {
        download_dir
            .join("SAR")
            .join(self.product_type.to_string())
            .join(self.start.format("%Y").to_string())
            .join(self.start.format("%m").to_string())
            .join(self.start.format("%d").to_string())
            .join(format!("{}.zip", self.scene_id))
    }
}

fn parse_compact_timestamp(value: &str) -> S1Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
        .map(|dt| dt.and_utc())
        .map_err(|e| S1Error::InvalidFormat(format!("invalid timestamp {}: {}", value, e)))
}
