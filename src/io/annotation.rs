use crate::types::{S1Error, S1Result, Subswath};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::collections::HashMap;

/// Subset of the Sentinel-1 annotation XML needed for burst footprints.
/// This represents the root <product> element directly.
#[derive(Debug, Deserialize)]
pub struct AnnotationRoot {
    #[serde(rename = "adsHeader")]
    pub ads_header: AdsHeader,
    #[serde(rename = "swathTiming")]
    pub swath_timing: SwathTiming,
    #[serde(rename = "geolocationGrid")]
    pub geolocation_grid: GeolocationGrid,
}

#[derive(Debug, Deserialize)]
pub struct AdsHeader {
    #[serde(rename = "swath")]
    pub swath: String,
}

#[derive(Debug, Deserialize)]
pub struct SwathTiming {
    #[serde(rename = "linesPerBurst")]
    pub lines_per_burst: i64,
    #[serde(rename = "samplesPerBurst")]
    pub samples_per_burst: i64,
    #[serde(rename = "burstList")]
    pub burst_list: BurstList,
}

#[derive(Debug, Deserialize)]
pub struct BurstList {
    #[serde(rename = "burst", default)]
    pub bursts: Vec<BurstTiming>,
}

#[derive(Debug, Deserialize)]
pub struct BurstTiming {
    #[serde(rename = "azimuthAnxTime")]
    pub azimuth_anx_time: f64,
}

#[derive(Debug, Deserialize)]
pub struct GeolocationGrid {
    #[serde(rename = "geolocationGridPointList")]
    pub point_list: GeolocationGridPointList,
}

#[derive(Debug, Deserialize)]
pub struct GeolocationGridPointList {
    #[serde(rename = "geolocationGridPoint", default)]
    pub points: Vec<GeolocationGridPoint>,
}

/// One geolocation-grid entry, keyed by its (line, pixel) position
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct GeolocationGridPoint {
    pub line: i64,
    pub pixel: i64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Parsed per-subswath annotation, decoupled from the XML layout.
/// This is the input contract of the burst footprint extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct SwathAnnotation {
    pub swath: Subswath,
    pub lines_per_burst: i64,
    pub samples_per_burst: i64,
    /// Raw azimuth-ANX time per burst, in seconds
    pub burst_anx_times: Vec<f64>,
    pub grid: Vec<GeolocationGridPoint>,
}

impl SwathAnnotation {
    /// Parse annotation XML into the extractor input
    pub fn from_xml(xml_content: &str) -> S1Result<Self> {
        let root: AnnotationRoot = from_str(xml_content)
            .map_err(|e| S1Error::XmlParsing(format!("failed to parse annotation XML: {}", e)))?;

        let swath: Subswath = root.ads_header.swath.parse()?;

        Ok(SwathAnnotation {
            swath,
            lines_per_burst: root.swath_timing.lines_per_burst,
            samples_per_burst: root.swath_timing.samples_per_burst,
            burst_anx_times: root
                .swath_timing
                .burst_list
                .bursts
                .iter()
                .map(|b| b.azimuth_anx_time)
                .collect(),
            grid: root.geolocation_grid.point_list.points,
        })
    }
}

/// Boundary contract toward the annotation source (local archive, extracted
/// directory or remote endpoint). The core never opens scene files itself.
pub trait AnnotationProvider {
    /// Annotation for one `(scene, subswath)` pair. A missing scene must be
    /// reported as [`S1Error::MissingInput`].
    fn subswath_annotation(&self, scene_id: &str, swath: Subswath) -> S1Result<SwathAnnotation>;
}

/// Annotation provider backed by pre-parsed annotations, keyed by scene id.
/// Used by orchestrators that extract annotation files up front, and by tests.
#[derive(Debug, Default)]
pub struct InMemoryAnnotations {
    annotations: HashMap<(String, Subswath), SwathAnnotation>,
}

impl InMemoryAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, scene_id: &str, annotation: SwathAnnotation) {
        self.annotations
            .insert((scene_id.to_string(), annotation.swath), annotation);
    }
}

impl AnnotationProvider for InMemoryAnnotations {
    fn subswath_annotation(&self, scene_id: &str, swath: Subswath) -> S1Result<SwathAnnotation> {
        self.annotations
            .get(&(scene_id.to_string(), swath))
            .cloned()
            .ok_or_else(|| {
                S1Error::MissingInput(format!("no {} annotation for scene {}", swath, scene_id))
            })
    }
}
