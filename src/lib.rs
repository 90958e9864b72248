//! s1burst: A Fast, Modular Sentinel-1 Burst Inventory and AOI Coverage Toolkit
//!
//! This library decomposes Sentinel-1 SLC acquisitions into per-burst
//! footprints with stable cross-temporal identities, pairs bursts between
//! acquisitions for coherence processing, and refines raw scene search
//! results into the minimal set of acquisitions that fully covers an area
//! of interest, organized into mosaic date windows.

pub mod core;
pub mod geometry;
pub mod io;
pub mod scene;
pub mod types;

// Re-export main types and functions for easier access
pub use types::{
    BurstFootprint, BurstRecord, OrbitDirection, PolarisationMode, ProcessingChainEntry,
    ProductType, S1Error, S1Result, SceneRecord, SlaveInfo, Subswath, Track,
};

pub use core::{
    build_burst_inventory, build_processing_chain, bursts_by_polygon, extract_burst_footprints,
    pair_bursts, refine_burst_inventory, search_refinement, BurstPair, ChainConfig, MosaicWindow,
    RefineConfig, RefinedCombination, SelectedBurst,
};

pub use io::{AnnotationProvider, InMemoryAnnotations, SwathAnnotation};
pub use scene::SceneInfo;
