//! Core burst and coverage processing modules

pub mod burst_extract;
pub mod chain;
pub mod inventory;
pub mod pairing;
pub mod refine;

// Re-export main types
pub use burst_extract::{extract_burst_footprints, normalize_anx_time};
pub use chain::{build_processing_chain, ChainConfig};
pub use inventory::{build_burst_inventory, refine_burst_inventory};
pub use pairing::{bursts_by_polygon, pair_bursts, BurstPair, SelectedBurst};
pub use refine::{search_refinement, MosaicWindow, RefineConfig, RefinedCombination};
