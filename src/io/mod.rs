//! Boundary I/O: annotation metadata parsing and inventory persistence

pub mod annotation;
pub mod inventory;

pub use annotation::{AnnotationProvider, InMemoryAnnotations, SwathAnnotation};
pub use inventory::{
    read_burst_inventory, read_scene_inventory, write_burst_inventory, write_scene_inventory,
};
