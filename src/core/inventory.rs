use geo::Intersects;
use geo_types::Polygon;
use rayon::prelude::*;
use std::collections::HashSet;

use crate::core::burst_extract::extract_burst_footprints;
use crate::geometry::buffered_envelope;
use crate::io::annotation::AnnotationProvider;
use crate::scene::SceneInfo;
use crate::types::{BurstRecord, S1Result, SceneRecord, Subswath};

/// Burst footprints are narrow; the AOI is expanded by this margin before
/// the burst-level overlap filter so edge bursts are not clipped away.
const AOI_BUFFER_DEGREES: f64 = 0.05;

/// Build the cross-temporal burst catalogue from a scene inventory.
///
/// Every scene is decomposed into per-subswath burst footprints, near
/// duplicate ANX times are coalesced to one canonical value, and each row
/// gets its stable burst id. With an AOI, the catalogue is additionally
/// refined (see [`refine_burst_inventory`]).
pub fn build_burst_inventory<P>(
    scenes: &[SceneRecord],
    provider: &P,
    aoi: Option<&Polygon<f64>>,
    coverages: Option<usize>,
) -> S1Result<Vec<BurstRecord>>
where
    P: AnnotationProvider + Sync,
{
    // Extraction is pure per scene, so scenes are processed in parallel
    let per_scene: Vec<Vec<BurstRecord>> = scenes
        .par_iter()
        .map(|scene| extract_scene_bursts(scene, provider))
        .collect::<S1Result<_>>()?;

    let mut inventory: Vec<BurstRecord> = per_scene.into_iter().flatten().collect();

    coalesce_anx_times(&mut inventory);

    for record in &mut inventory {
        record.bid = burst_id(record);
    }

    log::info!(
        "Built burst inventory with {} rows from {} scenes",
        inventory.len(),
        scenes.len()
    );

    match aoi {
        Some(aoi) => refine_burst_inventory(aoi, inventory, coverages),
        None => Ok(inventory),
    }
}

/// Refine the burst catalogue against the AOI: keep only bursts overlapping
/// the buffered AOI, drop duplicate `(scene, date, bid)` rows, and remove
/// every bid whose acquisition count does not match the expected number of
/// coverages (incomplete time series are removed, never padded).
pub fn refine_burst_inventory(
    aoi: &Polygon<f64>,
    inventory: Vec<BurstRecord>,
    coverages: Option<usize>,
) -> S1Result<Vec<BurstRecord>> {
    let buffered_aoi = buffered_envelope(aoi, AOI_BUFFER_DEGREES)?;

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut refined: Vec<BurstRecord> = inventory
        .into_iter()
        .filter(|record| record.geometry.intersects(&buffered_aoi))
        .filter(|record| {
            seen.insert((
                record.scene_id.clone(),
                format!("{}_{}", record.date, record.bid),
            ))
        })
        .collect();

    if let Some(expected) = coverages {
        let bids: Vec<String> = {
            let mut bids: Vec<String> = refined.iter().map(|r| r.bid.clone()).collect();
            bids.sort();
            bids.dedup();
            bids
        };
        for bid in bids {
            let count = refined.iter().filter(|r| r.bid == bid).count();
            if count != expected {
                log::info!(
                    "Removing burst {} because of insufficient coverage ({} of {})",
                    bid,
                    count,
                    expected
                );
                refined.retain(|r| r.bid != bid);
            }
        }
    }

    log::info!("{} burst rows remain after AOI refinement", refined.len());
    Ok(refined)
}

fn extract_scene_bursts<P>(scene: &SceneRecord, provider: &P) -> S1Result<Vec<BurstRecord>>
where
    P: AnnotationProvider,
{
    let info = SceneInfo::from_id(&scene.identifier)?;
    log::info!("Getting burst info from {}", scene.identifier);

    let mut records = Vec::new();
    for swath in Subswath::ALL {
        let annotation = provider.subswath_annotation(&scene.identifier, swath)?;
        let footprints = extract_burst_footprints(
            &scene.identifier,
            info.relative_orbit,
            scene.acquisition_date,
            &annotation,
        );
        records.extend(footprints.into_iter().map(|fp| BurstRecord {
            bid: String::new(), // assigned after ANX coalescing
            scene_id: fp.scene_id,
            track: fp.track,
            direction: scene.orbit_direction,
            date: fp.date,
            swath: fp.swath,
            anx_time: fp.anx_time,
            burst_nr: fp.burst_nr,
            geometry: fp.geometry,
        }));
    }
    Ok(records)
}

/// Collapse ANX times that differ by at most one deci-second onto a single
/// canonical value, so orbital jitter between repeat passes cannot split a
/// physical burst into two ids. Values are processed in ascending order to
/// keep the result reproducible.
fn coalesce_anx_times(inventory: &mut [BurstRecord]) {
    let mut values: Vec<i64> = inventory.iter().map(|r| r.anx_time).collect();
    values.sort_unstable();
    values.dedup();

    for value in values {
        for record in inventory.iter_mut() {
            if record.anx_time != value && (record.anx_time - value).abs() <= 1 {
                record.anx_time = value;
            }
        }
    }
}

fn burst_id(record: &BurstRecord) -> String {
    format!(
        "{}{}_{}_{}",
        record.direction.letter(),
        record.track,
        record.swath,
        record.anx_time
    )
}
