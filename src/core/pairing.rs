use geo::Intersects;
use geo_types::{Polygon, Rect};
use std::collections::{BTreeMap, HashSet};

use crate::geometry::{bounds, bounds_union, pad_rect};
use crate::types::{BurstFootprint, Subswath};

/// Fraction of the reference width used as crop margin around a burst pair.
/// Empirically chosen; fixed for output compatibility.
const CROP_MARGIN_FRACTION: f64 = 75.0;

/// A master/slave burst pair eligible for a two-product operation,
/// with the padded bounding box for the downstream crop.
#[derive(Debug, Clone, PartialEq)]
pub struct BurstPair {
    pub master_burst_nr: u32,
    pub master_burst_id: i64,
    pub slave_burst_nr: u32,
    pub slave_burst_id: i64,
    pub bbox: Rect<f64>,
}

/// A single qualifying burst from the one-scene variant
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedBurst {
    pub burst_nr: u32,
    pub burst_id: i64,
    pub bbox: Rect<f64>,
}

/// Find all same-subswath, geometrically intersecting (master, slave) burst
/// pairs. With an AOI, both bursts must individually intersect it.
///
/// The output always carries all three sub-swath keys; a swath without
/// qualifying pairs maps to an empty list.
pub fn pair_bursts(
    master: &[BurstFootprint],
    slave: &[BurstFootprint],
    aoi: Option<&Polygon<f64>>,
) -> BTreeMap<Subswath, Vec<BurstPair>> {
    let mut pairs = empty_swath_map::<BurstPair>();
    let mut seen: HashSet<(u32, i64, u32, i64)> = HashSet::new();

    for m in master {
        for s in slave {
            if m.swath != s.swath || !m.geometry.intersects(&s.geometry) {
                continue;
            }
            if let Some(poly) = aoi {
                if !m.geometry.intersects(poly) || !s.geometry.intersects(poly) {
                    continue;
                }
            }
            if !seen.insert((m.burst_nr, m.anx_time, s.burst_nr, s.anx_time)) {
                continue;
            }

            let (mb, sb) = match (bounds(&m.geometry), bounds(&s.geometry)) {
                (Some(mb), Some(sb)) => (mb, sb),
                _ => {
                    log::debug!(
                        "skipping degenerate burst pair {}/{} in {}",
                        m.burst_nr,
                        s.burst_nr,
                        m.swath
                    );
                    continue;
                }
            };

            let union = bounds_union(mb, sb);
            pairs.entry(m.swath).or_default().push(BurstPair {
                master_burst_nr: m.burst_nr,
                master_burst_id: m.anx_time,
                slave_burst_nr: s.burst_nr,
                slave_burst_id: s.anx_time,
                bbox: pad_rect(union, crop_margin(union, aoi)),
            });
        }
    }

    pairs
}

/// One-scene variant of [`pair_bursts`]: select every burst intersecting the
/// AOI (or every burst when no AOI is given), with the same padding and
/// dedup rules.
pub fn bursts_by_polygon(
    bursts: &[BurstFootprint],
    aoi: Option<&Polygon<f64>>,
) -> BTreeMap<Subswath, Vec<SelectedBurst>> {
    let mut selected = empty_swath_map::<SelectedBurst>();
    let mut seen: HashSet<(u32, i64)> = HashSet::new();

    for b in bursts {
        if let Some(poly) = aoi {
            if !b.geometry.intersects(poly) {
                continue;
            }
        }
        if !seen.insert((b.burst_nr, b.anx_time)) {
            continue;
        }

        let rect = match bounds(&b.geometry) {
            Some(rect) => rect,
            None => {
                log::debug!("skipping degenerate burst {} in {}", b.burst_nr, b.swath);
                continue;
            }
        };

        selected.entry(b.swath).or_default().push(SelectedBurst {
            burst_nr: b.burst_nr,
            burst_id: b.anx_time,
            bbox: pad_rect(rect, crop_margin(rect, aoi)),
        });
    }

    selected
}

/// Crop margin: 1/75 of the AOI width when an AOI constrains the pairing,
/// otherwise 1/75 of the burst-bounds width.
fn crop_margin(burst_bounds: Rect<f64>, aoi: Option<&Polygon<f64>>) -> f64 {
    let width = match aoi.and_then(bounds) {
        Some(aoi_bounds) => aoi_bounds.max().x - aoi_bounds.min().x,
        None => burst_bounds.max().x - burst_bounds.min().x,
    };
    width.abs() / CROP_MARGIN_FRACTION
}

fn empty_swath_map<T>() -> BTreeMap<Subswath, Vec<T>> {
    Subswath::ALL
        .iter()
        .map(|swath| (*swath, Vec::new()))
        .collect()
}
