use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::scene::SceneInfo;
use crate::types::{BurstRecord, ProcessingChainEntry, S1Result, SlaveInfo};

/// Directory layout consumed by the external processing-engine calls
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub download_dir: PathBuf,
    pub processing_dir: PathBuf,
}

/// Derive per-burst master→slave processing chains from the burst catalogue.
///
/// Rows are grouped by burst id and ordered by date; every date points to the
/// chronologically next acquisition as its slave. The last date of a series
/// has no slave, which is the terminal state, not an error.
pub fn build_processing_chain(
    inventory: &[BurstRecord],
    config: &ChainConfig,
) -> S1Result<Vec<ProcessingChainEntry>> {
    let mut by_bid: BTreeMap<&str, Vec<&BurstRecord>> = BTreeMap::new();
    for record in inventory {
        by_bid.entry(record.bid.as_str()).or_default().push(record);
    }

    let mut chain = Vec::with_capacity(inventory.len());

    for (bid, mut rows) in by_bid {
        rows.sort_by_key(|r| r.date);

        for (idx, master) in rows.iter().enumerate() {
            let master_info = SceneInfo::from_id(&master.scene_id)?;

            let slave = match rows.get(idx + 1) {
                Some(next) => {
                    let slave_info = SceneInfo::from_id(&next.scene_id)?;
                    Some(SlaveInfo {
                        date: next.date,
                        scene_id: next.scene_id.clone(),
                        file_location: slave_info.file_location(&config.download_dir),
                        burst_nr: next.burst_nr,
                        prefix: prefix(next.date, bid),
                    })
                }
                None => None,
            };

            chain.push(ProcessingChainEntry {
                bid: bid.to_string(),
                date: master.date,
                scene_id: master.scene_id.clone(),
                burst_nr: master.burst_nr,
                file_location: master_info.file_location(&config.download_dir),
                master_prefix: prefix(master.date, bid),
                out_directory: config
                    .processing_dir
                    .join(bid)
                    .join(master.date.format("%Y%m%d").to_string()),
                slave,
            });
        }
    }

    log::info!("Prepared {} processing-chain entries", chain.len());
    Ok(chain)
}

fn prefix(date: NaiveDate, bid: &str) -> String {
    format!("{}_{}", date.format("%Y%m%d"), bid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrbitDirection, Subswath};
    use geo_types::{polygon, Polygon};
    use std::path::Path;

    const SCENE_A: &str = "S1A_IW_SLC__1SDV_20200103T170815_20200103T170842_030639_0382D5_DADE";
    const SCENE_B: &str = "S1A_IW_SLC__1SDV_20200115T170815_20200115T170842_030814_0388D5_AB12";

    fn footprint() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ]
    }

    fn record(bid: &str, scene_id: &str, date: NaiveDate, burst_nr: u32) -> BurstRecord {
        BurstRecord {
            bid: bid.to_string(),
            scene_id: scene_id.to_string(),
            track: 117,
            direction: OrbitDirection::Ascending,
            date,
            swath: Subswath::IW1,
            anx_time: 12780,
            burst_nr,
            geometry: footprint(),
        }
    }

    fn config() -> ChainConfig {
        ChainConfig {
            download_dir: PathBuf::from("/data/download"),
            processing_dir: PathBuf::from("/data/processing"),
        }
    }

    #[test]
    fn test_slave_is_next_date_and_last_is_terminal() {
        let d1 = NaiveDate::from_ymd_opt(2020, 1, 3).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2020, 1, 15).unwrap();
        let inventory = vec![
            record("A117_IW1_12780", SCENE_B, d2, 3),
            record("A117_IW1_12780", SCENE_A, d1, 2),
        ];

        let chain = build_processing_chain(&inventory, &config()).unwrap();
        assert_eq!(chain.len(), 2);

        let first = &chain[0];
        assert_eq!(first.date, d1);
        assert_eq!(first.master_prefix, "20200103_A117_IW1_12780");
        assert_eq!(
            first.out_directory,
            Path::new("/data/processing/A117_IW1_12780/20200103")
        );
        let slave = first.slave.as_ref().unwrap();
        assert_eq!(slave.date, d2);
        assert_eq!(slave.scene_id, SCENE_B);
        assert_eq!(slave.burst_nr, 3);
        assert_eq!(slave.prefix, "20200115_A117_IW1_12780");
        assert_eq!(
            slave.file_location,
            Path::new(&format!("/data/download/SAR/SLC/2020/01/15/{}.zip", SCENE_B))
        );

        assert!(chain[1].slave.is_none());
    }

    #[test]
    fn test_single_date_yields_one_terminal_entry() {
        let d1 = NaiveDate::from_ymd_opt(2020, 1, 3).unwrap();
        let inventory = vec![record("A117_IW1_12780", SCENE_A, d1, 1)];

        let chain = build_processing_chain(&inventory, &config()).unwrap();
        assert_eq!(chain.len(), 1);
        assert!(chain[0].slave.is_none());
    }

    #[test]
    fn test_independent_bids_do_not_chain() {
        let d1 = NaiveDate::from_ymd_opt(2020, 1, 3).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2020, 1, 15).unwrap();
        let inventory = vec![
            record("A117_IW1_12780", SCENE_A, d1, 1),
            record("A117_IW2_12810", SCENE_B, d2, 1),
        ];

        let chain = build_processing_chain(&inventory, &config()).unwrap();
        assert_eq!(chain.len(), 2);
        assert!(chain.iter().all(|entry| entry.slave.is_none()));
    }
}
