use serde::Deserialize;

#[derive(Deserialize)]
pub struct GetStats {
    pub total_entries: u64,
    pub duplicates_count: u64,
    pub discarded_count: u64,
}
