// Read-side helpers over the clean table: aggregate stats for charting and
// delimited-text export.

pub mod export;
pub mod stats;
