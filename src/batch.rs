//! Batch conversion of many records.
//!
//! Records are converted in parallel with rayon. Results stay associated with
//! their input index, and a failing record never aborts the rest of the batch.

use rayon::prelude::*;
use serde_json::Value;
use tracing::{info, trace, warn};

use crate::codec::EwkbCodec;
use crate::error::ConversionError;

/// Outcome of converting a batch of records.
#[derive(Debug)]
pub struct BatchReport {
    /// One result per input record, in input order.
    pub results: Vec<Result<Option<Value>, ConversionError>>,
    /// Records that produced a geometry.
    pub converted: usize,
    /// Records with no geometry.
    pub empty: usize,
    /// Records that failed to convert.
    pub failed: usize,
}

impl BatchReport {
    /// Returns the geometries in input order, with `None` for records that
    /// were empty or failed.
    pub fn geometries(&self) -> Vec<Option<&Value>> {
        self.results
            .iter()
            .map(|result| result.as_ref().ok().and_then(Option::as_ref))
            .collect()
    }

    /// Returns true if any record failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Converts every record, tallying successes, empty records and failures.
pub fn convert_batch<S>(codec: &EwkbCodec, records: &[Option<S>]) -> BatchReport
where
    S: AsRef<str> + Sync,
{
    let results: Vec<_> = records
        .par_iter()
        .map(|record| codec.convert(record.as_ref().map(|s| AsRef::<str>::as_ref(s))))
        .collect();

    let mut report = BatchReport {
        results: Vec::new(),
        converted: 0,
        empty: 0,
        failed: 0,
    };

    for (index, result) in results.iter().enumerate() {
        match result {
            Ok(Some(value)) => {
                trace!("Record {}: {}", index, value["type"]);
                report.converted += 1;
            }
            Ok(None) => {
                trace!("Record {}: no geometry", index);
                report.empty += 1;
            }
            Err(e) => {
                warn!("Record {}: {} ({})", index, e, e.cause);
                report.failed += 1;
            }
        }
    }

    info!(
        "Converted {} records: {} geometries, {} empty, {} failed",
        results.len(),
        report.converted,
        report.empty,
        report.failed
    );

    report.results = results;
    report
}
