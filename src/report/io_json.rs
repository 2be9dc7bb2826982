// Readers for the documents sent by the backend.

use crate::report::*;

use serde_json::Value as JSValue;
use snafu::prelude::*;
use std::fs;

use election_results::snapshot::parse_snapshot;
use election_results::turnout::ElectionStatistics;
use election_results::ElectionSnapshot;
use log::{debug, info};

pub fn read_snapshot(path: &str) -> ReportResult<ElectionSnapshot> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    let snapshot = parse_snapshot(&js).context(AggregationSnafu { path })?;
    debug!(
        "read_snapshot: {:?}: {} positions",
        path,
        snapshot.results.len()
    );
    Ok(snapshot)
}

pub fn read_statistics(path: &str) -> ReportResult<ElectionStatistics> {
    info!("Attempting to read statistics {:?}", path);
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}
