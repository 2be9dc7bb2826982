use crate::report::*;

use snafu::prelude::*;
use std::fs;

use election_results::{AggregationRules, ZeroVotePolicy};
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "reportName")]
    pub report_name: String,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    #[serde(rename = "csvPath")]
    pub csv_path: Option<String>,
    #[serde(rename = "includeCharts")]
    pub include_charts: Option<bool>,
}

/// The header of the generated report.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub report: String,
    #[serde(rename = "generatedBy")]
    pub generated_by: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "statisticsFilePath")]
    pub statistics_file_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ReportRules {
    #[serde(rename = "zeroVotePolicy")]
    pub zero_vote_policy: Option<String>,
    #[serde(rename = "flagOvercount")]
    pub flag_overcount: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "snapshotSources")]
    pub snapshot_sources: Vec<SnapshotSource>,
    pub rules: Option<ReportRules>,
}

pub fn read_config(path: &str) -> ReportResult<ReportConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(&contents).context(ParsingJsonSnafu { path })
}

pub fn read_summary(path: &str) -> ReportResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}

fn parse_zero_vote_policy(s: &str) -> ReportResult<ZeroVotePolicy> {
    match s {
        "noWinner" => Ok(ZeroVotePolicy::NoWinner),
        "allTied" => Ok(ZeroVotePolicy::AllTied),
        x => UnknownPolicySnafu { value: x }.fail(),
    }
}

/// The aggregation rules. The policy passed on the command line takes
/// precedence over the one of the configuration.
pub fn validate_rules(
    rules: Option<&ReportRules>,
    zero_vote_policy_flag: Option<&str>,
) -> ReportResult<AggregationRules> {
    let mut res = AggregationRules::DEFAULT_RULES;
    let policy = zero_vote_policy_flag.or_else(|| rules.and_then(|r| r.zero_vote_policy.as_deref()));
    if let Some(p) = policy {
        res.zero_vote_policy = parse_zero_vote_policy(p)?;
    }
    if let Some(flag) = rules.and_then(|r| r.flag_overcount) {
        res.flag_overcount = flag;
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_config() {
        let js = r#"{
            "outputSettings": { "reportName": "SSG 2024", "includeCharts": true },
            "snapshotSources": [ { "provider": "json", "filePath": "snap.json" } ]
        }"#;
        let c: ReportConfig = serde_json::from_str(js).unwrap();
        assert_eq!(c.output_settings.report_name, "SSG 2024");
        assert_eq!(c.output_settings.output_path, None);
        assert_eq!(c.snapshot_sources[0].statistics_file_path, None);
        assert_eq!(c.rules, None);
    }

    #[test]
    fn default_rules() {
        assert_eq!(
            validate_rules(None, None).unwrap(),
            AggregationRules::DEFAULT_RULES
        );
    }

    #[test]
    fn unknown_policy() {
        let rules = ReportRules {
            zero_vote_policy: Some("coinFlip".to_string()),
            flag_overcount: None,
        };
        assert!(matches!(
            validate_rules(Some(&rules), None),
            Err(ReportError::UnknownPolicy { .. })
        ));
    }
}
