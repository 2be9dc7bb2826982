use log::{debug, info, warn};

use election_results::turnout::{department_series, turnout_breakdown, ElectionStatistics};
use election_results::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::report::config_reader::*;
use crate::report::io_common::{resolve_path, simplify_file_name};

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_json;

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing the report"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing CSV table {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Error in the election data of {path}: {source}"))]
    Aggregation {
        source: AggregationError,
        path: String,
    },
    #[snafu(display("No snapshot: pass --input or add an entry to snapshotSources"))]
    MissingSource {},
    #[snafu(display("Snapshot provider {provider:?} is not supported (only json is)"))]
    UnsupportedProvider { provider: String },
    #[snafu(display("Unknown zero vote policy {value:?}: expected noWinner or allTied"))]
    UnknownPolicy { value: String },
    #[snafu(display("Difference detected between computed report and reference summary"))]
    ReferenceMismatch {},
}

pub type ReportResult<T> = Result<T, ReportError>;

const STDOUT: &str = "stdout";

fn position_to_json(p: &PositionReport, include_charts: bool) -> ReportResult<JSValue> {
    let mut js = serde_json::to_value(p).context(SerializingJsonSnafu {})?;
    if include_charts {
        let charts = build_chart_series(&p.result);
        js["charts"] = serde_json::to_value(charts).context(SerializingJsonSnafu {})?;
    }
    Ok(js)
}

fn build_summary_js(
    c: &OutputConfig,
    report: &ElectionReport,
    include_charts: bool,
    statistics: Option<&ElectionStatistics>,
) -> ReportResult<JSValue> {
    let mut results: Vec<JSValue> = Vec::new();
    for p in report.position_results.iter() {
        results.push(position_to_json(p, include_charts)?);
    }
    let statistics_js = match statistics {
        Some(stats) => {
            serde_json::to_value(department_series(stats)).context(SerializingJsonSnafu {})?
        }
        None => JSValue::Null,
    };
    Ok(json!({
        "config": c,
        "election": report.election,
        "results": results,
        "turnout": turnout_breakdown(&report.election),
        "statistics": statistics_js,
        "warnings": report.warnings,
    }))
}

fn write_output(out: &str, contents: &str) -> ReportResult<()> {
    if out == STDOUT {
        println!("{}", contents);
        Ok(())
    } else {
        info!("Writing report to {:?}", out);
        fs::write(out, contents).context(WritingFileSnafu { path: out })
    }
}

/// The paths and settings of one run, once the configuration file and the
/// command line flags have been merged.
#[derive(Eq, PartialEq, Debug, Clone)]
struct RunSettings {
    output_config: OutputConfig,
    snapshot_path: String,
    statistics_path: Option<String>,
    out: String,
    csv_path: Option<String>,
    include_charts: bool,
    rules: AggregationRules,
}

fn merge_settings(args: &Args, config: Option<(&ReportConfig, &str)>) -> ReportResult<RunSettings> {
    let source: Option<&SnapshotSource> = config.and_then(|(c, _)| c.snapshot_sources.first());
    if let Some(s) = source {
        ensure!(
            s.provider == "json",
            UnsupportedProviderSnafu {
                provider: s.provider.clone()
            }
        );
    }
    let root = config.map(|(_, root)| root);
    let from_config = |p: &Option<String>| -> Option<String> {
        match (p, root) {
            (Some(p), Some(root)) => Some(resolve_path(root, p)),
            _ => None,
        }
    };

    let snapshot_path = match (&args.input, source) {
        (Some(p), _) => p.clone(),
        (None, Some(s)) => from_config(&Some(s.file_path.clone())).unwrap_or_default(),
        (None, None) => return MissingSourceSnafu {}.fail(),
    };
    let statistics_path = args
        .statistics
        .clone()
        .or_else(|| source.and_then(|s| from_config(&s.statistics_file_path)));

    let output_settings = config.map(|(c, _)| &c.output_settings);
    let out = args
        .out
        .clone()
        .or_else(|| output_settings.and_then(|o| from_config(&o.output_path)))
        .unwrap_or_else(|| STDOUT.to_string());
    let csv_path = args
        .csv
        .clone()
        .or_else(|| output_settings.and_then(|o| from_config(&o.csv_path)));
    let include_charts = output_settings
        .and_then(|o| o.include_charts)
        .unwrap_or(false);
    let report_name = output_settings
        .map(|o| o.report_name.clone())
        .unwrap_or_else(|| simplify_file_name(snapshot_path.as_str()));

    let rules = validate_rules(
        config.and_then(|(c, _)| c.rules.as_ref()),
        args.zero_vote_policy.as_deref(),
    )?;

    Ok(RunSettings {
        output_config: OutputConfig {
            report: report_name,
            generated_by: env!("CARGO_PKG_NAME").to_string(),
        },
        snapshot_path,
        statistics_path,
        out,
        csv_path,
        include_charts,
        rules,
    })
}

pub fn run_report(args: &Args) -> ReportResult<()> {
    let config_data: Option<(ReportConfig, String)> = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            info!("config: {:?}", config);
            Some((config, io_common::parent_dir(config_path)))
        }
        None => None,
    };
    let settings = merge_settings(
        args,
        config_data.as_ref().map(|(c, root)| (c, root.as_str())),
    )?;
    debug!("run_report: settings: {:?}", settings);

    info!("Attempting to read snapshot {:?}", settings.snapshot_path);
    let snapshot = io_json::read_snapshot(&settings.snapshot_path)?;
    let statistics = match &settings.statistics_path {
        Some(p) => Some(io_json::read_statistics(p)?),
        None => None,
    };

    let report =
        compute_election_report_with_rules(&snapshot.election, &snapshot.results, &settings.rules)
            .context(AggregationSnafu {
                path: settings.snapshot_path.clone(),
            })?;
    if !report.warnings.is_empty() {
        warn!(
            "{} data quality warnings in {:?}",
            report.warnings.len(),
            settings.snapshot_path
        );
    }

    // Assemble the final json
    let result_js = build_summary_js(
        &settings.output_config,
        &report,
        settings.include_charts,
        statistics.as_ref(),
    )?;
    let pretty_js_stats =
        serde_json::to_string_pretty(&result_js).context(SerializingJsonSnafu {})?;
    write_output(&settings.out, &pretty_js_stats)?;

    if let Some(csv_path) = &settings.csv_path {
        io_csv::write_results_table(csv_path, &report)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(SerializingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return ReferenceMismatchSnafu {}.fail();
        }
        info!("The report matches the reference {:?}", summary_p);
    }
    Ok(())
}

#[cfg(test)]
fn run_report_test(test_name: &str, config_lpath: &str, summary_lpath: &str) -> ReportResult<()> {
    let test_dir = option_env!("TALLYBOARD_TEST_DIR")
        .unwrap_or(concat!(env!("CARGO_MANIFEST_DIR"), "/tests"));
    info!("Running test {}", test_name);
    let args = Args {
        config: Some(format!("{}/{}/{}", test_dir, test_name, config_lpath)),
        reference: Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath)),
        ..Args::default()
    };
    run_report(&args)
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) {
    let res = run_report_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    );
    if let Err(e) = res {
        panic!("test {} failed: {}", test_name, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(sources: Vec<SnapshotSource>, rules: Option<ReportRules>) -> ReportConfig {
        ReportConfig {
            output_settings: OutputSettings {
                report_name: "Council".to_string(),
                output_path: Some("out/report.json".to_string()),
                csv_path: None,
                include_charts: Some(true),
            },
            snapshot_sources: sources,
            rules,
        }
    }

    fn json_source(path: &str) -> SnapshotSource {
        SnapshotSource {
            provider: "json".to_string(),
            file_path: path.to_string(),
            statistics_file_path: Some("stats.json".to_string()),
        }
    }

    #[test]
    fn basic_election() {
        test_wrapper("basic_election");
    }

    #[test]
    fn settings_from_config() {
        let c = config(vec![json_source("snap.json")], None);
        let s = merge_settings(&Args::default(), Some((&c, "/data/council"))).unwrap();
        assert_eq!(s.snapshot_path, "/data/council/snap.json");
        assert_eq!(s.statistics_path, Some("/data/council/stats.json".to_string()));
        assert_eq!(s.out, "/data/council/out/report.json");
        assert_eq!(s.output_config.report, "Council");
        assert!(s.include_charts);
        assert_eq!(s.rules, AggregationRules::DEFAULT_RULES);
    }

    #[test]
    fn flags_override_config() {
        let c = config(
            vec![json_source("snap.json")],
            Some(ReportRules {
                zero_vote_policy: Some("noWinner".to_string()),
                flag_overcount: Some(false),
            }),
        );
        let args = Args {
            input: Some("other.json".to_string()),
            out: Some("stdout".to_string()),
            zero_vote_policy: Some("allTied".to_string()),
            ..Args::default()
        };
        let s = merge_settings(&args, Some((&c, "/data"))).unwrap();
        assert_eq!(s.snapshot_path, "other.json");
        assert_eq!(s.out, STDOUT);
        assert_eq!(s.rules.zero_vote_policy, ZeroVotePolicy::AllTied);
        assert!(!s.rules.flag_overcount);
    }

    #[test]
    fn settings_without_config() {
        let args = Args {
            input: Some("data/ssg_2024.json".to_string()),
            ..Args::default()
        };
        let s = merge_settings(&args, None).unwrap();
        assert_eq!(s.output_config.report, "ssg_2024.json");
        assert_eq!(s.out, STDOUT);
        assert_eq!(s.csv_path, None);
        assert!(!s.include_charts);
    }

    #[test]
    fn settings_need_a_source() {
        let res = merge_settings(&Args::default(), None);
        assert!(matches!(res, Err(ReportError::MissingSource {})));
    }

    #[test]
    fn unsupported_provider() {
        let mut source = json_source("snap.xlsx");
        source.provider = "excel".to_string();
        let c = config(vec![source], None);
        let res = merge_settings(&Args::default(), Some((&c, "/data")));
        assert!(matches!(res, Err(ReportError::UnsupportedProvider { .. })));
    }
}
