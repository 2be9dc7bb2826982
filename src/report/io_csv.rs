// Flat CSV table of the results, one row per candidate.

use crate::report::*;

use log::{debug, info};
use snafu::prelude::*;

use election_results::{ElectionReport, ABSTAIN_LABEL};

const HEADER: [&str; 9] = [
    "position_id",
    "position_name",
    "rank",
    "candidate_id",
    "name",
    "partylist",
    "votes",
    "percentage",
    "winner",
];

pub fn results_table_rows(report: &ElectionReport) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    for p in report.position_results.iter() {
        let res = &p.result;
        for (idx, c) in res.candidates_ranked.iter().enumerate() {
            let is_winner = res.winners.iter().any(|w| w.candidate_id == c.candidate_id);
            rows.push(vec![
                p.position_id.to_string(),
                p.position_name.clone(),
                (idx + 1).to_string(),
                c.candidate_id.to_string(),
                c.name.clone(),
                c.partylist.clone(),
                c.votes.to_string(),
                format!("{:.2}", c.percentage),
                is_winner.to_string(),
            ]);
        }
        if res.abstain_count > 0 {
            rows.push(vec![
                p.position_id.to_string(),
                p.position_name.clone(),
                "".to_string(),
                "".to_string(),
                ABSTAIN_LABEL.to_string(),
                "".to_string(),
                res.abstain_count.to_string(),
                format!("{:.2}", res.abstain_percentage),
                false.to_string(),
            ]);
        }
    }
    rows
}

pub fn write_results_table(path: &str, report: &ElectionReport) -> ReportResult<()> {
    info!("Writing results table to {:?}", path);
    let mut wtr = csv::Writer::from_path(path).context(CsvWriteSnafu { path })?;
    wtr.write_record(HEADER).context(CsvWriteSnafu { path })?;
    for row in results_table_rows(report) {
        debug!("write_results_table: {:?}", row);
        wtr.write_record(&row).context(CsvWriteSnafu { path })?;
    }
    wtr.flush().context(WritingFileSnafu { path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use election_results::{compute_election_report, Candidate, Election, ElectionStatus, Position};

    #[test]
    fn table_rows() {
        let election = Election {
            id: 2,
            name: "Council".to_string(),
            status: ElectionStatus::Completed,
            total_voters: 20,
            votes_cast: 15,
            turnout_percentage: 75.0,
        };
        let positions = vec![Position {
            position_id: 5,
            position_name: "Mayor".to_string(),
            candidates: vec![
                Candidate {
                    candidate_id: 1,
                    name: "Anna".to_string(),
                    partylist: Some("Blue".to_string()),
                    votes: 4,
                },
                Candidate {
                    candidate_id: 2,
                    name: "Bob".to_string(),
                    partylist: None,
                    votes: 8,
                },
            ],
        }];
        let report = compute_election_report(&election, &positions).unwrap();
        let rows = results_table_rows(&report);
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            vec!["5", "Mayor", "1", "2", "Bob", "Independent", "8", "53.33", "true"]
        );
        assert_eq!(
            rows[1],
            vec!["5", "Mayor", "2", "1", "Anna", "Blue", "4", "26.67", "false"]
        );
        assert_eq!(
            rows[2],
            vec!["5", "Mayor", "", "", "Abstains", "", "3", "20.00", "false"]
        );
    }
}
