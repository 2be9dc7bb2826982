//! Turnout figures of an election.
//!
//! Turnout percentages come from the backend and are passed through. Only the
//! share of registered voters who did not vote is derived here.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JSValue;

use crate::config::Election;
use crate::percentage_of;

pub const VOTES_CAST_LABEL: &str = "Votes Cast";
pub const NON_VOTES_LABEL: &str = "Non-Votes";

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct TurnoutSlice {
    pub label: String,
    pub value: i64,
    pub percentage: f64,
}

/// The "votes cast" and "non-votes" slices of the turnout chart.
///
/// A slice with a negative value (inconsistent upstream figures) is left out.
pub fn turnout_breakdown(election: &Election) -> Vec<TurnoutSlice> {
    let total = i128::from(election.total_voters);
    let cast = i128::from(election.votes_cast);
    let non_votes = total - cast;
    let non_votes_percentage = if non_votes >= 0 {
        percentage_of(non_votes as u64, election.total_voters)
    } else {
        0.0
    };
    let slices = vec![
        TurnoutSlice {
            label: VOTES_CAST_LABEL.to_string(),
            value: election.votes_cast,
            percentage: election.turnout_percentage,
        },
        TurnoutSlice {
            label: NON_VOTES_LABEL.to_string(),
            value: non_votes.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64,
            percentage: non_votes_percentage,
        },
    ];
    slices.into_iter().filter(|s| s.value >= 0).collect()
}

/// Participation statistics of an election, broken down by department.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionStatistics {
    pub total_eligible_voters: u64,
    pub total_voted: u64,
    #[serde(deserialize_with = "lenient_f64")]
    pub overall_turnout_percentage: f64,
    #[serde(default)]
    pub department_turnout: Vec<DepartmentTurnout>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentTurnout {
    pub department_id: u64,
    pub department_name: String,
    pub eligible_voters: u64,
    pub voted_count: u64,
    #[serde(deserialize_with = "lenient_f64")]
    pub department_turnout_percentage: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub votes_distribution_percentage: f64,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct DepartmentBar {
    pub name: String,
    pub eligible: u64,
    pub voted: u64,
    pub turnout_percentage: f64,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct DistributionSlice {
    pub name: String,
    pub value: f64,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct DepartmentSeries {
    pub total_eligible_voters: u64,
    pub total_voted: u64,
    pub overall_turnout_percentage: f64,
    pub bar: Vec<DepartmentBar>,
    pub pie: Vec<DistributionSlice>,
}

/// Per-department series, in the order of the statistics.
pub fn department_series(stats: &ElectionStatistics) -> DepartmentSeries {
    DepartmentSeries {
        total_eligible_voters: stats.total_eligible_voters,
        total_voted: stats.total_voted,
        overall_turnout_percentage: stats.overall_turnout_percentage,
        bar: stats
            .department_turnout
            .iter()
            .map(|d| DepartmentBar {
                name: d.department_name.clone(),
                eligible: d.eligible_voters,
                voted: d.voted_count,
                turnout_percentage: d.department_turnout_percentage,
            })
            .collect(),
        pie: stats
            .department_turnout
            .iter()
            .map(|d| DistributionSlice {
                name: d.department_name.clone(),
                value: d.votes_distribution_percentage,
            })
            .collect(),
    }
}

// Percentages are sent either as numbers or as decimal strings ("42.50").
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let js = JSValue::deserialize(deserializer)?;
    let x = match &js {
        JSValue::Number(n) => n.as_f64(),
        JSValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    x.ok_or_else(|| serde::de::Error::custom(format!("expected a percentage, got {}", js)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElectionStatus;

    fn election(total_voters: u64, votes_cast: i64) -> Election {
        Election {
            id: 1,
            name: "General".to_string(),
            status: ElectionStatus::Completed,
            total_voters,
            votes_cast,
            turnout_percentage: 62.5,
        }
    }

    #[test]
    fn breakdown() {
        let slices = turnout_breakdown(&election(80, 50));
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].label, VOTES_CAST_LABEL);
        assert_eq!(slices[0].value, 50);
        assert_eq!(slices[0].percentage, 62.5);
        assert_eq!(slices[1].label, NON_VOTES_LABEL);
        assert_eq!(slices[1].value, 30);
        assert_eq!(slices[1].percentage, 37.5);
    }

    #[test]
    fn breakdown_drops_negative_slices() {
        let slices = turnout_breakdown(&election(10, 12));
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].label, VOTES_CAST_LABEL);

        let slices = turnout_breakdown(&election(10, -1));
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].label, NON_VOTES_LABEL);
    }

    #[test]
    fn breakdown_without_voters() {
        let slices = turnout_breakdown(&election(0, 0));
        assert_eq!(slices[1].value, 0);
        assert_eq!(slices[1].percentage, 0.0);
    }

    #[test]
    fn statistics_from_json() {
        let js = r#"{
            "total_eligible_voters": 300,
            "total_voted": 120,
            "overall_turnout_percentage": "40.00",
            "election_details": { "election_type": { "name": "General" } },
            "department_turnout": [
                { "department_id": 1, "department_name": "CCS", "eligible_voters": 100,
                  "voted_count": 70, "department_turnout_percentage": 70,
                  "votes_distribution_percentage": "58.33" },
                { "department_id": 2, "department_name": "CBA", "eligible_voters": 200,
                  "voted_count": 50, "department_turnout_percentage": "25.00",
                  "votes_distribution_percentage": 41.67 }
            ]
        }"#;
        let stats: ElectionStatistics = serde_json::from_str(js).unwrap();
        let series = department_series(&stats);
        assert_eq!(series.overall_turnout_percentage, 40.0);
        assert_eq!(series.bar.len(), 2);
        assert_eq!(series.bar[0].name, "CCS");
        assert_eq!(series.bar[0].turnout_percentage, 70.0);
        assert_eq!(series.bar[1].voted, 50);
        assert_eq!(series.pie[0].value, 58.33);
        assert_eq!(series.pie[1].value, 41.67);
    }

    #[test]
    fn statistics_reject_bad_percentage() {
        let js = r#"{ "total_eligible_voters": 1, "total_voted": 0,
                      "overall_turnout_percentage": "n/a" }"#;
        assert!(serde_json::from_str::<ElectionStatistics>(js).is_err());
    }
}
