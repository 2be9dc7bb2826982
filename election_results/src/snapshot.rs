//! Validation of the snapshots sent by the backend.
//!
//! The backend sends loosely typed JSON: identifiers and percentages are
//! sometimes strings, `partylist` may be missing. Everything is checked here
//! before any computation, and the first violation is reported.

use log::debug;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use crate::config::*;

type SnapshotResult<T> = Result<T, AggregationError>;

/// Reads a `{ election, results }` document.
pub fn parse_snapshot(js: &JSValue) -> SnapshotResult<ElectionSnapshot> {
    let root = as_object(js, "snapshot")?;
    let election = parse_election(field(root, "election", "snapshot")?)?;
    let results_js = as_array(field(root, "results", "snapshot")?, "results")?;
    let mut results: Vec<Position> = Vec::with_capacity(results_js.len());
    for (idx, p) in results_js.iter().enumerate() {
        results.push(parse_position(p, &format!("results[{}]", idx))?);
    }
    debug!(
        "parse_snapshot: election {} with {} positions",
        election.id,
        results.len()
    );
    Ok(ElectionSnapshot { election, results })
}

pub fn parse_election(js: &JSValue) -> SnapshotResult<Election> {
    let obj = as_object(js, "election")?;
    let status = match read_str(field(obj, "status", "election")?, "election.status")? {
        "upcoming" => ElectionStatus::Upcoming,
        "ongoing" => ElectionStatus::Ongoing,
        "completed" => ElectionStatus::Completed,
        _ => {
            return Err(InvalidInput::WrongType {
                field: "election.status".to_string(),
                expected: "one of upcoming, ongoing, completed",
            }
            .into())
        }
    };
    Ok(Election {
        id: read_id(field(obj, "id", "election")?, "election.id")?,
        name: read_str(field(obj, "name", "election")?, "election.name")?.to_string(),
        status,
        total_voters: read_id(field(obj, "total_voters", "election")?, "election.total_voters")?,
        votes_cast: read_i64(field(obj, "votes_cast", "election")?, "election.votes_cast")?,
        turnout_percentage: read_f64(
            field(obj, "turnout_percentage", "election")?,
            "election.turnout_percentage",
        )?,
    })
}

fn parse_position(js: &JSValue, path: &str) -> SnapshotResult<Position> {
    let obj = as_object(js, path)?;
    let candidates_path = format!("{}.candidates", path);
    let candidates_js = as_array(field(obj, "candidates", path)?, &candidates_path)?;
    let mut candidates: Vec<Candidate> = Vec::with_capacity(candidates_js.len());
    for (idx, c) in candidates_js.iter().enumerate() {
        candidates.push(parse_candidate(
            c,
            &format!("{}[{}]", candidates_path, idx),
        )?);
    }
    Ok(Position {
        position_id: read_id(
            field(obj, "position_id", path)?,
            &format!("{}.position_id", path),
        )?,
        position_name: read_str(
            field(obj, "position_name", path)?,
            &format!("{}.position_name", path),
        )?
        .to_string(),
        candidates,
    })
}

fn parse_candidate(js: &JSValue, path: &str) -> SnapshotResult<Candidate> {
    let obj = as_object(js, path)?;
    let candidate_id = read_id(
        field(obj, "candidate_id", path)?,
        &format!("{}.candidate_id", path),
    )?;
    let partylist = match obj.get("partylist") {
        None | Some(JSValue::Null) => None,
        Some(JSValue::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(InvalidInput::WrongType {
                field: format!("{}.partylist", path),
                expected: "a string or null",
            }
            .into())
        }
    };
    Ok(Candidate {
        candidate_id,
        name: read_str(field(obj, "name", path)?, &format!("{}.name", path))?.to_string(),
        partylist,
        votes: read_votes(field(obj, "votes", path)?, candidate_id)?,
    })
}

// Votes must be JSON integers. Floats with a zero fractional part are accepted.
fn read_votes(js: &JSValue, candidate_id: u64) -> SnapshotResult<i64> {
    let out_of_range = || -> AggregationError {
        InvalidInput::VotesOutOfRange {
            candidate_id,
            value: js.to_string(),
        }
        .into()
    };
    let votes = match js {
        JSValue::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(v), _, _) => Some(v),
            // Above i64::MAX.
            (None, Some(_), _) => return Err(out_of_range()),
            (None, None, Some(f)) if f.fract() == 0.0 => {
                if f.abs() < i64::MAX as f64 {
                    Some(f as i64)
                } else {
                    return Err(out_of_range());
                }
            }
            _ => None,
        },
        _ => None,
    };
    match votes {
        Some(v) if v < 0 => Err(InvalidInput::NegativeVotes {
            candidate_id,
            votes: v,
        }
        .into()),
        Some(v) => Ok(v),
        None => Err(InvalidInput::NonIntegerVotes {
            candidate_id,
            value: js.to_string(),
        }
        .into()),
    }
}

fn field<'a>(obj: &'a JSMap<String, JSValue>, name: &str, path: &str) -> SnapshotResult<&'a JSValue> {
    obj.get(name).ok_or_else(|| {
        InvalidInput::MissingField {
            field: format!("{}.{}", path, name),
        }
        .into()
    })
}

fn as_object<'a>(js: &'a JSValue, path: &str) -> SnapshotResult<&'a JSMap<String, JSValue>> {
    js.as_object().ok_or_else(|| {
        InvalidInput::WrongType {
            field: path.to_string(),
            expected: "an object",
        }
        .into()
    })
}

fn as_array<'a>(js: &'a JSValue, path: &str) -> SnapshotResult<&'a Vec<JSValue>> {
    js.as_array().ok_or_else(|| {
        InvalidInput::NotASequence {
            field: path.to_string(),
        }
        .into()
    })
}

fn read_str<'a>(js: &'a JSValue, path: &str) -> SnapshotResult<&'a str> {
    js.as_str().ok_or_else(|| {
        InvalidInput::WrongType {
            field: path.to_string(),
            expected: "a string",
        }
        .into()
    })
}

// Identifiers and counts may come as numbers or as numeric strings.
fn read_id(js: &JSValue, path: &str) -> SnapshotResult<u64> {
    let x = match js {
        JSValue::Number(n) => n.as_u64(),
        JSValue::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    x.ok_or_else(|| {
        InvalidInput::WrongType {
            field: path.to_string(),
            expected: "a non-negative integer",
        }
        .into()
    })
}

fn read_i64(js: &JSValue, path: &str) -> SnapshotResult<i64> {
    let x = match js {
        JSValue::Number(n) => n.as_i64(),
        JSValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    x.ok_or_else(|| {
        InvalidInput::WrongType {
            field: path.to_string(),
            expected: "an integer",
        }
        .into()
    })
}

fn read_f64(js: &JSValue, path: &str) -> SnapshotResult<f64> {
    let x = match js {
        JSValue::Number(n) => n.as_f64(),
        JSValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    x.filter(|f| f.is_finite()).ok_or_else(|| {
        InvalidInput::WrongType {
            field: path.to_string(),
            expected: "a number",
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot_with(candidates: JSValue) -> JSValue {
        json!({
            "election": {
                "id": 12,
                "name": "SSG 2024",
                "status": "completed",
                "total_voters": 200,
                "votes_cast": "150",
                "turnout_percentage": "75.00"
            },
            "results": [
                { "position_id": "1", "position_name": "President", "candidates": candidates }
            ]
        })
    }

    #[test]
    fn parse_valid_snapshot() {
        let js = snapshot_with(json!([
            { "candidate_id": 1, "name": "Anna", "partylist": "Blue", "votes": 80 },
            { "candidate_id": 2, "name": "Bob", "partylist": null, "votes": 60 },
            { "candidate_id": 3, "name": "Clara", "votes": 10.0 }
        ]));
        let snap = parse_snapshot(&js).unwrap();
        assert_eq!(snap.election.votes_cast, 150);
        assert_eq!(snap.election.turnout_percentage, 75.0);
        assert_eq!(snap.election.status, ElectionStatus::Completed);
        let p = &snap.results[0];
        assert_eq!(p.position_id, 1);
        assert_eq!(p.candidates.len(), 3);
        assert_eq!(p.candidates[0].party_label(), "Blue");
        assert_eq!(p.candidates[1].party_label(), INDEPENDENT);
        assert_eq!(p.candidates[2].partylist, None);
        assert_eq!(p.candidates[2].votes, 10);
    }

    #[test]
    fn negative_votes() {
        let js = snapshot_with(json!([{ "candidate_id": 4, "name": "A", "votes": -1 }]));
        assert_eq!(
            parse_snapshot(&js),
            Err(AggregationError::InvalidInput(InvalidInput::NegativeVotes {
                candidate_id: 4,
                votes: -1
            }))
        );
    }

    #[test]
    fn fractional_votes() {
        let js = snapshot_with(json!([{ "candidate_id": 4, "name": "A", "votes": 1.5 }]));
        assert!(matches!(
            parse_snapshot(&js),
            Err(AggregationError::InvalidInput(InvalidInput::NonIntegerVotes {
                candidate_id: 4,
                ..
            }))
        ));
        let js = snapshot_with(json!([{ "candidate_id": 4, "name": "A", "votes": "3" }]));
        assert!(matches!(
            parse_snapshot(&js),
            Err(AggregationError::InvalidInput(InvalidInput::NonIntegerVotes { .. }))
        ));
    }

    #[test]
    fn votes_too_large() {
        let js = snapshot_with(json!([
            { "candidate_id": 4, "name": "A", "votes": 18446744073709551615u64 }
        ]));
        assert_eq!(
            parse_snapshot(&js),
            Err(AggregationError::InvalidInput(InvalidInput::VotesOutOfRange {
                candidate_id: 4,
                value: "18446744073709551615".to_string()
            }))
        );
        let js = snapshot_with(json!([{ "candidate_id": 5, "name": "B", "votes": 1e20 }]));
        assert!(matches!(
            parse_snapshot(&js),
            Err(AggregationError::InvalidInput(InvalidInput::VotesOutOfRange {
                candidate_id: 5,
                ..
            }))
        ));
    }

    #[test]
    fn candidates_not_a_list() {
        let js = snapshot_with(json!({ "candidate_id": 4 }));
        assert_eq!(
            parse_snapshot(&js),
            Err(AggregationError::InvalidInput(InvalidInput::NotASequence {
                field: "results[0].candidates".to_string()
            }))
        );
    }

    #[test]
    fn missing_votes_cast() {
        let js = json!({
            "election": { "id": 1, "name": "x", "status": "ongoing", "total_voters": 3, "turnout_percentage": 0 },
            "results": []
        });
        assert_eq!(
            parse_snapshot(&js),
            Err(AggregationError::InvalidInput(InvalidInput::MissingField {
                field: "election.votes_cast".to_string()
            }))
        );
    }

    #[test]
    fn unknown_status() {
        let js = json!({
            "election": { "id": 1, "name": "x", "status": "archived", "total_voters": 3,
                          "votes_cast": 0, "turnout_percentage": 0 },
            "results": []
        });
        assert!(parse_snapshot(&js).is_err());
    }
}
