/*!
Aggregation of election results for reporting dashboards.

The backend records how many votes each candidate received for each
position, and how many voters cast a ballot in the election. This crate
turns one snapshot of those figures into a report: vote shares, standings,
winners (with ties), and the abstains of each position.

```
use election_results::*;

let candidates = vec![
    Candidate { candidate_id: 1, name: "Anna".to_string(), partylist: None, votes: 30 },
    Candidate { candidate_id: 2, name: "Bob".to_string(), partylist: Some("Blue".to_string()), votes: 10 },
];
let res = compute_position_result(&candidates, 50)?;
assert_eq!(res.abstain_count, 10);
assert_eq!(res.candidates_ranked[0].percentage, 60.0);
assert_eq!(res.winners[0].name, "Anna");
# Ok::<(), AggregationError>(())
```

All the functions are pure: the same snapshot always yields the same report.
*/
mod config;
pub mod builder;
pub mod manual;
pub mod snapshot;
pub mod turnout;

use log::{debug, info, warn};

use std::ops::Add;

pub use crate::config::*;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);
}

impl Add for VoteCount {
    type Output = VoteCount;
    fn add(self: VoteCount, rhs: VoteCount) -> VoteCount {
        VoteCount(self.0 + rhs.0)
    }
}

// A candidate whose vote count passed the checks.
#[derive(Debug, Clone)]
struct CheckedCandidate<'a> {
    candidate: &'a Candidate,
    count: VoteCount,
}

// Validates the counts and returns them with their total.
fn checks(
    candidates: &[Candidate],
) -> Result<(Vec<CheckedCandidate<'_>>, VoteCount), AggregationError> {
    let mut res: Vec<CheckedCandidate> = Vec::with_capacity(candidates.len());
    let mut total = VoteCount::EMPTY;
    for c in candidates.iter() {
        let count = u64::try_from(c.votes).map_err(|_| InvalidInput::NegativeVotes {
            candidate_id: c.candidate_id,
            votes: c.votes,
        })?;
        // The total is reported as an i64 next to votes_cast.
        total = total
            .0
            .checked_add(count)
            .filter(|t| i64::try_from(*t).is_ok())
            .map(VoteCount)
            .ok_or(InvalidInput::VoteTotalOverflow {
                candidate_id: c.candidate_id,
            })?;
        res.push(CheckedCandidate {
            candidate: c,
            count: VoteCount(count),
        });
    }
    Ok((res, total))
}

/// The share of `part` in `denominator`, in percent, rounded to 2 decimals.
///
/// The rounding is done on integers (half away from zero) so that the same
/// counts always give the same value. A zero denominator gives 0.
pub(crate) fn percentage_of(part: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let d = u128::from(denominator);
    let hundredths = (u128::from(part) * 20_000 + d) / (2 * d);
    hundredths as f64 / 100.0
}

// Votes cast that did not go to any candidate. Clamped at zero when the
// candidates received more votes than were cast.
fn abstain_count(votes_cast: i64, total: VoteCount) -> VoteCount {
    let raw = i128::from(votes_cast) - i128::from(total.0);
    if raw > 0 {
        VoteCount(raw as u64)
    } else {
        VoteCount::EMPTY
    }
}

/// Computes the results of one position with the default rules.
///
/// Arguments:
/// * `candidates` the candidates of the position, in the order given by the backend
/// * `votes_cast` the number of voters who cast a ballot in the election. It may be
/// smaller than the votes of the candidates if the upstream data is inconsistent.
pub fn compute_position_result(
    candidates: &[Candidate],
    votes_cast: i64,
) -> Result<PositionResult, AggregationError> {
    compute_position_result_with_rules(candidates, votes_cast, &AggregationRules::DEFAULT_RULES)
}

pub fn compute_position_result_with_rules(
    candidates: &[Candidate],
    votes_cast: i64,
    rules: &AggregationRules,
) -> Result<PositionResult, AggregationError> {
    let (checked, total) = checks(candidates)?;

    let abstains = abstain_count(votes_cast, total);
    // Candidates and abstains together make up 100%.
    let denominator = total + abstains;

    let mut ranked: Vec<RankedCandidate> = checked
        .iter()
        .map(|c| RankedCandidate {
            candidate_id: c.candidate.candidate_id,
            name: c.candidate.name.clone(),
            partylist: c.candidate.party_label().to_string(),
            votes: c.count.0,
            percentage: percentage_of(c.count.0, denominator.0),
        })
        .collect();
    // The sort is stable: candidates with the same count keep the upstream order.
    ranked.sort_by(|a, b| b.votes.cmp(&a.votes));

    let max_votes = ranked.first().map(|c| c.votes).unwrap_or(0);
    let winners: Vec<RankedCandidate> = match rules.zero_vote_policy {
        ZeroVotePolicy::NoWinner if max_votes == 0 => vec![],
        _ => ranked
            .iter()
            .take_while(|c| c.votes == max_votes)
            .cloned()
            .collect(),
    };

    let outcome = if ranked.is_empty() {
        PositionOutcome::NoCandidates
    } else if total == VoteCount::EMPTY {
        PositionOutcome::NoVotes
    } else if winners.len() == 1 {
        PositionOutcome::Winner
    } else {
        PositionOutcome::Tie
    };

    debug!(
        "compute_position_result: {} candidates, total {:?}, abstains {:?}, outcome {:?}",
        ranked.len(),
        total,
        abstains,
        outcome
    );

    Ok(PositionResult {
        total_candidate_votes: total.0,
        candidates_ranked: ranked,
        winners,
        abstain_count: abstains.0,
        abstain_percentage: percentage_of(abstains.0, denominator.0),
        outcome,
    })
}

/// Computes the results of all the positions of an election with the default rules.
///
/// The election is passed through unchanged.
pub fn compute_election_report(
    election: &Election,
    positions: &[Position],
) -> Result<ElectionReport, AggregationError> {
    compute_election_report_with_rules(election, positions, &AggregationRules::DEFAULT_RULES)
}

pub fn compute_election_report_with_rules(
    election: &Election,
    positions: &[Position],
    rules: &AggregationRules,
) -> Result<ElectionReport, AggregationError> {
    info!(
        "Processing election {} ({}): {} positions, {} votes cast out of {} voters",
        election.id,
        election.name,
        positions.len(),
        election.votes_cast,
        election.total_voters
    );

    let mut warnings = election_warnings(election);

    let mut position_results: Vec<PositionReport> = Vec::with_capacity(positions.len());
    for p in positions.iter() {
        debug!(
            "Position {}: {} with {} candidates",
            p.position_id,
            p.position_name,
            p.candidates.len()
        );
        let result = compute_position_result_with_rules(&p.candidates, election.votes_cast, rules)?;
        if rules.flag_overcount
            && election.votes_cast >= 0
            && i128::from(result.total_candidate_votes) > i128::from(election.votes_cast)
        {
            warn!(
                "Position {} ({}) received {} votes but only {} votes were cast, abstains clamped to 0",
                p.position_id, p.position_name, result.total_candidate_votes, election.votes_cast
            );
            warnings.push(DataQualityWarning::Overcount {
                position_id: p.position_id,
                candidate_votes: result.total_candidate_votes,
                votes_cast: election.votes_cast,
            });
        }
        for w in result.winners.iter() {
            info!(
                "Position {}: {} votes {} ({}%) -> {:?}",
                p.position_name, w.votes, w.name, w.percentage, result.outcome
            );
        }
        position_results.push(PositionReport {
            position_id: p.position_id,
            position_name: p.position_name.clone(),
            result,
        });
    }

    Ok(ElectionReport {
        election: election.clone(),
        position_results,
        warnings,
    })
}

fn election_warnings(election: &Election) -> Vec<DataQualityWarning> {
    let mut res: Vec<DataQualityWarning> = Vec::new();
    if election.votes_cast < 0 {
        warn!(
            "Election {}: negative number of votes cast: {}",
            election.id, election.votes_cast
        );
        res.push(DataQualityWarning::NegativeVotesCast {
            votes_cast: election.votes_cast,
        });
    } else if election.votes_cast as u64 > election.total_voters {
        warn!(
            "Election {}: {} votes cast for {} registered voters",
            election.id, election.votes_cast, election.total_voters
        );
        res.push(DataQualityWarning::VotesCastExceedsRegistered {
            votes_cast: election.votes_cast,
            total_voters: election.total_voters,
        });
    }
    res
}

/// The bar and pie series of a position.
///
/// The percentages are the ones of the result, they are not computed again.
/// Both series list every candidate, followed by an `Abstains` entry when
/// there are abstains.
pub fn build_chart_series(result: &PositionResult) -> ChartSeries {
    let mut bar: Vec<SeriesPoint> = result
        .candidates_ranked
        .iter()
        .map(|c| SeriesPoint {
            label: c.name.clone(),
            votes: c.votes,
            percentage: c.percentage,
            kind: SeriesKind::Candidate,
        })
        .collect();
    if result.abstain_count > 0 {
        bar.push(SeriesPoint {
            label: ABSTAIN_LABEL.to_string(),
            votes: result.abstain_count,
            percentage: result.abstain_percentage,
            kind: SeriesKind::Abstain,
        });
    }
    let pie = bar.clone();
    ChartSeries { bar, pie }
}
