// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Label used for candidates that do not belong to any party list.
pub const INDEPENDENT: &str = "Independent";

/// Label of the synthetic entry that stands for the abstains of a position.
pub const ABSTAIN_LABEL: &str = "Abstains";

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    Upcoming,
    Ongoing,
    Completed,
}

/// An election, as delivered by the backend.
///
/// `turnout_percentage` is trusted as-is: it is never recomputed from
/// `votes_cast` and `total_voters`.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Election {
    pub id: u64,
    pub name: String,
    pub status: ElectionStatus,
    pub total_voters: u64,
    /// Expected to be within `0..=total_voters`, but the backend does not guarantee it.
    pub votes_cast: i64,
    pub turnout_percentage: f64,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub candidate_id: u64,
    pub name: String,
    #[serde(default)]
    pub partylist: Option<String>,
    /// Signed so that a corrupted count reaches the validation instead of being
    /// rejected by the deserializer.
    pub votes: i64,
}

impl Candidate {
    pub fn party_label(&self) -> &str {
        self.partylist.as_deref().unwrap_or(INDEPENDENT)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub position_id: u64,
    pub position_name: String,
    pub candidates: Vec<Candidate>,
}

/// One fetched snapshot of the results of an election.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionSnapshot {
    pub election: Election,
    pub results: Vec<Position>,
}

// ******** Output data structures *********

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub candidate_id: u64,
    pub name: String,
    /// The party list, with `Independent` filled in.
    pub partylist: String,
    pub votes: u64,
    pub percentage: f64,
}

/// How a position ended.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PositionOutcome {
    /// Nobody ran for this position.
    NoCandidates,
    /// There are candidates, but none of them received a vote.
    NoVotes,
    Winner,
    Tie,
}

/// The aggregated results of one position.
///
/// Always rebuilt from scratch by [`crate::compute_position_result`].
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct PositionResult {
    pub total_candidate_votes: u64,
    /// Sorted by votes, descending. Equal counts keep the upstream order.
    pub candidates_ranked: Vec<RankedCandidate>,
    pub winners: Vec<RankedCandidate>,
    pub abstain_count: u64,
    pub abstain_percentage: f64,
    pub outcome: PositionOutcome,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct PositionReport {
    pub position_id: u64,
    pub position_name: String,
    #[serde(flatten)]
    pub result: PositionResult,
}

/// Inconsistencies in the upstream data that were recovered locally.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DataQualityWarning {
    /// The candidates of a position received more votes than were cast in the
    /// whole election. The abstains were clamped to zero.
    Overcount {
        position_id: u64,
        candidate_votes: u64,
        votes_cast: i64,
    },
    VotesCastExceedsRegistered { votes_cast: i64, total_voters: u64 },
    NegativeVotesCast { votes_cast: i64 },
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct ElectionReport {
    pub election: Election,
    pub position_results: Vec<PositionReport>,
    pub warnings: Vec<DataQualityWarning>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesKind {
    Candidate,
    Abstain,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub votes: u64,
    pub percentage: f64,
    pub kind: SeriesKind,
}

/// The data fed to the bar and pie charts of one position.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub bar: Vec<SeriesPoint>,
    pub pie: Vec<SeriesPoint>,
}

/// The upstream data broke its contract. Nothing is computed in this case.
#[derive(PartialEq, Debug, Clone)]
pub enum InvalidInput {
    NegativeVotes { candidate_id: u64, votes: i64 },
    NonIntegerVotes { candidate_id: u64, value: String },
    /// An integer count that does not fit in an `i64`.
    VotesOutOfRange { candidate_id: u64, value: String },
    /// Adding the votes of this candidate took the total of the position past `i64::MAX`.
    VoteTotalOverflow { candidate_id: u64 },
    NotASequence { field: String },
    MissingField { field: String },
    WrongType { field: String, expected: &'static str },
}

impl Display for InvalidInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidInput::NegativeVotes {
                candidate_id,
                votes,
            } => write!(
                f,
                "candidate {} has a negative vote count: {}",
                candidate_id, votes
            ),
            InvalidInput::NonIntegerVotes {
                candidate_id,
                value,
            } => write!(
                f,
                "candidate {} has a vote count that is not an integer: {}",
                candidate_id, value
            ),
            InvalidInput::VotesOutOfRange {
                candidate_id,
                value,
            } => write!(
                f,
                "candidate {} has a vote count that is too large: {}",
                candidate_id, value
            ),
            InvalidInput::VoteTotalOverflow { candidate_id } => write!(
                f,
                "the total of the votes overflows at candidate {}",
                candidate_id
            ),
            InvalidInput::NotASequence { field } => {
                write!(f, "field {} should be a list", field)
            }
            InvalidInput::MissingField { field } => write!(f, "missing field {}", field),
            InvalidInput::WrongType { field, expected } => {
                write!(f, "field {} should be {}", field, expected)
            }
        }
    }
}

/// Errors that prevent the aggregation from completing.
#[derive(PartialEq, Debug, Clone)]
pub enum AggregationError {
    InvalidInput(InvalidInput),
    /// A candidate was added to a position that the builder does not know.
    UnknownPosition { position_id: u64 },
}

impl From<InvalidInput> for AggregationError {
    fn from(e: InvalidInput) -> Self {
        AggregationError::InvalidInput(e)
    }
}

impl Error for AggregationError {}

impl Display for AggregationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregationError::InvalidInput(e) => write!(f, "Invalid election data: {}", e),
            AggregationError::UnknownPosition { position_id } => {
                write!(f, "Unknown position {}", position_id)
            }
        }
    }
}

// ********* Configuration **********

/// Who wins a position where every candidate has zero votes.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ZeroVotePolicy {
    /// No winner: the position is reported as having received no votes.
    NoWinner,
    /// Every candidate is tied at zero and listed as a winner.
    AllTied,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AggregationRules {
    pub zero_vote_policy: ZeroVotePolicy,
    /// Report positions whose candidate votes exceed the votes cast.
    pub flag_overcount: bool,
}

impl AggregationRules {
    pub const DEFAULT_RULES: AggregationRules = AggregationRules {
        zero_vote_policy: ZeroVotePolicy::NoWinner,
        flag_overcount: true,
    };
}

impl Default for AggregationRules {
    fn default() -> Self {
        AggregationRules::DEFAULT_RULES
    }
}
