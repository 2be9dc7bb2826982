pub use crate::config::*;

/// A builder for assembling an election snapshot by hand.
///
/// Counts are checked as they are added, so that a bad count is reported
/// next to the code that introduced it.
///
/// ```
/// pub use election_results::builder::Builder;
/// pub use election_results::*;
///
/// let mut builder = Builder::new(&AggregationRules::DEFAULT_RULES)?
///     .election(Election {
///         id: 1,
///         name: "Student council".to_string(),
///         status: ElectionStatus::Completed,
///         total_voters: 120,
///         votes_cast: 90,
///         turnout_percentage: 75.0,
///     })?;
///
/// builder.add_position(1, "President")?;
/// builder.add_candidate(1, 10, "Anna", Some("Blue"), 50)?;
/// builder.add_candidate(1, 11, "Bob", None, 35)?;
///
/// let report = builder.build()?;
/// assert_eq!(report.position_results[0].result.abstain_count, 5);
/// # Ok::<(), AggregationError>(())
/// ```
pub struct Builder {
    pub(crate) _rules: AggregationRules,
    pub(crate) _election: Option<Election>,
    pub(crate) _positions: Vec<Position>,
}

impl Builder {
    pub fn new(rules: &AggregationRules) -> Result<Builder, AggregationError> {
        Ok(Builder {
            _rules: rules.clone(),
            _election: None,
            _positions: Vec::new(),
        })
    }

    pub fn election(self, election: Election) -> Result<Builder, AggregationError> {
        Ok(Builder {
            _rules: self._rules,
            _election: Some(election),
            _positions: self._positions,
        })
    }

    /// Adds an empty position. Positions are reported in the order they are added.
    pub fn add_position(&mut self, position_id: u64, name: &str) -> Result<(), AggregationError> {
        self._positions.push(Position {
            position_id,
            position_name: name.to_string(),
            candidates: Vec::new(),
        });
        Ok(())
    }

    /// Adds a candidate to a position that was added before.
    pub fn add_candidate(
        &mut self,
        position_id: u64,
        candidate_id: u64,
        name: &str,
        partylist: Option<&str>,
        votes: i64,
    ) -> Result<(), AggregationError> {
        self.add_candidate_2(
            position_id,
            &Candidate {
                candidate_id,
                name: name.to_string(),
                partylist: partylist.map(|s| s.to_string()),
                votes,
            },
        )
    }

    pub fn add_candidate_2(
        &mut self,
        position_id: u64,
        candidate: &Candidate,
    ) -> Result<(), AggregationError> {
        if candidate.votes < 0 {
            return Err(InvalidInput::NegativeVotes {
                candidate_id: candidate.candidate_id,
                votes: candidate.votes,
            }
            .into());
        }
        let position = self
            ._positions
            .iter_mut()
            .find(|p| p.position_id == position_id)
            .ok_or(AggregationError::UnknownPosition { position_id })?;
        position.candidates.push(candidate.clone());
        Ok(())
    }

    pub fn snapshot(&self) -> Result<ElectionSnapshot, AggregationError> {
        let election = self._election.clone().ok_or(InvalidInput::MissingField {
            field: "election".to_string(),
        })?;
        Ok(ElectionSnapshot {
            election,
            results: self._positions.clone(),
        })
    }

    pub fn build(&self) -> Result<ElectionReport, AggregationError> {
        let snapshot = self.snapshot()?;
        crate::compute_election_report_with_rules(
            &snapshot.election,
            &snapshot.results,
            &self._rules,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn council() -> Election {
        Election {
            id: 3,
            name: "Council".to_string(),
            status: ElectionStatus::Ongoing,
            total_voters: 10,
            votes_cast: 6,
            turnout_percentage: 60.0,
        }
    }

    #[test]
    fn unknown_position() {
        let mut b = Builder::new(&AggregationRules::DEFAULT_RULES).unwrap();
        let res = b.add_candidate(4, 1, "A", None, 1);
        assert_eq!(
            res,
            Err(AggregationError::UnknownPosition { position_id: 4 })
        );
    }

    #[test]
    fn negative_votes_rejected_on_add() {
        let mut b = Builder::new(&AggregationRules::DEFAULT_RULES).unwrap();
        b.add_position(1, "President").unwrap();
        assert!(b.add_candidate(1, 1, "A", None, -2).is_err());
    }

    #[test]
    fn missing_election() {
        let b = Builder::new(&AggregationRules::DEFAULT_RULES).unwrap();
        assert!(matches!(
            b.build(),
            Err(AggregationError::InvalidInput(InvalidInput::MissingField { .. }))
        ));
    }

    #[test]
    fn rules_are_applied() {
        let rules = AggregationRules {
            zero_vote_policy: ZeroVotePolicy::AllTied,
            flag_overcount: true,
        };
        let mut b = Builder::new(&rules).unwrap().election(council()).unwrap();
        b.add_position(1, "President").unwrap();
        b.add_candidate(1, 1, "A", None, 0).unwrap();
        b.add_candidate(1, 2, "B", Some("Red"), 0).unwrap();
        let report = b.build().unwrap();
        let res = &report.position_results[0].result;
        assert_eq!(res.winners.len(), 2);
        assert_eq!(res.abstain_count, 6);
        assert_eq!(res.candidates_ranked[1].partylist, "Red");
    }
}
