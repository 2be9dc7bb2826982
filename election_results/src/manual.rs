/*!

This is the long-form manual for `election_results` and `tallyboard`.

## Input

The backend delivers one snapshot of the results of an election:

```json
{
  "election": { "id": 12, "name": "SSG 2024", "status": "completed",
                "total_voters": 200, "votes_cast": 150, "turnout_percentage": 75.0 },
  "results": [
    { "position_id": 1, "position_name": "President",
      "candidates": [ { "candidate_id": 1, "name": "Anna", "partylist": "Blue", "votes": 80 } ] }
  ]
}
```

Identifiers, counts of voters and percentages may be sent as numbers or as
numeric strings. `partylist` may be `null` or missing: the candidate is then
reported as `Independent`. Vote counts must be integers that are not
negative. Any other value stops the computation with an
[`InvalidInput`](crate::InvalidInput) error and no partial report is produced.

## Computation

For each position:

1. the candidate votes are summed (`total_candidate_votes`);
2. the abstains are the votes cast minus this sum, and never less than 0;
3. the percentages of the candidates and of the abstains are computed over
   `total_candidate_votes + abstain_count`, rounded to 2 decimals, so that they
   add up to 100. When nobody voted, all percentages are 0;
4. candidates are ranked by votes, and candidates with the same count keep the
   order of the snapshot;
5. the winners are all the candidates with the highest count.

### Positions without votes

When all the candidates of a position have 0 votes, the outcome is `noVotes`
and the winners depend on the zero-vote policy:

- `noWinner` (default): no winner is reported;
- `allTied`: every candidate is reported as tied for the win.

### Data quality

Inconsistent figures do not stop the computation, but they are reported in
the `warnings` of the report:

- `overcount`: the candidates of a position received more votes than were cast.
  The abstains are clamped to 0. This warning can be turned off with
  `"flagOvercount": false`;
- `votesCastExceedsRegistered`: more votes cast than registered voters;
- `negativeVotesCast`: a negative number of votes cast.

The turnout percentage of the election is never recomputed.

## Configuration

`tallyboard` accepts a JSON configuration with the `--config` flag:

```json
{
  "outputSettings": { "reportName": "SSG 2024", "outputPath": "report.json",
                      "csvPath": "report.csv", "includeCharts": true },
  "snapshotSources": [ { "provider": "json", "filePath": "snapshot.json",
                         "statisticsFilePath": "statistics.json" } ],
  "rules": { "zeroVotePolicy": "noWinner", "flagOvercount": true }
}
```

Paths are relative to the directory of the configuration file. The command
line flags `--input`, `--statistics`, `--out`, `--csv` and `--zero-vote-policy`
take precedence over the configuration.

## Output

The report is written in JSON. With `includeCharts`, each position also
carries the series of its bar chart and pie chart. Both series list every
candidate, and include an `Abstains` entry when there are abstains.

The CSV table has one row per candidate and one `Abstains` row per position
with abstains:

```text
position_id,position_name,rank,candidate_id,name,partylist,votes,percentage,winner
1,President,1,1,Anna,Blue,80,53.33,true
1,President,,,Abstains,,10,6.67,false
```

*/
