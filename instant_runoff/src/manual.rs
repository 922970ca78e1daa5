/*!

This is the long-form manual for `instant_runoff` and the `irv` command line.

## Counting rules

Every ballot ranks all the candidates. In each round, every ballot counts for its
highest ranked candidate that is still in the race. If the candidate with the most
votes holds strictly more than the majority threshold (one half by default) of the
votes cast in that round, this candidate wins. Otherwise the candidate with the fewest
votes is eliminated and the next round starts. A candidate that is nobody's current
first choice has zero votes and is eliminated before anyone else.

Ties (for the fewest votes, or for the most votes when the threshold is low enough
to let several candidates pass it) are broken by one of two policies:
* `useCandidateOrder`: the tied candidate that comes first in the list of candidates
* `random`: one of the tied candidates, drawn uniformly at random

```
use instant_runoff::{run_voting_stats, BallotSet, VoteRules};
use rand::SeedableRng;

let candidates = vec!["X".to_string(), "Y".to_string(), "Z".to_string()];
// The rank that each voter gave to X, Y and Z.
let ballots = BallotSet::from_rank_rows(
    &[vec![1, 2, 3], vec![2, 1, 3], vec![3, 2, 1]],
    &candidates,
)?;
let mut rng = rand::rngs::StdRng::seed_from_u64(0);
let result = run_voting_stats(&ballots, &VoteRules::DEFAULT_RULES, &mut rng)?;
assert_eq!(result.round_stats[0].eliminated.as_deref(), Some("X"));
assert_eq!(result.winner, "Y");
# Ok::<(), instant_runoff::VotingErrors>(())
```

## Simulations

With the `random` policy, the winner may depend on the outcome of the tiebreaks.
[crate::run_simulations] runs the same election many times, always from the
original ballots, and reports how often each candidate won.

## Input formats

The input is a table with a header row and one row per voter. This is the layout
produced when exporting the responses of a Google Forms or Microsoft Forms poll that
uses a grid question (one row per candidate, one column per rank):

```text
Timestamp,Preferred name [Alice],Preferred name [Bob],Preferred name [Charlie]
2018/05/09 10:55:53 AM AST,2,1,3
2018/05/09 10:57:12 AM AST,1,3,2
```

* the first column is a timestamp. It is skipped unless `--no-timestamp` is passed
  (or `timestampColumnPresent` is `false` in the configuration).
* every other column is a candidate. The name of the candidate is the text between the
  last pair of brackets of the header, or the whole header if there are no brackets.
* the cells are the ranks, starting at 1. Every row must use each rank exactly once.
  Rows that do not are reported with their line number and stop the count.

### `csv`

Comma separated values.

### `xlsx`

Excel workbook. The first worksheet is used, unless `--excel-worksheet-name` is provided.

## Configuration

The program accepts a configuration file in JSON:

```text
{
  "outputSettings": { "contestName": "Name of the group", "outputPath": "summary.json" },
  "cvrFileSources": [
    { "provider": "csv", "filePath": "votes.csv", "timestampColumnPresent": true }
  ],
  "rules": { "tiebreakMode": "random", "randomSeed": "42", "majorityThreshold": 0.5 },
  "simulation": { "simulationCount": 1000000 }
}
```

The paths are relative to the directory of the configuration file. The options given
on the command line take precedence over the configuration file.

## Output

Without simulations, every round is printed with the candidates still standing and
the candidates already removed, followed by the winner. With `--simulations N`, the
election is run N times and the distinct winners are printed with their frequency.
The `--out` flag writes a JSON summary of the same information, and `--reference`
compares this summary with a previously saved one.

 */
