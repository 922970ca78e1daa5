use log::{debug, info};
use rand::Rng;

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::{resolve_winner, BallotSet, VoteRules, VotingErrors};

/// Number of runs between two progress messages.
pub const PROGRESS_EVERY: u64 = 100_000;

/// The outcome of running the same election many times.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SimulationSummary {
    pub runs: u64,
    /// Every distinct winner with its number of wins, by decreasing number of wins
    /// then by position in the roster.
    pub winners: Vec<(String, u64)>,
    /// The runs that did not produce a winner, grouped by error.
    pub failures: Vec<(VotingErrors, u64)>,
}

impl SimulationSummary {
    pub fn distinct_winners(&self) -> Vec<&str> {
        self.winners.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// The fraction of all the runs won by this candidate.
    pub fn frequency(&self, candidate: &str) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        let wins = self
            .winners
            .iter()
            .find(|(name, _)| name == candidate)
            .map(|(_, count)| *count)
            .unwrap_or(0);
        wins as f64 / self.runs as f64
    }

    pub fn failed_runs(&self) -> u64 {
        self.failures.iter().map(|(_, count)| *count).sum()
    }

    /// True if all the runs elected the same candidate.
    pub fn is_unanimous(&self) -> bool {
        self.failures.is_empty() && self.winners.len() == 1
    }
}

/// Resolves the election `num_runs` times and counts the winners.
///
/// Every run starts from the ballots as given: the rounds of a run never see the
/// eliminations of another run. A run that fails (for example with
/// [VotingErrors::NoQuorum]) is recorded in the failures and the other runs proceed.
/// Rules that are not valid are rejected before any run.
pub fn run_simulations<R: Rng + ?Sized>(
    ballots: &BallotSet,
    rules: &VoteRules,
    num_runs: u64,
    rng: &mut R,
) -> Result<SimulationSummary, VotingErrors> {
    rules.validate()?;
    info!(
        "run_simulations: {} runs over {} ballots, rules: {:?}",
        num_runs,
        ballots.num_ballots(),
        rules
    );

    let mut wins: HashMap<String, u64> = HashMap::new();
    let mut failures: HashMap<VotingErrors, u64> = HashMap::new();
    for run in 0..num_runs {
        match resolve_winner(ballots, rules, rng) {
            Ok(winner) => {
                *wins.entry(winner).or_insert(0) += 1;
            }
            Err(e) => {
                debug!("run_simulations: run {} failed: {}", run, e);
                *failures.entry(e).or_insert(0) += 1;
            }
        }
        if (run + 1) % PROGRESS_EVERY == 0 {
            debug!(
                "run_simulations: {} / {} runs, {} distinct winner(s)",
                run + 1,
                num_runs,
                wins.len()
            );
        }
    }

    let roster = ballots.original_roster();
    let mut winners: Vec<(String, u64)> = wins.into_iter().collect();
    winners.sort_by_key(|(name, count)| {
        (
            Reverse(*count),
            roster.iter().position(|c| c == name).unwrap_or(roster.len()),
        )
    });
    let mut failures: Vec<(VotingErrors, u64)> = failures.into_iter().collect();
    failures.sort_by_key(|(e, count)| (Reverse(*count), e.to_string()));

    let summary = SimulationSummary {
        runs: num_runs,
        winners,
        failures,
    };
    info!(
        "run_simulations: winners: {:?} failed runs: {}",
        summary.winners,
        summary.failed_runs()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TieBreakMode;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn names(l: &[&str]) -> Vec<String> {
        l.iter().map(|s| s.to_string()).collect()
    }

    // X>Y>Z, Y>X>Z, Z>Y>X: every candidate can be eliminated first.
    fn three_way_tie() -> BallotSet {
        BallotSet::from_rank_rows(
            &[vec![1, 2, 3], vec![2, 1, 3], vec![3, 2, 1]],
            &names(&["X", "Y", "Z"]),
        )
        .unwrap()
    }

    #[test]
    fn deterministic_runs_agree() {
        let _ = env_logger::builder().is_test(true).try_init();
        let bs = three_way_tie();
        let summary = run_simulations(
            &bs,
            &VoteRules::DEFAULT_RULES,
            50,
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap();
        assert!(summary.is_unanimous());
        assert_eq!(summary.winners, vec![("Y".to_string(), 50)]);
        assert_eq!(summary.frequency("Y"), 1.0);
        assert_eq!(summary.frequency("X"), 0.0);
    }

    #[test]
    fn runs_do_not_modify_the_ballots() {
        let bs = three_way_tie();
        let copy = bs.clone();
        let summary = run_simulations(
            &bs,
            &VoteRules::DEFAULT_RULES,
            2,
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap();
        assert_eq!(summary.runs, 2);
        assert_eq!(bs, copy);
        assert_eq!(bs.surviving_roster(), vec!["X", "Y", "Z"]);
        assert_eq!(bs.original_roster(), &names(&["X", "Y", "Z"])[..]);
    }

    #[test]
    fn random_tiebreaks_give_several_winners() {
        let _ = env_logger::builder().is_test(true).try_init();
        let bs = three_way_tie();
        let rules = VoteRules::new(0.5, TieBreakMode::UniformRandom).unwrap();
        let summary = run_simulations(&bs, &rules, 3000, &mut StdRng::seed_from_u64(17)).unwrap();
        // Eliminating X or Z first elects Y, eliminating Y first elects X.
        let mut distinct = summary.distinct_winners();
        distinct.sort();
        assert_eq!(distinct, vec!["X", "Y"]);
        assert_eq!(summary.failed_runs(), 0);
        assert!(!summary.is_unanimous());
        let total: u64 = summary.winners.iter().map(|(_, c)| *c).sum();
        assert_eq!(total, 3000);
        // Y wins about two thirds of the time.
        assert!((summary.frequency("Y") - 2.0 / 3.0).abs() < 0.05);
        assert_eq!(summary.winners[0].0, "Y");
    }

    #[test]
    fn seeded_batches_are_reproducible() {
        let bs = three_way_tie();
        let rules = VoteRules::new(0.5, TieBreakMode::UniformRandom).unwrap();
        let s1 = run_simulations(&bs, &rules, 200, &mut StdRng::seed_from_u64(3)).unwrap();
        let s2 = run_simulations(&bs, &rules, 200, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(s1, s2);
    }

    #[test]
    fn failed_runs_are_counted() {
        let bs = three_way_tie();
        let rules = VoteRules::new(1.0, TieBreakMode::UniformRandom).unwrap();
        let summary = run_simulations(&bs, &rules, 10, &mut StdRng::seed_from_u64(3)).unwrap();
        assert!(summary.winners.is_empty());
        assert_eq!(summary.failed_runs(), 10);
        assert_eq!(
            summary.failures,
            vec![(VotingErrors::NoQuorum { round: 4 }, 10)]
        );
        assert_eq!(summary.frequency("X"), 0.0);
    }

    #[test]
    fn invalid_rules_stop_the_batch() {
        let bs = three_way_tie();
        let rules = VoteRules {
            majority_threshold: 2.0,
            tiebreak_mode: TieBreakMode::UseCandidateOrder,
        };
        let res = run_simulations(&bs, &rules, 10, &mut StdRng::seed_from_u64(3));
        assert_eq!(res, Err(VotingErrors::InvalidThreshold));
    }

    #[test]
    fn zero_runs() {
        let bs = three_way_tie();
        let summary = run_simulations(
            &bs,
            &VoteRules::DEFAULT_RULES,
            0,
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap();
        assert_eq!(summary.runs, 0);
        assert!(summary.winners.is_empty());
        assert_eq!(summary.frequency("X"), 0.0);
    }
}
