pub use crate::config::*;
use crate::{run_voting_stats, BallotSet};

use rand::Rng;

/// A builder for adding ballots.
///
/// ```
/// use instant_runoff::builder::Builder;
/// use instant_runoff::VoteRules;
/// # use instant_runoff::VotingErrors;
///
/// let mut builder = Builder::new(&VoteRules::DEFAULT_RULES)?
///     .candidates(&["Anna".to_string(), "Bob".to_string(), "Clara".to_string()])?;
///
/// builder.add_ranking(&["Anna".to_string(), "Clara".to_string(), "Bob".to_string()])?;
/// // Ranks given to Anna, Bob and Clara, in this order.
/// builder.add_ranks(&[2, 1, 3])?;
/// builder.add_ranks(&[1, 3, 2])?;
///
/// let result = builder.run(&mut rand::thread_rng())?;
/// assert_eq!(result.winner, "Anna");
///
/// # Ok::<(), VotingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: VoteRules,
    pub(crate) _candidates: Option<Vec<String>>,
    pub(crate) _rankings: Vec<Vec<(u32, usize)>>,
}

impl Builder {
    pub fn new(rules: &VoteRules) -> Result<Builder, VotingErrors> {
        rules.validate()?;
        Ok(Builder {
            _rules: *rules,
            _candidates: None,
            _rankings: Vec::new(),
        })
    }

    /// Sets the roster. The order of the candidates is the order used by the
    /// [TieBreakMode::UseCandidateOrder] policy. Previously added ballots are dropped.
    pub fn candidates(self, cands: &[String]) -> Result<Builder, VotingErrors> {
        Ok(Builder {
            _rules: self._rules,
            _candidates: Some(cands.to_vec()),
            _rankings: Vec::new(),
        })
    }

    /// Adds a ballot given as the rank of every candidate, in roster order.
    ///
    /// The ranks start at 1.
    pub fn add_ranks(&mut self, ranks: &[u32]) -> Result<(), VotingErrors> {
        let ranking = ranks
            .iter()
            .enumerate()
            .map(|(cidx, rank)| (*rank, cidx))
            .collect();
        self._rankings.push(ranking);
        Ok(())
    }

    /// Adds a ballot given as the names of the candidates, most preferred first.
    pub fn add_ranking(&mut self, candidates: &[String]) -> Result<(), VotingErrors> {
        let roster: &[String] = self._candidates.as_deref().unwrap_or(&[]);
        let mut ranking: Vec<(u32, usize)> = Vec::with_capacity(candidates.len());
        for (pos, name) in candidates.iter().enumerate() {
            let cidx = roster.iter().position(|c| c == name).ok_or_else(|| {
                VotingErrors::MalformedBallot {
                    voter: self._rankings.len(),
                    defect: BallotDefect::UnknownCandidateName(name.clone()),
                }
            })?;
            ranking.push(((pos + 1) as u32, cidx));
        }
        self._rankings.push(ranking);
        Ok(())
    }

    /// Checks all the ballots and assembles them.
    pub fn build(&self) -> Result<BallotSet, VotingErrors> {
        let roster: &[String] = self._candidates.as_deref().unwrap_or(&[]);
        BallotSet::from_rankings(&self._rankings, roster)
    }

    /// Builds the ballots and runs the election with the rules of this builder.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<VotingResult, VotingErrors> {
        let ballots = self.build()?;
        run_voting_stats(&ballots, &self._rules, rng)
    }
}
