use log::debug;

use std::collections::HashSet;

use crate::config::*;

/// Position of a candidate in the original roster.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub(crate) struct CandidateId(pub(crate) u32);

impl CandidateId {
    pub(crate) fn idx(self) -> usize {
        self.0 as usize
    }
}

/// The ballots of an election, with the roster of the candidates still in play.
///
/// Every ballot is a full ranking of the original candidates, stored by increasing rank.
/// Purging a candidate removes it from all the ballots, so the head of a ballot is always
/// the favourite surviving candidate of that voter. A ballot that becomes empty is exhausted.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BallotSet {
    // The original roster. Never modified after construction.
    candidates: Vec<String>,
    // Invariant: sorted, and a subset of the ids of `candidates`.
    surviving: Vec<CandidateId>,
    // Invariant: every id in a ballot is in `surviving`.
    ballots: Vec<Vec<CandidateId>>,
}

impl BallotSet {
    /// Builds the ballots from, for each voter, the list of (rank, candidate index) pairs.
    ///
    /// The ranks start at 1. Each voter must rank every candidate exactly once, with the
    /// ranks forming a permutation of 1..=K. The pairs do not need to be sorted.
    pub fn from_rankings(
        rankings: &[Vec<(u32, usize)>],
        candidate_names: &[String],
    ) -> Result<BallotSet, VotingErrors> {
        let num_candidates = candidate_names.len();
        let mut seen_names: HashSet<&String> = HashSet::new();
        for name in candidate_names.iter() {
            if !seen_names.insert(name) {
                return Err(VotingErrors::DuplicateCandidate(name.clone()));
            }
        }

        let mut ballots: Vec<Vec<CandidateId>> = Vec::with_capacity(rankings.len());
        for (voter, ranking) in rankings.iter().enumerate() {
            let ballot = order_ranking(ranking, num_candidates)
                .map_err(|defect| VotingErrors::MalformedBallot { voter, defect })?;
            ballots.push(ballot);
        }
        debug!(
            "from_rankings: {} ballots over {} candidates",
            ballots.len(),
            num_candidates
        );

        Ok(BallotSet {
            candidates: candidate_names.to_vec(),
            surviving: (0..num_candidates)
                .map(|idx| CandidateId(idx as u32))
                .collect(),
            ballots,
        })
    }

    /// Builds the ballots from rows of ranks: `rows[v][c]` is the rank that voter `v`
    /// gave to candidate `c`. This is the layout of most spreadsheets.
    pub fn from_rank_rows(
        rows: &[Vec<u32>],
        candidate_names: &[String],
    ) -> Result<BallotSet, VotingErrors> {
        let rankings: Vec<Vec<(u32, usize)>> = rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(cidx, rank)| (*rank, cidx))
                    .collect()
            })
            .collect();
        BallotSet::from_rankings(&rankings, candidate_names)
    }

    /// Removes a candidate from all the ballots and from the surviving roster.
    ///
    /// Unknown or already removed candidates are ignored.
    pub fn purge(&mut self, candidate: &str) {
        match self.candidates.iter().position(|c| c == candidate) {
            Some(idx) => self.purge_id(CandidateId(idx as u32)),
            None => debug!("purge: unknown candidate {:?}", candidate),
        }
    }

    pub(crate) fn purge_id(&mut self, cid: CandidateId) {
        self.surviving.retain(|c| *c != cid);
        for ballot in self.ballots.iter_mut() {
            ballot.retain(|c| *c != cid);
        }
    }

    pub fn original_roster(&self) -> &[String] {
        &self.candidates
    }

    /// The candidates still in play, in roster order.
    pub fn surviving_roster(&self) -> Vec<&str> {
        self.surviving.iter().map(|cid| self.name(*cid)).collect()
    }

    /// The candidates already purged, in roster order.
    pub fn removed_roster(&self) -> Vec<&str> {
        self.candidates
            .iter()
            .enumerate()
            .filter(|(idx, _)| !self.surviving.contains(&CandidateId(*idx as u32)))
            .map(|(_, name)| name.as_str())
            .collect()
    }

    /// The current rankings, most preferred first.
    pub fn ballots(&self) -> Vec<Vec<&str>> {
        self.ballots
            .iter()
            .map(|b| b.iter().map(|cid| self.name(*cid)).collect())
            .collect()
    }

    pub fn num_ballots(&self) -> usize {
        self.ballots.len()
    }

    pub fn num_candidates(&self) -> usize {
        self.candidates.len()
    }

    pub(crate) fn surviving_ids(&self) -> &[CandidateId] {
        &self.surviving
    }

    /// The current top choice of each ballot. None for exhausted ballots.
    pub(crate) fn first_choices(&self) -> impl Iterator<Item = Option<CandidateId>> + '_ {
        self.ballots.iter().map(|b| b.first().cloned())
    }

    pub(crate) fn name(&self, cid: CandidateId) -> &str {
        self.candidates[cid.idx()].as_str()
    }
}

// Sorts one voter's (rank, candidate) pairs into a ballot, checking that they form a permutation.
fn order_ranking(
    ranking: &[(u32, usize)],
    num_candidates: usize,
) -> Result<Vec<CandidateId>, BallotDefect> {
    if ranking.len() != num_candidates {
        return Err(BallotDefect::WrongLength {
            expected: num_candidates,
            actual: ranking.len(),
        });
    }
    let mut by_rank: Vec<Option<CandidateId>> = vec![None; num_candidates];
    let mut seen_candidates: Vec<bool> = vec![false; num_candidates];
    for &(rank, cidx) in ranking.iter() {
        if rank == 0 || rank as usize > num_candidates {
            return Err(BallotDefect::RankOutOfRange(rank));
        }
        if cidx >= num_candidates {
            return Err(BallotDefect::UnknownCandidate(cidx));
        }
        if seen_candidates[cidx] {
            return Err(BallotDefect::DuplicateCandidate(cidx));
        }
        let slot = &mut by_rank[(rank - 1) as usize];
        if slot.is_some() {
            return Err(BallotDefect::DuplicateRank(rank));
        }
        *slot = Some(CandidateId(cidx as u32));
        seen_candidates[cidx] = true;
    }
    // K distinct ranks in 1..=K: every slot is filled.
    Ok(by_rank.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(l: &[&str]) -> Vec<String> {
        l.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn sorts_by_rank() {
        let bs = BallotSet::from_rankings(
            &[vec![(2, 0), (3, 1), (1, 2)], vec![(1, 0), (2, 1), (3, 2)]],
            &names(&["X", "Y", "Z"]),
        )
        .unwrap();
        assert_eq!(bs.ballots(), vec![vec!["Z", "X", "Y"], vec!["X", "Y", "Z"]]);
        assert_eq!(bs.surviving_roster(), vec!["X", "Y", "Z"]);
        assert_eq!(bs.num_ballots(), 2);
    }

    #[test]
    fn rank_rows() {
        let bs = BallotSet::from_rank_rows(&[vec![3, 1, 2]], &names(&["X", "Y", "Z"])).unwrap();
        assert_eq!(bs.ballots(), vec![vec!["Y", "Z", "X"]]);
    }

    #[test]
    fn duplicate_rank_is_malformed() {
        let res = BallotSet::from_rank_rows(
            &[vec![1, 2, 3], vec![1, 1, 2]],
            &names(&["X", "Y", "Z"]),
        );
        assert_eq!(
            res,
            Err(VotingErrors::MalformedBallot {
                voter: 1,
                defect: BallotDefect::DuplicateRank(1)
            })
        );
    }

    #[test]
    fn wrong_length_is_malformed() {
        let res = BallotSet::from_rank_rows(&[vec![1, 2]], &names(&["X", "Y", "Z"]));
        assert_eq!(
            res,
            Err(VotingErrors::MalformedBallot {
                voter: 0,
                defect: BallotDefect::WrongLength {
                    expected: 3,
                    actual: 2
                }
            })
        );
    }

    #[test]
    fn out_of_range_rank_is_malformed() {
        let res = BallotSet::from_rank_rows(&[vec![1, 2, 4]], &names(&["X", "Y", "Z"]));
        assert_eq!(
            res,
            Err(VotingErrors::MalformedBallot {
                voter: 0,
                defect: BallotDefect::RankOutOfRange(4)
            })
        );
        let res = BallotSet::from_rank_rows(&[vec![0, 1, 2]], &names(&["X", "Y", "Z"]));
        assert!(matches!(
            res,
            Err(VotingErrors::MalformedBallot {
                defect: BallotDefect::RankOutOfRange(0),
                ..
            })
        ));
    }

    #[test]
    fn repeated_candidate_is_malformed() {
        let res = BallotSet::from_rankings(&[vec![(1, 0), (2, 0)]], &names(&["X", "Y"]));
        assert_eq!(
            res,
            Err(VotingErrors::MalformedBallot {
                voter: 0,
                defect: BallotDefect::DuplicateCandidate(0)
            })
        );
        let res = BallotSet::from_rankings(&[vec![(1, 0), (2, 5)]], &names(&["X", "Y"]));
        assert!(matches!(
            res,
            Err(VotingErrors::MalformedBallot {
                defect: BallotDefect::UnknownCandidate(5),
                ..
            })
        ));
    }

    #[test]
    fn duplicate_names() {
        let res = BallotSet::from_rank_rows(&[], &names(&["X", "X"]));
        assert_eq!(res, Err(VotingErrors::DuplicateCandidate("X".to_string())));
    }

    #[test]
    fn purge_keeps_relative_order() {
        let mut bs = BallotSet::from_rank_rows(
            &[vec![1, 2, 3], vec![3, 2, 1]],
            &names(&["X", "Y", "Z"]),
        )
        .unwrap();
        bs.purge("Y");
        assert_eq!(bs.ballots(), vec![vec!["X", "Z"], vec!["Z", "X"]]);
        assert_eq!(bs.surviving_roster(), vec!["X", "Z"]);
        assert_eq!(bs.removed_roster(), vec!["Y"]);
        assert_eq!(bs.original_roster(), &names(&["X", "Y", "Z"])[..]);

        // Purging twice or purging an unknown name does nothing.
        let before = bs.clone();
        bs.purge("Y");
        bs.purge("W");
        assert_eq!(bs, before);
    }

    #[test]
    fn purge_all_exhausts_ballots() {
        let mut bs = BallotSet::from_rank_rows(&[vec![1, 2]], &names(&["X", "Y"])).unwrap();
        bs.purge("X");
        bs.purge("Y");
        assert!(bs.surviving_roster().is_empty());
        assert_eq!(bs.first_choices().collect::<Vec<_>>(), vec![None]);
    }
}
