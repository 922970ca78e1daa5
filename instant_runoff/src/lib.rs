mod ballots;
pub mod builder;
mod config;
pub mod manual;
mod monte_carlo;

use log::{debug, info};
use rand::Rng;

use std::{collections::HashMap, ops::AddAssign};

pub use crate::ballots::BallotSet;
use crate::ballots::CandidateId;
pub use crate::config::*;
pub use crate::monte_carlo::*;

// **** Private structures ****

type RoundId = u32;

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);
}

impl std::iter::Sum for VoteCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        VoteCount(iter.map(|vc| vc.0).sum())
    }
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum RoundOutcome {
    Elected(CandidateId),
    Eliminated(CandidateId),
}

#[derive(Eq, PartialEq, Debug, Clone)]
struct RoundResult {
    tally: HashMap<CandidateId, VoteCount>,
    votes_cast: VoteCount,
    top_count: VoteCount,
    outcome: RoundOutcome,
    // Number of candidates the tiebreak had to choose from.
    tied: usize,
}

/// Runs the instant-runoff rounds on the given ballots until a candidate holds
/// a majority of the votes, and returns the winner with the statistics of every round.
///
/// Arguments:
/// * `ballots` the ballots of the election. They are not modified: the rounds operate on a copy.
/// * `rules` the majority threshold and the tiebreak policy
/// * `rng` the source of randomness. It is only drawn from when a tie is broken
/// under [TieBreakMode::UniformRandom].
pub fn run_voting_stats<R: Rng + ?Sized>(
    ballots: &BallotSet,
    rules: &VoteRules,
    rng: &mut R,
) -> Result<VotingResult, VotingErrors> {
    info!(
        "Processing {:?} ballots, candidates: {:?}, rules: {:?}",
        ballots.num_ballots(),
        ballots.original_roster(),
        rules
    );
    let mut round_stats: Vec<RoundStats> = Vec::new();
    let winner = run_voting_rounds(ballots, rules, rng, &mut round_stats)?;
    info!("Winner: {} after {} round(s)", winner, round_stats.len());
    Ok(VotingResult {
        winner,
        threshold: rules.majority_threshold,
        round_stats,
    })
}

/// Runs the rounds like [run_voting_stats], appending the statistics of every
/// completed round to `round_stats`.
///
/// The rounds completed before a failure stay in `round_stats`: with
/// [VotingErrors::NoQuorum] `{ round: r }`, it holds the rounds 1 to r-1.
pub fn run_voting_rounds<R: Rng + ?Sized>(
    ballots: &BallotSet,
    rules: &VoteRules,
    rng: &mut R,
    round_stats: &mut Vec<RoundStats>,
) -> Result<String, VotingErrors> {
    run_rounds(ballots, rules, rng, Some(round_stats))
}

/// Same as [run_voting_stats], but only returns the name of the winner.
///
/// No statistics are assembled, which makes it suitable for running many elections in a row.
pub fn resolve_winner<R: Rng + ?Sized>(
    ballots: &BallotSet,
    rules: &VoteRules,
    rng: &mut R,
) -> Result<String, VotingErrors> {
    run_rounds(ballots, rules, rng, None)
}

fn run_rounds<R: Rng + ?Sized>(
    ballots: &BallotSet,
    rules: &VoteRules,
    rng: &mut R,
    mut stats: Option<&mut Vec<RoundStats>>,
) -> Result<String, VotingErrors> {
    rules.validate()?;

    let mut cur_ballots: BallotSet = ballots.clone();
    let mut round_id: RoundId = 0;
    // Every round either elects a candidate, eliminates one, or fails once no
    // candidate is left. This loop always terminates.
    loop {
        round_id += 1;
        debug!(
            "Round id: {:?} cur_candidates: {:?}",
            round_id,
            cur_ballots.surviving_roster()
        );
        let round_res = run_one_round(&cur_ballots, rules, rng, round_id)?;

        if let Some(l) = stats.as_mut() {
            l.push(round_result_to_stat(&round_res, round_id, &cur_ballots));
        }

        match round_res.outcome {
            RoundOutcome::Elected(cid) => {
                return Ok(cur_ballots.name(cid).to_string());
            }
            RoundOutcome::Eliminated(cid) => {
                let num_before = cur_ballots.surviving_ids().len();
                cur_ballots.purge_id(cid);
                // Invariant: the number of candidates decreased by exactly one.
                debug_assert_eq!(cur_ballots.surviving_ids().len() + 1, num_before);
            }
        }
    }
}

fn compute_tally(ballots: &BallotSet) -> HashMap<CandidateId, VoteCount> {
    let mut tally: HashMap<CandidateId, VoteCount> = HashMap::new();
    // Candidates who are nobody's first choice still take part with zero votes.
    for cid in ballots.surviving_ids().iter() {
        tally.insert(*cid, VoteCount::EMPTY);
    }
    for cid in ballots.first_choices().flatten() {
        if let Some(vc) = tally.get_mut(&cid) {
            *vc += VoteCount(1);
        }
    }
    tally
}

fn run_one_round<R: Rng + ?Sized>(
    ballots: &BallotSet,
    rules: &VoteRules,
    rng: &mut R,
    num_round: RoundId,
) -> Result<RoundResult, VotingErrors> {
    let tally = compute_tally(ballots);
    debug!("run_one_round: tally: {:?}", tally);

    let votes_cast: VoteCount = tally.values().cloned().sum();
    if votes_cast == VoteCount::EMPTY {
        debug!(
            "run_one_round: round {}: no vote cast, {} candidate(s) left",
            num_round,
            tally.len()
        );
        return Err(VotingErrors::NoQuorum { round: num_round });
    }

    // The tally is not empty since some votes were cast.
    let top_count: VoteCount = tally.values().cloned().max().unwrap_or(VoteCount::EMPTY);
    let top_fraction = fraction(top_count, votes_cast);
    debug!(
        "run_one_round: votes_cast: {:?} top_fraction: {}",
        votes_cast, top_fraction
    );

    if top_fraction > rules.majority_threshold {
        let best = candidates_with_count(&tally, top_count);
        let winner = match break_tie(&best, rules.tiebreak_mode, rng) {
            Some(cid) => cid,
            None => return Err(VotingErrors::NoQuorum { round: num_round }),
        };
        debug!(
            "run_one_round: {:?} has count {:?}, marking as winner (among {:?})",
            winner, top_count, best
        );
        return Ok(RoundResult {
            tally,
            votes_cast,
            top_count,
            outcome: RoundOutcome::Elected(winner),
            tied: best.len(),
        });
    }

    let min_count: VoteCount = tally.values().cloned().min().unwrap_or(VoteCount::EMPTY);
    let all_smallest = candidates_with_count(&tally, min_count);
    let eliminated = match break_tie(&all_smallest, rules.tiebreak_mode, rng) {
        Some(cid) => cid,
        None => return Err(VotingErrors::NoQuorum { round: num_round }),
    };
    debug!(
        "run_one_round: all_smallest: {:?} eliminated: {:?}",
        all_smallest, eliminated
    );
    Ok(RoundResult {
        tally,
        votes_cast,
        top_count,
        outcome: RoundOutcome::Eliminated(eliminated),
        tied: all_smallest.len(),
    })
}

fn fraction(count: VoteCount, total: VoteCount) -> f64 {
    count.0 as f64 / total.0 as f64
}

// The candidates with exactly this count, in roster order.
fn candidates_with_count(
    tally: &HashMap<CandidateId, VoteCount>,
    count: VoteCount,
) -> Vec<CandidateId> {
    let mut res: Vec<CandidateId> = tally
        .iter()
        .filter_map(|(cid, vc)| if *vc == count { Some(*cid) } else { None })
        .collect();
    res.sort();
    res
}

/// Selects one candidate among the tied candidates, which must be in roster order.
///
/// The list is never empty: some votes were cast, so the tally has a minimum and a maximum.
fn break_tie<R: Rng + ?Sized>(
    tied: &[CandidateId],
    tiebreak: TieBreakMode,
    rng: &mut R,
) -> Option<CandidateId> {
    match (tied, tiebreak) {
        ([], _) => None,
        ([single], _) => Some(*single),
        ([first, ..], TieBreakMode::UseCandidateOrder) => Some(*first),
        (_, TieBreakMode::UniformRandom) => tied.get(rng.gen_range(0..tied.len())).cloned(),
    }
}

fn round_result_to_stat(res: &RoundResult, round_id: RoundId, ballots: &BallotSet) -> RoundStats {
    let mut sorted_tally: Vec<(CandidateId, VoteCount)> =
        res.tally.iter().map(|(cid, vc)| (*cid, *vc)).collect();
    sorted_tally.sort_by(|(cid1, vc1), (cid2, vc2)| vc2.cmp(vc1).then(cid1.cmp(cid2)));

    let (elected, eliminated) = match res.outcome {
        RoundOutcome::Elected(cid) => (Some(ballots.name(cid).to_string()), None),
        RoundOutcome::Eliminated(cid) => (None, Some(ballots.name(cid).to_string())),
    };

    RoundStats {
        round: round_id,
        tally: sorted_tally
            .iter()
            .map(|(cid, vc)| (ballots.name(*cid).to_string(), vc.0))
            .collect(),
        votes_cast: res.votes_cast.0,
        top_fraction: fraction(res.top_count, res.votes_cast),
        elected,
        eliminated,
        tied: res.tied,
        removed: ballots
            .removed_roster()
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}
