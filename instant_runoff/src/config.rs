// ******** Output data structures *********

use std::error::Error;
use std::fmt::Display;

/// Statistics for one round
#[derive(PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    /// The first-choice count of every candidate still standing at the start of the round,
    /// sorted by decreasing count, then by position in the original roster.
    pub tally: Vec<(String, u64)>,
    pub votes_cast: u64,
    /// The fraction of `votes_cast` held by the top candidate.
    pub top_fraction: f64,
    pub elected: Option<String>,
    pub eliminated: Option<String>,
    /// Number of candidates that were tied when the tiebreak policy was applied
    /// for this round's decision. 1 if no tie had to be resolved.
    pub tied: usize,
    /// The candidates removed in the previous rounds, in roster order.
    pub removed: Vec<String>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct VotingResult {
    pub winner: String,
    pub threshold: f64,
    pub round_stats: Vec<RoundStats>,
}

impl VotingResult {
    pub fn num_rounds(&self) -> u32 {
        self.round_stats.len() as u32
    }
}

// ********* Errors **********

/// The reason a ballot could not be accepted.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum BallotDefect {
    /// The ballot does not rank exactly all the candidates.
    WrongLength { expected: usize, actual: usize },
    /// A rank outside of 1..=K.
    RankOutOfRange(u32),
    /// The same rank was given twice.
    DuplicateRank(u32),
    /// A candidate index outside of the roster.
    UnknownCandidate(usize),
    /// A name that is not in the roster.
    UnknownCandidateName(String),
    /// The same candidate was ranked twice.
    DuplicateCandidate(usize),
}

impl Display for BallotDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BallotDefect::WrongLength { expected, actual } => {
                write!(f, "expected {} ranks, found {}", expected, actual)
            }
            BallotDefect::RankOutOfRange(r) => write!(f, "rank {} is out of range", r),
            BallotDefect::DuplicateRank(r) => write!(f, "rank {} is used more than once", r),
            BallotDefect::UnknownCandidate(c) => write!(f, "unknown candidate index {}", c),
            BallotDefect::UnknownCandidateName(name) => write!(f, "unknown candidate {:?}", name),
            BallotDefect::DuplicateCandidate(c) => {
                write!(f, "candidate index {} is ranked more than once", c)
            }
        }
    }
}

/// Errors that prevent the algorithm from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum VotingErrors {
    /// A ballot is not a full ranking of the candidates.
    /// `voter` is the position of the ballot in the input (starting at 0).
    MalformedBallot { voter: usize, defect: BallotDefect },
    /// The same name appears twice in the list of candidates.
    DuplicateCandidate(String),
    /// The majority threshold is not a fraction in (0, 1].
    InvalidThreshold,
    /// No vote could be counted in the given round: all the ballots are exhausted
    /// or no candidate is left.
    NoQuorum { round: u32 },
}

impl Error for VotingErrors {}

impl Display for VotingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingErrors::MalformedBallot { voter, defect } => {
                write!(f, "malformed ballot for voter #{}: {}", voter, defect)
            }
            VotingErrors::DuplicateCandidate(name) => {
                write!(f, "candidate {:?} is declared more than once", name)
            }
            VotingErrors::InvalidThreshold => {
                write!(f, "the majority threshold must be a fraction in (0, 1]")
            }
            VotingErrors::NoQuorum { round } => {
                write!(f, "no vote left to count in round {}", round)
            }
        }
    }
}

// ********* Configuration **********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum TieBreakMode {
    /// Among the tied candidates, the one that comes first in the original roster is selected.
    UseCandidateOrder,
    /// Among the tied candidates, one is drawn uniformly at random.
    /// The source of randomness is provided by the caller.
    UniformRandom,
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct VoteRules {
    /// A candidate wins as soon as their share of the votes cast is strictly
    /// greater than this fraction.
    pub majority_threshold: f64,
    pub tiebreak_mode: TieBreakMode,
}

impl VoteRules {
    pub const DEFAULT_THRESHOLD: f64 = 0.5;

    pub const DEFAULT_RULES: VoteRules = VoteRules {
        majority_threshold: VoteRules::DEFAULT_THRESHOLD,
        tiebreak_mode: TieBreakMode::UseCandidateOrder,
    };

    pub fn new(
        majority_threshold: f64,
        tiebreak_mode: TieBreakMode,
    ) -> Result<VoteRules, VotingErrors> {
        let rules = VoteRules {
            majority_threshold,
            tiebreak_mode,
        };
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), VotingErrors> {
        // Also rejects NaN.
        if self.majority_threshold > 0.0 && self.majority_threshold <= 1.0 {
            Ok(())
        } else {
            Err(VotingErrors::InvalidThreshold)
        }
    }
}

impl Default for VoteRules {
    fn default() -> Self {
        VoteRules::DEFAULT_RULES
    }
}
