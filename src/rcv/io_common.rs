use std::path::Path;

use crate::rcv::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}:{}", simplified_file_name, lineno)
}

/// Index of the first column holding ranks.
pub fn first_vote_column(timestamp_column_present: bool) -> usize {
    if timestamp_column_present {
        1
    } else {
        0
    }
}

/// The name of a candidate, taken from the header of its column.
///
/// Forms tools label the columns of a grid question as `Question [Candidate]`:
/// the name is the text inside the last pair of brackets, or the full header
/// if there are none.
pub fn candidate_name(header: &str) -> String {
    let h = header.trim();
    if let (Some(start), Some(end)) = (h.rfind('['), h.rfind(']')) {
        if start < end {
            return h[start + 1..end].trim().to_string();
        }
    }
    h.to_string()
}

fn parse_rank(ballot: &ParsedBallot, cell: &str) -> RcvResult<u32> {
    match cell.trim().parse::<u32>() {
        Ok(rank) => Ok(rank),
        Err(_) => InvalidRankSnafu {
            id: ballot.id.clone(),
            content: cell,
        }
        .fail(),
    }
}

/// Checks the parsed ballots and assembles them for counting.
pub fn build_ballots(sheet: &ParsedSheet) -> RcvResult<BallotSet> {
    let mut rows: Vec<Vec<u32>> = Vec::with_capacity(sheet.ballots.len());
    for pb in sheet.ballots.iter() {
        let ranks: Vec<u32> = pb
            .ranks
            .iter()
            .map(|cell| parse_rank(pb, cell))
            .collect::<RcvResult<Vec<u32>>>()?;
        debug!("build_ballots: line {}: ranks {:?}", pb.lineno, ranks);
        rows.push(ranks);
    }
    BallotSet::from_rank_rows(&rows, &sheet.candidates).map_err(|e| match e {
        VotingErrors::MalformedBallot { voter, defect } => RcvError::MalformedBallot {
            id: sheet
                .ballots
                .get(voter)
                .map(|pb| pb.id.clone())
                .unwrap_or_else(|| format!("#{}", voter)),
            defect,
        },
        e => RcvError::Voting { source: e },
    })
}
