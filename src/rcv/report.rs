// Rendering of the results: human-readable text and the JSON summary.

use std::io::{self, Write};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use crate::rcv::config_reader::ElectionSettings;
use instant_runoff::*;

/// Receives the results as they are presented to the user.
pub trait Reporter {
    fn round(&mut self, stats: &RoundStats) -> io::Result<()>;
    fn winner(&mut self, result: &VotingResult) -> io::Result<()>;
    fn failure(&mut self, err: &VotingErrors) -> io::Result<()>;
    fn simulations(&mut self, summary: &SimulationSummary) -> io::Result<()>;
}

/// Sends every round of the election, then the winner, to the reporter.
pub fn report_result(result: &VotingResult, reporter: &mut dyn Reporter) -> io::Result<()> {
    for stats in result.round_stats.iter() {
        reporter.round(stats)?;
    }
    reporter.winner(result)
}

/// Sends the rounds completed before the count failed, then the failure.
pub fn report_failure(
    completed: &[RoundStats],
    err: &VotingErrors,
    reporter: &mut dyn Reporter,
) -> io::Result<()> {
    for stats in completed.iter() {
        reporter.round(stats)?;
    }
    reporter.failure(err)
}

/// Writes the report as plain text.
pub struct TextReporter<W: Write> {
    out: W,
    threshold: f64,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W, threshold: f64) -> TextReporter<W> {
        TextReporter { out, threshold }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn round(&mut self, stats: &RoundStats) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "################################################")?;
        writeln!(self.out, "##{:^44}##", format!("Round {}", stats.round))?;
        writeln!(self.out, "################################################")?;
        writeln!(self.out, "Still standing:")?;
        for (name, count) in stats.tally.iter() {
            writeln!(self.out, "  Votes: {:>6}  Name: {}", count, name)?;
        }
        if !stats.removed.is_empty() {
            writeln!(self.out, "Already removed: {}", stats.removed.join(", "))?;
        }
        writeln!(self.out)?;
        writeln!(
            self.out,
            "Fraction of the {} votes going to the top candidate: {:.4}",
            stats.votes_cast,
            stats.top_fraction
        )?;
        if let Some(name) = stats.elected.as_ref() {
            writeln!(self.out, "Elected: {}", name)?;
        }
        if let Some(name) = stats.eliminated.as_ref() {
            writeln!(
                self.out,
                "The top candidate needs more than {} of the votes.",
                self.threshold
            )?;
            writeln!(self.out, "Dropping from consideration: {}", name)?;
        }
        if stats.tied > 1 {
            writeln!(self.out, "(tiebreak among {} candidates)", stats.tied)?;
        }
        Ok(())
    }

    fn winner(&mut self, result: &VotingResult) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "Winner: {} after {} round(s)",
            result.winner,
            result.num_rounds()
        )
    }

    fn failure(&mut self, err: &VotingErrors) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "No winner: {}", err)
    }

    fn simulations(&mut self, summary: &SimulationSummary) -> io::Result<()> {
        writeln!(self.out, "Ran the election {} times", summary.runs)?;
        for (name, count) in summary.winners.iter() {
            writeln!(
                self.out,
                "  Winner: {}  runs: {}  ({:.2}%)",
                name,
                count,
                100.0 * summary.frequency(name)
            )?;
        }
        for (err, count) in summary.failures.iter() {
            writeln!(self.out, "  Failed: {}  runs: {}", err, count)?;
        }
        if summary.is_unanimous() {
            writeln!(self.out, "All the runs elected the same candidate.")?;
        }
        Ok(())
    }
}

pub fn tiebreak_name(mode: TieBreakMode) -> &'static str {
    match mode {
        TieBreakMode::UseCandidateOrder => "useCandidateOrder",
        TieBreakMode::UniformRandom => "random",
    }
}

fn result_stats_to_json(rs: &VotingResult) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in rs.round_stats.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (name, count) in round_stat.tally.iter() {
            tally.insert(name.clone(), json!(count.to_string()));
        }

        let mut tally_results: Vec<JSValue> = Vec::new();
        if let Some(name) = round_stat.eliminated.as_ref() {
            tally_results.push(json!({ "eliminated": name }));
        }
        if let Some(name) = round_stat.elected.as_ref() {
            tally_results.push(json!({ "elected": name }));
        }

        let js = json!({"round": round_stat.round, "tally": tally, "tallyResults": tally_results});
        l.push(js);
    }
    l
}

fn config_js(settings: &ElectionSettings) -> JSMap<String, JSValue> {
    let mut c: JSMap<String, JSValue> = JSMap::new();
    c.insert("contest".to_string(), json!(settings.contest_name));
    c.insert(
        "threshold".to_string(),
        json!(settings.rules.majority_threshold.to_string()),
    );
    c.insert(
        "tiebreakMode".to_string(),
        json!(tiebreak_name(settings.rules.tiebreak_mode)),
    );
    c
}

/// The JSON summary of one election.
pub fn summary_js(settings: &ElectionSettings, rv: &VotingResult) -> JSValue {
    json!({
        "config": config_js(settings),
        "results": result_stats_to_json(rv),
        "winner": rv.winner })
}

/// The JSON summary of a batch of simulations.
pub fn simulation_js(settings: &ElectionSettings, summary: &SimulationSummary) -> JSValue {
    let mut c = config_js(settings);
    c.insert(
        "simulationCount".to_string(),
        json!(summary.runs.to_string()),
    );
    if let Some(seed) = settings.seed {
        c.insert("randomSeed".to_string(), json!(seed.to_string()));
    }

    let mut winners: JSMap<String, JSValue> = JSMap::new();
    for (name, count) in summary.winners.iter() {
        winners.insert(name.clone(), json!(count.to_string()));
    }
    let mut failures: JSMap<String, JSValue> = JSMap::new();
    for (err, count) in summary.failures.iter() {
        failures.insert(err.to_string(), json!(count.to_string()));
    }
    json!({
        "config": c,
        "winners": winners,
        "failures": failures })
}
