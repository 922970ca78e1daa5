pub mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;
pub mod report;

use log::{debug, info, warn};

use instant_runoff::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use snafu::{prelude::*, Snafu};

use std::fs;

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::rcv::config_reader::*;
use crate::rcv::io_common::build_ballots;
use crate::rcv::report::*;

#[derive(Debug, Snafu)]
pub enum RcvError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("The workbook {path} has no worksheet named {name}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of the CSV file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("The file {path} has no header row"))]
    MissingHeader { path: String },
    #[snafu(display("Ballot {id}: cannot read the rank {content:?}"))]
    InvalidRank { id: String, content: String },
    #[snafu(display("Ballot {id}: {defect}"))]
    MalformedBallot { id: String, defect: BallotDefect },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing the report"))]
    Reporting { source: std::io::Error },
    #[snafu(display("Voting error: {source}"))]
    Voting { source: VotingErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type RcvResult<T> = Result<T, RcvError>;

/// A ballot, as parsed by the readers.
/// This is before checking that the ranks form a valid ranking.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedBallot {
    pub id: String,
    pub lineno: usize,
    /// The content of the cells, one per candidate, in the order of the header.
    pub ranks: Vec<String>,
}

/// The content of one input file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedSheet {
    pub candidates: Vec<String>,
    pub ballots: Vec<ParsedBallot>,
}

fn read_ranking_data(source: &InputSource) -> RcvResult<ParsedSheet> {
    info!("Attempting to read rank file {:?}", source.path);
    match source.provider.as_str() {
        "csv" => io_csv::read_csv_ranking(&source.path, source.timestamp_column_present),
        "xlsx" => io_xlsx::read_xlsx_ranking(
            &source.path,
            source.timestamp_column_present,
            source.excel_worksheet_name.as_deref(),
        ),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

/// Reads all the input files. They must all declare the same candidates, in the same order.
fn read_all_ranking_data(sources: &[InputSource]) -> RcvResult<ParsedSheet> {
    let mut res: Option<ParsedSheet> = None;
    for source in sources.iter() {
        let sheet = read_ranking_data(source)?;
        debug!(
            "read_all_ranking_data: {:?}: {} ballots, candidates {:?}",
            source.path,
            sheet.ballots.len(),
            sheet.candidates
        );
        res = match res {
            None => Some(sheet),
            Some(mut acc) => {
                if acc.candidates != sheet.candidates {
                    whatever!(
                        "The candidates in {} ({:?}) differ from the previous files ({:?})",
                        source.path,
                        sheet.candidates,
                        acc.candidates
                    );
                }
                acc.ballots.extend(sheet.ballots);
                Some(acc)
            }
        };
    }
    match res {
        Some(sheet) => Ok(sheet),
        None => whatever!("No input file: use --input or a configuration file with cvrFileSources"),
    }
}

fn check_reference(reference_path: &str, pretty_js_stats: &str) -> RcvResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    info!("The summary matches the reference {}", reference_path);
    Ok(())
}

fn write_summary(out: &str, pretty_js_stats: &str) -> RcvResult<()> {
    if out == "stdout" {
        println!("{}", pretty_js_stats);
    } else {
        fs::write(out, pretty_js_stats).context(WritingOutputSnafu { path: out })?;
        info!("Summary written to {}", out);
    }
    Ok(())
}

/// Runs the election (or the simulations) described by the command line and the
/// optional configuration file.
pub fn run_election(args: &Args) -> RcvResult<()> {
    let config: Option<(RcvConfig, String)> = match args.config.as_ref() {
        Some(config_path) => Some((read_config(config_path)?, config_path.clone())),
        None => None,
    };
    let settings = build_settings(
        args,
        config.as_ref().map(|(c, path)| (c, path.as_str())),
    )?;
    info!("settings: {:?}", settings);

    let sheet = read_all_ranking_data(&settings.sources)?;
    let ballots = build_ballots(&sheet)?;
    info!(
        "Read {} ballots, candidates: {:?}",
        ballots.num_ballots(),
        ballots.original_roster()
    );

    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // The text report goes to stderr when the summary takes stdout.
    let mut reporter: TextReporter<Box<dyn std::io::Write>> =
        if settings.out.as_deref() == Some("stdout") {
            TextReporter::new(Box::new(std::io::stderr()), settings.rules.majority_threshold)
        } else {
            TextReporter::new(Box::new(std::io::stdout()), settings.rules.majority_threshold)
        };

    let result_js: JSValue = match settings.simulation_count {
        Some(num_runs) => {
            let summary = run_simulations(&ballots, &settings.rules, num_runs, &mut rng)
                .context(VotingSnafu {})?;
            reporter.simulations(&summary).context(ReportingSnafu {})?;
            simulation_js(&settings, &summary)
        }
        None => {
            let mut round_stats: Vec<RoundStats> = Vec::new();
            match run_voting_rounds(&ballots, &settings.rules, &mut rng, &mut round_stats) {
                Ok(winner) => {
                    let result = VotingResult {
                        winner,
                        threshold: settings.rules.majority_threshold,
                        round_stats,
                    };
                    report_result(&result, &mut reporter).context(ReportingSnafu {})?;
                    summary_js(&settings, &result)
                }
                Err(e) => {
                    report_failure(&round_stats, &e, &mut reporter).context(ReportingSnafu {})?;
                    return Err(RcvError::Voting { source: e });
                }
            }
        }
    };

    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    if let Some(out) = settings.out.as_ref() {
        write_summary(out, &pretty_js_stats)?;
    }

    // The reference summary, if provided for comparison
    if let Some(reference_path) = args.reference.as_ref() {
        check_reference(reference_path, &pretty_js_stats)?;
    }

    Ok(())
}
