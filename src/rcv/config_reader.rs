use crate::args::Args;
use crate::rcv::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use std::path::Path;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "timestampColumnPresent")]
    pub timestamp_column_present: Option<bool>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RcvRules {
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: String,
    #[serde(rename = "randomSeed")]
    pub random_seed: Option<String>,
    #[serde(rename = "majorityThreshold")]
    pub majority_threshold: Option<f64>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSettings {
    #[serde(rename = "simulationCount")]
    pub simulation_count: u64,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RcvConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "cvrFileSources")]
    pub cvr_file_sources: Vec<FileSource>,
    pub rules: RcvRules,
    pub simulation: Option<SimulationSettings>,
}

/// A file to read the ballots from, with its path resolved.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct InputSource {
    pub path: String,
    pub provider: String,
    pub timestamp_column_present: bool,
    pub excel_worksheet_name: Option<String>,
}

/// Everything needed to run an election, after merging the command line and the
/// configuration file.
#[derive(PartialEq, Debug, Clone)]
pub struct ElectionSettings {
    pub contest_name: String,
    pub sources: Vec<InputSource>,
    pub rules: VoteRules,
    pub seed: Option<u64>,
    pub simulation_count: Option<u64>,
    pub out: Option<String>,
}

pub fn read_config(path: &str) -> RcvResult<RcvConfig> {
    let config_str = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: RcvConfig = serde_json::from_str(&config_str).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> RcvResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

pub fn parse_tiebreak(mode: &str) -> RcvResult<TieBreakMode> {
    match mode {
        "useCandidateOrder" | "deterministic" => Ok(TieBreakMode::UseCandidateOrder),
        "random" => Ok(TieBreakMode::UniformRandom),
        x => whatever!(
            "Cannot use tiebreak mode {:?} (expected useCandidateOrder or random)",
            x
        ),
    }
}

fn infer_provider(path: &str) -> String {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext.as_deref() {
        Some("xlsx") => "xlsx".to_string(),
        _ => "csv".to_string(),
    }
}

// Paths in the configuration file are relative to the directory of this file.
fn resolve_path(config_path: &str, file_path: &str) -> String {
    match Path::new(config_path).parent() {
        Some(root) if !Path::new(file_path).is_absolute() => {
            root.join(file_path).display().to_string()
        }
        _ => file_path.to_string(),
    }
}

/// Merges the command line arguments with the configuration file, if any.
/// The command line takes precedence.
pub fn build_settings(
    args: &Args,
    config: Option<(&RcvConfig, &str)>,
) -> RcvResult<ElectionSettings> {
    let tiebreak_mode = match (args.tiebreak.as_ref(), config) {
        (Some(mode), _) => parse_tiebreak(mode)?,
        (None, Some((c, _))) => parse_tiebreak(&c.rules.tiebreak_mode)?,
        (None, None) => TieBreakMode::UseCandidateOrder,
    };
    let majority_threshold = args
        .threshold
        .or_else(|| config.and_then(|(c, _)| c.rules.majority_threshold))
        .unwrap_or(VoteRules::DEFAULT_THRESHOLD);
    let rules = VoteRules::new(majority_threshold, tiebreak_mode).context(VotingSnafu {})?;

    let seed = match (args.seed, config.and_then(|(c, _)| c.rules.random_seed.as_ref())) {
        (Some(seed), _) => Some(seed),
        (None, Some(s)) => match s.parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(e) => whatever!("Cannot read randomSeed {:?}: {}", s, e),
        },
        (None, None) => None,
    };

    let sources: Vec<InputSource> = match (args.input.as_ref(), config) {
        (Some(input), _) => vec![InputSource {
            path: input.clone(),
            provider: args
                .input_type
                .clone()
                .unwrap_or_else(|| infer_provider(input)),
            timestamp_column_present: !args.no_timestamp,
            excel_worksheet_name: args.excel_worksheet_name.clone(),
        }],
        (None, Some((c, config_path))) => c
            .cvr_file_sources
            .iter()
            .map(|cfs| InputSource {
                path: resolve_path(config_path, &cfs.file_path),
                provider: cfs.provider.clone(),
                timestamp_column_present: !args.no_timestamp
                    && cfs.timestamp_column_present.unwrap_or(true),
                excel_worksheet_name: args
                    .excel_worksheet_name
                    .clone()
                    .or_else(|| cfs.excel_worksheet_name.clone()),
            })
            .collect(),
        (None, None) => vec![],
    };

    let simulation_count = args.simulations.or_else(|| {
        config.and_then(|(c, _)| c.simulation.as_ref().map(|s| s.simulation_count))
    });

    let out = match (args.out.as_ref(), config) {
        (Some(out), _) => Some(out.clone()),
        (None, Some((c, config_path))) => c
            .output_settings
            .output_path
            .as_ref()
            .map(|p| resolve_path(config_path, p)),
        (None, None) => None,
    };

    let contest_name = match (config, sources.first()) {
        (Some((c, _)), _) => c.output_settings.contest_name.clone(),
        (None, Some(source)) => io_common::simplify_file_name(&source.path),
        (None, None) => "election".to_string(),
    };

    Ok(ElectionSettings {
        contest_name,
        sources,
        rules,
        seed,
        simulation_count,
        out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "outputSettings": { "contestName": "Group name", "outputPath": "out/summary.json" },
        "cvrFileSources": [
            { "provider": "csv", "filePath": "votes.csv" },
            { "provider": "xlsx", "filePath": "/data/more.xlsx", "timestampColumnPresent": false,
              "excelWorksheetName": "Form1" }
        ],
        "rules": { "tiebreakMode": "random", "randomSeed": "42", "majorityThreshold": 0.6 },
        "simulation": { "simulationCount": 1000 }
    }"#;

    fn config() -> RcvConfig {
        serde_json::from_str(CONFIG).unwrap()
    }

    #[test]
    fn settings_from_config() {
        let c = config();
        let s = build_settings(&Args::default(), Some((&c, "/elections/config.json"))).unwrap();
        assert_eq!(s.contest_name, "Group name");
        assert_eq!(
            s.rules,
            VoteRules::new(0.6, TieBreakMode::UniformRandom).unwrap()
        );
        assert_eq!(s.seed, Some(42));
        assert_eq!(s.simulation_count, Some(1000));
        assert_eq!(s.out, Some("/elections/out/summary.json".to_string()));
        assert_eq!(
            s.sources,
            vec![
                InputSource {
                    path: "/elections/votes.csv".to_string(),
                    provider: "csv".to_string(),
                    timestamp_column_present: true,
                    excel_worksheet_name: None,
                },
                InputSource {
                    path: "/data/more.xlsx".to_string(),
                    provider: "xlsx".to_string(),
                    timestamp_column_present: false,
                    excel_worksheet_name: Some("Form1".to_string()),
                }
            ]
        );
    }

    #[test]
    fn command_line_overrides_config() {
        let c = config();
        let args = Args {
            input: Some("ballots.XLSX".to_string()),
            tiebreak: Some("useCandidateOrder".to_string()),
            threshold: Some(0.5),
            seed: Some(7),
            simulations: Some(3),
            no_timestamp: true,
            out: Some("stdout".to_string()),
            ..Args::default()
        };
        let s = build_settings(&args, Some((&c, "/elections/config.json"))).unwrap();
        assert_eq!(s.rules, VoteRules::DEFAULT_RULES);
        assert_eq!(s.seed, Some(7));
        assert_eq!(s.simulation_count, Some(3));
        assert_eq!(s.out, Some("stdout".to_string()));
        assert_eq!(s.sources.len(), 1);
        assert_eq!(s.sources[0].provider, "xlsx");
        assert!(!s.sources[0].timestamp_column_present);
    }

    #[test]
    fn defaults_without_config() {
        let args = Args {
            input: Some("/tmp/votes.csv".to_string()),
            ..Args::default()
        };
        let s = build_settings(&args, None).unwrap();
        assert_eq!(s.rules, VoteRules::DEFAULT_RULES);
        assert_eq!(s.contest_name, "votes.csv");
        assert_eq!(s.seed, None);
        assert_eq!(s.simulation_count, None);
        assert!(s.sources[0].timestamp_column_present);
        assert_eq!(s.sources[0].provider, "csv");
    }

    #[test]
    fn invalid_rules() {
        let args = Args {
            tiebreak: Some("coinFlip".to_string()),
            ..Args::default()
        };
        assert!(build_settings(&args, None).is_err());
        let args = Args {
            threshold: Some(1.5),
            ..Args::default()
        };
        assert!(matches!(
            build_settings(&args, None),
            Err(RcvError::Voting {
                source: VotingErrors::InvalidThreshold
            })
        ));
        let mut c = config();
        c.rules.random_seed = Some("not a number".to_string());
        assert!(build_settings(&Args::default(), Some((&c, "config.json"))).is_err());
    }
}
