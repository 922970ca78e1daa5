use clap::Parser;

/// This is an instant-runoff tabulation program for fully ranked ballots.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the election configuration in JSON format.
    /// For more information about the file format, read the documentation of the
    /// instant_runoff::manual module.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing the outcome of an election in JSON format. If provided, irv will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The file with the ballots. Setting this option overrides the file that may be
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv or xlsx. If not provided, it is deduced from
    /// the extension of the input file.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// If passed as an argument, the first column of the input is a candidate and not a timestamp.
    #[clap(long, takes_value = false)]
    pub no_timestamp: bool,

    /// (default 0.5) The fraction of the votes that a candidate must strictly exceed to win.
    #[clap(long, value_parser)]
    pub threshold: Option<f64>,

    /// (default useCandidateOrder) How ties are broken: useCandidateOrder or random.
    #[clap(long, value_parser)]
    pub tiebreak: Option<String>,

    /// (integer, optional) The seed for the random tiebreaks. Without a seed, every invocation
    /// draws different tiebreaks.
    #[clap(long, value_parser)]
    pub seed: Option<u64>,

    /// (integer, optional) If specified, the election is run this many times and the
    /// distinct winners are reported instead of the rounds.
    #[clap(long, value_parser)]
    pub simulations: Option<u64>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
