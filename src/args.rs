use clap::Parser;

/// This is a reporting program for election results.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The configuration of the report, in JSON format.
    /// For more information about the file format, read the manual of the election_results crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the report of an election in JSON format. If provided, tallyboard will
    /// check that the computed report matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the report will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The snapshot of the election results in JSON format. Setting this option overrides
    /// the snapshot source that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path or empty) The participation statistics of the election, broken down by department.
    #[clap(long, value_parser)]
    pub statistics: Option<String>,

    /// (file path or empty) If specified, the results will also be written as a CSV table to the given location.
    #[clap(long, value_parser)]
    pub csv: Option<String>,

    /// (noWinner or allTied) Who wins a position in which no candidate received a vote.
    #[clap(long, value_parser)]
    pub zero_vote_policy: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
