use clap::Parser;

/// This is a program to rank alternatives with the TOPSIS multi-criteria method.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The table of alternatives. The first column is the label of each alternative,
    /// the other columns are the numeric criteria.
    #[clap(value_parser)]
    pub input: Option<String>,

    /// (list of comma-separated numbers) One positive weight per criterion, for example "1,1,1,2".
    #[clap(value_parser, allow_hyphen_values = true)]
    pub weights: Option<String>,

    /// (list of comma-separated '+' or '-') One impact per criterion, for example "+,+,-,+".
    #[clap(value_parser, allow_hyphen_values = true)]
    pub impacts: Option<String>,

    /// (file path or 'stdout') Where the result table is written in CSV format.
    #[clap(value_parser)]
    pub output: Option<String>,

    /// (file path, optional) A JSON file describing the run. The positional arguments, when given,
    /// override the values of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing the expected result in CSV format. If provided, the
    /// program checks that the computed result matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (default: inferred from the file extension, else csv) The type of the input: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet
    /// to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (number) Prints the first rows of the result.
    #[clap(long, value_parser)]
    pub preview: Option<usize>,

    /// If passed as an argument, empty entries in the weights and impacts are errors instead of
    /// being ignored.
    #[clap(long, takes_value = false)]
    pub strict_tokens: bool,

    /// If passed as an argument, the evaluation fails when an alternative is at distance zero
    /// from both ideal solutions, instead of giving it a score of 0.
    #[clap(long, takes_value = false)]
    pub fail_on_degenerate_row: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
