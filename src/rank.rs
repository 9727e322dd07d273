pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;

use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use std::fs;
use std::path::Path;

use text_diff::print_diff;
use topsis::*;

use crate::args::Args;
use crate::rank::config_reader::*;
use crate::rank::io_common::*;

#[derive(Debug, Snafu)]
pub enum RankError {
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error writing the result table"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet {name:?}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("The worksheet of {path} is empty"))]
    EmptyExcel { path: String },
    #[snafu(display("Error reading configuration file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing configuration file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Failed to write output file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading reference file {path}"))]
    OpeningReference {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Missing argument: {name}"))]
    MissingArgument { name: String },
    #[snafu(display("{source}"))]
    Evaluation { source: TopsisError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type RankResult<T> = Result<T, RankError>;

/// The output path that sends the result table to the standard output.
pub const STDOUT_OUTPUT: &str = "stdout";

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    Csv,
    Xlsx,
}

/// Everything needed for one run, after merging the configuration file and the arguments.
#[derive(PartialEq, Debug, Clone)]
pub struct RunSettings {
    pub input_path: String,
    pub input_type: InputType,
    pub excel_worksheet_name: Option<String>,
    pub weights: ListSpec,
    pub impacts: ListSpec,
    /// A file path, or `stdout`
    pub output: String,
    pub preview_rows: Option<usize>,
    pub reference: Option<String>,
    pub parse_options: ParseOptions,
    pub engine_options: EngineOptions,
}

impl RunSettings {
    pub fn writes_to_stdout(&self) -> bool {
        self.output == STDOUT_OUTPUT
    }
}

fn parse_input_type(s: &str) -> RankResult<InputType> {
    match s {
        "csv" => Ok(InputType::Csv),
        "xlsx" | "excel" => Ok(InputType::Xlsx),
        x => whatever!("Input type {:?} not implemented (expected csv or xlsx)", x),
    }
}

fn infer_input_type(path: &str) -> InputType {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("xlsx") | Some("xlsm") => InputType::Xlsx,
        _ => InputType::Csv,
    }
}

/// Merges the run configuration file (if any) with the command line arguments.
/// The arguments take precedence.
pub fn settings_from_args(args: &Args) -> RankResult<RunSettings> {
    let config: Option<RunConfig> = match args.config.as_ref() {
        Some(p) => Some(read_config(p)?),
        None => None,
    };
    debug!("settings_from_args: config: {:?}", config);
    let rules = config.as_ref().and_then(|c| c.rules.clone());

    let input_path = match (&args.input, &config) {
        (Some(p), _) => p.clone(),
        (None, Some(c)) => c.input.file_path.clone(),
        (None, None) => return MissingArgumentSnafu { name: "INPUT" }.fail(),
    };
    let weights = match (&args.weights, &config) {
        (Some(w), _) => ListSpec::Joined(w.clone()),
        (None, Some(c)) => c.weights()?,
        (None, None) => return MissingArgumentSnafu { name: "WEIGHTS" }.fail(),
    };
    let impacts = match (&args.impacts, &config) {
        (Some(i), _) => ListSpec::Joined(i.clone()),
        (None, Some(c)) => c.impacts()?,
        (None, None) => return MissingArgumentSnafu { name: "IMPACTS" }.fail(),
    };
    let config_output: Option<String> = config
        .as_ref()
        .and_then(|c| c.output.as_ref())
        .and_then(|o| o.file_path.clone());
    let output = match (&args.output, config_output) {
        (Some(o), _) => o.clone(),
        (None, Some(o)) => o,
        (None, None) => return MissingArgumentSnafu { name: "OUTPUT" }.fail(),
    };

    let provider = args
        .input_type
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.input.provider.clone()));
    let input_type = match provider {
        Some(p) => parse_input_type(&p)?,
        None => infer_input_type(&input_path),
    };

    let config_rules = rules.as_ref().map(|r| r.parse_options()).transpose()?;
    let parse_options = if args.strict_tokens {
        ParseOptions {
            empty_tokens: EmptyTokens::Reject,
        }
    } else {
        config_rules.unwrap_or(ParseOptions::DEFAULT)
    };
    let config_engine = rules.as_ref().map(|r| r.engine_options()).transpose()?;
    let engine_options = if args.fail_on_degenerate_row {
        EngineOptions {
            degenerate_row: DegenerateRow::Fail,
            ..EngineOptions::DEFAULT
        }
    } else {
        config_engine.unwrap_or(EngineOptions::DEFAULT)
    };

    Ok(RunSettings {
        input_path,
        input_type,
        excel_worksheet_name: args.excel_worksheet_name.clone().or_else(|| {
            config
                .as_ref()
                .and_then(|c| c.input.excel_worksheet_name.clone())
        }),
        weights,
        impacts,
        output,
        preview_rows: args.preview.or_else(|| {
            config
                .as_ref()
                .and_then(|c| c.output.as_ref())
                .and_then(|o| o.preview_rows)
        }),
        reference: args.reference.clone(),
        parse_options,
        engine_options,
    })
}

fn read_table(settings: &RunSettings) -> RankResult<RawTable> {
    info!(
        "Attempting to read {:?} file {:?}",
        settings.input_type, settings.input_path
    );
    match settings.input_type {
        InputType::Csv => io_csv::read_csv_table(&settings.input_path),
        InputType::Xlsx => io_excel::read_excel_table(
            &settings.input_path,
            settings.excel_worksheet_name.as_deref(),
        ),
    }
}

fn validate_settings(table: &RawTable, settings: &RunSettings) -> Result<Problem, TopsisError> {
    validate_inputs(
        table,
        settings.weights.as_input(),
        settings.impacts.as_input(),
        &settings.parse_options,
    )
}

/// Reads, validates and evaluates the input, then writes the result.
///
/// Nothing is written if any step before the writing fails.
pub fn run_topsis(settings: &RunSettings) -> RankResult<Evaluation> {
    let table = read_table(settings)?;
    debug!(
        "run_topsis: headers: {:?}, {} rows",
        table.headers,
        table.rows.len()
    );

    let problem = validate_settings(&table, settings).context(EvaluationSnafu {})?;
    let evaluation = problem
        .evaluate_with(&settings.engine_options)
        .context(EvaluationSnafu {})?;

    let result_csv = io_csv::write_csv_result(&table, &evaluation)?;

    if settings.writes_to_stdout() {
        print!("{}", result_csv);
    } else {
        fs::write(&settings.output, &result_csv).context(WritingOutputSnafu {
            path: settings.output.clone(),
        })?;
        println!("Success: TOPSIS result saved to '{}'", settings.output);
    }

    if let Some(k) = settings.preview_rows {
        let preview = format_preview(&table, &evaluation, k);
        // Keeps the result table alone on stdout.
        if settings.writes_to_stdout() {
            eprintln!("{}", preview);
        } else {
            println!("{}", preview);
        }
    }

    // The reference result, if provided for comparison
    if let Some(reference_p) = settings.reference.as_ref() {
        let reference = fs::read_to_string(reference_p).context(OpeningReferenceSnafu {
            path: reference_p.clone(),
        })?;
        let reference = reference.replace("\r\n", "\n");
        info!("reference: {:?}", reference);
        if reference != result_csv {
            warn!("Found differences with the reference result");
            print_diff(reference.as_str(), result_csv.as_str(), "\n");
            whatever!("Difference detected between calculated result and reference result")
        }
    }

    Ok(evaluation)
}

pub fn run_from_args(args: &Args) -> RankResult<()> {
    let settings = settings_from_args(args)?;
    info!("settings: {:?}", settings);
    run_topsis(&settings)?;
    Ok(())
}

#[cfg(test)]
fn test_dir() -> String {
    format!("{}/testdata", env!("CARGO_MANIFEST_DIR"))
}

#[cfg(test)]
fn run_topsis_test(test_name: &str) -> RankResult<Evaluation> {
    let _ = env_logger::builder().is_test(true).try_init();
    let output = std::env::temp_dir()
        .join(format!("topsis_{}_result.csv", test_name))
        .display()
        .to_string();
    let _ = fs::remove_file(&output);
    let args = Args {
        input: None,
        weights: None,
        impacts: None,
        output: Some(output.clone()),
        config: Some(format!(
            "{}/{}/{}_config.json",
            test_dir(),
            test_name,
            test_name
        )),
        reference: Some(format!(
            "{}/{}/{}_expected.csv",
            test_dir(),
            test_name,
            test_name
        )),
        input_type: None,
        excel_worksheet_name: None,
        preview: Some(3),
        strict_tokens: false,
        fail_on_degenerate_row: false,
        verbose: true,
    };
    info!("Running test {}", test_name);
    let settings = settings_from_args(&args)?;
    let res = run_topsis(&settings);
    if res.is_err() {
        assert!(
            !Path::new(&output).exists(),
            "no output expected after a failure"
        );
    }
    res
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) {
    if let Err(e) = run_topsis_test(test_name) {
        panic!("Test {} failed: {}", test_name, e);
    }
}
