//! Purpose: `clet` CLI entry point; runs command scripts against the C entry points.
//! Role: Binary crate root; stands in for a host runtime that loads libclet and calls it by name.
//! Invariants: Each script line is one call; results go to stdout, one line per call.
//! Invariants: Errors are emitted as JSON on stderr; exit code comes from `api::to_exit_code`.
//! Invariants: `set/get/remove/free` cross the real C boundary via `host`; `init` applies CLI options.
#![allow(clippy::result_large_err)]
use std::error::Error as StdError;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::aot::Shell;
use serde::Serialize;
use serde_json::{Map, Value, json};

use clet::api::{EmptyKeys, Error, ErrorKind, Lookup, SENTINEL, StoreOptions, global, to_exit_code};
use clet::{host, logging};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "clet",
    version,
    about = "Run variable-store command scripts through the libclet C entry points",
    after_help = r#"Script lines:
  init               create the table (keeps a live one)
  set <key> <value>  store a value; everything after the first space is the value
  get <key>          print the value, or "nil" when absent
  remove <key>       drop one entry
  free               drop the table and every entry
  dump               print the live table as a JSON object
Blank lines and lines starting with '#' are skipped."#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "Log filter in tracing EnvFilter syntax (overrides CLET_LOG; default: warn)"
    )]
    log: Option<String>,
    #[arg(
        long,
        global = true,
        default_value = "text",
        value_enum,
        help = "Result format on stdout: text|json"
    )]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Execute a command script from a file or stdin")]
    Run(RunArgs),
    #[command(about = "Print shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    #[arg(help = "Script path (default: stdin)", value_hint = ValueHint::FilePath)]
    script: Option<PathBuf>,
    #[arg(long, help = "Allow empty keys (lines starting with a space)")]
    accept_empty_keys: bool,
    #[arg(long, help = "Line buffer chunk size in bytes (default: CLET_CHUNK_SIZE or 100)")]
    chunk_size: Option<usize>,
}

impl RunArgs {
    fn store_options(&self) -> StoreOptions {
        let mut options = StoreOptions::from_env();
        if self.accept_empty_keys {
            options = options.with_empty_keys(EmptyKeys::Accept);
        }
        if let Some(chunk_size) = self.chunk_size {
            options = options.with_chunk_size(chunk_size);
        }
        options
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = Cli::parse();
    logging::init(cli.log.as_deref(), "warn");

    match cli.command {
        Command::Run(args) => {
            let options = args.store_options();
            let stdout = io::stdout();
            let mut out = stdout.lock();
            match &args.script {
                Some(path) => {
                    let file = File::open(path).map_err(|err| {
                        Error::new(ErrorKind::Io)
                            .with_message(format!("failed to open script {}", path.display()))
                            .with_source(err)
                    })?;
                    run_script(BufReader::new(file), &mut out, cli.format, options)?;
                }
                None => run_script(io::stdin().lock(), &mut out, cli.format, options)?,
            }
            Ok(RunOutcome::ok())
        }
        Command::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::aot::generate(shell, &mut command, "clet", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
    }
}

fn run_script<R, W>(
    reader: R,
    out: &mut W,
    format: OutputFormat,
    options: StoreOptions,
) -> Result<(), Error>
where
    R: BufRead,
    W: Write,
{
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read script")
                .with_source(err)
        })?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let (verb, arg) = line.split_once(' ').unwrap_or((line, ""));
        let record = execute(verb, arg, options).map_err(|err| {
            let message = err.message().unwrap_or("call failed").to_string();
            let kind = match err.kind() {
                ErrorKind::NotFound => ErrorKind::Usage,
                kind => kind,
            };
            Error::new(kind)
                .with_message(format!("line {}: {message}", index + 1))
                .with_source(err)
        })?;
        write_record(out, format, verb, arg, &record)?;
    }
    out.flush().map_err(write_error)
}

enum Record {
    Text(String),
    Table(Value),
}

fn execute(verb: &str, arg: &str, options: StoreOptions) -> Result<Record, Error> {
    match verb {
        "dump" => {
            let table = global::snapshot()?.unwrap_or_default();
            Ok(Record::Table(json!(table)))
        }
        "init" | "clet_init" => {
            global::init_with(options)?;
            Ok(Record::Text(SENTINEL.to_string()))
        }
        _ => host::call_by_name(verb, arg).map(Record::Text),
    }
}

fn write_record<W: Write>(
    out: &mut W,
    format: OutputFormat,
    verb: &str,
    arg: &str,
    record: &Record,
) -> Result<(), Error> {
    let line = match (format, record) {
        (OutputFormat::Text, Record::Text(text)) => text.clone(),
        (OutputFormat::Text, Record::Table(table)) => table.to_string(),
        (OutputFormat::Json, Record::Text(text)) => {
            let found = matches!(verb, "get" | "clet_get")
                .then(|| Lookup::from_wire(text).is_found());
            record_json(verb, arg, json!(text), found)?
        }
        (OutputFormat::Json, Record::Table(table)) => record_json(verb, arg, table.clone(), None)?,
    };
    writeln!(out, "{line}").map_err(write_error)
}

#[derive(Serialize)]
struct CallRecord<'a> {
    call: &'a str,
    arg: &'a str,
    result: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    found: Option<bool>,
}

fn record_json(verb: &str, arg: &str, result: Value, found: Option<bool>) -> Result<String, Error> {
    let record = CallRecord {
        call: verb,
        arg,
        result,
        found,
    };
    serde_json::to_string(&record).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode call record")
            .with_source(err)
    })
}

fn write_error(err: io::Error) -> Error {
    Error::new(ErrorKind::Io)
        .with_message("failed to write output")
        .with_source(err)
}

fn emit_error(err: &Error) {
    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert(
        "message".to_string(),
        json!(err.message().unwrap_or("error")),
    );
    if let Some(key) = err.key() {
        inner.insert("key".to_string(), json!(key));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut current = err.source();
    while let Some(source) = current {
        causes.push(source.to_string());
        current = source.source();
    }
    causes
}
