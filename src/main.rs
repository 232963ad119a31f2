//! Interactive command loop over the JSON documents of a flatdb database.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use flatdb::{Config, Database, Outcome, Storage, parser::parse_command};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flatdb")]
#[command(about = "Flat-file table store with an interactive command loop", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, env = "FLATDB_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding one document per table (default: data)
    #[arg(long, env = "FLATDB_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Document holding the table schemas (default: db_meta.json)
    #[arg(long, env = "FLATDB_METADATA")]
    metadata: Option<PathBuf>,

    /// Run drop_table and delete without asking for confirmation
    #[arg(long, short)]
    yes: bool,

    /// Log filter, e.g. "info" or "flatdb=debug"
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    log: String,
}

impl Cli {
    /// The configuration file, if any, with command-line overrides applied.
    fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = Config::load_or_default(self.config.as_deref())?;

        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(metadata) = &self.metadata {
            config.metadata_file = metadata.clone();
        }
        if self.yes {
            config.confirm_destructive = false;
        }

        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log).context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = cli.resolve_config()?;
    tracing::debug!(?config, "configuration loaded");

    let mut db = Database::open(&config);
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_repl(&mut db, stdin.lock(), stdout.lock(), config.confirm_destructive)?;

    Ok(())
}

/// Reads commands from `input` until `exit` or end of input.
///
/// Failed commands are reported on `output` and the loop goes on.
fn run_repl<S, R, W>(db: &mut Database<S>, input: R, mut output: W, confirm: bool) -> io::Result<()>
where
    S: Storage,
    R: BufRead,
    W: Write,
{
    writeln!(output, "Welcome to flatdb. Type help for the list of commands.")?;
    let mut lines = input.lines();

    loop {
        write!(output, "flatdb> ")?;
        output.flush()?;

        let Some(line) = lines.next() else {
            writeln!(output)?;
            break;
        };
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match parse_command(line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(output, "Error: {e}")?;
                continue;
            }
        };

        if confirm
            && command.is_destructive()
            && !ask_confirmation(&mut lines, &mut output, command.verb())?
        {
            writeln!(output, "Operation cancelled.")?;
            continue;
        }

        match db.run(command) {
            Ok(Outcome::Exit) => {
                writeln!(output, "{}", Outcome::Exit)?;
                break;
            }
            Ok(outcome) => writeln!(output, "{outcome}")?,
            Err(e) => writeln!(output, "Error: {e}")?,
        }
    }

    Ok(())
}

/// Asks whether to run `verb`; only `y`, in any case, counts as yes.
fn ask_confirmation<I, W>(lines: &mut I, output: &mut W, verb: &str) -> io::Result<bool>
where
    I: Iterator<Item = io::Result<String>>,
    W: Write,
{
    write!(output, "Are you sure you want to run \"{verb}\"? [y/n]: ")?;
    output.flush()?;

    match lines.next() {
        Some(answer) => Ok(answer?.trim().eq_ignore_ascii_case("y")),
        None => Ok(false),
    }
}
