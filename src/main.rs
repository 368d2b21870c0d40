use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use minisql::{Database, Error, Outcome, Statement};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Database file, created if it does not exist
    filename: PathBuf,
}

struct InputBuffer {
    buffer: String,
}

impl InputBuffer {
    fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Reads the next line, returning `false` once stdin is exhausted.
    ///
    /// Invalid UTF-8 is replaced rather than treated as a read failure.
    fn read_input(&mut self) -> io::Result<bool> {
        let mut bytes = Vec::new();
        let read = io::stdin().lock().read_until(b'\n', &mut bytes)?;
        self.buffer = String::from_utf8_lossy(&bytes).trim().to_string();
        Ok(read > 0)
    }
}

// Non-SQL statements like .exit are called “meta-commands”.
enum MetaCommands {
    Exit,
    Unrecognized,
}

impl MetaCommands {
    fn parse(input: &str) -> Option<MetaCommands> {
        match input {
            ".exit" => Some(MetaCommands::Exit),
            _ => {
                if input.starts_with('.') {
                    Some(MetaCommands::Unrecognized)
                } else {
                    None
                }
            }
        }
    }
}

enum InputType {
    Meta(MetaCommands),
    Statement,
}

impl InputType {
    fn parse(input: &str) -> InputType {
        match MetaCommands::parse(input) {
            Some(meta) => InputType::Meta(meta),
            None => InputType::Statement,
        }
    }
}

fn print_prompt() -> io::Result<()> {
    print!("db > ");
    io::stdout().flush()
}

fn run_statement(input: &str, db: &mut Database) {
    let statement = match Statement::prepare(input) {
        Ok(statement) => statement,
        Err(e) => {
            println!("{e}");
            return;
        }
    };

    match statement.execute(db) {
        Ok(Outcome::Inserted) => println!("Executed."),
        Ok(Outcome::Rows(rows)) => {
            for row in rows {
                println!("{row}");
            }
            println!("Executed.");
        }
        Err(e @ Error::TableFull { .. }) => println!("Error: {e}"),
        Err(e) => {
            error!(error = %e, "statement failed");
            println!("Error: {e}");
        }
    }
}

/// Runs the prompt loop until `.exit` or end of input.
fn repl(db: &mut Database) -> io::Result<()> {
    let mut input_buffer = InputBuffer::new();

    loop {
        print_prompt()?;
        if !input_buffer.read_input()? {
            debug!("end of input");
            break;
        }

        match InputType::parse(&input_buffer.buffer) {
            InputType::Meta(MetaCommands::Exit) => break,
            InputType::Meta(MetaCommands::Unrecognized) => {
                println!("Unrecognized meta-command: {}", input_buffer.buffer);
            }
            InputType::Statement => run_statement(&input_buffer.buffer, db),
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut db = match Database::open(&args.filename) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to open database {}: {e}", args.filename.display());
            return ExitCode::FAILURE;
        }
    };

    let session = repl(&mut db);

    if let Err(e) = db.close() {
        eprintln!("Failed to close database: {e}");
        return ExitCode::FAILURE;
    }
    if let Err(e) = session {
        eprintln!("Failed to read input: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
