//! Minsky Machine - CLI Entry Point
//!
//! Commands:
//! - `minsky run <program>` - Run a program and print its trace
//! - `minsky check <program>` - Validate a program
//! - `minsky fmt <program>` - Print the canonical listing
//! - `minsky debug <program>` - Interactive debugger

use clap::{Parser, Subcommand};
use minsky::machine::{FnObserver, NoTrace, TraceEvent};
use minsky::{load_file, report, LoadedProgram, Outcome};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "minsky")]
#[command(author = "Yigit")]
#[command(version = "0.1.0")]
#[command(about = "A Minsky counter machine simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it halts
    Run {
        /// Path to the program file
        program: String,
        /// Stop after this many steps (default: no limit)
        #[arg(short, long)]
        max_steps: Option<u64>,
        /// Do not print the step trace
        #[arg(long)]
        no_trace: bool,
        /// Print the trace and outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a program and print a summary
    Check {
        /// Path to the program file
        program: String,
    },
    /// Print a program in canonical form
    Fmt {
        /// Path to the program file
        program: String,
    },
    /// Interactive debugger
    #[cfg(feature = "tui")]
    Debug {
        /// Path to the program file
        program: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { program, max_steps, no_trace, json } => {
            run_program(&program, max_steps, !no_trace, json)
        }
        Commands::Check { program } => check_program(&program),
        Commands::Fmt { program } => format_file(&program),
        #[cfg(feature = "tui")]
        Commands::Debug { program } => debug_program(&program),
    }
}

fn load(path: &str) -> Result<LoadedProgram, ExitCode> {
    load_file(path).map_err(|e| {
        eprintln!("error: {}", e);
        ExitCode::from(1)
    })
}

fn run_program(path: &str, max_steps: Option<u64>, trace: bool, json: bool) -> ExitCode {
    let loaded = match load(path) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let mut machine = loaded.machine();

    let mut events: Vec<TraceEvent> = Vec::new();
    let result = if json {
        drive(&mut machine, max_steps, &mut events)
    } else if trace {
        println!("{}", report::TRACE_HEADER);
        drive(&mut machine, max_steps, FnObserver(|event: &TraceEvent| {
            println!("{}", report::format_event(event));
        }))
    } else {
        drive(&mut machine, max_steps, NoTrace)
    };

    let outcome = match result {
        Ok(Some(outcome)) => outcome,
        Ok(None) => {
            eprintln!(
                "stopped after {} steps at label {} without halting (--max-steps)",
                machine.steps, machine.label
            );
            eprintln!("register state: {}", machine.registers);
            return ExitCode::from(2);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };

    if json {
        match report::to_json(&events, &outcome) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::from(1);
            }
        }
    } else {
        print!("{}", report::format_summary(&outcome));
    }

    ExitCode::SUCCESS
}

fn drive<O: minsky::TraceObserver>(
    machine: &mut minsky::Machine,
    max_steps: Option<u64>,
    observer: O,
) -> Result<Option<Outcome>, minsky::MachineError> {
    match max_steps {
        Some(limit) => machine.run_limited(limit, observer),
        None => machine.run(observer).map(Some),
    }
}

fn check_program(path: &str) -> ExitCode {
    let loaded = match load(path) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    println!("ok: {}", path);
    println!("start label:   {}", loaded.config.start_label);
    println!("registers:     {}", loaded.config.register_file());
    println!("instructions:  {}", loaded.program.len());
    if let Some(max) = loaded.program.max_register() {
        println!("highest register used: r{}", max);
    }

    if !loaded.program.contains(&loaded.config.start_label) {
        println!("note: start label {} is undefined", loaded.config.start_label);
    }
    let missing = loaded.program.undefined_targets();
    if !missing.is_empty() {
        let names: Vec<String> = missing.iter().map(|l| l.to_string()).collect();
        println!("note: jumps to undefined labels halt erroneously: {}", names.join(", "));
    }

    ExitCode::SUCCESS
}

fn format_file(path: &str) -> ExitCode {
    match load(path) {
        Ok(loaded) => {
            print!("{}", minsky::format_program(&loaded));
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}

#[cfg(feature = "tui")]
fn debug_program(path: &str) -> ExitCode {
    let loaded = match load(path) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    if let Err(e) = minsky::run_debugger(loaded) {
        eprintln!("debugger error: {}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}
