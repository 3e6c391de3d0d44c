//! index-doc CLI entry point
//!
//! Checks the indices of an Elasticsearch cluster for problems.

use clap::Parser;
use index_doc::checks::default_registry;
use index_doc::cli::args::{Args, Command};
use index_doc::cli::output::{exit_code, get_formatter, EXIT_ERROR};
use index_doc::logging::init_tracing;
use index_doc::version::get_build_info;
use index_doc::{run_checks, IndexDocConfig, Predicate};

use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command() {
        Command::Version => {
            println!("{}", get_build_info());
            ExitCode::SUCCESS
        }
        Command::List => print_check_list(),
        Command::Check => check(&args),
    }
}

fn print_check_list() -> ExitCode {
    let registry = match default_registry() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR as u8);
        }
    };

    println!("Available checks:");
    let mut current = None;
    for (phase, check) in registry.iter() {
        if current != Some(phase) {
            println!();
            println!("{}:", phase);
            current = Some(phase);
        }
        let scope = match check.predicate() {
            Predicate::Index(_) => "index",
            Predicate::Field(_) => "field",
        };
        println!("  {:<7} {:<6} {}", check.severity(), scope, check.name());
    }
    ExitCode::SUCCESS
}

fn check(args: &Args) -> ExitCode {
    let config = match IndexDocConfig::load(args.config.as_deref(), &args.overrides()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR as u8);
        }
    };

    let report = match run_checks(&config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error running checks: {}", e);
            return ExitCode::from(EXIT_ERROR as u8);
        }
    };

    let color = config.color && std::env::var_os("NO_COLOR").is_none();
    let formatter = get_formatter(config.format, color, args.quiet);
    println!("{}", formatter.format(&report));

    ExitCode::from(exit_code(&report) as u8)
}
