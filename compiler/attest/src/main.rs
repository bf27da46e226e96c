//! Attest CLI
//!
//! Runs the test collections of attest script units.

use std::path::Path;

use attest::commands::{compile_file, list_reporters, rewrite_file, run_tests_command, RunOptions};
use attest::CompileMode;

fn main() {
    attest::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "run" => {
            let mut options = RunOptions::default();
            for arg in args.iter().skip(2) {
                if let Some(name) = arg.strip_prefix("--reporter=") {
                    options.reporter = Some(name.to_string());
                } else if arg == "--full-tracebacks" {
                    options.runner.full_tracebacks = true;
                } else if arg == "--no-hook" {
                    options.hook = false;
                } else if arg == "--regenerate" {
                    options.compile_mode = CompileMode::Regenerate;
                } else if arg == "--fail-fast" || arg == "-x" {
                    options.runner.fail_fast = true;
                } else if arg == "--no-capture" || arg == "-s" {
                    options.runner.capture = false;
                } else if arg.starts_with('-') {
                    eprintln!("error: unknown option '{arg}'");
                    std::process::exit(1);
                } else {
                    options.targets.push(arg.clone());
                }
            }

            if options.targets.is_empty() {
                eprintln!("Usage: attest run <module|file.att>... [options]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --reporter=<name>    Reporter: auto, plain, quickfix");
                eprintln!("  --full-tracebacks    Keep library frames in tracebacks");
                eprintln!("  --no-hook            Run plain asserts (no rewriting)");
                eprintln!("  --regenerate         Execute re-parsed source of rewritten units");
                eprintln!("  -x, --fail-fast      Stop after the first failing test");
                eprintln!("  -s, --no-capture     Do not capture test output");
                std::process::exit(1);
            }

            match run_tests_command(&options) {
                Ok(code) => std::process::exit(code),
                Err(err) => {
                    eprintln!("error: {err}");
                    std::process::exit(1);
                }
            }
        }
        "rewrite" => {
            if args.len() < 3 {
                eprintln!("Usage: attest rewrite <file.att>");
                std::process::exit(1);
            }
            match rewrite_file(Path::new(&args[2])) {
                Ok(source) => print!("{source}"),
                Err(err) => {
                    eprintln!("error: {err}");
                    std::process::exit(1);
                }
            }
        }
        "compile" => {
            if args.len() < 3 {
                eprintln!("Usage: attest compile <file.att>");
                std::process::exit(1);
            }
            match compile_file(Path::new(&args[2])) {
                Ok(output) => println!("{}", output.display()),
                Err(err) => {
                    eprintln!("error: {err}");
                    std::process::exit(1);
                }
            }
        }
        "reporters" => {
            for name in list_reporters() {
                println!("{name}");
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Attest - assertion rewriting test runner");
    println!();
    println!("Usage: attest <command> [options]");
    println!();
    println!("Commands:");
    println!("  run <targets>...   Run the Tests collections of modules or files");
    println!("  rewrite <file>     Print a unit's source with asserts rewritten");
    println!("  compile <file>     Write a precompiled .attc unit");
    println!("  reporters          List reporter names");
    println!("  help               Show this message");
}
