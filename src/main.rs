//! ObjectIR runtime entry point.
//!
//! Behavior summary:
//! - With **no args**, print usage and exit.
//! - With `-h/--help`, print usage.
//! - With `-v/--version`, print the runtime version.
//! - With an **`.oir`** path, parse it and execute `Main` if the file
//!   declares one, printing captured console output and reporting any
//!   diagnostics to stderr.
//!
//! This binary contains no engine logic of its own — everything it calls
//! is public library API (`objectir::Runtime`).

use std::collections::HashMap;
use std::env;

use objectir::Runtime;

/// Human-facing runtime version string.
const VERSION: &str = "0.1.0";

/// Construct the help/usage text shown for `-h/--help`.
fn usage() -> String {
    format!(
        r#"ObjectIR Runtime v{0}

Usage:
    objectir <program.oir>

Arguments:
    <program.oir>
        Path to an ObjectIR source file to execute.

Options:
    -h, --help
        Show this help message and exit.
    -v, --version
        Show runtime version."#,
        VERSION
    )
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() == 1 {
        println!("{}", usage());
        return;
    }

    if args[1] == "-h" || args[1] == "--help" {
        println!("{}", usage());
        return;
    }

    if args[1] == "-v" || args[1] == "--version" {
        println!("objectir-runtime: v{}", VERSION);
        return;
    }

    let path = &args[1];
    println!("Loading ObjectIR file: {}", path);

    let mut runtime = match Runtime::parse_file(path) {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path, e);
            std::process::exit(1);
        }
    };

    if !runtime.methods().contains_key("Main") {
        println!("No Main method found in module.");
        report_diagnostics(&runtime);
        return;
    }

    println!("Executing Main method...");
    match runtime.execute_method("Main", HashMap::new()) {
        Ok(_) => {
            let output = runtime.get_output();
            if !output.is_empty() {
                println!("{}", output);
            }
            println!("Execution completed.");
        }
        Err(e) => {
            eprintln!("{}", e);
            report_diagnostics(&runtime);
            std::process::exit(1);
        }
    }

    report_diagnostics(&runtime);
}

fn report_diagnostics(runtime: &Runtime) {
    for diagnostic in runtime.diagnostics() {
        eprintln!("warning: {}", diagnostic);
    }
}
