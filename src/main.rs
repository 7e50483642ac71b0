//! CLI tool to preprocess files and inspect the resulting tree.

use std::process::ExitCode;

use pre_rs::{Commenter, Config, Parser, format_tree};
use tracing_subscriber::EnvFilter;

fn usage() {
    eprintln!("Usage: pre <command> [options] [files...]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  render    Print the preprocessed output");
    eprintln!("  tree      Print the include tree with source positions");
    eprintln!("  check     Check that file(s) preprocess without errors");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --trigger <s>        Directive trigger (default: #)");
    eprintln!("  --max-depth <n>      Maximum include depth (default: 128)");
    eprintln!("  --comments <style>   Recognize c, cpp or lisp comments (repeatable)");
    eprintln!("  --keep-comments      Keep recognized comments in the output");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  pre render --comments cpp main.txt");
    eprintln!("  pre tree main.txt");
    eprintln!("  pre check --trigger %% a.txt b.txt");
}

/// Split options from file arguments and build the configuration.
fn parse_args(args: &[String]) -> Result<(Config, Vec<String>), String> {
    let mut config = Config::default();
    let mut styles = Vec::new();
    let mut strip = true;
    let mut files = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--trigger" => {
                let value = iter.next().ok_or("--trigger needs a value")?;
                config = config.with_trigger(value);
            }
            "--max-depth" => {
                let value = iter.next().ok_or("--max-depth needs a value")?;
                let depth = value
                    .parse::<usize>()
                    .map_err(|e| format!("invalid --max-depth {value}: {e}"))?;
                config = config.with_max_include_depth(depth);
            }
            "--comments" => {
                let value = iter.next().ok_or("--comments needs a value")?;
                let commenter = match value.as_str() {
                    "c" => Commenter::c(),
                    "cpp" => Commenter::cpp(),
                    "lisp" => Commenter::lisp(),
                    other => return Err(format!("unknown comment style: {other}")),
                };
                styles.push(commenter);
            }
            "--keep-comments" => strip = false,
            other if other.starts_with("--") => {
                return Err(format!("unknown option: {other}"));
            }
            _ => files.push(arg.clone()),
        }
    }

    for commenter in styles {
        config = config.with_commenter(commenter.strip(strip));
    }
    Ok((config, files))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        usage();
        return ExitCode::from(2);
    }

    let command = args[1].as_str();
    if !matches!(command, "render" | "tree" | "check") {
        eprintln!("Unknown command: {command}");
        return ExitCode::from(2);
    }

    let (config, files) = match parse_args(&args[2..]) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    if files.is_empty() {
        eprintln!("Error: no files specified");
        return ExitCode::from(2);
    }

    let parser = Parser::new(config);
    let mut had_error = false;

    for path in &files {
        match parser.parse(path) {
            Ok(root) => match command {
                "render" => print!("{root}"),
                "tree" => print!("{}", format_tree(&root)),
                _ => {
                    let included = root.files().len() - 1;
                    eprintln!(
                        "{path}: ok ({} byte(s), {included} included file(s))",
                        root.len()
                    );
                }
            },
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
