use std::{collections::HashMap, env, fs::read_to_string, path::PathBuf, process::ExitCode, rc::Rc, time::Instant};

use candice::{compile_file, config::CompilerConfig, display_error, errors::errors::Error, session::Session};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: candice <file> [--max-errors N] [--max-semantic-errors N]";

fn parse_args(args: &[String]) -> Result<(PathBuf, CompilerConfig), String> {
    let mut file = None;
    let mut config = CompilerConfig::default();

    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--max-errors" => {
                let value = args.next().ok_or("--max-errors needs a value")?;
                let max = value
                    .parse()
                    .map_err(|_| format!("invalid error limit `{}`", value))?;
                config = config.with_max_parse_errors(max);
            }
            "--max-semantic-errors" => {
                let value = args.next().ok_or("--max-semantic-errors needs a value")?;
                let max = value
                    .parse()
                    .map_err(|_| format!("invalid error limit `{}`", value))?;
                config = config.with_max_semantic_errors(Some(max));
            }
            other if file.is_none() && !other.starts_with("--") => file = Some(PathBuf::from(other)),
            other => return Err(format!("unexpected argument `{}`", other)),
        }
    }

    let file = file.ok_or("no input file")?;
    Ok((file, config))
}

/// Prints every error against the line it points at. Errors raised inside
/// imported files are shown against those files.
fn report(errors: &[Error]) {
    let mut sources: HashMap<String, String> = HashMap::new();

    for error in errors {
        let file = error.get_position().file.to_string();
        let source = sources
            .entry(file.clone())
            .or_insert_with(|| read_to_string(&file).unwrap_or_default());
        display_error(error, source);
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (path, config) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("{}\n{}", message, USAGE);
            return ExitCode::from(2);
        }
    };

    let source = match read_to_string(&path) {
        Ok(source) => source,
        Err(err) => {
            error!(path = %path.display(), "failed to read source: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    let session = Rc::new(Session::with_filesystem(config));

    match compile_file(source, &path, &session) {
        Ok(unit) => {
            info!(
                functions = unit.semantic.functions().count(),
                elapsed = ?start.elapsed(),
                "checked {}",
                path.display()
            );
            ExitCode::SUCCESS
        }
        Err(errors) => {
            report(&errors);
            println!("{} error(s)", errors.len());
            ExitCode::FAILURE
        }
    }
}
