//! `formula`: evaluate or reduce an expression.
//!
//! Usage:
//!   formula [--config FILE] [--context JSON] [--reduce] '<expression>'
//!
//! The config file is TOML, or JSON when its name ends in `.json`. The
//! context is a JSON document that configured variables read from.
//! Set `RUST_LOG=formula=debug` to trace parsing and folding.

use formula::{EngineConfig, FormulaType, Parser};
use std::process::exit;
use tracing_subscriber::EnvFilter;

struct Args {
    config: Option<String>,
    context: Option<String>,
    reduce: bool,
    expression: String,
}

fn parse_args() -> Result<Args, String> {
    let mut config = None;
    let mut context = None;
    let mut reduce = false;
    let mut expression = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(args.next().ok_or("--config needs a file name")?),
            "--context" => context = Some(args.next().ok_or("--context needs a JSON document")?),
            "--reduce" => reduce = true,
            _ if expression.is_none() => expression = Some(arg),
            _ => return Err(format!("Unexpected argument: {arg}")),
        }
    }

    Ok(Args {
        config,
        context,
        reduce,
        expression: expression.ok_or("Missing expression.")?,
    })
}

fn load_parser(path: Option<&str>) -> Result<Parser, String> {
    let Some(path) = path else {
        return Ok(Parser::with_defaults());
    };
    let text = std::fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
    let config = if path.ends_with(".json") {
        EngineConfig::from_json_str(&text)
    } else {
        EngineConfig::from_toml_str(&text)
    };
    config.and_then(EngineConfig::into_parser).map_err(|e| e.to_string())
}

fn run(args: Args) -> Result<String, String> {
    let parser = load_parser(args.config.as_deref())?;
    let member = parser.parse(&args.expression).map_err(|e| e.to_string())?;

    if args.reduce {
        let reduced = parser.reduce(&member);
        return parser.format(&reduced).map_err(|e| e.to_string());
    }

    let context: serde_json::Value = match &args.context {
        Some(json) => serde_json::from_str(json).map_err(|e| format!("Invalid context: {e}"))?,
        None => serde_json::Value::Null,
    };
    let value = member.value(&context).map_err(|e| e.to_string())?;
    parser
        .syntax()
        .format_literal(&value, FormulaType::of(&value))
        .map_err(|e| e.to_string())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            exit(1);
        }
    };

    match run(args) {
        Ok(out) => println!("{out}"),
        Err(e) => {
            eprintln!("{e}");
            exit(1);
        }
    }
}
