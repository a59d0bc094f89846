use clap::Parser;
use handlebars_context::{AccessErrorPolicy, Context, ContextOptions};
use serde_json::Value as Json;
use tracing::{debug, Level};

/// Resolve template paths against a JSON model, optionally through nested scopes.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON model of the root context.
    model: String,
    /// Paths to resolve, e.g. `nested.simple`, `.` or `this`.
    #[arg(required = true)]
    paths: Vec<String>,
    /// JSON model layered as a child context (repeatable, innermost last).
    #[arg(long, value_name = "JSON")]
    extend: Vec<String>,
    /// Extra binding on the innermost context.
    #[arg(long, value_name = "NAME=JSON", value_parser = parse_binding)]
    bind: Vec<(String, Json)>,
    /// Treat failing accessors as absent instead of failing.
    #[arg(long)]
    lenient: bool,
    /// Print whether each path exists instead of its value.
    #[arg(long)]
    exists: bool,
    /// Fallback JSON printed for null results.
    #[arg(long)]
    default: Option<String>,
    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// Anything that is not valid JSON is taken as a plain string.
fn parse_json_or_string(s: &str) -> Json {
    serde_json::from_str(s).unwrap_or_else(|_| Json::String(s.to_string()))
}

fn parse_binding(s: &str) -> Result<(String, Json), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=JSON, got `{s}`"))?;
    if name.is_empty() {
        return Err("binding name is empty".into());
    }
    Ok((name.to_string(), parse_json_or_string(value)))
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn build_context(args: &Args) -> Result<Context, Box<dyn std::error::Error>> {
    let mut layers = Vec::with_capacity(args.extend.len() + 1);
    layers.push(serde_json::from_str::<Json>(&args.model).map_err(|e| format!("invalid JSON model: {e}"))?);
    for ext in &args.extend {
        layers.push(serde_json::from_str::<Json>(ext).map_err(|e| format!("invalid JSON in --extend: {e}"))?);
    }

    let options = ContextOptions {
        access_errors: if args.lenient { AccessErrorPolicy::Absent } else { AccessErrorPolicy::Propagate },
    };
    let innermost = layers.len() - 1;
    let mut context: Option<Context> = None;
    for (i, layer) in layers.into_iter().enumerate() {
        let mut builder = Context::builder(layer).options(options);
        if let Some(parent) = &context {
            builder = builder.parent(parent);
        }
        if i == innermost {
            for (name, value) in &args.bind {
                builder = builder.bind(name.clone(), value.clone());
            }
        }
        context = Some(builder.build()?);
    }
    debug!(depth = innermost, "context chain built");
    context.ok_or_else(|| "no model given".into())
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let context = build_context(args)?;
    let default = args.default.as_deref().map(parse_json_or_string);

    for path in &args.paths {
        if args.exists {
            println!("{path}: {}", context.has(path)?);
            continue;
        }
        let mut out = context.get(path)?.to_json();
        if out.is_null() {
            if let Some(default) = &default {
                out = default.clone();
            }
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
    }
    Ok(())
}

fn main() {
    // Parse CLI arguments.
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
