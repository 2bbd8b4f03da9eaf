//! bramble CLI: convert between CBOR and JSON, inspect a value tree, and
//! walk/mutate it with JSON Pointer.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bramble::arena::{Arena, ValueId};
use bramble::error::Result;
use bramble::json::JsonFlags;
use bramble::{cbor, json, pointer, value::ValueKind};

#[derive(Parser)]
#[command(name = "bramble")]
#[command(about = "CBOR-faithful value tree, CBOR/JSON codecs, JSON Pointer and Merge Patch")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a CBOR file and re-emit it as JSON
    CborToJson {
        input: PathBuf,
        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Emit 4-space-indented JSON instead of compact
        #[arg(long)]
        pretty: bool,
    },
    /// Parse a JSON file and re-emit it as CBOR
    JsonToCbor {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Accept `//`/`/* */`/`#` comments and bare `inf`/`nan` literals
        #[arg(long)]
        tolerant: bool,
    },
    /// Print a value's shape: type, size (for containers), byte/char length
    Inspect {
        input: PathBuf,
        /// Force the input format instead of guessing from the extension
        #[arg(long, value_enum)]
        format: Option<Format>,
    },
    /// Evaluate a JSON Pointer against a file and print the result as JSON
    Get {
        input: PathBuf,
        pointer: String,
        #[arg(long, value_enum)]
        format: Option<Format>,
    },
    /// Upsert a JSON-literal value at a JSON Pointer and write the result
    Set {
        input: PathBuf,
        pointer: String,
        /// The replacement value, as a JSON literal (e.g. `42`, `"x"`, `[1,2]`)
        value: String,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, value_enum)]
        format: Option<Format>,
    },
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
enum Format {
    Cbor,
    Json,
}

fn guess_format(path: &Path, explicit: Option<Format>) -> Format {
    if let Some(f) = explicit {
        return f;
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Format::Json,
        _ => Format::Cbor,
    }
}

fn load_file(path: &Path, format: Format) -> Result<(Arena, ValueId)> {
    match format {
        Format::Cbor => cbor::loadf(path),
        Format::Json => json::loadf(path),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("bramble=debug,info")
    } else {
        EnvFilter::new("bramble=info,warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::CborToJson { input, output, pretty } => cmd_cbor_to_json(&input, output.as_deref(), pretty),
        Commands::JsonToCbor { input, output, tolerant } => cmd_json_to_cbor(&input, output.as_deref(), tolerant),
        Commands::Inspect { input, format } => cmd_inspect(&input, format),
        Commands::Get { input, pointer, format } => cmd_get(&input, &pointer, format),
        Commands::Set { input, pointer, value, output, format } => {
            cmd_set(&input, &pointer, &value, &output, format)
        }
    }
}

fn cmd_cbor_to_json(input: &Path, output: Option<&Path>, pretty: bool) -> Result<()> {
    tracing::info!(path = %input.display(), "decoding CBOR");
    let (arena, id) = cbor::loadf(input)?;
    let text = if pretty { json::dump_pretty(&arena, id) } else { json::dump(&arena, id) };
    match output {
        Some(path) => {
            std::fs::write(path, &text)?;
            tracing::info!(path = %path.display(), bytes = text.len(), "wrote JSON");
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn cmd_json_to_cbor(input: &Path, output: Option<&Path>, tolerant: bool) -> Result<()> {
    tracing::info!(path = %input.display(), "parsing JSON");
    let text = std::fs::read_to_string(input)?;
    let flags = if tolerant {
        JsonFlags::ALLOW_COMMENT | JsonFlags::ALLOW_INF | JsonFlags::ALLOW_NAN
    } else {
        JsonFlags::empty()
    };
    let (arena, id, _) = json::load_with(&text, flags, &cbor::DecodeLimits::default())?;
    let bytes = cbor::dump(&arena, id);
    match output {
        Some(path) => {
            std::fs::write(path, &bytes)?;
            tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote CBOR");
        }
        None => {
            use std::io::Write;
            std::io::stdout().write_all(&bytes)?;
        }
    }
    Ok(())
}

fn describe(arena: &Arena, id: ValueId) -> String {
    match arena.tl_type(id) {
        ValueKind::Uint | ValueKind::NegInt => format!("integer {}", arena.as_integer(id)),
        ValueKind::Bytes => format!("bytes, {} octet(s)", arena.as_bytes(id).len()),
        ValueKind::Text => format!("text, {} byte(s)", arena.as_text(id).len()),
        ValueKind::Array => format!("array, {} element(s)", arena.size(id)),
        ValueKind::Map => format!("map, {} entries", arena.size(id)),
        ValueKind::Tag => {
            let item = arena.tag_item(id).unwrap_or(0);
            format!("tag {item}")
        }
        ValueKind::Simple => match arena.as_simple(id) {
            Some(bramble::Simple::Real(f)) => format!("real {f}"),
            Some(s) => format!("{s:?}"),
            None => "simple".to_string(),
        },
        ValueKind::Pair => "pair".to_string(),
    }
}

fn cmd_inspect(input: &Path, format: Option<Format>) -> Result<()> {
    let format = guess_format(input, format);
    let (arena, id) = load_file(input, format)?;
    println!("{}", describe(&arena, id));
    if matches!(arena.tl_type(id), ValueKind::Array | ValueKind::Map) {
        for child in arena.iter(id) {
            let child = if matches!(arena.tl_type(child), ValueKind::Pair) {
                let key = arena.pair_key(child).unwrap();
                let value = arena.pair_value(child).unwrap();
                println!("  {:?}: {}", arena.as_text_str(key), describe(&arena, value));
                continue;
            } else {
                child
            };
            println!("  {}", describe(&arena, child));
        }
    }
    Ok(())
}

fn cmd_get(input: &Path, path: &str, format: Option<Format>) -> Result<()> {
    let format = guess_format(input, format);
    let (arena, root) = load_file(input, format)?;
    match pointer::get(&arena, root, path) {
        Some(id) => println!("{}", json::dump(&arena, id)),
        None => {
            eprintln!("no value at {path}");
            std::process::exit(1);
        }
    }
    Ok(())
}

fn cmd_set(input: &Path, path: &str, literal: &str, output: &Path, format: Option<Format>) -> Result<()> {
    let format = guess_format(input, format);
    let (mut arena, root) = load_file(input, format)?;
    let (value, _) = json::load_into(&mut arena, literal, JsonFlags::empty(), &cbor::DecodeLimits::default())?;
    if pointer::set(&mut arena, root, path, value).is_none() {
        arena.release(value);
        eprintln!("could not set {path}: parent path does not resolve to a container");
        std::process::exit(1);
    }
    match format {
        Format::Cbor => std::fs::write(output, cbor::dump(&arena, root))?,
        Format::Json => std::fs::write(output, json::dump_pretty(&arena, root))?,
    }
    tracing::info!(path = %output.display(), "wrote updated document");
    Ok(())
}
