use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use rustie_spans::{EngineConfig, SpanEngine, SpanPattern};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "span_search")]
#[command(about = "Index annotated sentences and search them with span patterns")]
#[command(version)]
struct Args {
    /// Engine configuration file (annotations, bucket limits)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Index directory
    #[arg(short, long, global = true, default_value = "./index")]
    index_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Index JSON documents (.json, .jsonl or .gz files, or directories of them)
    Index {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Run a JSON span pattern against the index
    Query {
        /// Pattern JSON, or @path to read it from a file
        pattern: String,

        /// Maximum number of matches to print
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_yaml(path),
        None => Ok(EngineConfig::default()),
    }
}

fn is_document_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json") | Some("jsonl") | Some("gz")
    )
}

fn collect_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && is_document_file(path))
                .collect();
            entries.sort();
            files.extend(entries);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            return Err(anyhow!("Input not found: {}", input.display()));
        }
    }
    Ok(files)
}

fn run_index(engine: &mut SpanEngine, inputs: &[PathBuf]) -> Result<()> {
    let files = collect_files(inputs)?;
    info!("Found {} document files to index", files.len());
    let mut indexed = 0;
    let mut failed = 0;
    for file in &files {
        match engine.add_file(file) {
            Ok(count) => indexed += count,
            Err(e) => {
                error!("Failed to process {}: {}", file.display(), e);
                failed += 1;
            }
        }
    }
    engine.commit()?;
    println!(
        "Indexed {} documents from {} files ({} failed); index holds {} sentences",
        indexed,
        files.len() - failed,
        failed,
        engine.num_sentences()
    );
    Ok(())
}

fn read_pattern(arg: &str) -> Result<SpanPattern> {
    let json = match arg.strip_prefix('@') {
        Some(path) => fs::read_to_string(path).map_err(|e| anyhow!("Failed to read pattern file {}: {}", path, e))?,
        None => arg.to_string(),
    };
    SpanPattern::from_json(&json).map_err(|e| anyhow!("Invalid pattern: {}", e))
}

fn run_query(engine: &SpanEngine, pattern: &str, limit: usize, json: bool) -> Result<()> {
    let pattern = read_pattern(pattern)?;
    info!("Searching for {}", pattern);
    let results = engine.search(&pattern, limit)?;
    if json {
        println!("{}", results.to_json_pretty());
    } else {
        print!("{}", results.summary());
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match &args.command {
        Command::Index { inputs } => {
            let mut engine = SpanEngine::open(&args.index_dir, config)?;
            run_index(&mut engine, inputs)
        }
        Command::Query { pattern, limit, json } => {
            let engine = SpanEngine::open(&args.index_dir, config)?;
            run_query(&engine, pattern, *limit, *json)
        }
    }
}
