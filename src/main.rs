use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use strata_core::export::Encoding;
use strata_core::{CorpusIndex, LayerQuery, MatchFlags, Query, RunStatus, Session};
use strata_corpus::{CorpusSource, FileSource};

#[derive(Parser)]
#[command(name = "strata", about = "Layered search over annotated text corpora")]
struct Cli {
    /// Corpus configuration (TOML): node types and their layers.
    #[arg(long)]
    config: PathBuf,

    /// Corpus data (JSON, optionally wrapped in a JS assignment).
    #[arg(long)]
    data: PathBuf,

    /// Layer pattern, repeatable: TYPE.LAYER=REGEX
    #[arg(short = 'p', long = "pattern", value_parser = parse_pattern)]
    patterns: Vec<LayerPattern>,

    /// Node type to organise results around.
    #[arg(long)]
    container: Option<String>,

    /// Result to focus, counting from 1.
    #[arg(long)]
    focus: Option<usize>,

    #[arg(long)]
    case_sensitive: bool,

    /// `^` and `$` match at text boundaries only.
    #[arg(long)]
    no_multiline: bool,

    /// `.` also matches newlines.
    #[arg(long)]
    dot_all: bool,

    /// Write the result table (tab separated) to this file.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Export as UTF-16LE with a byte order mark.
    #[arg(long, requires = "export")]
    utf16: bool,

    /// Write debug logs to /tmp/strata-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,
}

#[derive(Debug, Clone)]
struct LayerPattern {
    ntype: String,
    layer: String,
    pattern: String,
}

fn parse_pattern(arg: &str) -> Result<LayerPattern, String> {
    let (target, pattern) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected TYPE.LAYER=REGEX, got {arg:?}"))?;
    let (ntype, layer) = target
        .split_once('.')
        .ok_or_else(|| format!("expected TYPE.LAYER before '=', got {target:?}"))?;
    Ok(LayerPattern {
        ntype: ntype.to_string(),
        layer: layer.to_string(),
        pattern: pattern.to_string(),
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/strata-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("strata debug log started, tail -f /tmp/strata-debug.log");
    }

    let config = strata_core::config::Config::load(&cli.config)?;
    let source = FileSource::new(&cli.data);
    let data = source
        .load()
        .with_context(|| format!("loading corpus data from {}", source.describe()))?;
    let index = CorpusIndex::from_config(&config, data).context("building corpus index")?;
    let session = Session::new(Arc::new(index), config);

    let flags = MatchFlags {
        ignore_case: !cli.case_sensitive,
        multi_line: !cli.no_multiline,
        dot_all: cli.dot_all,
    };
    let mut query = Query::new();
    for p in cli.patterns {
        query.insert(&p.ntype, &p.layer, LayerQuery::new(p.pattern).with_flags(flags));
    }

    let mut view = session.initial_view();
    if let Some(name) = &cli.container {
        view.container = session
            .index()
            .chain()
            .lookup(name)
            .with_context(|| format!("unknown container type {name:?}"))?;
    }

    let mut outcome = session.run_with_progress(&query, &view, |phase| {
        tracing::debug!(?phase, "progress");
    })?;
    if let Some(focus) = cli.focus {
        outcome.view.cursor = outcome
            .view
            .cursor
            .move_to(focus.saturating_sub(1), outcome.view.result_count);
    }

    for (ntype, count) in outcome.stats.iter() {
        println!("{ntype}: {count}");
    }
    for error in &outcome.errors {
        eprintln!("error: {error}");
    }
    println!();
    for row in session.display(&outcome) {
        println!("{row}");
    }

    if let Some(path) = &cli.export {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        let encoding = if cli.utf16 { Encoding::Utf16Le } else { Encoding::Utf8 };
        session
            .export(&outcome)
            .write_tsv(std::io::BufWriter::new(file), encoding)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    if outcome.status == RunStatus::Failed {
        bail!("{} layer search(es) failed", outcome.errors.len());
    }
    Ok(())
}
