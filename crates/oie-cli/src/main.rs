//! OIE CLI - Command-line interface
//!
//! Usage:
//!   oie explain <pattern>
//!   oie match <pattern> [--input sentences.txt] [--json]
//!   oie extract [--input sentences.txt]
//!   oie eval --gold gold.jsonl [--input sentences.txt]
//!
//! Input holds one tagged sentence per line as `word/POS/CHUNK` tokens.
//! Blank lines and lines starting with `#` are ignored. Gold files use the
//! JSON lines written by `oie extract`.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use oie_core::{LoggingConfig, OieConfig, Span, TaggedSentence};
use oie_extractor::{GoldSpan, PatternExtractor, SpanExtractor, SpanMetrics};
use oie_pattern::LayeredPattern;

#[derive(Parser)]
#[command(name = "oie")]
#[command(about = "Layered pattern matching over tagged sentences")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the layers, alphabet sizes and rewritten expression of a pattern
    Explain {
        /// Layered pattern, e.g. "DT_pos ? NN_pos +"
        pattern: String,
    },
    /// Match one pattern against tagged sentences
    Match {
        /// Layered pattern
        pattern: String,
        /// Sentence file (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Print JSON lines instead of text
        #[arg(long)]
        json: bool,
    },
    /// Run the extraction rules from the configuration file
    Extract {
        /// Sentence file (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Score the configured extraction rules against gold spans
    Eval {
        /// Gold spans as JSON lines in `oie extract` format
        #[arg(short, long)]
        gold: PathBuf,
        /// Sentence file (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Explain { pattern } => explain(&pattern, &config),
        Commands::Match {
            pattern,
            input,
            json,
        } => match_pattern(&pattern, input.as_deref(), json, &config),
        Commands::Extract { input } => extract(input.as_deref(), &config),
        Commands::Eval { gold, input } => evaluate(&gold, input.as_deref(), &config),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<OieConfig> {
    let config = match path {
        Some(path) => OieConfig::from_file(path)?.with_env_override()?,
        None => OieConfig::from_env()?,
    };
    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(logging.include_location)
        .with_line_number(logging.include_location)
        .with_writer(std::io::stderr);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn explain(source: &str, config: &OieConfig) -> anyhow::Result<()> {
    let pattern = LayeredPattern::compile_with(source, &config.engine)
        .with_context(|| format!("Failed to compile pattern {source:?}"))?;
    let encoder = pattern.encoder();

    println!("Pattern:    {}", pattern.source());
    for (i, layer) in pattern.layers().iter().enumerate() {
        let alphabet = encoder.alphabet(i).unwrap_or_default();
        let symbols: Vec<String> = alphabet.iter().map(ToString::to_string).collect();
        println!("Layer {i}:    {layer} ({}) {}", alphabet.len(), symbols.join(" "));
    }
    println!(
        "Table size: {} (limit {})",
        encoder.size(),
        encoder.max_table_size()
    );
    println!("Groups:     {}", pattern.group_count());
    println!("Expression: {}", pattern.expression());
    Ok(())
}

fn match_pattern(
    source: &str,
    input: Option<&Path>,
    json: bool,
    config: &OieConfig,
) -> anyhow::Result<()> {
    let pattern = LayeredPattern::compile_with(source, &config.engine)
        .with_context(|| format!("Failed to compile pattern {source:?}"))?;

    let mut total = 0;
    for (line, sentence) in read_sentences(input)? {
        let spans = non_empty_matches(&pattern, &sentence)
            .with_context(|| format!("Line {line}"))?;

        for span in spans {
            total += 1;
            let words = sentence.words(span);
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "line": line, "span": span, "words": words })
                );
            } else {
                println!("{line}\t{span}\t{words}");
            }
        }
    }

    tracing::info!("{} matches for {:?}", total, source);
    Ok(())
}

/// Matches of `pattern` in one sentence, skipping zero-length spans
fn non_empty_matches(
    pattern: &LayeredPattern,
    sentence: &TaggedSentence,
) -> anyhow::Result<Vec<Span>> {
    let sequence = sentence.to_sequence()?;
    let matcher = pattern.matcher(&sequence)?;
    Ok(matcher.filter(|span| !span.is_empty()).collect())
}

fn configured_extractor(config: &OieConfig) -> anyhow::Result<PatternExtractor> {
    if config.extractor.patterns.is_empty() {
        anyhow::bail!("No extraction patterns configured; add [[extractor.patterns]] entries");
    }
    Ok(PatternExtractor::from_config(config)?)
}

fn extract(input: Option<&Path>, config: &OieConfig) -> anyhow::Result<()> {
    let extractor = configured_extractor(config)?;

    for (line, sentence) in read_sentences(input)? {
        let sequence = sentence.to_sequence()?;
        let matches = extractor
            .extract(&sequence)
            .with_context(|| format!("Line {line}"))?;

        let rendered: Vec<serde_json::Value> = matches
            .iter()
            .map(|m| {
                serde_json::json!({
                    "rule": m.rule,
                    "span": m.span,
                    "words": sentence.words(m.span),
                    "groups": m.groups,
                    "confidence": m.confidence,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::json!({ "line": line, "matches": rendered })
        );
    }
    Ok(())
}

fn evaluate(gold: &Path, input: Option<&Path>, config: &OieConfig) -> anyhow::Result<()> {
    let extractor = configured_extractor(config)?;
    let text = std::fs::read_to_string(gold)
        .with_context(|| format!("Failed to read {}", gold.display()))?;
    let gold = parse_gold(&text)?;

    let mut total = SpanMetrics::default();
    for (line, sentence) in read_sentences(input)? {
        let predicted = extractor
            .extract(&sentence.to_sequence()?)
            .with_context(|| format!("Line {line}"))?;
        let expected = gold.get(&line).map(Vec::as_slice).unwrap_or_default();
        total.add(&SpanMetrics::evaluate(&predicted, expected));
    }

    print!("{}", total.report());
    Ok(())
}

#[derive(Deserialize)]
struct GoldLine {
    line: usize,
    matches: Vec<GoldSpan>,
}

/// Gold spans keyed by sentence line number
fn parse_gold(text: &str) -> anyhow::Result<HashMap<usize, Vec<GoldSpan>>> {
    let mut gold: HashMap<usize, Vec<GoldSpan>> = HashMap::new();
    for (i, raw) in text.lines().enumerate() {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let entry: GoldLine = serde_json::from_str(raw)
            .with_context(|| format!("Gold line {}", i + 1))?;
        gold.entry(entry.line).or_default().extend(entry.matches);
    }
    Ok(gold)
}

/// Tagged sentences with their 1-based line numbers
fn read_sentences(input: Option<&Path>) -> anyhow::Result<Vec<(usize, TaggedSentence)>> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            text
        }
    };

    let sentences = parse_sentences(&text)?;
    tracing::debug!("Read {} sentences", sentences.len());
    Ok(sentences)
}

fn parse_sentences(text: &str) -> anyhow::Result<Vec<(usize, TaggedSentence)>> {
    let mut sentences = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('#') {
            continue;
        }
        let sentence =
            TaggedSentence::parse(raw).with_context(|| format!("Line {}", i + 1))?;
        sentences.push((i + 1, sentence));
    }
    Ok(sentences)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EDISON: &str =
        "Edison/NNP/B-NP invented/VBD/B-VP the/DT/B-NP light/NN/I-NP bulb/NN/I-NP ././O";

    #[test]
    fn test_zero_length_matches_skipped() {
        let sentence = TaggedSentence::parse(EDISON).unwrap();

        let optional = LayeredPattern::compile("JJ_pos *").unwrap();
        assert!(non_empty_matches(&optional, &sentence).unwrap().is_empty());

        let nouns = LayeredPattern::compile("NN_pos *").unwrap();
        assert_eq!(
            non_empty_matches(&nouns, &sentence).unwrap(),
            vec![Span::new(3, 5)]
        );
    }

    #[test]
    fn test_parse_sentences_skips_comments() {
        let text = format!("# header\n\n{EDISON}\nthe/DT/B-NP cat/NN/I-NP\n");
        let sentences = parse_sentences(&text).unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].0, 3);
        assert_eq!(sentences[1].1.len(), 2);
    }

    #[test]
    fn test_parse_gold_reads_extract_output() {
        let text = r#"{"line": 3, "matches": [{"rule": "np", "span": {"start": 2, "end": 5}, "words": "the light bulb", "confidence": 1.0}]}
{"line": 4, "matches": []}
{"line": 3, "matches": [{"rule": "verb", "span": {"start": 1, "end": 2}}]}"#;
        let gold = parse_gold(text).unwrap();

        assert_eq!(gold[&3].len(), 2);
        assert_eq!(gold[&3][0], GoldSpan::new("np", Span::new(2, 5)));
        assert!(gold[&4].is_empty());
        assert!(parse_gold("not json").is_err());
    }

    #[test]
    fn test_evaluate_against_gold() {
        let mut config = OieConfig::default();
        config.extractor.patterns = vec![oie_core::PatternRule::new("np", "DT_pos NN_pos +")];
        let extractor = configured_extractor(&config).unwrap();

        let sentence = TaggedSentence::parse(EDISON).unwrap();
        let predicted = extractor.extract(&sentence.to_sequence().unwrap()).unwrap();
        let gold = parse_gold(concat!(
            r#"{"line": 1, "matches": [{"rule": "np", "span": {"start": 2, "end": 5}}, "#,
            r#"{"rule": "np", "span": {"start": 0, "end": 1}}]}"#,
        ))
        .unwrap();

        let metrics = SpanMetrics::evaluate(&predicted, &gold[&1]);
        assert_eq!(metrics.true_positives, 1);
        assert_eq!(metrics.false_negatives, 1);
        assert!((metrics.precision() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_extractor_requires_rules() {
        assert!(configured_extractor(&OieConfig::default()).is_err());
    }
}
