use std::cmp;
use std::error::Error;
use std::path::{Path, PathBuf};

use atty::Stream;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use ladderforge_rs::{
    DEFAULT_OPTION_LIMIT, Dictionary, LadderGraph, NextStep, PuzzleChain, PuzzleGenerator,
    ResolvedPuzzle, Schedule, added_letter, check_word, graph_from_dictionary, next_options,
    validate_chain,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde_json::json;
use termimad::{FmtText, MadSkin, terminal_size};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ladderforge", about = "Build and check anagram word ladders", version)]
pub struct Cli {
    /// Emit JSON instead of human-readable tables.
    #[arg(long, global = true)]
    json: bool,

    /// Word list to build the graph from (`.zst` files are decompressed).
    #[arg(long, global = true, env = "LADDER_DICTIONARY")]
    dictionary: Option<PathBuf>,

    /// Seed for the random walk; omit for a different ladder each run.
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize the signature graph.
    Stats,
    /// Generate one or more ladders.
    Generate {
        /// Number of distinct ladders to generate.
        #[arg(short, long, default_value_t = 1)]
        count: usize,
    },
    /// Check a six-signature chain.
    Validate {
        /// Signatures from shortest to longest.
        #[arg(required = true)]
        signatures: Vec<String>,
        /// Display word for each row, in order.
        #[arg(long = "word")]
        words: Vec<String>,
    },
    /// List the words that extend a word by one letter.
    Next {
        word: String,
        /// Maximum number of options to return.
        #[arg(short, long, default_value_t = DEFAULT_OPTION_LIMIT)]
        limit: usize,
    },
    /// Show the letter added between two signatures.
    Hint { parent: String, child: String },
    /// Check a guessed word against a row's signature.
    Check { word: String, signature: String },
    /// List dictionary words that start with the provided prefix.
    Words {
        prefix: String,
        /// Maximum number of matches to return.
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Manage the calendar of daily puzzles.
    Schedule {
        /// JSON file holding the calendar.
        #[arg(long)]
        file: PathBuf,
        #[command(subcommand)]
        action: ScheduleCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ScheduleCommand {
    /// List every scheduled puzzle.
    Show,
    /// Show the puzzle served on a date (today by default).
    Today {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Validate a chain and add it to the calendar.
    Publish {
        #[arg(required = true)]
        signatures: Vec<String>,
        #[arg(long = "word")]
        words: Vec<String>,
        /// Date to publish on (YYYY-MM-DD).
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Publish on the day after the latest scheduled puzzle.
        #[arg(long)]
        auto_date: bool,
    },
    /// Fill a run of days with generated ladders.
    Batch {
        /// First day to fill (today by default).
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(short, long, default_value_t = 7)]
        days: u32,
        /// Replace puzzles already scheduled in the range.
        #[arg(long)]
        overwrite: bool,
    },
    /// Remove a scheduled puzzle by id.
    Remove { id: String },
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing();
    let mut rng = match cli.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let dictionary = cli.dictionary.as_deref();
    match cli.command {
        Command::Stats => handle_stats(dictionary, cli.json),
        Command::Generate { count } => handle_generate(dictionary, count, &mut rng, cli.json),
        Command::Validate { signatures, words } => {
            handle_validate(dictionary, signatures, words, cli.json)
        }
        Command::Next { word, limit } => handle_next(dictionary, word, limit, cli.json),
        Command::Hint { parent, child } => handle_hint(parent, child, cli.json),
        Command::Check { word, signature } => handle_check(dictionary, word, signature, cli.json),
        Command::Words { prefix, limit } => handle_words(dictionary, prefix, limit, cli.json),
        Command::Schedule { file, action } => {
            handle_schedule(dictionary, &file, action, &mut rng, cli.json)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_dictionary(path: Option<&Path>) -> Result<Dictionary, Box<dyn Error>> {
    match path {
        Some(path) => Ok(Dictionary::load_from_path(path)?),
        None => {
            debug!("No dictionary given; using seed words");
            Ok(Dictionary::seed_only())
        }
    }
}

fn load_graph(path: Option<&Path>) -> Result<LadderGraph, Box<dyn Error>> {
    Ok(graph_from_dictionary(&load_dictionary(path)?))
}

fn handle_stats(dictionary: Option<&Path>, as_json: bool) -> Result<(), Box<dyn Error>> {
    let stats = load_graph(dictionary)?.stats();
    if as_json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    println!("Words:            {}", stats.words);
    println!("Signatures:       {}", stats.signatures);
    println!("Edges:            {}", stats.edges);
    println!("Start signatures: {}", stats.start_signatures);
    println!("{:<6}  {}", "LENGTH", "SIGNATURES");
    println!("{:-<6}  {}", "", "----------");
    for (len, count) in &stats.signatures_by_length {
        println!("{:<6}  {}", len, count);
    }
    Ok(())
}

fn handle_generate(
    dictionary: Option<&Path>,
    count: usize,
    rng: &mut SmallRng,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let graph = load_graph(dictionary)?;
    let generator = PuzzleGenerator::new(&graph);
    let count = cmp::max(1, count);
    let chains = if count == 1 {
        vec![generator.chain_or_fallback(rng)]
    } else {
        generator.suggestions(count, rng)
    };

    if as_json {
        let payload = if count == 1 {
            serde_json::to_value(&chains[0])?
        } else {
            json!({ "count": chains.len(), "suggestions": chains })
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if chains.is_empty() {
        println!("No ladders could be generated from this dictionary.");
    } else {
        for (i, chain) in chains.iter().enumerate() {
            if i > 0 {
                println!();
            }
            print_chain(chain);
        }
    }
    Ok(())
}

fn handle_validate(
    dictionary: Option<&Path>,
    signatures: Vec<String>,
    words: Vec<String>,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let graph = load_graph(dictionary)?;
    let words = (!words.is_empty()).then_some(words.as_slice());
    match validate_chain(&graph, &signatures, words) {
        Ok(chain) => {
            if as_json {
                let payload = json!({ "valid": true, "chain": chain });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Chain is valid.");
                print_chain(&chain);
            }
            Ok(())
        }
        Err(err) if as_json => {
            let payload = json!({
                "valid": false,
                "index": err.index(),
                "error": err.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn handle_next(
    dictionary: Option<&Path>,
    word: String,
    limit: usize,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let graph = load_graph(dictionary)?;
    let step = next_options(&graph, &word, limit)?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&step)?);
        return Ok(());
    }
    match step {
        NextStep::Done => println!("\"{word}\" is already a full-length row."),
        NextStep::Options {
            next_length,
            options,
        } => {
            if options.is_empty() {
                println!("No {next_length}-letter words extend \"{word}\".");
                return Ok(());
            }
            let width = options
                .iter()
                .map(|option| option.word.len())
                .max()
                .unwrap_or(next_length)
                .max("WORD".len());
            println!("{next_length}-letter options for \"{word}\":");
            println!("{:<width$}  {:<9}  {}", "WORD", "SIGNATURE", "REACHES_8", width = width);
            println!("{:-<width$}  {:-<9}  {}", "", "", "---------", width = width);
            for option in &options {
                println!(
                    "{:<width$}  {:<9}  {}",
                    option.word,
                    option.signature,
                    if option.can_reach_eight { "yes" } else { "no" },
                    width = width
                );
            }
        }
    }
    Ok(())
}

fn handle_hint(parent: String, child: String, as_json: bool) -> Result<(), Box<dyn Error>> {
    let letter = hint_letter(&parent, &child)?;
    if as_json {
        let payload = json!({ "parent": parent, "child": child, "letter": letter });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{parent} + {letter} -> {child}");
    }
    Ok(())
}

fn hint_letter(parent: &str, child: &str) -> Result<char, Box<dyn Error>> {
    let letter = (child.len() == parent.len() + 1)
        .then(|| added_letter(parent, child))
        .flatten();
    letter.ok_or_else(|| format!("{child:?} is not {parent:?} plus one letter").into())
}

fn handle_check(
    dictionary: Option<&Path>,
    word: String,
    signature: String,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let graph = load_graph(dictionary)?;
    let check = check_word(&graph, &word, &signature)?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&check)?);
    } else if check.ok {
        println!("\"{word}\" fits {signature}.");
    } else if !check.in_dictionary {
        println!("\"{word}\" is not in the dictionary.");
    } else {
        println!("\"{word}\" does not use the letters {signature}.");
    }
    Ok(())
}

fn handle_words(
    dictionary: Option<&Path>,
    prefix: String,
    limit: usize,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let limit = cmp::max(1, limit);
    let matches = load_dictionary(dictionary)?.prefix(&prefix.to_lowercase(), limit);
    if as_json {
        let payload = json!({ "prefix": prefix, "limit": limit, "results": matches });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }
    if matches.is_empty() {
        println!("No words matched prefix \"{prefix}\".");
        return Ok(());
    }
    println!("Matches for prefix \"{prefix}\":");
    for word in &matches {
        println!("  {word}");
    }
    Ok(())
}

fn handle_schedule(
    dictionary: Option<&Path>,
    file: &Path,
    action: ScheduleCommand,
    rng: &mut SmallRng,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let mut schedule = Schedule::load(file)?;
    let today = Local::now().date_naive();
    match action {
        ScheduleCommand::Show => {
            if as_json {
                println!("{}", serde_json::to_string_pretty(&schedule)?);
            } else {
                print_schedule_table(&schedule);
            }
        }
        ScheduleCommand::Today { date } => {
            let graph = load_graph(dictionary)?;
            let generator = PuzzleGenerator::new(&graph);
            let resolved = schedule.resolve(date.unwrap_or(today), &generator, rng);
            if as_json {
                println!("{}", serde_json::to_string_pretty(&resolved)?);
            } else {
                print_resolved(&resolved);
            }
        }
        ScheduleCommand::Publish {
            signatures,
            words,
            date,
            auto_date,
        } => {
            let graph = load_graph(dictionary)?;
            let words = (!words.is_empty()).then_some(words.as_slice());
            let entry =
                schedule.publish_signatures(&graph, &signatures, words, date, auto_date, today)?;
            schedule.save(file)?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&entry)?);
            } else {
                println!("Published {} on {}: {}", entry.id, entry.date, entry.words.join(" "));
            }
        }
        ScheduleCommand::Batch {
            start,
            days,
            overwrite,
        } => {
            let graph = load_graph(dictionary)?;
            let generator = PuzzleGenerator::new(&graph);
            let report =
                schedule.plan_batch(&generator, start.unwrap_or(today), days, !overwrite, rng);
            schedule.save(file)?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Created {} puzzle(s) from {} over {} day(s).",
                    report.created.len(),
                    report.start_date,
                    report.days
                );
                for detail in &report.details {
                    println!("  {}: {:?}", detail.date, detail.reason);
                }
            }
        }
        ScheduleCommand::Remove { id } => {
            let removed = schedule.remove(&id)?;
            schedule.save(file)?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&removed)?);
            } else {
                println!("Removed {} ({}).", removed.id, removed.date);
            }
        }
    }
    Ok(())
}

fn print_schedule_table(schedule: &Schedule) {
    if schedule.entries().is_empty() {
        println!("No puzzles scheduled.");
        return;
    }
    println!("{:<10}  {:<24}  {}", "DATE", "ID", "WORDS");
    println!("{:-<10}  {:-<24}  {}", "", "", "-----");
    for entry in schedule.entries() {
        println!("{:<10}  {:<24}  {}", entry.date, entry.id, entry.words.join(" "));
    }
}

fn print_resolved(resolved: &ResolvedPuzzle) {
    println!(
        "Puzzle for {} ({}, id {})",
        resolved.date, resolved.source, resolved.id
    );
    let rows: Vec<_> = resolved
        .signatures
        .iter()
        .zip(&resolved.words)
        .map(|(signature, word)| (signature.as_str(), word.as_str(), None))
        .collect();
    print_rows(&rows, &resolved.added_letters);
}

fn print_chain(chain: &PuzzleChain) {
    println!(
        "Ladder ({}, average difficulty {:.2})",
        chain.source, chain.average_difficulty
    );
    let rows: Vec<_> = chain
        .signatures
        .iter()
        .zip(&chain.words)
        .zip(&chain.anagram_counts)
        .map(|((signature, word), count)| (signature.as_str(), word.as_str(), Some(*count)))
        .collect();
    print_rows(&rows, &chain.added_letters());
}

fn print_rows(rows: &[(&str, &str, Option<usize>)], added: &[char]) {
    let added_at = |row: usize| {
        row.checked_sub(1)
            .and_then(|i| added.get(i))
            .map(|letter| format!("+{letter}"))
            .unwrap_or_default()
    };
    if stdout_is_tty() {
        let mut markdown = String::from("|#|signature|word|anagrams|added|\n|-:|:-|:-|-:|:-:|\n");
        for (row, (signature, word, count)) in rows.iter().enumerate() {
            let count = count.map(|c| c.to_string()).unwrap_or_default();
            markdown.push_str(&format!(
                "|{}|{}|**{}**|{}|{}|\n",
                row + 1,
                signature,
                word,
                count,
                added_at(row)
            ));
        }
        let skin = MadSkin::default();
        println!("{}", FmtText::from(&skin, &markdown, Some(markdown_width())));
        return;
    }
    println!("{:<3}  {:<9}  {:<9}  {:<8}  {}", "#", "SIGNATURE", "WORD", "ANAGRAMS", "ADDED");
    println!("{:-<3}  {:-<9}  {:-<9}  {:-<8}  {}", "", "", "", "", "-----");
    for (row, (signature, word, count)) in rows.iter().enumerate() {
        let count = count.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string());
        println!(
            "{:<3}  {:<9}  {:<9}  {:<8}  {}",
            row + 1,
            signature,
            word,
            count,
            added_at(row)
        );
    }
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}

fn markdown_width() -> usize {
    let (width, _) = terminal_size();
    width.max(60) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_requires_a_single_inserted_letter() {
        assert_eq!(hint_letter("aehrst", "aehrstt").unwrap(), 't');
        assert!(hint_letter("art", "art").is_err());
        assert!(hint_letter("art", "aerst").is_err());
        assert!(hint_letter("art", "abc").is_err());
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ladderforge", "hint", "art", "aert", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Hint { .. }));
    }
}
