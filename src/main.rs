use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Instant;

use music_name_match::album::AlbumName;
use music_name_match::artists::split_artists;
use music_name_match::enclosure::split_enclosed;
use music_name_match::models::{RankStats, RankedCandidate};
use music_name_match::name::Name;
use music_name_match::progress::{create_progress_bar, format_duration, set_log_only, tick};
use music_name_match::scoring::{MatchOptions, DEFAULT_MATCH_THRESHOLD, ROMANIZATION_BONUS};

#[derive(Parser)]
#[command(name = "name-match")]
#[command(about = "Parse and fuzzy-match multilingual album titles and artist credits")]
struct Args {
    /// Log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split text on its enclosed (bracketed/quoted) parts
    Split {
        text: String,

        #[arg(long)]
        reverse: bool,

        #[arg(long)]
        inner: bool,

        #[arg(long, default_value = "0")]
        recurse: i32,

        #[arg(long, default_value = "0")]
        maxsplit: i32,
    },

    /// Split an artist credit into names
    Artists { credit: String },

    /// Parse a raw album title
    Album {
        title: String,

        /// Album artist, used to drop restatements and split collaborators
        #[arg(long)]
        artist: Option<String>,
    },

    /// Score two names against each other
    Score {
        a: String,

        b: String,

        #[command(flatten)]
        matching: MatchArgs,
    },

    /// Rank the lines of a candidates file against a title
    Rank {
        title: String,

        candidates: PathBuf,

        #[command(flatten)]
        matching: MatchArgs,

        #[arg(long, default_value = "0")]
        workers: usize,

        /// Hide the progress bar and log periodic progress lines instead
        #[arg(long)]
        log_only: bool,

        /// Write run statistics as JSON to this path
        #[arg(long)]
        stats: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct MatchArgs {
    #[arg(long, default_value_t = DEFAULT_MATCH_THRESHOLD)]
    threshold: i32,

    #[arg(long, default_value_t = ROMANIZATION_BONUS)]
    romanization_bonus: i32,
}

impl MatchArgs {
    fn options(&self) -> MatchOptions {
        MatchOptions {
            threshold: self.threshold,
            romanization_bonus: self.romanization_bonus,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let mut clog = colog::default_builder();
    clog.filter(None, level);
    clog.init();
}

fn run_album(title: &str, artist: Option<&str>) -> Result<()> {
    let artist = artist.map(Name::from_enclosed);
    let album = AlbumName::parse(title, artist.as_ref())
        .with_context(|| format!("Failed to parse album title {:?}", title))?;
    print_json(&json!({
        "album": album,
        "type": album.entry_type(),
        "number": album.number(),
        "display": album.to_string(),
    }))
}

fn run_score(a: &str, b: &str, opts: &MatchOptions) -> Result<()> {
    let (a, b) = (Name::parse(a), Name::parse(b));
    let scores = a.scores(&b, opts.romanization_bonus, true);
    let best = scores.iter().copied().max();
    print_json(&json!({
        "a": a,
        "b": b,
        "scores": scores,
        "best": best,
        "threshold": opts.threshold,
        "matches": a.matches_with(&b, opts),
    }))
}

/// Score every non-blank candidate line against the query, in parallel.
fn rank_candidates(query: &Name, lines: &[String], opts: &MatchOptions) -> (Vec<RankedCandidate>, RankStats) {
    let start = Instant::now();
    let total = lines.len() as u64;
    let pb = create_progress_bar(total, "Scoring candidates");

    let results: Vec<Option<RankedCandidate>> = lines
        .par_iter()
        .enumerate()
        .map(|(i, line)| {
            let candidate = line.trim();
            let ranked = (!candidate.is_empty()).then(|| {
                let name = Name::parse(candidate);
                let score = query.match_score(&name, opts.romanization_bonus);
                RankedCandidate {
                    line: i + 1,
                    candidate: candidate.to_string(),
                    name,
                    score,
                }
            });
            tick(&pb, "RANK", total);
            ranked
        })
        .collect();

    let mut stats = RankStats {
        total_candidates: lines.len(),
        ..Default::default()
    };
    let mut matches = Vec::new();
    for result in results {
        match result {
            None => stats.skipped_blank += 1,
            Some(ranked) if ranked.score >= opts.threshold => {
                stats.record_match(ranked.score);
                matches.push(ranked);
            }
            Some(_) => {}
        }
    }
    matches.sort_by(|a, b| b.score.cmp(&a.score).then(a.line.cmp(&b.line)));

    stats.elapsed_seconds = start.elapsed().as_secs_f64();
    pb.finish_with_message(format!("Scored {} candidates, {} matches", total, matches.len()));
    (matches, stats)
}

fn run_rank(
    title: &str,
    candidates: &Path,
    opts: &MatchOptions,
    workers: usize,
    stats_path: Option<&Path>,
) -> Result<()> {
    if workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build_global()
            .context("Failed to set thread pool size")?;
    }

    let content = std::fs::read_to_string(candidates)
        .with_context(|| format!("Failed to read candidates file {:?}", candidates))?;
    let lines: Vec<String> = content.lines().map(str::to_string).collect();
    let query = Name::parse(title);
    eprintln!("[RANK] Query: {} ({} candidates)", query, lines.len());

    let (matches, stats) = rank_candidates(&query, &lines, opts);
    eprintln!(
        "[RANK] {} matches ({:.1}%) in {}",
        stats.total_matches,
        stats.match_rate(),
        format_duration(std::time::Duration::from_secs_f64(stats.elapsed_seconds))
    );
    stats.log_phase("rank");
    if let Some(path) = stats_path {
        stats
            .write_to_file(path)
            .with_context(|| format!("Failed to write stats to {:?}", path))?;
    }

    print_json(&matches)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Split { text, reverse, inner, recurse, maxsplit } => {
            print_json(&split_enclosed(&text, reverse, inner, recurse, maxsplit))
        }
        Command::Artists { credit } => {
            let names = split_artists(&credit).with_context(|| format!("Failed to split artists {:?}", credit))?;
            print_json(&names)
        }
        Command::Album { title, artist } => run_album(&title, artist.as_deref()),
        Command::Score { a, b, matching } => run_score(&a, &b, &matching.options()),
        Command::Rank { title, candidates, matching, workers, log_only, stats } => {
            set_log_only(log_only);
            run_rank(&title, &candidates, &matching.options(), workers, stats.as_deref())
        }
    }
}
