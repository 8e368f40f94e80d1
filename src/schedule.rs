use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Days, NaiveDate, Utc};
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ScheduleError;
use crate::generator::PuzzleGenerator;
use crate::graph::LadderGraph;
use crate::puzzle::{ChainSource, PuzzleChain, chain_key};
use crate::signature::added_letter;
use crate::validator::validate_chain;

pub const MAX_BATCH_DAYS: u32 = 90;
const ID_LENGTH: usize = 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPuzzle {
    pub id: String,
    pub date: NaiveDate,
    pub signatures: Vec<String>,
    pub words: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ScheduledPuzzle {
    fn from_chain(chain: PuzzleChain, date: NaiveDate) -> Self {
        Self {
            id: generate_puzzle_id(),
            date,
            signatures: chain.signatures,
            words: chain.words,
            created_at: Utc::now(),
        }
    }

    pub fn key(&self) -> String {
        chain_key(&self.signatures)
    }
}

/// The puzzle served for a date, with the letters revealed between rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPuzzle {
    pub id: String,
    pub date: NaiveDate,
    pub source: ChainSource,
    pub signatures: Vec<String>,
    pub words: Vec<String>,
    pub added_letters: Vec<char>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyExists,
    NoSuggestionAvailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchDetail {
    pub date: NaiveDate,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub start_date: NaiveDate,
    pub days: u32,
    pub created: Vec<ScheduledPuzzle>,
    pub details: Vec<BatchDetail>,
}

/// Calendar of curated puzzles, at most one per date, kept sorted by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    curated: Vec<ScheduledPuzzle>,
}

impl Schedule {
    /// Loads a schedule file; a missing file is an empty schedule. A file with two
    /// puzzles on the same date is rejected.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScheduleError> {
        let path = path.as_ref();
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No schedule file yet");
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        let mut schedule: Schedule = serde_json::from_slice(&bytes)?;
        schedule.curated.sort_by_key(|entry| entry.date);
        if let Some(pair) = schedule
            .curated
            .windows(2)
            .find(|pair| pair[0].date == pair[1].date)
        {
            return Err(ScheduleError::DuplicateDate(pair[0].date));
        }
        Ok(schedule)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ScheduleError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    pub fn entries(&self) -> &[ScheduledPuzzle] {
        &self.curated
    }

    pub fn get(&self, date: NaiveDate) -> Option<&ScheduledPuzzle> {
        self.curated.iter().find(|entry| entry.date == date)
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.curated.iter().map(|entry| entry.date).max()
    }

    pub fn used_keys(&self) -> HashSet<String> {
        self.curated.iter().map(ScheduledPuzzle::key).collect()
    }

    /// Curated puzzle for `date`, else a freshly generated one, else the static fallback.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        generator: &PuzzleGenerator<'_>,
        rng: &mut R,
    ) -> ResolvedPuzzle {
        if let Some(entry) = self.get(date) {
            return ResolvedPuzzle {
                id: entry.id.clone(),
                date,
                source: ChainSource::Curated,
                added_letters: letters_between(&entry.signatures),
                signatures: entry.signatures.clone(),
                words: entry.words.clone(),
            };
        }
        let (id, chain) = match generator.generate_chain(rng) {
            Some(chain) => ("fallback-generated", chain),
            None => ("fallback-static", PuzzleChain::fallback()),
        };
        ResolvedPuzzle {
            id: id.to_string(),
            date,
            source: ChainSource::Fallback,
            added_letters: chain.added_letters(),
            signatures: chain.signatures,
            words: chain.words,
        }
    }

    /// Schedules `chain`. With `auto_date` (or no `date`) it goes on the day after
    /// the latest scheduled puzzle, or `today` when the calendar is empty.
    pub fn publish(
        &mut self,
        chain: PuzzleChain,
        date: Option<NaiveDate>,
        auto_date: bool,
        today: NaiveDate,
    ) -> Result<ScheduledPuzzle, ScheduleError> {
        let date = match date {
            Some(date) if !auto_date => date,
            _ => match self.latest_date() {
                Some(latest) => latest
                    .succ_opt()
                    .ok_or(ScheduleError::DateOutOfRange(latest))?,
                None => today,
            },
        };
        let entry = ScheduledPuzzle::from_chain(chain, date);
        self.insert(entry.clone());
        info!(id = %entry.id, %date, "Published puzzle");
        Ok(entry)
    }

    /// Validates a submitted chain against `graph`, then publishes it.
    pub fn publish_signatures<S, W>(
        &mut self,
        graph: &LadderGraph,
        signatures: &[S],
        words: Option<&[W]>,
        date: Option<NaiveDate>,
        auto_date: bool,
        today: NaiveDate,
    ) -> Result<ScheduledPuzzle, ScheduleError>
    where
        S: AsRef<str>,
        W: AsRef<str>,
    {
        let chain = validate_chain(graph, signatures, words)?;
        self.publish(chain, date, auto_date, today)
    }

    pub fn remove(&mut self, id: &str) -> Result<ScheduledPuzzle, ScheduleError> {
        let position = self
            .curated
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| ScheduleError::NotFound(id.to_string()))?;
        Ok(self.curated.remove(position))
    }

    /// Fills `days` consecutive dates from `start` with chains not used anywhere
    /// else in the calendar.
    pub fn plan_batch<R: Rng + ?Sized>(
        &mut self,
        generator: &PuzzleGenerator<'_>,
        start: NaiveDate,
        days: u32,
        skip_existing: bool,
        rng: &mut R,
    ) -> BatchReport {
        let days = days.clamp(1, MAX_BATCH_DAYS);
        let mut used = self.used_keys();
        let mut created = Vec::new();
        let mut details = Vec::new();

        for offset in 0..days {
            let Some(date) = start.checked_add_days(Days::new(u64::from(offset))) else {
                continue;
            };
            if self.get(date).is_some() {
                details.push(BatchDetail {
                    date,
                    reason: SkipReason::AlreadyExists,
                });
                if skip_existing {
                    continue;
                }
            }
            let Some(chain) = generator.unique_chain(&mut used, rng) else {
                details.push(BatchDetail {
                    date,
                    reason: SkipReason::NoSuggestionAvailable,
                });
                continue;
            };
            let entry = ScheduledPuzzle::from_chain(chain, date);
            self.insert(entry.clone());
            created.push(entry);
        }

        info!(
            %start,
            days,
            created = created.len(),
            skipped = details.len(),
            "Planned puzzle batch"
        );
        BatchReport {
            start_date: start,
            days,
            created,
            details,
        }
    }

    fn insert(&mut self, entry: ScheduledPuzzle) {
        self.curated.retain(|existing| existing.date != entry.date);
        let position = self
            .curated
            .partition_point(|existing| existing.date < entry.date);
        self.curated.insert(position, entry);
    }
}

fn letters_between(signatures: &[String]) -> Vec<char> {
    signatures
        .windows(2)
        .filter_map(|pair| added_letter(&pair[0], &pair[1]))
        .collect()
}

pub fn generate_puzzle_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LENGTH)
        .map(char::from)
        .collect()
}
