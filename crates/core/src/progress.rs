//! Sequential chapter unlock rules.
//!
//! Progress lives on the client as a map of `chapter_number -> answer`. The
//! server never trusts it: every access decision re-checks the submitted
//! answers against the stored ones. Chapter N is reachable iff chapters
//! `1..N` (exclusive) were all answered correctly.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::answers::answers_match;
use crate::error::CoreError;

/// The first chapter of every room. Always reachable.
pub const FIRST_CHAPTER: i32 = 1;

/// A stored chapter as far as unlock rules are concerned.
pub trait SolvableChapter {
    fn chapter_number(&self) -> i32;
    /// The stored (already normalized) answer.
    fn answer(&self) -> &str;
}

/// Client-reported progress for one room: `chapter_number -> submitted answer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoomProgress(BTreeMap<i32, String>);

impl RoomProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted answer for a chapter.
    pub fn insert(&mut self, chapter_number: i32, answer: impl Into<String>) {
        self.0.insert(chapter_number, answer.into());
    }

    pub fn answer_for(&self, chapter_number: i32) -> Option<&str> {
        self.0.get(&chapter_number).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a request body of the form `{ "progress": { "1": "answer", ... } }`.
    ///
    /// Parsing is lenient: a missing or malformed body yields empty progress,
    /// and entries whose key is not an integer or whose value is not a string
    /// are skipped.
    pub fn from_json_body(body: &[u8]) -> Self {
        let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) else {
            return Self::default();
        };
        let Some(entries) = value.get("progress").and_then(|p| p.as_object()) else {
            return Self::default();
        };

        let mut progress = Self::default();
        for (key, answer) in entries {
            if let (Ok(number), Some(answer)) = (key.trim().parse::<i32>(), answer.as_str()) {
                progress.insert(number, answer);
            }
        }
        progress
    }
}

impl<S: Into<String>> FromIterator<(i32, S)> for RoomProgress {
    fn from_iter<I: IntoIterator<Item = (i32, S)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(n, a)| (n, a.into())).collect())
    }
}

/// Outcome of a chapter access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    /// A prior chapter has not been answered correctly.
    Denied { reason: String, redirect_to: i32 },
    /// A prior chapter does not exist in the room.
    MissingChapter(i32),
}

/// Outcome of submitting an answer for a single chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AnswerOutcome {
    Correct {
        /// True when the answered chapter was the last one.
        completed: bool,
        next_chapter: Option<i32>,
    },
    Incorrect,
}

/// Parse a chapter number from a URL segment. Chapter numbers start at 1.
pub fn parse_chapter_number(raw: &str) -> Result<i32, CoreError> {
    match raw.trim().parse::<i32>() {
        Ok(n) if n >= FIRST_CHAPTER => Ok(n),
        _ => Err(CoreError::Validation("Invalid chapter number".to_string())),
    }
}

/// Decide whether `target` is reachable given the submitted progress.
pub fn check_access<C: SolvableChapter>(
    chapters: &[C],
    target: i32,
    progress: &RoomProgress,
) -> AccessDecision {
    for number in FIRST_CHAPTER..target {
        let Some(chapter) = chapters.iter().find(|c| c.chapter_number() == number) else {
            return AccessDecision::MissingChapter(number);
        };

        let solved = progress
            .answer_for(number)
            .is_some_and(|submitted| answers_match(submitted, chapter.answer()));
        if !solved {
            return AccessDecision::Denied {
                reason: format!("You must correctly answer chapter {number} first"),
                redirect_to: number,
            };
        }
    }
    AccessDecision::Allowed
}

/// All chapters reachable with the submitted progress, ascending.
///
/// Chapter 1 is unlocked whenever the room has chapters; each further chapter
/// unlocks only behind an unbroken run of correct answers, so the result is
/// always `1..=k` and agrees with [`check_access`].
pub fn unlocked_chapters<C: SolvableChapter>(chapters: &[C], progress: &RoomProgress) -> Vec<i32> {
    let total = i32::try_from(chapters.len()).unwrap_or(i32::MAX);
    if total == 0 {
        return Vec::new();
    }

    let mut unlocked = vec![FIRST_CHAPTER];
    let mut number = FIRST_CHAPTER;
    while number < total {
        let solved = chapters
            .iter()
            .find(|c| c.chapter_number() == number)
            .zip(progress.answer_for(number))
            .is_some_and(|(chapter, submitted)| answers_match(submitted, chapter.answer()));
        if !solved {
            break;
        }
        number += 1;
        unlocked.push(number);
    }
    unlocked
}

/// Check a submitted answer for one chapter of a room with `total_chapters`.
pub fn evaluate_answer<C: SolvableChapter>(
    chapter: &C,
    total_chapters: usize,
    submitted: &str,
) -> Result<AnswerOutcome, CoreError> {
    if submitted.trim().is_empty() {
        return Err(CoreError::Validation("Please enter an answer".to_string()));
    }
    if !answers_match(submitted, chapter.answer()) {
        return Ok(AnswerOutcome::Incorrect);
    }

    let number = chapter.chapter_number();
    let completed = usize::try_from(number).is_ok_and(|n| n >= total_chapters);
    Ok(AnswerOutcome::Correct {
        completed,
        next_chapter: (!completed).then_some(number + 1),
    })
}
