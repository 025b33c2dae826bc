use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PronounUsage {
    pub first_person: usize,
    pub second_person: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetails {
    /// Canonical ending form -> number of sentences terminating with it.
    pub ending_patterns: HashMap<String, usize>,
    /// Distinct characteristic phrases present, in rule-table order.
    pub characteristic_phrases_used: Vec<String>,
    /// Distinct slang surface forms found, first-seen order.
    pub inappropriate_phrases_found: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    /// Composite score in [0, 1], rounded to 2 decimals.
    pub score: f64,
    pub total_sentences: usize,
    pub appropriate_endings: usize,
    pub characteristic_phrase_count: usize,
    pub pronoun_usage: PronounUsage,
    pub inappropriate_count: usize,
    pub details: ReportDetails,
}

// ---------------------------------------------------------------------------
// Weight table
// ---------------------------------------------------------------------------

/// Relative weight of each scoring component. Defaults sum to 1.0; the
/// pronoun weight is split into two independent presence bonuses.
#[derive(Debug, Clone, Copy)]
pub struct Weights {
    pub ending_adequacy: f64,
    pub characteristic_phrases: f64,
    /// Distinct phrases needed before the phrase component saturates.
    pub phrase_saturation: f64,
    pub first_person_bonus: f64,
    pub second_person_bonus: f64,
    pub cleanliness_bonus: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            ending_adequacy: 0.4,
            characteristic_phrases: 0.3,
            phrase_saturation: 5.0,
            first_person_bonus: 0.1,
            second_person_bonus: 0.1,
            cleanliness_bonus: 0.1,
        }
    }
}

// ---------------------------------------------------------------------------
// Register profile
// ---------------------------------------------------------------------------

/// A sentence-terminating suffix, tagged with the canonical key it is
/// recorded under in the report histogram.
#[derive(Debug, Clone)]
pub struct EndingPattern {
    pub suffix: String,
    pub canonical: String,
}

impl EndingPattern {
    /// An ending whose canonical key is its own surface form.
    pub fn literal(surface: &str) -> Self {
        Self {
            suffix: surface.to_string(),
            canonical: surface.to_string(),
        }
    }
}

/// Precedence-ordered pattern list. Earlier patterns claim the spans they
/// match; a later pattern is not counted inside a claimed span, so a combined
/// form never double-counts as its standalone parts.
#[derive(Debug)]
pub struct PrecedenceList {
    patterns: Vec<Regex>,
}

impl PrecedenceList {
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    /// Total matches across all patterns, skipping any match contained in a
    /// span already claimed by an earlier pattern.
    pub fn count(&self, text: &str) -> usize {
        let mut claimed: Vec<(usize, usize)> = Vec::new();
        let mut total = 0usize;
        for pat in &self.patterns {
            for m in pat.find_iter(text) {
                if claimed
                    .iter()
                    .any(|&(start, end)| start <= m.start() && m.end() <= end)
                {
                    continue;
                }
                total += 1;
                claimed.push((m.start(), m.end()));
            }
        }
        total
    }
}

/// The full rule table for one persona register, together with the weight
/// table used to aggregate its per-category tallies.
pub struct RegisterProfile {
    pub endings: Vec<EndingPattern>,
    pub characteristic_phrases: Vec<String>,
    pub first_person: PrecedenceList,
    pub second_person: PrecedenceList,
    pub disallowed: Vec<Regex>,
    pub weights: Weights,
}

// Suffixes for the archaic refined-feminine register. A longer suffix that
// textually contains a shorter one must precede it, so the histogram records
// the most specific form (りますわ before ますわ).
static OJOUSAMA_ENDINGS: &[&str] = &[
    "ですわ",
    "ましょう",
    "ですこと",
    "でしょう",
    "ございます",
    "ませ",
    "わね",
    "りますわ",
    "ますわ",
];

static OJOUSAMA_PHRASES: &[&str] = &[
    "あら、まぁ",
    "ふふっ",
    "これはこれは",
    "面白きことを仰る",
    "というものですわ",
    "便利な道具",
    "千里眼のような",
    "蜘蛛の巣のような",
    "瓦版",
    "井戸端会議",
    "御贔屓",
];

// Modern slang and casual register the persona must never slip into.
static OJOUSAMA_DISALLOWED: &[&str] = &[
    "ヤバ[いっ]?",
    "ウケる",
    "マジ",
    "っす",
    "だよね",
    "じゃん",
    "〜的な",
    "ワロタ",
    "草",
    "www",
];

static OJOUSAMA: Lazy<RegisterProfile> = Lazy::new(RegisterProfile::ojousama);

impl RegisterProfile {
    /// Built-in profile: archaic refined-feminine Japanese (ojousama speech).
    pub fn ojousama() -> Self {
        Self {
            endings: OJOUSAMA_ENDINGS
                .iter()
                .map(|s| EndingPattern::literal(s))
                .collect(),
            characteristic_phrases: OJOUSAMA_PHRASES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            first_person: PrecedenceList::new(vec![
                // Reading-annotated form first; only these two bracket styles.
                Regex::new("私[（(]わたくし[)）]").unwrap(),
                Regex::new("わたくし").unwrap(),
                Regex::new("私").unwrap(),
            ]),
            second_person: PrecedenceList::new(vec![
                Regex::new("あなた様").unwrap(),
                Regex::new("あなた").unwrap(),
                Regex::new("お客様").unwrap(),
            ]),
            disallowed: OJOUSAMA_DISALLOWED
                .iter()
                .map(|p| Regex::new(p).unwrap())
                .collect(),
            weights: Weights::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sentence segmentation
// ---------------------------------------------------------------------------

const SENTENCE_TERMINATORS: &[char] = &['。', '！', '？'];

/// Split a response into sentences on terminal punctuation. Non-empty text
/// without any terminator is a single sentence; whitespace-only text has no
/// sentences.
pub fn split_sentences(text: &str) -> Vec<&str> {
    if text.contains(SENTENCE_TERMINATORS) {
        text.split(SENTENCE_TERMINATORS)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    } else {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed]
        }
    }
}

// ---------------------------------------------------------------------------
// Per-category scans
// ---------------------------------------------------------------------------

fn classify_endings(
    sentences: &[&str],
    endings: &[EndingPattern],
) -> (usize, HashMap<String, usize>) {
    let mut appropriate = 0usize;
    let mut histogram: HashMap<String, usize> = HashMap::new();
    for sentence in sentences {
        // First declared pattern wins; a sentence never counts twice.
        if let Some(ending) = endings.iter().find(|e| sentence.ends_with(&e.suffix)) {
            appropriate += 1;
            *histogram.entry(ending.canonical.clone()).or_insert(0) += 1;
        }
    }
    (appropriate, histogram)
}

fn scan_phrases(text: &str, phrases: &[String]) -> Vec<String> {
    phrases
        .iter()
        .filter(|phrase| text.contains(phrase.as_str()))
        .cloned()
        .collect()
}

fn scan_disallowed(text: &str, patterns: &[Regex]) -> (usize, Vec<String>) {
    let mut count = 0usize;
    let mut found: Vec<String> = Vec::new();
    for pat in patterns {
        for m in pat.find_iter(text) {
            count += 1;
            if !found.iter().any(|f| f == m.as_str()) {
                found.push(m.as_str().to_string());
            }
        }
    }
    (count, found)
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Round half away from zero at 2 decimals.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl RegisterProfile {
    /// Score a candidate response against this profile. The reference input
    /// that elicited the response is accepted for parity with sibling
    /// evaluation metrics but does not influence the result.
    pub fn measure(&self, _input: &str, output: &str) -> ScoreReport {
        let sentences = split_sentences(output);
        let total_sentences = sentences.len();

        let (appropriate_endings, ending_patterns) = classify_endings(&sentences, &self.endings);
        let phrases_used = scan_phrases(output, &self.characteristic_phrases);
        let characteristic_phrase_count = phrases_used.len();
        let first_person = self.first_person.count(output);
        let second_person = self.second_person.count(output);
        let (inappropriate_count, inappropriate_found) = scan_disallowed(output, &self.disallowed);

        let w = &self.weights;
        let mut score = 0.0f64;
        if total_sentences > 0 {
            score += appropriate_endings as f64 / total_sentences as f64 * w.ending_adequacy;
        }
        if characteristic_phrase_count > 0 {
            score += (characteristic_phrase_count as f64 / w.phrase_saturation).min(1.0)
                * w.characteristic_phrases;
        }
        if first_person > 0 {
            score += w.first_person_bonus;
        }
        if second_person > 0 {
            score += w.second_person_bonus;
        }
        if inappropriate_count == 0 {
            score += w.cleanliness_bonus;
        }

        ScoreReport {
            score: round2(score),
            total_sentences,
            appropriate_endings,
            characteristic_phrase_count,
            pronoun_usage: PronounUsage {
                first_person,
                second_person,
            },
            inappropriate_count,
            details: ReportDetails {
                ending_patterns,
                characteristic_phrases_used: phrases_used,
                inappropriate_phrases_found: inappropriate_found,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score `output` against the built-in ojousama register profile.
pub fn measure(input: &str, output: &str) -> ScoreReport {
    OJOUSAMA.measure(input, output)
}
