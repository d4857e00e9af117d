//! Pure aggregation over already-collected SERP signals. No I/O happens
//! here; every function degrades to empty/zero defaults on empty input.

use std::collections::HashMap;

use crate::report::{
    ContentMetrics, HeadingStructure, IntentKind, SearchIntent, SearchResultEntry, TitlePatterns,
    UrlPatterns,
};

const TRANSACTIONAL_TERMS: [&str; 9] = [
    "buy", "purchase", "order", "shop", "price", "cost", "deal", "discount", "sale",
];
const NAVIGATIONAL_TERMS: [&str; 4] = ["official", "login", "sign in", "homepage"];
const COMMERCIAL_TERMS: [&str; 7] = [
    "best", "top", "review", "compare", "vs", "comparison", "alternative",
];
const INFORMATIONAL_TERMS: [&str; 8] = [
    "what", "how", "why", "when", "guide", "tutorial", "learn", "understand",
];

const TITLE_STOP_WORDS: [&str; 18] = [
    "the", "and", "for", "are", "but", "not", "with", "you", "your", "from", "this", "that",
    "was", "can", "will", "has", "have", "had",
];

/// Classify the search intent behind `keyword` from result titles and
/// snippets.
///
/// Categories are evaluated transactional -> navigational -> commercial ->
/// informational; each category with at least two vocabulary hits overrides
/// the kind, so the last qualifying category wins and informational is the
/// default. Confidence is 10x the hit total across all four categories,
/// capped at 90 — it measures overall signal strength, not the margin of
/// the winning category.
pub fn classify_intent(keyword: &str, results: &[SearchResultEntry]) -> SearchIntent {
    let haystack = results
        .iter()
        .map(|entry| {
            let snippet = entry.snippet.as_deref().unwrap_or("");
            format!("{} {snippet}", entry.title)
        })
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let keyword_lower = keyword.to_lowercase();

    let transactional = count_hits(&haystack, &TRANSACTIONAL_TERMS);
    let mut navigational = count_hits(&haystack, &NAVIGATIONAL_TERMS);
    if keyword_lower.contains(".com") || keyword_lower.contains("www") {
        navigational += 1;
    }
    let commercial = count_hits(&haystack, &COMMERCIAL_TERMS);
    let informational = count_hits(&haystack, &INFORMATIONAL_TERMS);

    let mut kind = IntentKind::Informational;
    let mut indicators = Vec::new();

    if transactional >= 2 {
        kind = IntentKind::Transactional;
        indicators.push("purchase-oriented terms in titles and snippets".to_owned());
    }
    if navigational >= 2 {
        kind = IntentKind::Navigational;
        indicators.push("site or brand navigation terms".to_owned());
    }
    if commercial >= 2 {
        kind = IntentKind::Commercial;
        indicators.push("comparison and review terms".to_owned());
    }
    if informational >= 2 {
        kind = IntentKind::Informational;
        indicators.push("question and learning terms".to_owned());
    }

    let total = transactional + navigational + commercial + informational;
    let confidence = (10 * total as u32).min(90);

    SearchIntent {
        kind,
        confidence,
        indicators,
    }
}

fn count_hits(haystack: &str, vocabulary: &[&str]) -> usize {
    vocabulary
        .iter()
        .filter(|term| haystack.contains(**term))
        .count()
}

/// Mine recurring path segments, average path depth and file extensions
/// from result URLs. Unparseable URLs are skipped.
pub fn mine_url_patterns(results: &[SearchResultEntry]) -> UrlPatterns {
    let paths = results
        .iter()
        .filter_map(|entry| url::Url::parse(&entry.link).ok())
        .map(|parsed| {
            parsed
                .path()
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(ToOwned::to_owned)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    if paths.is_empty() {
        return UrlPatterns::default();
    }

    let url_count = paths.len();
    let total_depth: usize = paths.iter().map(Vec::len).sum();
    let avg_path_depth = round_one_decimal(total_depth as f64 / url_count as f64);

    // A segment counts once per URL, however often it repeats in one path.
    let segments_per_url = paths.iter().flat_map(|segments| {
        let mut seen = Vec::new();
        for segment in segments {
            if !seen.contains(segment) {
                seen.push(segment.clone());
            }
        }
        seen
    });
    let threshold = url_count as f64 / 3.0;
    let common_paths = rank_by_frequency(segments_per_url)
        .into_iter()
        .filter(|(_, count)| *count as f64 >= threshold)
        .take(5)
        .map(|(segment, _)| segment)
        .collect();

    let extensions = results
        .iter()
        .filter_map(|entry| url::Url::parse(&entry.link).ok())
        .map(|parsed| path_extension(parsed.path()));
    let common_extensions = rank_by_frequency(extensions)
        .into_iter()
        .take(3)
        .map(|(extension, _)| extension)
        .collect();

    UrlPatterns {
        common_paths,
        avg_path_depth,
        common_extensions,
    }
}

/// Trailing `.xxx` (ASCII letters only, case-insensitive) of a URL path,
/// or "none".
fn path_extension(path: &str) -> String {
    match path.rsplit_once('.') {
        Some((_, ext))
            if !ext.is_empty() && ext.chars().all(|ch| ch.is_ascii_alphabetic()) =>
        {
            ext.to_lowercase()
        }
        _ => "none".to_owned(),
    }
}

/// Mine recurring title words, average title length and common title
/// formats from the full result list.
pub fn mine_title_patterns(results: &[SearchResultEntry]) -> TitlePatterns {
    if results.is_empty() {
        return TitlePatterns::default();
    }

    let words = results.iter().flat_map(|entry| {
        entry
            .title
            .to_lowercase()
            .split_whitespace()
            .filter(|word| word.len() > 2 && !TITLE_STOP_WORDS.contains(word))
            .map(ToOwned::to_owned)
            .collect::<Vec<_>>()
    });
    let common_words = rank_by_frequency(words)
        .into_iter()
        .take(10)
        .map(|(word, _)| word)
        .collect();

    let total_chars: usize = results.iter().map(|entry| entry.title.chars().count()).sum();
    let avg_length = (total_chars as f64 / results.len() as f64).round() as u32;

    let lowered = results
        .iter()
        .map(|entry| entry.title.to_lowercase())
        .collect::<Vec<_>>();
    let mut common_formats = Vec::new();
    if lowered.iter().any(|title| title.contains("how to")) {
        common_formats.push("How to...".to_owned());
    }
    if lowered.iter().any(|title| title.contains("best")) {
        common_formats.push("Best...".to_owned());
    }
    if lowered.iter().any(|title| title.contains("guide")) {
        common_formats.push("Guides".to_owned());
    }
    if lowered
        .iter()
        .any(|title| title.chars().any(|ch| ch.is_ascii_digit()))
    {
        common_formats.push("Listicles".to_owned());
    }
    if lowered.iter().any(|title| title.contains('?')) {
        common_formats.push("Questions".to_owned());
    }

    TitlePatterns {
        common_words,
        avg_length,
        common_formats,
    }
}

/// Aggregate per-document heading structures into the most frequent
/// headings per level: top 5 h1, top 10 h2, top 10 h3. Headings are
/// normalized (trimmed, lowercased); frequency ties keep first-seen order.
pub fn aggregate_headings(documents: &[HeadingStructure]) -> HeadingStructure {
    HeadingStructure {
        h1: top_headings(documents.iter().flat_map(|doc| doc.h1.iter()), 5),
        h2: top_headings(documents.iter().flat_map(|doc| doc.h2.iter()), 10),
        h3: top_headings(documents.iter().flat_map(|doc| doc.h3.iter()), 10),
    }
}

fn top_headings<'a>(headings: impl Iterator<Item = &'a String>, limit: usize) -> Vec<String> {
    rank_by_frequency(headings.map(|heading| heading.trim().to_lowercase()))
        .into_iter()
        .take(limit)
        .map(|(heading, _)| heading)
        .collect()
}

/// Word-count statistics across the analyzed documents. Empty input yields
/// all zeros rather than dividing by zero.
pub fn content_metrics(word_counts: &[usize]) -> ContentMetrics {
    if word_counts.is_empty() {
        return ContentMetrics::default();
    }

    let total: usize = word_counts.iter().sum();
    ContentMetrics {
        avg_word_count: (total as f64 / word_counts.len() as f64).round() as u32,
        min_word_count: word_counts.iter().copied().min().unwrap_or(0) as u32,
        max_word_count: word_counts.iter().copied().max().unwrap_or(0) as u32,
    }
}

/// Count occurrences and order by descending frequency. `sort_by` is stable,
/// so equal counts keep first-seen order.
fn rank_by_frequency(items: impl Iterator<Item = String>) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for item in items {
        match counts.get_mut(&item) {
            Some(count) => *count += 1,
            None => {
                counts.insert(item.clone(), 1);
                order.push(item);
            }
        }
    }

    let mut ranked = order
        .into_iter()
        .map(|item| {
            let count = counts.get(&item).copied().unwrap_or(0);
            (item, count)
        })
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
