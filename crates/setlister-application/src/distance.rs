// SPDX-License-Identifier: GPL-3.0-or-later

//! Title/artist distance used to rank loosely named tracks.
//!
//! Distances are in `[0.0, 1.0]`, lower is closer. Each component is a
//! normalized Levenshtein distance over the alphanumeric characters of the
//! transliterated, lowercased strings, with discounts for decorations that
//! commonly differ between sources ("(live)", "feat. …", "Part II", …).

use deunicode::deunicode;
use lazy_static::lazy_static;
use regex::Regex;

/// Relative weight of the title component.
pub const TITLE_WEIGHT: f64 = 3.0;
/// Relative weight of the artist component.
pub const ARTIST_WEIGHT: f64 = 2.0;

/// Words that some catalogs move to the end: "Beatles, The".
const END_WORDS: [&str; 3] = ["the", "a", "an"];

lazy_static! {
    static ref AMPERSAND: Regex = Regex::new(r"&").expect("ampersand regex is valid");

    /// Patterns whose presence is only partially penalized, with their weights.
    static ref PENALTY_PATTERNS: Vec<(Regex, f64)> = vec![
        (Regex::new(r"^the ").expect("article regex is valid"), 0.1),
        (Regex::new(r"\s[\[\(]?(ep|single)[\]\)]?$").expect("ep regex is valid"), 0.0),
        (Regex::new(r"(^|\s)[\[\(]?(featuring|feat|ft)[\. :].+").expect("featuring regex is valid"), 0.1),
        (Regex::new(r"\(.*?\)").expect("parenthesis regex is valid"), 0.3),
        (Regex::new(r"\[.*?\]").expect("bracket regex is valid"), 0.3),
        (Regex::new(r"(, )?\b(pt\.|part) .+").expect("part regex is valid"), 0.2),
    ];
}

/// Distance between a candidate title/artist and the wanted title/artist.
///
/// The artist component only counts when the candidate has a non-empty
/// artist; otherwise the title distance is returned as is. With both
/// components the result is their weighted mean, so a threshold means the
/// same thing either way.
pub fn track_distance(
    candidate_title: &str,
    candidate_artist: Option<&str>,
    target_title: &str,
    target_artist: &str,
) -> f64 {
    let title = string_distance(target_title, candidate_title);

    match candidate_artist.filter(|artist| !artist.is_empty()) {
        Some(artist) => {
            let artist = string_distance(target_artist, artist);
            (TITLE_WEIGHT * title + ARTIST_WEIGHT * artist) / (TITLE_WEIGHT + ARTIST_WEIGHT)
        }
        None => title,
    }
}

/// Whether `distance` is close enough. The bound is inclusive.
pub fn within_threshold(distance: f64, threshold: f64) -> bool {
    distance <= threshold
}

/// Distance between two free-form strings, in `[0.0, 1.0]`.
pub fn string_distance(left: &str, right: &str) -> f64 {
    let mut left = move_end_word(&deunicode(left).to_lowercase());
    let mut right = move_end_word(&deunicode(right).to_lowercase());
    left = AMPERSAND.replace_all(&left, "and").into_owned();
    right = AMPERSAND.replace_all(&right, "and").into_owned();

    let mut base = basic_distance(&left, &right);
    let mut penalty = 0.0;

    for (pattern, weight) in PENALTY_PATTERNS.iter() {
        let stripped_left = pattern.replace_all(&left, "").into_owned();
        let stripped_right = pattern.replace_all(&right, "").into_owned();
        if stripped_left == left && stripped_right == right {
            continue;
        }

        let stripped = basic_distance(&stripped_left, &stripped_right);
        let delta = (base - stripped).max(0.0);
        if delta == 0.0 {
            continue;
        }

        // Continue from the stripped strings so one decoration is only discounted once.
        left = stripped_left;
        right = stripped_right;
        base = stripped;
        penalty += weight * delta;
    }

    (base + penalty).clamp(0.0, 1.0)
}

/// "beatles, the" -> "the beatles"
fn move_end_word(value: &str) -> String {
    for word in END_WORDS {
        if let Some(head) = value.strip_suffix(&format!(", {word}")) {
            return format!("{word} {head}");
        }
    }
    value.to_string()
}

fn basic_distance(left: &str, right: &str) -> f64 {
    let left = fold_alphanumeric(left);
    let right = fold_alphanumeric(right);
    if left.is_empty() && right.is_empty() {
        return 0.0;
    }

    let max_len = left.len().max(right.len()) as f64;
    levenshtein_distance(&left, &right) as f64 / max_len
}

/// Keep `[a-z0-9]`; input is already transliterated.
fn fold_alphanumeric(value: &str) -> Vec<char> {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

fn levenshtein_distance(left: &[char], right: &[char]) -> usize {
    if left.is_empty() {
        return right.len();
    }
    if right.is_empty() {
        return left.len();
    }

    let mut previous_row: Vec<usize> = (0..=right.len()).collect();
    let mut current_row: Vec<usize> = vec![0; right.len() + 1];

    for (left_index, left_char) in left.iter().enumerate() {
        current_row[0] = left_index + 1;
        for (right_index, right_char) in right.iter().enumerate() {
            let insert_cost = current_row[right_index] + 1;
            let delete_cost = previous_row[right_index + 1] + 1;
            let replace_cost = previous_row[right_index] + usize::from(left_char != right_char);
            current_row[right_index + 1] = insert_cost.min(delete_cost).min(replace_cost);
        }
        std::mem::swap(&mut previous_row, &mut current_row);
    }

    previous_row[right.len()]
}
