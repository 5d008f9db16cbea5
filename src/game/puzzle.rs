//! Puzzle resolvers
//!
//! Pure validators: each takes a puzzle payload and a candidate answer and
//! says whether the clue is resolved. Counting mistakes is the engine's job.

use crate::data::{CipherPuzzle, DifferenceGameState, PatternPuzzle};

/// Uppercase cipher alphabet: Latin letters then accented Portuguese letters
pub const UPPER_ALPHABET: [char; 38] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'Á', 'Â', 'Ã', 'À', 'É', 'Ê', 'Í', 'Ó', 'Ô', 'Õ', 'Ú', 'Ç',
];

pub const LOWER_ALPHABET: [char; 38] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z', 'á', 'â', 'ã', 'à', 'é', 'ê', 'í', 'ó', 'ô', 'õ', 'ú', 'ç',
];

fn shift_back(alphabet: &[char], index: usize, shift: u32) -> char {
    let len = alphabet.len();
    let shift = shift as usize % len;
    alphabet[(index + len - shift) % len]
}

/// Shift every letter `shift` places backward within its own case's
/// alphabet. Anything outside both alphabets passes through.
pub fn decode_caesar(text: &str, shift: u32) -> String {
    text.chars()
        .map(|ch| {
            if let Some(i) = UPPER_ALPHABET.iter().position(|&c| c == ch) {
                shift_back(&UPPER_ALPHABET, i, shift)
            } else if let Some(i) = LOWER_ALPHABET.iter().position(|&c| c == ch) {
                shift_back(&LOWER_ALPHABET, i, shift)
            } else {
                ch
            }
        })
        .collect()
}

/// The answer must equal the decoded text, ignoring case and surrounding
/// whitespace
pub fn resolve_cipher(puzzle: &CipherPuzzle, answer: &str) -> bool {
    let expected = decode_caesar(&puzzle.cipher_text, puzzle.shift).to_lowercase();
    answer.trim().to_lowercase() == expected
}

/// Exact numeric match
pub fn resolve_pattern(puzzle: &PatternPuzzle, answer: f64) -> bool {
    answer == puzzle.answer
}

/// Parse a typed pattern answer; accepts a decimal comma
pub fn parse_number(input: &str) -> Option<f64> {
    input.trim().replace(',', ".").parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Choices offered for a pattern puzzle
pub fn pattern_options(puzzle: &PatternPuzzle) -> Vec<f64> {
    if !puzzle.options.is_empty() {
        return puzzle.options.clone();
    }
    generate_options(puzzle.answer)
}

/// Sorted distinct distractors around the answer, at most five
pub fn generate_options(answer: f64) -> Vec<f64> {
    let mut options = vec![answer, answer - 2.0, answer + 2.0];
    if answer > 0.0 {
        options.push(answer / 2.0);
    }
    options.push(answer * 2.0);

    options.sort_by(|a, b| a.total_cmp(b));
    options.dedup();
    options.truncate(5);
    options
}

/// Render a number without a trailing `.0`
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// A difference board resolves once every region has been found
pub fn resolve_difference(state: &DifferenceGameState) -> bool {
    state.is_complete()
}
