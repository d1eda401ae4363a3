// src/utils/code.rs

use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;

/// Alphabet for room codes. Excludes I, O, 0 and 1 to avoid
/// ambiguity when codes are read aloud or written on a board.
const CODE_CHARS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const CODE_LEN: usize = 6;

/// Generates a random 6-character room code.
pub fn generate_room_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CODE_CHARS[rng.gen_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// Normalizes a user-entered room code: trimmed, uppercased.
/// Codes are matched case-insensitively everywhere.
pub fn normalize_room_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn classroom_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([1-9]|1[0-2])[a-zA-Z]$").expect("classroom regex is valid"))
}

/// Validates the classroom naming format: grade number (1-12) followed by
/// a single section letter, e.g. "10A", "5B", "12C".
pub fn is_valid_classroom(name: &str) -> bool {
    classroom_regex().is_match(name)
}
