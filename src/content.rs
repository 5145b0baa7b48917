use once_cell::sync::Lazy;
use regex::RegexSet;

const MIN_LEN: usize = 10;
const MAX_LEN: usize = 500;
const MAX_SYMBOL_RATIO: f64 = 0.1;

/// Patterns that mark a block of text as leftover code or markup rather than prose.
/// Anchors apply to the start of the whole block, not to each line.
static CODE_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"^\s*[{}]",
        r"^\s*[.#][a-zA-Z_-]",
        r"^\s*/\*.*\*/",
        r"^\s*function\s*\(",
        r"^\s*var\s+|let\s+|const\s+",
        r"^\s*if\s*\(|while\s*\(|for\s*\(",
        r"^\s*<[a-zA-Z]",
        r"^\s*[a-zA-Z-]+\s*:\s*[^;]*;",
        r"===+",
        r"^\s*//|^\s*#",
        r"[0-9A-Za-z_]+\(\)",
        r"[0-9A-Za-z_]+\.[0-9A-Za-z_]+",
    ])
    .expect("code pattern set")
});

const COMMON_WORDS: &[&str] = &[
    "the", "and", "to", "of", "a", "in", "is", "it", "you", "that", "he", "was", "for", "on",
    "are", "as", "with", "his", "they", "be", "at", "have", "this", "from", "or", "one", "had",
    "by", "word", "but", "not", "what", "all", "were", "we", "when", "your", "can", "said",
    "there", "each", "which", "she", "do", "how", "their", "if", "will", "up", "other", "about",
    "out", "many", "then", "them", "these", "so", "some", "her", "would", "make", "like", "into",
    "him", "has", "two", "more", "go", "no", "way", "could", "my", "than", "first", "been",
    "call", "who", "its", "now", "find", "long", "down", "day", "did", "get", "come", "made",
    "may", "part",
];

/// Whether a scraped block reads like quest prose.
///
/// The block is trimmed first. It must be 10 to 500 characters long, must not
/// look like code, must not be dense with structural punctuation, and must
/// contain at least one common English word. The word check is English-only.
pub fn is_meaningful(text: &str) -> bool {
    let text = text.trim();
    let len = text.chars().count();

    if !(MIN_LEN..=MAX_LEN).contains(&len) {
        return false;
    }

    if looks_like_code(text) {
        return false;
    }

    if symbol_ratio(text, len) > MAX_SYMBOL_RATIO {
        return false;
    }

    has_common_word(text)
}

pub fn looks_like_code(text: &str) -> bool {
    CODE_PATTERNS.is_match(text.trim())
}

fn symbol_ratio(text: &str, len: usize) -> f64 {
    let symbols = text
        .chars()
        .filter(|c| matches!(c, '{' | '}' | '[' | ']' | '(' | ')' | ';' | ':'))
        .count();
    symbols as f64 / len as f64
}

fn has_common_word(text: &str) -> bool {
    text.to_lowercase()
        .split_whitespace()
        .any(|word| COMMON_WORDS.contains(&word))
}
