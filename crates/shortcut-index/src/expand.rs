use unicode_segmentation::UnicodeSegmentation;

const MAX_DESCRIPTION_WORDS: usize = 100;
const MIN_PREFERRED_WORD_CHARS: usize = 3;

/// Completes the last word of `text` with the first matching word of `description`.
///
/// Trailing whitespace is trimmed from `text`. Only the missing characters are
/// appended, so the typed portion keeps its original capitalization. Text ending
/// in a symbol (e.g. `Cha*`) is never expanded.
///
/// Among description words starting with the last typed word, the first one of
/// at least three chars wins; shorter matches are used only when no longer one
/// exists. Only the first hundred description words are examined.
#[must_use]
pub fn expand_to_full_word(text: &str, description: &str) -> String {
    debug_assert!(!text.is_empty(), "expansion needs non-empty text");

    let trimmed = text.trim_end();
    let Some((start, last_word)) = trimmed.unicode_word_indices().last() else {
        return trimmed.to_string();
    };
    if start + last_word.len() != trimmed.len() {
        return trimmed.to_string();
    }
    let last_word = last_word.to_lowercase();

    let mut best: Option<&str> = None;
    for word in description.unicode_words().take(MAX_DESCRIPTION_WORDS) {
        if best.is_some_and(|found| found.chars().count() >= MIN_PREFERRED_WORD_CHARS) {
            break;
        }
        if best.is_some() && word.chars().count() < MIN_PREFERRED_WORD_CHARS {
            continue;
        }
        if word.to_lowercase().starts_with(&last_word) {
            best = Some(word);
        }
    }

    match best {
        Some(word) => {
            let missing = word
                .chars()
                .skip(last_word.chars().count())
                .collect::<String>();
            format!("{trimmed}{missing}")
        }
        None => trimmed.to_string(),
    }
}
