/// Substrings treated as profane. Matching is substring based, so short
/// entries also hit longer words that contain them.
pub const DEFAULT_DENY_LIST: &[&str] = &["바보", "청이", "욕설", "나쁜말"];

/// A single character repeated this many times in a row is spam.
const CHAR_RUN_LIMIT: usize = 4;

/// The same word this many times in a row is spam.
const WORD_RUN_LIMIT: usize = 3;

/// Case-insensitive substring match against `deny_list`.
pub fn contains_profanity<S: AsRef<str>>(text: &str, deny_list: &[S]) -> bool {
    let lowered = text.to_lowercase();
    deny_list
        .iter()
        .any(|word| lowered.contains(&word.as_ref().to_lowercase()))
}

/// Flags flooding: a long run of one character, or the same word
/// three times back to back.
pub fn is_spam_pattern(text: &str) -> bool {
    has_repeated_char(text) || has_repeated_word(text)
}

// Line breaks never form a run, so blank-line spacing in a body is allowed.
fn has_repeated_char(text: &str) -> bool {
    let mut prev: Option<char> = None;
    let mut run = 0;
    for c in text.chars() {
        if c != '\n' && prev == Some(c) {
            run += 1;
            if run >= CHAR_RUN_LIMIT {
                return true;
            }
        } else {
            run = 1;
        }
        prev = Some(c);
    }
    false
}

fn has_repeated_word(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .windows(WORD_RUN_LIMIT)
        .any(|w| w.iter().all(|word| *word == w[0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profanity_matches_any_casing() {
        let deny = ["spam", "바보"];
        assert!(contains_profanity("buy SPAM now", &deny));
        assert!(contains_profanity("SpAm", &deny));
        assert!(contains_profanity("너 바보야", &deny));
        assert!(!contains_profanity("우리 강아지가 아파요", &deny));
    }

    #[test]
    fn profanity_is_substring_based() {
        assert!(contains_profanity("나쁜말버릇", DEFAULT_DENY_LIST));
    }

    #[test]
    fn empty_text_is_clean() {
        assert!(!contains_profanity("", DEFAULT_DENY_LIST));
        assert!(!is_spam_pattern(""));
    }

    #[test]
    fn four_identical_chars_is_spam() {
        assert!(is_spam_pattern("aaaa"));
        assert!(is_spam_pattern("좋아요ㅋㅋㅋㅋ"));
        assert!(!is_spam_pattern("aaa"));
        assert!(!is_spam_pattern("aaabaaa"));
    }

    #[test]
    fn blank_lines_are_not_a_char_run() {
        assert!(!is_spam_pattern("첫 문단\n\n\n\n둘째 문단"));
        assert!(is_spam_pattern("    "));
    }

    #[test]
    fn three_identical_words_is_spam() {
        assert!(is_spam_pattern("hi hi hi"));
        assert!(is_spam_pattern("well hi  hi\thi there"));
        assert!(!is_spam_pattern("hi hi there"));
        assert!(!is_spam_pattern("hi there hi hi"));
    }

    #[test]
    fn word_comparison_is_case_sensitive() {
        assert!(!is_spam_pattern("Hi hi hi"));
    }
}
