use std::sync::OnceLock;

use regex::Regex;

use crate::errors::ValuationError;

const MIN_FIELD_CHARS: usize = 2;

/// First gate of the pipeline. Rejects entries too short to identify a
/// product and obvious keyboard noise before any network work happens.
pub fn screen(brand: &str, model: &str) -> Result<(), ValuationError> {
    if brand.trim().chars().count() < MIN_FIELD_CHARS
        || model.trim().chars().count() < MIN_FIELD_CHARS
    {
        return Err(ValuationError::Validation(
            "Brand and model must each be at least 2 characters".to_string(),
        ));
    }

    if looks_gibberish(brand) || looks_gibberish(model) {
        return Err(ValuationError::Validation(
            "Invalid product information detected".to_string(),
        ));
    }

    Ok(())
}

fn looks_gibberish(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    if has_repeated_char_run(&normalized, 4) {
        return true;
    }
    gibberish_patterns().iter().any(|pattern| pattern.is_match(&normalized))
}

fn gibberish_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // Vowel runs like "aaeio" never occur in real brand names.
            r"[aeiou]{3,}",
            r"[bcdfghjklmnpqrstvwxyz]{4,}",
            r"qwerty|asdf|zxcv",
            r"^\d{3,}$",
            r"^(test|sample|demo)([^a-z]|$)",
            r"^[a-z]\d{3,}$",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("valid regex"))
        .collect()
    })
}

// The regex crate has no backreferences, so repeated characters are counted
// with a plain scan.
fn has_repeated_char_run(text: &str, limit: usize) -> bool {
    let mut run = 0usize;
    let mut previous: Option<char> = None;
    for ch in text.chars() {
        if previous == Some(ch) {
            run += 1;
        } else {
            run = 1;
            previous = Some(ch);
        }
        if run >= limit {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use crate::errors::ValuationError;

    use super::screen;

    fn message(result: Result<(), ValuationError>) -> String {
        match result {
            Ok(()) => String::new(),
            Err(error) => error.to_string(),
        }
    }

    #[test]
    fn accepts_ordinary_brand_and_model() {
        assert!(screen("Rolex", "Submariner").is_ok());
        assert!(screen("Apple", "iPhone 15").is_ok());
        assert!(screen("Gibson", "Les Paul Standard").is_ok());
    }

    #[test]
    fn rejects_fields_shorter_than_two_characters() {
        let result = screen("R", "Submariner");
        assert_eq!(message(result), "Brand and model must each be at least 2 characters");
        assert!(screen("Rolex", " x ").is_err());
    }

    #[test]
    fn rejects_repeated_character_runs() {
        let result = screen("aaaa", "Submariner");
        assert_eq!(message(result), "Invalid product information detected");
        assert!(screen("Rolex", "model!!!!").is_err());
    }

    #[test]
    fn rejects_vowel_and_consonant_runs() {
        assert!(screen("aeiox", "Submariner").is_err());
        assert!(screen("bcdfg", "Submariner").is_err());
    }

    #[test]
    fn rejects_keyboard_sequences() {
        assert!(screen("qwerty watches", "Submariner").is_err());
        assert!(screen("Rolex", "asdf").is_err());
        assert!(screen("zxcv", "zxcv").is_err());
    }

    #[test]
    fn rejects_pure_digit_entries() {
        assert!(screen("12345", "Submariner").is_err());
        assert!(screen("Rolex", "999").is_err());
    }

    #[test]
    fn allows_digits_mixed_into_real_model_names() {
        assert!(screen("Canon", "EOS R5").is_ok());
        assert!(screen("Sony", "RX100 VII").is_ok());
    }

    #[test]
    fn rejects_placeholder_words() {
        assert!(screen("test brand", "Submariner").is_err());
        assert!(screen("Rolex", "sample 123").is_err());
        assert!(screen("demo", "demo").is_err());
    }

    #[test]
    fn placeholder_check_needs_a_word_boundary() {
        // "Testoni" is a real brand prefix, not the word "test".
        assert!(screen("Testoni", "Diadema").is_ok());
    }

    #[test]
    fn rejects_single_letter_plus_digits() {
        assert!(screen("x1000", "Submariner").is_err());
    }

    #[test]
    fn screening_is_case_insensitive() {
        assert!(screen("AAAA", "Submariner").is_err());
        assert!(screen("QWERTY", "Submariner").is_err());
    }
}
