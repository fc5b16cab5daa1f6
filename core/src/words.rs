//! Word segmentation for field names and aliases.
//!
//! Field names arrive in whatever shape the caller declared them
//! (`ValueTestProp`, `null_value`, `max-depth2x`). Both alias validation and
//! alias suggestion work on the same normalized word list produced here.

/// Symbols allowed in single-character aliases besides ASCII letters and digits.
pub const ALLOWED_SYMBOLS: [char; 5] = ['?', '!', '@', '#', '+'];

/// Returns `true` if `c` is one of [`ALLOWED_SYMBOLS`].
pub fn is_allowed_symbol(c: char) -> bool {
    ALLOWED_SYMBOLS.contains(&c)
}

/// Splits a free-form name into normalized words.
///
/// Characters other than ASCII letters, digits, whitespace, `_`, `-` and
/// [`ALLOWED_SYMBOLS`] are dropped. `_`, `-` and whitespace separate words.
/// Each word is further split at case and digit boundaries.
///
/// # Examples
///
/// ```
/// use argot_core::words::normalized_words;
///
/// assert_eq!(normalized_words("ValueTestProp"), vec!["Value", "Test", "Prop"]);
/// assert_eq!(normalized_words("null_value"), vec!["null", "value"]);
/// assert_eq!(normalized_words("HTTPPort2Go"), vec!["HTTP", "Port2", "Go"]);
/// ```
pub fn normalized_words(name: &str) -> Vec<String> {
    let filtered: String = name
        .chars()
        .filter_map(|c| match c {
            '_' | '-' => Some(' '),
            c if c.is_ascii_alphanumeric() || c.is_whitespace() || is_allowed_symbol(c) => {
                Some(c)
            }
            _ => None,
        })
        .collect();

    filtered.split_whitespace().flat_map(sub_words).collect()
}

/// Splits one word at lower→upper, acronym→word and digit→non-digit boundaries.
///
/// `ValueTestProp` → `Value`, `Test`, `Prop`; `HTMLParser` → `HTML`,
/// `Parser`; `Port2Go` → `Port2`, `Go`.
pub fn sub_words(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !current.is_empty() && is_boundary(&chars, i) {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
}

fn is_boundary(chars: &[char], i: usize) -> bool {
    let prev = chars[i - 1];
    let c = chars[i];

    if prev.is_ascii_digit() && !c.is_ascii_digit() {
        return true;
    }
    if prev.is_ascii_lowercase() && c.is_ascii_uppercase() {
        return true;
    }
    // Last capital of an acronym starts the next word: HTMLParser.
    prev.is_ascii_uppercase()
        && c.is_ascii_uppercase()
        && chars.get(i + 1).is_some_and(char::is_ascii_lowercase)
}
