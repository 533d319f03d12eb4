use std::sync::LazyLock;

use regex::Regex;

/// Parenthesised asides such as transliterations.
static PARENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*?\)").unwrap());

/// Alternative pronunciations: `or /.../` up to the end of the line.
static ALTERNATIVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"or\s*/[^/].*").unwrap());

static COLON: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":[ \t]*").unwrap());

/// Tidy a single-word analysis returned by the model.
///
/// IPA written between slashes is kept, including when the model wraps it in
/// brackets like `[/ˈæpəl/]`. A colon and any spaces after it become exactly
/// one `": "`, so `Translation:  x` and `Translation:x` both read `Translation: x`.
pub fn clean_word_analysis(response: &str) -> String {
    let cleaned = PARENS.replace_all(response, "");
    let cleaned = strip_brackets(&cleaned);
    let cleaned = ALTERNATIVE.replace_all(&cleaned, "");
    let cleaned = COLON.replace_all(&cleaned, ": ");
    cleaned.trim().to_string()
}

/// Remove `[...]` groups on a single line unless the content starts or ends with `/`.
fn strip_brackets(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '[' && chars.get(i + 1) != Some(&'/') {
            let close = chars[i + 1..]
                .iter()
                .enumerate()
                .take_while(|(_, c)| **c != '\n')
                .find(|(offset, c)| **c == ']' && chars[i + offset] != '/')
                .map(|(offset, _)| i + 1 + offset);

            if let Some(end) = close {
                i = end + 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}
