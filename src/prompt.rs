//! Prompt construction for the four translation modes.
//!
//! A message is either a single word, which gets a short linguistic analysis,
//! or running text, which gets a plain translation. The direction is decided
//! from the script of the first word.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    EnglishToPersian,
    PersianToEnglish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    SingleWord,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub kind: InputKind,
    pub direction: Direction,
}

/// True when the word contains a character from the Arabic block (U+0600..U+06FF).
pub fn is_persian(word: &str) -> bool {
    word.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c))
}

/// Classify a message. Returns `None` when it contains no words at all.
pub fn detect(text: &str) -> Option<TranslationRequest> {
    let mut words = text.split_whitespace();
    let first = words.next()?;

    let kind = if words.next().is_none() {
        InputKind::SingleWord
    } else {
        InputKind::Text
    };

    let direction = if is_persian(first) {
        Direction::PersianToEnglish
    } else {
        Direction::EnglishToPersian
    };

    Some(TranslationRequest {
        text: text.to_string(),
        kind,
        direction,
    })
}

pub fn build_prompt(request: &TranslationRequest) -> String {
    let text = &request.text;
    match (request.kind, request.direction) {
        (InputKind::SingleWord, Direction::EnglishToPersian) => format!(
            "You are a helpful translator and linguistic analyzer. Translate the following English word to Persian.\n\
             Also, identify the word's part of speech (e.g., verb, noun, adjective).\n\
             Provide the word's pronunciation using the International Phonetic Alphabet (IPA), enclosed in slashes. \
             Do NOT include any Persian transliterations, parentheses, or alternative Persian translations. \
             Give ONLY ONE Persian translation.\n\
             Provide a short example sentence in both English and Persian using the word. \
             Do NOT include any Persian transliterations in the example sentences.\n\
             \n\
             Word: {text}\n\
             \n\
             Output in the following format (do NOT include any introductory text, ONLY the requested information):\n\
             \n\
             Translation: [Persian Translation]\n\
             Part of Speech: [Part of Speech]\n\
             IPA Pronunciation: [IPA Pronunciation]\n\
             Example (EN): [English Example]\n\
             Example (FA): [Persian Example]\n"
        ),
        (InputKind::SingleWord, Direction::PersianToEnglish) => format!(
            "You are a helpful translator and linguistic analyzer. Translate the following Persian word to English.\n\
             Also, identify the word's part of speech (e.g., verb, noun, adjective).\n\
             Provide a short example sentence in both Persian and English using the word. \
             Do NOT include any transliterations.\n\
             \n\
             Word: {text}\n\
             \n\
             Output in the following format (do NOT include any introductory text, ONLY the requested information):\n\
             \n\
             Translation: [English Translation]\n\
             Part of Speech: [Part of Speech]\n\
             Example (FA): [Persian Example]\n\
             Example (EN): [English Example]\n"
        ),
        (InputKind::Text, Direction::EnglishToPersian) => format!(
            "Translate the following text to Persian. Only provide the Persian translation, \
             do not include any of the original English text or any explanations.\n\
             \n\
             Text:\n\
             {text}\n"
        ),
        (InputKind::Text, Direction::PersianToEnglish) => format!(
            "Translate the following text to English. Only provide the English translation, \
             do not include any of the original Persian text or explanations.\n\
             \n\
             Text:\n\
             {text}\n"
        ),
    }
}
