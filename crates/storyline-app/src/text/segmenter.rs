use std::collections::HashSet;
use std::sync::LazyLock;

use thiserror::Error;

static ABBREVIATIONS: &[&str] = &[
    "mr.", "mrs.", "ms.", "messrs.", "dr.", "prof.", "sr.", "jr.", "st.", "mt.", "ft.", "gen.",
    "col.", "lt.", "maj.", "capt.", "sgt.", "adm.", "cmdr.", "gov.", "sen.", "rep.", "rev.",
    "hon.", "pres.", "supt.", "inc.", "ltd.", "corp.", "bros.", "dept.", "univ.", "assn.", "ave.",
    "blvd.", "rd.", "vs.", "e.g.", "i.e.", "cf.", "viz.", "approx.", "ca.", "fl.", "a.m.", "p.m.",
    "u.s.", "u.k.", "u.n.", "d.c.", "a.d.", "b.c.", "jan.", "feb.", "apr.", "jun.", "jul.",
    "aug.", "sep.", "sept.", "oct.", "nov.", "dec.", "fig.", "figs.", "vol.", "vols.", "eds.",
    "pp.", "op.", "cit.", "ibid.",
];

/// Abbreviations that double as words or names. They only hold a sentence
/// open when a number follows, as in `c. 1500` or `Mar. 5`.
static NUMERIC_CONTEXT_ABBREVIATIONS: &[&str] = &["c", "co", "ed", "est", "mar", "no"];

/// Single letters that are Roman numerals as often as initials.
const NUMERAL_LETTERS: &[char] = &['I', 'V', 'X'];

/// Characters that may open the next sentence right after a terminator.
const OPENING_PUNCTUATION: &[char] = &['"', '\u{201c}', '\'', '\u{2018}', '(', '['];

/// Characters absorbed into a sentence right after its terminator.
const CLOSING_PUNCTUATION: &[char] = &['\'', '\u{2019}', '"', '\u{201d}', ')', ']'];

const MAX_CITATION_LEN: usize = 6;

static PAIRED_DELIMITERS: &[(char, char)] = &[
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('<', '>'),
    ('"', '"'),
    ('\u{201c}', '\u{201d}'),
];

const MAX_DELIMITER_SEARCH: usize = 1000;

static DEFAULT_SEGMENTER: LazyLock<EnglishSentenceSegmenter> =
    LazyLock::new(EnglishSentenceSegmenter::default);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SegmenterError {
    #[error("invalid abbreviation `{0}`: expected a non-empty token without whitespace")]
    InvalidAbbreviation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmenterOptions {
    /// Abbreviations added on top of the built-in English table, e.g. `"approx."`.
    pub extra_abbreviations: Vec<String>,
}

/// Rule-based English sentence splitter aware of abbreviations, initials,
/// decimal numbers and bracketed asides.
#[derive(Debug, Clone)]
pub struct EnglishSentenceSegmenter {
    abbreviations: HashSet<String>,
}

impl Default for EnglishSentenceSegmenter {
    fn default() -> Self {
        Self {
            abbreviations: ABBREVIATIONS.iter().map(|abbr| normalize_abbreviation(abbr)).collect(),
        }
    }
}

impl EnglishSentenceSegmenter {
    pub fn new(options: &SegmenterOptions) -> Result<Self, SegmenterError> {
        let mut segmenter = Self::default();
        for extra in &options.extra_abbreviations {
            let normalized = normalize_abbreviation(extra);
            if normalized.is_empty() || extra.chars().any(char::is_whitespace) {
                return Err(SegmenterError::InvalidAbbreviation(extra.clone()));
            }
            segmenter.abbreviations.insert(normalized);
        }
        Ok(segmenter)
    }

    /// Lazily yields trimmed sentences borrowed from `text`. Call again (or
    /// clone the iterator) to restart.
    pub fn sentences<'s, 'a>(&'s self, text: &'a str) -> Sentences<'s, 'a> {
        Sentences {
            abbreviations: &self.abbreviations,
            input: text,
            position: 0,
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.sentences(text).map(str::to_string).collect()
    }

    pub fn abbreviation_count(&self) -> usize {
        self.abbreviations.len()
    }
}

pub trait EnglishSentenceSplit {
    fn split_english_sentences(&self) -> Vec<String>;
}

impl<T: AsRef<str>> EnglishSentenceSplit for T {
    fn split_english_sentences(&self) -> Vec<String> {
        DEFAULT_SEGMENTER.split(self.as_ref())
    }
}

fn normalize_abbreviation(abbr: &str) -> String {
    abbr.trim().trim_matches('.').to_lowercase()
}

fn is_initial(fragment: &str) -> bool {
    let trimmed = fragment.trim_start_matches(OPENING_PUNCTUATION);
    let mut chars = trimmed.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(c), Some('.'), None) if c.is_uppercase()
    )
}

fn abbreviation_key(word: &str) -> String {
    word.trim_matches(|c: char| {
        matches!(c, '.' | ',' | ';' | ':' | '"' | '\'' | '(' | '[' | '\u{2018}' | '\u{201c}')
    })
    .to_lowercase()
}

/// Length of a `[n]` style reference marker at the start of `text`.
fn citation_len(text: &str) -> Option<usize> {
    let inner = text.strip_prefix('[')?;
    let label_len = inner
        .find(|c: char| !c.is_ascii_alphanumeric())
        .filter(|len| (1..=MAX_CITATION_LEN).contains(len))?;
    inner[label_len..].starts_with(']').then_some(label_len + 2)
}

fn is_list_enumerator(sentence: &str) -> bool {
    let digits = sentence.trim().trim_end_matches('.');
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn group_ends_with_terminator(group: &str) -> bool {
    let mut chars = group.chars();
    chars.next_back();
    chars
        .as_str()
        .trim_end()
        .ends_with(['.', '!', '?'])
}

#[derive(Debug, Clone)]
pub struct Sentences<'s, 'a> {
    abbreviations: &'s HashSet<String>,
    input: &'a str,
    position: usize,
}

impl<'s, 'a> Sentences<'s, 'a> {
    fn is_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn is_abbreviation_like(&self, word: &str) -> bool {
        let key = abbreviation_key(word);
        key.is_empty() || self.abbreviations.contains(&key)
    }

    fn next_word(&self) -> Option<&'a str> {
        self.remaining().split_whitespace().next()
    }

    fn tail_is_abbreviation(&self, sentence: &str) -> bool {
        let mut words = sentence.split_whitespace().rev();
        let Some(last) = words.next() else {
            return false;
        };
        let previous = words.next();

        if is_initial(last) {
            return !self.closes_with_numeral(last, previous);
        }
        if self.is_abbreviation_like(last) {
            return true;
        }

        let key = abbreviation_key(last);
        if key == "al" {
            return previous.is_some_and(|word| abbreviation_key(word) == "et");
        }
        NUMERIC_CONTEXT_ABBREVIATIONS.contains(&key.as_str())
            && self
                .remaining()
                .trim_start()
                .starts_with(|c: char| c.is_ascii_digit())
    }

    /// `World War I.` ends a sentence; `J. R. R. Tolkien` does not. A numeral
    /// letter is read as an initial only next to other initials or at the
    /// start of a sentence.
    fn closes_with_numeral(&self, last: &str, previous: Option<&str>) -> bool {
        let letter = last.trim_start_matches(OPENING_PUNCTUATION).chars().next();
        if !letter.is_some_and(|c| NUMERAL_LETTERS.contains(&c)) {
            return false;
        }
        let Some(previous) = previous else {
            return false;
        };
        !is_initial(previous) && !self.next_word().is_some_and(is_initial)
    }

    /// Pulls closing quotes, brackets and citation markers such as `[12]`
    /// that directly follow a terminator into the current sentence.
    fn consume_sentence_tail(&mut self) {
        loop {
            let remaining = self.remaining();
            if let Some(ch) = remaining.chars().next()
                && CLOSING_PUNCTUATION.contains(&ch)
            {
                self.position += ch.len_utf8();
                continue;
            }
            if let Some(len) = citation_len(remaining) {
                self.position += len;
                continue;
            }
            break;
        }
    }

    fn at_boundary(&self) -> bool {
        match self.remaining().chars().find(|c| !c.is_whitespace()) {
            None => true,
            Some(next) => {
                next.is_uppercase() || next.is_ascii_digit() || OPENING_PUNCTUATION.contains(&next)
            }
        }
    }

    /// Consumes an integer or decimal number so its dots are never read as
    /// terminators. A trailing dot is left in place.
    fn maybe_consume_digits(&mut self) -> bool {
        let remaining = self.remaining();
        if !remaining.starts_with(|c: char| c.is_ascii_digit()) {
            return false;
        }

        let mut end = 0;
        let mut last_was_dot = false;
        for ch in remaining.chars() {
            match ch {
                '0'..='9' => last_was_dot = false,
                '.' if !last_was_dot => last_was_dot = true,
                _ => break,
            }
            end += ch.len_utf8();
        }
        if last_was_dot {
            end -= 1;
        }
        self.position += end;
        true
    }

    fn maybe_consume_delimited(&mut self) -> Option<&'a str> {
        let remaining = self.remaining();
        let first = remaining.chars().next()?;
        let &(open, close) = PAIRED_DELIMITERS.iter().find(|(open, _)| *open == first)?;

        let mut depth = 0_usize;
        let mut end = 0;
        for ch in remaining.chars() {
            let is_opener = end == 0;
            end += ch.len_utf8();

            let closes = if open == close {
                !is_opener && ch == close
            } else if ch == open {
                depth += 1;
                false
            } else if ch == close {
                depth -= 1;
                depth == 0
            } else {
                false
            };

            if closes {
                self.position += end;
                return Some(&remaining[..end]);
            }
            if end > MAX_DELIMITER_SEARCH {
                break;
            }
        }
        None
    }

    fn parse_sentence(&mut self) -> Option<&'a str> {
        while !self.is_end() {
            let start = self.position;

            while !self.is_end() {
                if self.maybe_consume_digits() {
                    continue;
                }

                if let Some(group) = self.maybe_consume_delimited() {
                    if group_ends_with_terminator(group) && self.at_boundary() {
                        break;
                    }
                    continue;
                }

                let Some(ch) = self.remaining().chars().next() else {
                    break;
                };
                self.position += ch.len_utf8();

                if !matches!(ch, '.' | '!' | '?') {
                    continue;
                }

                let sentence = &self.input[start..self.position];
                if ch == '.' && (self.tail_is_abbreviation(sentence) || is_list_enumerator(sentence))
                {
                    continue;
                }
                self.consume_sentence_tail();
                if self.at_boundary() {
                    break;
                }
            }

            let sentence = self.input[start..self.position].trim();
            if !sentence.is_empty() {
                return Some(sentence);
            }
        }
        None
    }
}

impl<'s, 'a> Iterator for Sentences<'s, 'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.parse_sentence()
    }
}
