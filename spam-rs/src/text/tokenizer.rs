//! English word tokenization
//!
//! Reproduces NLTK's `word_tokenize`: the text is first split into sentences
//! (Punkt-style boundary detection with a bundled abbreviation list), then
//! each sentence goes through the Treebank word tokenizer rules. The rules run
//! in a fixed order and each one sees the output of the previous one, so the
//! order below must not change.

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Abbreviations after which a period does not end a sentence
const ABBREVIATIONS: &[&str] = &[
    "a.m", "p.m", "e.g", "i.e", "etc", "vs", "mr", "mrs", "ms", "dr", "prof", "st", "jr", "sr",
    "co", "corp", "inc", "ltd", "bros", "gov", "gen", "sen", "rep", "rev", "lt", "col", "sgt",
    "capt", "mt", "ft", "jan", "feb", "aug", "sept", "oct", "nov", "dec", "u.s", "u.k", "u.n",
    "u.s.a", "n.y", "d.c", "calif", "fla", "ariz", "conn", "tenn", "okla",
];

/// Split text into words and punctuation, NLTK `word_tokenize` style
pub fn word_tokenize(text: &str) -> Vec<String> {
    let rules = TreebankRules::get();
    split_sentences(text)
        .into_iter()
        .flat_map(|sentence| rules.tokenize(sentence))
        .collect()
}

/// Split text into sentences.
///
/// A candidate boundary is the last `.`, `?` or `!` of a whitespace-delimited
/// chunk that is followed either by closing punctuation or by whitespace and
/// another chunk. `?` and `!` always end a sentence; a period does unless the
/// word it closes is a known abbreviation, an ellipsis, or an initial or
/// number followed by a lowercase word.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut last_break = 0;

    for (chunk_start, chunk_end) in chunks(text) {
        let Some(candidate) = find_candidate(text, chunk_start, chunk_end) else {
            continue;
        };

        if !is_sentence_break(&text[chunk_start..candidate.end], candidate.next_token) {
            continue;
        }

        spans.push((last_break, candidate.end));
        last_break = candidate.next_start;
    }
    spans.push((last_break, text.len()));

    realign_boundaries(text, spans)
        .into_iter()
        .map(|(start, end)| &text[start..end])
        .collect()
}

struct Candidate<'a> {
    /// Byte offset just past the sentence-ending character
    end: usize,
    /// Where the next sentence starts
    next_start: usize,
    /// What follows the boundary: a closing punctuation char or the next chunk
    next_token: &'a str,
}

/// Byte ranges of maximal non-whitespace runs
fn chunks(text: &str) -> Vec<(usize, usize)> {
    let mut chunks = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                chunks.push((s, i));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        chunks.push((s, text.len()));
    }
    chunks
}

fn find_candidate(text: &str, chunk_start: usize, chunk_end: usize) -> Option<Candidate<'_>> {
    let chunk = &text[chunk_start..chunk_end];
    chunk
        .char_indices()
        .rev()
        .filter(|&(_, c)| matches!(c, '.' | '?' | '!'))
        .find_map(|(offset, c)| {
            let end = chunk_start + offset + c.len_utf8();
            if end < chunk_end {
                let next = text[end..].chars().next()?;
                is_non_word(next).then(|| Candidate {
                    end,
                    next_start: end,
                    next_token: &text[end..end + next.len_utf8()],
                })
            } else {
                let rest = &text[end..];
                let next_start = end + rest.find(|c: char| !c.is_whitespace())?;
                let next_end = text[next_start..]
                    .find(char::is_whitespace)
                    .map_or(text.len(), |i| next_start + i);
                Some(Candidate {
                    end,
                    next_start,
                    next_token: &text[next_start..next_end],
                })
            }
        })
}

/// Punctuation that ends a word token
fn is_non_word(c: char) -> bool {
    matches!(
        c,
        ')' | '"' | ';' | '}' | ']' | '*' | ':' | '@' | '\'' | '(' | '{' | '[' | '!' | '?'
    )
}

/// Punctuation that cannot start a word token
fn is_word_start_excluded(c: char) -> bool {
    matches!(
        c,
        '(' | '"' | '`' | '{' | '[' | ':' | ';' | '&' | '#' | '*' | '@' | ')' | '}' | ']' | '-' | ','
    )
}

fn is_sentence_break(context: &str, next_token: &str) -> bool {
    if !context.ends_with('.') {
        return true;
    }

    // word token that owns the final period
    let body = &context[..context.len() - 1];
    let word_start = body
        .char_indices()
        .filter(|&(_, c)| is_non_word(c))
        .last()
        .map_or(0, |(i, c)| i + c.len_utf8());
    let word = body[word_start..].trim_start_matches(is_word_start_excluded);

    if word.ends_with('.') {
        // ellipsis
        return false;
    }
    if word.is_empty() {
        return true;
    }

    let lower = word.to_lowercase();
    let last_part = lower.rsplit('-').next().unwrap_or(&lower);
    if ABBREVIATIONS.contains(&lower.as_str()) || ABBREVIATIONS.contains(&last_part) {
        return false;
    }

    let next_is_lower = next_token.chars().next().is_some_and(char::is_lowercase);
    if (is_initial(word) || is_number(word)) && next_is_lower {
        return false;
    }

    true
}

fn is_initial(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(c), None) if (c.is_alphabetic() || c == '_')
    )
}

fn is_number(word: &str) -> bool {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER
        .get_or_init(|| Regex::new(r"^-?[.,]?\d[\d,.\-]*$").expect("valid number pattern"))
        .is_match(word)
}

/// Move closing quotes and brackets that open a sentence back onto the
/// previous one, dropping empty sentences
fn realign_boundaries(text: &str, spans: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    let mut realigned = Vec::with_capacity(spans.len());
    let mut shift = 0;

    for (i, &(start, end)) in spans.iter().enumerate() {
        let start = (start + shift).min(end);
        shift = 0;

        let mut end = end;
        if let Some(&(next_start, next_end)) = spans.get(i + 1) {
            let next = &text[next_start..next_end];
            let closers = next
                .find(|c: char| !matches!(c, '"' | '\'' | ')' | ']' | '}'))
                .unwrap_or(next.len());
            let rest = &next[closers..];
            let aligned = closers > 0
                && (rest.is_empty()
                    || rest.starts_with(char::is_whitespace)
                    || rest.starts_with("--"));
            if aligned {
                end = next_start + closers;
                shift = closers + (rest.len() - rest.trim_start().len());
            }
        }

        if start < end {
            realigned.push((start, end));
        }
    }

    realigned
}

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    fn new(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("valid tokenizer pattern"),
            replacement,
        }
    }

    fn apply(&self, text: String) -> String {
        self.pattern
            .replace_all(&text, self.replacement)
            .into_owned()
    }
}

/// Treebank word tokenizer rules, compiled once per process
struct TreebankRules {
    starting_quotes: Vec<Rule>,
    quoted_letter: Regex,
    punctuation: Vec<Rule>,
    brackets: Rule,
    double_dashes: Rule,
    ending_quotes: Vec<Rule>,
    contractions: Vec<Rule>,
}

impl TreebankRules {
    fn get() -> &'static TreebankRules {
        static RULES: OnceLock<TreebankRules> = OnceLock::new();
        RULES.get_or_init(TreebankRules::new)
    }

    fn new() -> Self {
        Self {
            starting_quotes: vec![
                Rule::new(r"([«“‘„]|`+)", " ${1} "),
                Rule::new(r#"^""#, "``"),
                Rule::new(r"(``)", " ${1} "),
                Rule::new(r#"([ (\[{<])("|'')"#, "${1} `` "),
            ],
            quoted_letter: Regex::new(r"(')(\w)\b").expect("valid tokenizer pattern"),
            punctuation: vec![
                Rule::new(r#"([^.])(\.)([\]\)}>"']*)\s*$"#, "${1} ${2} ${3} "),
                Rule::new(r"([:,])([^\d])", " ${1} ${2}"),
                Rule::new(r"([:,])$", " ${1} "),
                Rule::new(r"\.{2,}", " ${0} "),
                Rule::new(r"[;@#$%&]", " ${0} "),
                Rule::new(r#"([^.])(\.)([\]\)}>"']*)\s*$"#, "${1} ${2}${3} "),
                Rule::new(r"[?!]", " ${0} "),
                Rule::new(r"([^'])' ", "${1} ' "),
                Rule::new(r"\*", " ${0} "),
            ],
            brackets: Rule::new(r"[\]\[\(\)\{\}<>]", " ${0} "),
            double_dashes: Rule::new(r"--", " -- "),
            ending_quotes: vec![
                Rule::new(r"([»”’])", " ${1} "),
                Rule::new(r"''", " '' "),
                Rule::new(r#"""#, " '' "),
                Rule::new(r"([^' ])('[sS]|'[mM]|'[dD]|') ", "${1} ${2} "),
                Rule::new(r"([^' ])('ll|'LL|'re|'RE|'ve|'VE|n't|N'T) ", "${1} ${2} "),
            ],
            contractions: vec![
                Rule::new(r"(?i)\b(can)(not)\b", " ${1} ${2} "),
                Rule::new(r"(?i)\b(d)('ye)\b", " ${1} ${2} "),
                Rule::new(r"(?i)\b(gim)(me)\b", " ${1} ${2} "),
                Rule::new(r"(?i)\b(gon)(na)\b", " ${1} ${2} "),
                Rule::new(r"(?i)\b(got)(ta)\b", " ${1} ${2} "),
                Rule::new(r"(?i)\b(lem)(me)\b", " ${1} ${2} "),
                Rule::new(r"(?i)\b(more)('n)\b", " ${1} ${2} "),
                Rule::new(r"(?i)\b(wan)(na)(\s)", " ${1} ${2} ${3}"),
                Rule::new(r"(?i) ('t)(is)\b", " ${1} ${2} "),
                Rule::new(r"(?i) ('t)(was)\b", " ${1} ${2} "),
            ],
        }
    }

    fn tokenize(&self, sentence: &str) -> Vec<String> {
        let mut text = sentence.to_string();

        for rule in &self.starting_quotes {
            text = rule.apply(text);
        }
        // a quote before a lone letter opens a quotation, except in
        // contractions such as 'm, 's, 't, 'd and rock 'n roll
        text = self
            .quoted_letter
            .replace_all(&text, |caps: &Captures| {
                let letter = &caps[2];
                if matches!(letter.to_lowercase().as_str(), "m" | "t" | "s" | "d" | "n") {
                    caps[0].to_string()
                } else {
                    format!("{} {}", &caps[1], letter)
                }
            })
            .into_owned();

        for rule in &self.punctuation {
            text = rule.apply(text);
        }
        text = self.brackets.apply(text);
        text = self.double_dashes.apply(text);

        let mut text = format!(" {text} ");
        for rule in &self.ending_quotes {
            text = rule.apply(text);
        }
        for rule in &self.contractions {
            text = rule.apply(text);
        }

        text.split_whitespace().map(str::to_string).collect()
    }
}
