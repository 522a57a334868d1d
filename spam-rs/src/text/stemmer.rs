//! Word stemmers
//!
//! The reference stemmer is the Porter algorithm with the NLTK extensions
//! (the variant produced by `nltk.stem.porter.PorterStemmer()`), since the
//! bundled model artifacts were trained on its output. A Snowball English
//! stemmer is available for artifacts trained with that algorithm instead.

use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};

/// A deterministic word stemmer
pub trait Stem: Send + Sync {
    /// Reduce an already lowercased word to its stem
    fn stem(&self, word: &str) -> String;
}

/// Which stemming algorithm a normalizer uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemmerKind {
    /// Porter with NLTK extensions
    #[default]
    Porter,
    /// Snowball English (Porter2)
    Snowball,
}

impl StemmerKind {
    pub fn build(self) -> Box<dyn Stem> {
        match self {
            StemmerKind::Porter => Box::new(PorterStemmer::new()),
            StemmerKind::Snowball => Box::new(SnowballStemmer::new()),
        }
    }
}

/// Snowball English stemmer backed by `rust-stemmers`
pub struct SnowballStemmer {
    stemmer: Stemmer,
}

impl SnowballStemmer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl Default for SnowballStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stem for SnowballStemmer {
    fn stem(&self, word: &str) -> String {
        self.stemmer.stem(word).into_owned()
    }
}

/// Words whose stems are fixed rather than computed
const IRREGULAR_FORMS: &[(&str, &str)] = &[
    ("sky", "sky"),
    ("skies", "sky"),
    ("dying", "die"),
    ("lying", "lie"),
    ("tying", "tie"),
    ("news", "news"),
    ("innings", "inning"),
    ("inning", "inning"),
    ("outings", "outing"),
    ("outing", "outing"),
    ("cannings", "canning"),
    ("canning", "canning"),
    ("howe", "howe"),
    ("proceed", "proceed"),
    ("exceed", "exceed"),
    ("succeed", "succeed"),
];

type Condition<'a> = Option<&'a dyn Fn(&[char]) -> bool>;

/// Porter stemmer, NLTK extension mode
#[derive(Debug, Default, Clone, Copy)]
pub struct PorterStemmer;

impl PorterStemmer {
    pub fn new() -> Self {
        Self
    }

    fn step1a(&self, word: &[char]) -> Vec<char> {
        // 'flies' -> 'fli' but 'dies' -> 'die'
        if word.len() == 4 && ends_with(word, "ies") {
            return replace_suffix(word, "ies", "ie");
        }

        apply_rules(
            word,
            &[
                ("sses", "ss", None),
                ("ies", "i", None),
                ("ss", "ss", None),
                ("s", "", None),
            ],
        )
    }

    fn step1b(&self, word: &[char]) -> Vec<char> {
        // 'spied' -> 'spi' but 'died' -> 'die'
        if ends_with(word, "ied") {
            return if word.len() == 4 {
                replace_suffix(word, "ied", "ie")
            } else {
                replace_suffix(word, "ied", "i")
            };
        }

        if ends_with(word, "eed") {
            let stem = strip_suffix(word, "eed");
            return if measure(stem) > 0 {
                join(stem, "ee")
            } else {
                word.to_vec()
            };
        }

        let stem = ["ed", "ing"]
            .iter()
            .filter(|suffix| ends_with(word, suffix))
            .map(|suffix| strip_suffix(word, suffix))
            .find(|stem| contains_vowel(stem));

        let Some(stem) = stem else {
            return word.to_vec();
        };

        for (suffix, replacement) in [("at", "ate"), ("bl", "ble"), ("iz", "ize")] {
            if ends_with(stem, suffix) {
                return replace_suffix(stem, suffix, replacement);
            }
        }

        if ends_double_consonant(stem) {
            let last = stem[stem.len() - 1];
            return if matches!(last, 'l' | 's' | 'z') {
                stem.to_vec()
            } else {
                stem[..stem.len() - 1].to_vec()
            };
        }

        if measure(stem) == 1 && ends_cvc(stem) {
            join(stem, "e")
        } else {
            stem.to_vec()
        }
    }

    fn step1c(&self, word: &[char]) -> Vec<char> {
        // y -> i only after a consonant that is not the whole stem:
        // 'happy' -> 'happi', 'enjoy' -> 'enjoy', 'by' untouched
        let condition: &dyn Fn(&[char]) -> bool =
            &|stem| stem.len() > 1 && is_consonant(stem, stem.len() - 1);
        apply_rules(word, &[("y", "i", Some(condition))])
    }

    fn step2(&self, word: &[char]) -> Vec<char> {
        if ends_with(word, "alli") && measure(strip_suffix(word, "alli")) > 0 {
            return self.step2(&replace_suffix(word, "alli", "al"));
        }

        let positive: &dyn Fn(&[char]) -> bool = &|stem| measure(stem) > 0;
        // the 'l' of 'logi' stays with the stem so 'geo', 'theo' work like 'philo'
        let logi: &dyn Fn(&[char]) -> bool = &|stem| measure(&word[..stem.len() + 1]) > 0;

        apply_rules(
            word,
            &[
                ("ational", "ate", Some(positive)),
                ("tional", "tion", Some(positive)),
                ("enci", "ence", Some(positive)),
                ("anci", "ance", Some(positive)),
                ("izer", "ize", Some(positive)),
                ("bli", "ble", Some(positive)),
                ("alli", "al", Some(positive)),
                ("entli", "ent", Some(positive)),
                ("eli", "e", Some(positive)),
                ("ousli", "ous", Some(positive)),
                ("ization", "ize", Some(positive)),
                ("ation", "ate", Some(positive)),
                ("ator", "ate", Some(positive)),
                ("alism", "al", Some(positive)),
                ("iveness", "ive", Some(positive)),
                ("fulness", "ful", Some(positive)),
                ("ousness", "ous", Some(positive)),
                ("aliti", "al", Some(positive)),
                ("iviti", "ive", Some(positive)),
                ("biliti", "ble", Some(positive)),
                ("fulli", "ful", Some(positive)),
                ("logi", "log", Some(logi)),
            ],
        )
    }

    fn step3(&self, word: &[char]) -> Vec<char> {
        let positive: &dyn Fn(&[char]) -> bool = &|stem| measure(stem) > 0;
        apply_rules(
            word,
            &[
                ("icate", "ic", Some(positive)),
                ("ative", "", Some(positive)),
                ("alize", "al", Some(positive)),
                ("iciti", "ic", Some(positive)),
                ("ical", "ic", Some(positive)),
                ("ful", "", Some(positive)),
                ("ness", "", Some(positive)),
            ],
        )
    }

    fn step4(&self, word: &[char]) -> Vec<char> {
        let gt1: &dyn Fn(&[char]) -> bool = &|stem| measure(stem) > 1;
        let ion: &dyn Fn(&[char]) -> bool =
            &|stem| measure(stem) > 1 && matches!(stem.last(), Some(&'s') | Some(&'t'));
        apply_rules(
            word,
            &[
                ("al", "", Some(gt1)),
                ("ance", "", Some(gt1)),
                ("ence", "", Some(gt1)),
                ("er", "", Some(gt1)),
                ("ic", "", Some(gt1)),
                ("able", "", Some(gt1)),
                ("ible", "", Some(gt1)),
                ("ant", "", Some(gt1)),
                ("ement", "", Some(gt1)),
                ("ment", "", Some(gt1)),
                ("ent", "", Some(gt1)),
                ("ion", "", Some(ion)),
                ("ou", "", Some(gt1)),
                ("ism", "", Some(gt1)),
                ("ate", "", Some(gt1)),
                ("iti", "", Some(gt1)),
                ("ous", "", Some(gt1)),
                ("ive", "", Some(gt1)),
                ("ize", "", Some(gt1)),
            ],
        )
    }

    fn step5a(&self, word: &[char]) -> Vec<char> {
        if ends_with(word, "e") {
            let stem = strip_suffix(word, "e");
            let m = measure(stem);
            if m > 1 || (m == 1 && !ends_cvc(stem)) {
                return stem.to_vec();
            }
        }
        word.to_vec()
    }

    fn step5b(&self, word: &[char]) -> Vec<char> {
        let condition: &dyn Fn(&[char]) -> bool = &|_| measure(&word[..word.len() - 1]) > 1;
        apply_rules(word, &[("ll", "l", Some(condition))])
    }
}

impl Stem for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        let word = word.to_lowercase();

        if let Some((_, stem)) = IRREGULAR_FORMS.iter().find(|(form, _)| *form == word) {
            return stem.to_string();
        }

        let chars: Vec<char> = word.chars().collect();
        if chars.len() <= 2 {
            return word;
        }

        let chars = self.step1a(&chars);
        let chars = self.step1b(&chars);
        let chars = self.step1c(&chars);
        let chars = self.step2(&chars);
        let chars = self.step3(&chars);
        let chars = self.step4(&chars);
        let chars = self.step5a(&chars);
        let chars = self.step5b(&chars);

        chars.into_iter().collect()
    }
}

/// First rule whose suffix matches decides the outcome, even if its
/// condition fails.
fn apply_rules(word: &[char], rules: &[(&str, &str, Condition<'_>)]) -> Vec<char> {
    for &(suffix, replacement, condition) in rules {
        if ends_with(word, suffix) {
            let stem = strip_suffix(word, suffix);
            return match condition {
                Some(condition) if !condition(stem) => word.to_vec(),
                _ => join(stem, replacement),
            };
        }
    }
    word.to_vec()
}

/// Consonant flag per letter; `y` is a consonant at the start or after a vowel
fn consonants(word: &[char]) -> Vec<bool> {
    let mut flags: Vec<bool> = Vec::with_capacity(word.len());
    for (i, c) in word.iter().enumerate() {
        let consonant = match c {
            'a' | 'e' | 'i' | 'o' | 'u' => false,
            'y' => i == 0 || !flags[i - 1],
            _ => true,
        };
        flags.push(consonant);
    }
    flags
}

fn is_consonant(word: &[char], i: usize) -> bool {
    consonants(&word[..=i])[i]
}

/// Number of vowel-consonant sequences, the `m` in `[C](VC)^m[V]`
fn measure(stem: &[char]) -> usize {
    let mut m = 0;
    let mut previous_vowel = false;
    for consonant in consonants(stem) {
        if consonant && previous_vowel {
            m += 1;
        }
        previous_vowel = !consonant;
    }
    m
}

fn contains_vowel(stem: &[char]) -> bool {
    consonants(stem).iter().any(|consonant| !consonant)
}

fn ends_double_consonant(word: &[char]) -> bool {
    let n = word.len();
    n >= 2 && word[n - 1] == word[n - 2] && is_consonant(word, n - 1)
}

/// `*o`: consonant-vowel-consonant where the last is not w, x or y; two-letter
/// vowel-consonant words also count
fn ends_cvc(word: &[char]) -> bool {
    let flags = consonants(word);
    let n = word.len();
    (n >= 3
        && flags[n - 3]
        && !flags[n - 2]
        && flags[n - 1]
        && !matches!(word[n - 1], 'w' | 'x' | 'y'))
        || (n == 2 && !flags[0] && flags[1])
}

fn ends_with(word: &[char], suffix: &str) -> bool {
    let len = suffix.chars().count();
    word.len() >= len && word[word.len() - len..].iter().copied().eq(suffix.chars())
}

fn strip_suffix<'a>(word: &'a [char], suffix: &str) -> &'a [char] {
    &word[..word.len() - suffix.chars().count()]
}

fn replace_suffix(word: &[char], suffix: &str, replacement: &str) -> Vec<char> {
    join(strip_suffix(word, suffix), replacement)
}

fn join(stem: &[char], suffix: &str) -> Vec<char> {
    stem.iter().copied().chain(suffix.chars()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn porter(word: &str) -> String {
        PorterStemmer::new().stem(word)
    }

    #[test]
    fn test_step1_plurals_and_participles() {
        let cases = [
            ("caresses", "caress"),
            ("ponies", "poni"),
            ("ties", "tie"),
            ("caress", "caress"),
            ("cats", "cat"),
            ("feed", "feed"),
            ("agreed", "agre"),
            ("plastered", "plaster"),
            ("bled", "bled"),
            ("motoring", "motor"),
            ("sing", "sing"),
            ("conflated", "conflat"),
            ("troubled", "troubl"),
            ("sized", "size"),
            ("hopping", "hop"),
            ("tanned", "tan"),
            ("falling", "fall"),
            ("hissing", "hiss"),
            ("fizzed", "fizz"),
            ("failing", "fail"),
            ("filing", "file"),
            ("happy", "happi"),
        ];
        for (word, expected) in cases {
            assert_eq!(porter(word), expected, "stem of {word}");
        }
    }

    #[test]
    fn test_steps_2_to_5() {
        let cases = [
            ("relational", "relat"),
            ("conditional", "condit"),
            ("rational", "ration"),
            ("valenci", "valenc"),
            ("hesitanci", "hesit"),
            ("digitizer", "digit"),
            ("conformabli", "conform"),
            ("radicalli", "radic"),
            ("differentli", "differ"),
            ("vileli", "vile"),
            ("analogousli", "analog"),
            ("vietnamization", "vietnam"),
            ("predication", "predic"),
            ("operator", "oper"),
            ("feudalism", "feudal"),
            ("decisiveness", "decis"),
            ("hopefulness", "hope"),
            ("callousness", "callous"),
            ("formaliti", "formal"),
            ("sensitiviti", "sensit"),
            ("sensibiliti", "sensibl"),
            ("triplicate", "triplic"),
            ("formative", "form"),
            ("formalize", "formal"),
            ("electriciti", "electr"),
            ("electrical", "electr"),
            ("hopeful", "hope"),
            ("goodness", "good"),
            ("revival", "reviv"),
            ("allowance", "allow"),
            ("inference", "infer"),
            ("airliner", "airlin"),
            ("gyroscopic", "gyroscop"),
            ("adjustable", "adjust"),
            ("defensible", "defens"),
            ("irritant", "irrit"),
            ("replacement", "replac"),
            ("adjustment", "adjust"),
            ("dependent", "depend"),
            ("adoption", "adopt"),
            ("homologous", "homolog"),
            ("communism", "commun"),
            ("activate", "activ"),
            ("effective", "effect"),
            ("bowdlerize", "bowdler"),
            ("probate", "probat"),
            ("rate", "rate"),
            ("cease", "ceas"),
            ("controll", "control"),
            ("roll", "roll"),
        ];
        for (word, expected) in cases {
            assert_eq!(porter(word), expected, "stem of {word}");
        }
    }

    #[test]
    fn test_nltk_extensions() {
        assert_eq!(porter("dying"), "die");
        assert_eq!(porter("lying"), "lie");
        assert_eq!(porter("skies"), "sky");
        assert_eq!(porter("news"), "news");
        assert_eq!(porter("died"), "die");
        assert_eq!(porter("spied"), "spi");
        assert_eq!(porter("flies"), "fli");
        assert_eq!(porter("enjoy"), "enjoy");
        assert_eq!(porter("generously"), "gener");
    }

    #[test]
    fn test_message_vocabulary() {
        let cases = [
            ("running", "run"),
            ("studies", "studi"),
            ("entry", "entri"),
            ("meeting", "meet"),
            ("winner", "winner"),
            ("prize", "prize"),
            ("free", "free"),
            ("claim", "claim"),
            ("still", "still"),
            ("hey", "hey"),
            ("tomorrow", "tomorrow"),
            ("congratulations", "congratul"),
        ];
        for (word, expected) in cases {
            assert_eq!(porter(word), expected, "stem of {word}");
        }
    }

    #[test]
    fn test_long_y_run_on_small_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(|| porter(&"y".repeat(200_000)))
            .unwrap();
        let stem = handle.join().unwrap();
        assert_eq!(stem.len(), 200_000);
        assert!(stem.ends_with("yyi"));
    }

    #[test]
    fn test_y_consonant_flags() {
        let word: Vec<char> = "yyay".chars().collect();
        assert_eq!(consonants(&word), vec![true, false, false, true]);
        assert_eq!(porter("syzygy"), "syzygi");
    }

    #[test]
    fn test_short_words_untouched() {
        assert_eq!(porter("as"), "as");
        assert_eq!(porter("is"), "is");
        assert_eq!(porter("a"), "a");
        assert_eq!(porter("4u"), "4u");
    }

    #[test]
    fn test_digits_and_non_ascii() {
        assert_eq!(porter("2000"), "2000");
        assert_eq!(porter("150p"), "150p");
        assert_eq!(porter("cafés"), "café");
    }

    #[test]
    fn test_snowball_differs_from_porter() {
        let snowball = SnowballStemmer::new();
        assert_eq!(snowball.stem("running"), "run");
        assert_eq!(snowball.stem("fairly"), "fair");
        assert_eq!(porter("fairly"), "fairli");
    }

    #[test]
    fn test_stemmer_kind_build() {
        assert_eq!(StemmerKind::Porter.build().stem("studies"), "studi");
        assert_eq!(StemmerKind::default(), StemmerKind::Porter);
    }
}
