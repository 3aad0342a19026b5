//! The text transformer: segmentation, word and character substitution,
//! case preservation, and indefinite-article agreement.
//!
//! A [`NlCrypt`] session is a strictly sequential state machine. Word and
//! letter substitutions draw permuted indices from the keystream engine, so
//! encrypt and decrypt must issue the identical `(label, n)` schedule; the
//! walk order below guarantees that. State (article slot, chaining digest)
//! persists across [`NlCrypt::feed`] calls to support streaming input.

use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::charclass;
use crate::dict::{Dictionary, WordEntry};
use crate::engine::Keystream;
use crate::error::Error;

/// Maximal runs of word-ish characters, including hyphens, apostrophes
/// (ASCII and U+2019) and periods, so `U.S.A.` and `don't` stay whole.
const WORD: &str = r"[-’'.\w]+";
/// Second pass over tokens the dictionary does not know.
const PART: &str = r"\d+|\w+|'\w+";
/// Single letters separated by punctuation (`U.S.A.`): passed through.
const IGNORE: &str = r"^(\w\W)+$";

/// Split `s` into alternating non-word/word runs; `true` marks a match.
fn segments<'t>(re: &Regex, s: &'t str) -> Vec<(bool, &'t str)> {
    let mut out = Vec::new();
    let mut last = 0;
    for m in re.find_iter(s) {
        if last < m.start() {
            out.push((false, &s[last..m.start()]));
        }
        out.push((true, m.as_str()));
        last = m.end();
    }
    if last < s.len() {
        out.push((false, &s[last..]));
    }
    out
}

fn is_voweled(w: &str) -> bool {
    matches!(
        w.chars().next().and_then(|c| c.to_lowercase().next()),
        Some('a' | 'e' | 'i' | 'o' | 'u')
    )
}

/// Copy the capitalization pattern of `w1` onto `w2`.
///
/// First and last characters both uppercase means ALL CAPS; otherwise the
/// uppercase positions of `w1` transfer index by index as far as `w1`
/// reaches, and the rest of `w2` stays as the dictionary stores it.
pub fn adjust_caps(w1: &str, w2: &str) -> String {
    let first_upper = w1.chars().next().is_some_and(char::is_uppercase);
    let last_upper = w1.chars().last().is_some_and(char::is_uppercase);
    if first_upper && last_upper {
        return w2.to_uppercase();
    }
    let caps: Vec<bool> = w1.chars().map(char::is_uppercase).collect();
    let mut out = String::with_capacity(w2.len());
    for (i, c) in w2.chars().enumerate() {
        if i < caps.len() && caps[i] {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// A captured indefinite article waiting for the word it modifies:
/// the original surface and the non-word run accumulated behind it.
struct PendingArticle {
    surface: String,
    trailing: String,
}

/// One encryption or decryption session.
pub struct NlCrypt {
    dict: Dictionary,
    ks: Keystream,
    word_re: Regex,
    part_re: Regex,
    ignore_re: Regex,
    article: Option<PendingArticle>,
    // Member lists of big groups are costly to split; consecutive words
    // often share a group, so one slot is enough.
    group_cache: (String, Vec<String>),
    out: String,
}

impl NlCrypt {
    /// Open the dictionary pair under `basedir` and key a session.
    /// `reverse` selects decryption, `cbc` enables chaining.
    pub fn new(key: &[u8], reverse: bool, cbc: bool, basedir: &Path) -> Result<Self, Error> {
        Ok(Self::with_dictionary(
            Dictionary::open(basedir)?,
            key,
            reverse,
            cbc,
        ))
    }

    pub fn with_dictionary(dict: Dictionary, key: &[u8], reverse: bool, cbc: bool) -> Self {
        NlCrypt {
            dict,
            ks: Keystream::new(key, reverse, cbc),
            word_re: Regex::new(WORD).expect("static pattern"),
            part_re: Regex::new(PART).expect("static pattern"),
            ignore_re: Regex::new(IGNORE).expect("static pattern"),
            article: None,
            group_cache: (String::new(), Vec::new()),
            out: String::new(),
        }
    }

    /// Transform a chunk of text. May be called repeatedly; the article slot
    /// and the chaining state carry over, so feeding a text in chunks equals
    /// feeding it whole.
    pub fn feed(&mut self, s: &str) -> Result<String, Error> {
        self.out.clear();
        for (isword, token) in segments(&self.word_re, s) {
            if !isword {
                self.put_space(token);
                continue;
            }
            if self.capture_article(token) {
                continue;
            }
            if let Some(w1) = self.crypt_word(token, false)? {
                self.put_word(&w1);
                continue;
            }
            // Unknown to the dictionary: re-tokenize and force the parts
            // through, character by character if need be.
            for (ispart, part) in segments(&self.part_re, token) {
                if !ispart {
                    self.put_space(part);
                    continue;
                }
                match self.crypt_word(part, true)? {
                    Some(p1) if !p1.is_empty() => self.put_word(&p1),
                    _ => self.put_word(part),
                }
            }
        }
        Ok(std::mem::take(&mut self.out))
    }

    /// Flush a pending article at true end-of-stream. `feed` never flushes
    /// on its own: the next chunk may open with the word the article
    /// belongs to.
    pub fn finish(&mut self) -> String {
        match self.article.take() {
            Some(article) => {
                let mut out = article.surface;
                out.push_str(&article.trailing);
                out
            }
            None => String::new(),
        }
    }

    /// Substitute one word. Returns `None` when the word is unknown and
    /// `force` is off; with `force` the five-class character fallback always
    /// produces an answer.
    fn crypt_word(&mut self, w0: &str, force: bool) -> Result<Option<String>, Error> {
        let k = w0.to_lowercase().replace('\u{2019}', "'");
        if self.ignore_re.is_match(&k) {
            debug!(word = w0, "ignored");
            return Ok(Some(w0.to_string()));
        }
        if let Some(entry) = self.dict.lookup_word(&k)? {
            if entry.label.is_empty() {
                debug!(word = w0, "ignored");
                return Ok(Some(w0.to_string()));
            }
            return self.substitute(w0, &k, &entry).map(Some);
        }
        if force {
            let w1 = self.crypt_letters(w0);
            debug!(from = w0, to = %w1, "character substitution");
            return Ok(Some(w1));
        }
        Ok(None)
    }

    fn substitute(&mut self, w0: &str, key: &str, entry: &WordEntry) -> Result<String, Error> {
        if self.group_cache.0 != entry.label {
            let members = self.dict.members(&entry.label)?;
            self.group_cache = (entry.label.clone(), members);
        }
        let members = &self.group_cache.1;
        if entry.position >= members.len() {
            return Err(Error::corrupt(
                key,
                format!(
                    "position {} out of range for group {:?} ({} members)",
                    entry.position,
                    entry.label,
                    members.len()
                ),
            ));
        }
        let i1 = self.ks.permute(entry.position, &entry.label, members.len());
        let w1 = adjust_caps(w0, &members[i1]);
        debug!(
            from = w0,
            group = %entry.label,
            i0 = entry.position,
            to = %w1,
            i1,
            "word substitution"
        );
        Ok(w1)
    }

    /// Map each classifiable character through its class permutation;
    /// anything else passes through. Case rides on the classes themselves.
    fn crypt_letters(&mut self, w0: &str) -> String {
        let mut out = String::with_capacity(w0.len());
        for c in w0.chars() {
            match charclass::classify(c) {
                Some((class, i0)) => {
                    let n = charclass::size(class);
                    let i1 = self.ks.permute(i0, charclass::label(class), n);
                    out.push(charclass::member(class, i1));
                }
                None => out.push(c),
            }
        }
        out
    }

    /// Hold back a bare `a`/`an` until the next word is known; `put_word`
    /// re-chooses the output article to agree with that word. Returns true
    /// when the token was captured.
    fn capture_article(&mut self, w: &str) -> bool {
        if self.article.is_none() {
            let lower = w.to_lowercase();
            if lower == "a" || lower == "an" {
                self.article = Some(PendingArticle {
                    surface: w.to_string(),
                    trailing: String::new(),
                });
                return true;
            }
        }
        false
    }

    fn put_space(&mut self, s: &str) {
        match &mut self.article {
            Some(article) => article.trailing.push_str(s),
            None => self.out.push_str(s),
        }
    }

    fn put_word(&mut self, w: &str) {
        if let Some(article) = self.article.take() {
            let chosen = if is_voweled(w) { "an" } else { "a" };
            self.out.push_str(&adjust_caps(&article.surface, chosen));
            self.out.push_str(&article.trailing);
        }
        self.out.push_str(w);
    }
}
