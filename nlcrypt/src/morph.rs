//! English inflection rules used by the dictionary builder.
//!
//! Every function checks the relevant WordNet exception table first; the
//! regular rules only apply on a miss. The outputs are part of the on-disk
//! dictionary format, so the rules must stay byte-for-byte stable even where
//! they are linguistically rough (`happy` compares as `happyier`: the
//! comparative and superlative rules append `ier`/`iest` without stripping
//! the `y`, while the plural rule does strip it).

use std::collections::HashMap;

pub type Exceptions = HashMap<String, String>;

fn ends_consonant_y(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 2
        && b[b.len() - 1] == b'y'
        && !matches!(b[b.len() - 2], b'a' | b'e' | b'i' | b'o' | b'u')
}

/// Regular plural / 3rd-person-s suffix. First matching rule wins.
pub fn regular_s(s: &str) -> String {
    if let Some(stem) = s.strip_suffix('s') {
        format!("{stem}ses")
    } else if let Some(stem) = s.strip_suffix('x') {
        format!("{stem}xes")
    } else if let Some(stem) = s.strip_suffix('z') {
        format!("{stem}zes")
    } else if ends_consonant_y(s) {
        format!("{}ies", &s[..s.len() - 1])
    } else if s.ends_with("ch") || s.ends_with("sh") {
        format!("{s}es")
    } else if let Some(stem) = s.strip_suffix("man") {
        format!("{stem}men")
    } else {
        format!("{s}s")
    }
}

/// Inflect the first `_`-separated token, keep the tail verbatim.
fn multiword(parts: &[&str], f: fn(&str, &Exceptions) -> String, exc: &Exceptions) -> String {
    let mut out = f(parts[0], exc);
    for part in &parts[1..] {
        out.push('_');
        out.push_str(part);
    }
    out
}

pub fn plural(s: &str, exc: &Exceptions) -> String {
    if let Some(x) = exc.get(s) {
        return x.clone();
    }
    regular_s(s)
}

pub fn pres_3rd(s: &str, exc: &Exceptions) -> String {
    if let Some(x) = exc.get(s) {
        return x.clone();
    }
    let parts: Vec<&str> = s.split('_').collect();
    if parts.len() > 1 {
        return multiword(&parts, pres_3rd, exc);
    }
    regular_s(s)
}

pub fn past(s: &str, exc: &Exceptions) -> String {
    if let Some(x) = exc.get(s) {
        return x.clone();
    }
    let parts: Vec<&str> = s.split('_').collect();
    if parts.len() > 1 {
        return multiword(&parts, past, exc);
    }
    if s.ends_with('e') {
        format!("{s}d")
    } else {
        format!("{s}ed")
    }
}

pub fn past_participle(s: &str, exc: &Exceptions) -> String {
    if let Some(x) = exc.get(s) {
        return x.clone();
    }
    let parts: Vec<&str> = s.split('_').collect();
    if parts.len() > 1 {
        return multiword(&parts, past_participle, exc);
    }
    past(s, exc)
}

pub fn gerund(s: &str, exc: &Exceptions) -> String {
    if let Some(x) = exc.get(s) {
        return x.clone();
    }
    if s == "see" {
        "seeing".to_string()
    } else if s.ends_with('e') {
        format!("{}ing", &s[..s.len() - 1])
    } else {
        format!("{s}ing")
    }
}

pub fn comparative(s: &str, exc: &Exceptions) -> String {
    if let Some(x) = exc.get(s) {
        return x.clone();
    }
    if s.ends_with('e') {
        format!("{s}r")
    } else if s.ends_with('y') {
        format!("{s}ier")
    } else {
        format!("{s}er")
    }
}

pub fn superlative(s: &str, exc: &Exceptions) -> String {
    if let Some(x) = exc.get(s) {
        return x.clone();
    }
    if s.ends_with('e') {
        format!("{s}st")
    } else if s.ends_with('y') {
        format!("{s}iest")
    } else {
        format!("{s}est")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn none() -> Exceptions {
        Exceptions::new()
    }

    #[test]
    fn regular_s_rules() {
        // (input, plural/3rd-s) pairs covering every branch in order.
        let table = [
            ("bus", "buses"),
            ("box", "boxes"),
            ("quiz", "quizes"),
            ("city", "cities"),
            ("my", "mies"),
            ("boy", "boys"),
            ("church", "churches"),
            ("wish", "wishes"),
            ("woman", "women"),
            ("dog", "dogs"),
        ];
        for (input, expected) in table {
            assert_eq!(regular_s(input), expected, "input {input:?}");
        }
    }

    #[test]
    fn past_and_participle() {
        assert_eq!(past("walk", &none()), "walked");
        assert_eq!(past("love", &none()), "loved");
        assert_eq!(past_participle("walk", &none()), "walked");
        let exc: Exceptions = [("go".to_string(), "gone".to_string())].into();
        assert_eq!(past_participle("go", &exc), "gone");
    }

    #[test]
    fn gerund_rules() {
        assert_eq!(gerund("see", &none()), "seeing");
        assert_eq!(gerund("make", &none()), "making");
        assert_eq!(gerund("jump", &none()), "jumping");
    }

    #[test]
    fn comparative_superlative_keep_trailing_y() {
        assert_eq!(comparative("late", &none()), "later");
        assert_eq!(comparative("happy", &none()), "happyier");
        assert_eq!(comparative("quick", &none()), "quicker");
        assert_eq!(superlative("late", &none()), "latest");
        assert_eq!(superlative("happy", &none()), "happyiest");
        assert_eq!(superlative("quick", &none()), "quickest");
    }

    #[test]
    fn exceptions_win() {
        let exc: Exceptions = [("goose".to_string(), "geese".to_string())].into();
        assert_eq!(plural("goose", &exc), "geese");
        assert_eq!(plural("moose", &exc), "mooses");
    }

    #[test]
    fn multiword_inflects_first_token_only() {
        assert_eq!(pres_3rd("give_up", &none()), "gives_up");
        assert_eq!(past("give_up", &none()), "gived_up");
        let exc: Exceptions = [("give".to_string(), "gave".to_string())].into();
        assert_eq!(past("give_up", &exc), "gave_up");
    }
}
