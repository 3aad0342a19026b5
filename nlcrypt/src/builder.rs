//! Offline dictionary builder: WordNet source files in, `w2g.cdb` and
//! `g2w.cdb` out.
//!
//! For every headword the builder emits the surface forms of §morphology
//! with their Penn-Treebank tags, then groups surface words by (tag set,
//! frequency weight). Group labels join the tags in ASCII order; member
//! lists are ASCII-sorted and frozen. Both orderings are part of the on-disk
//! format: installations that disagree on either cannot decrypt each other's
//! output.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info};

use crate::cdb::CdbWriter;
use crate::error::Error;
use crate::morph::{self, Exceptions};

/// WordNet part-of-speech categories, one `index.*`/`*.exc` file pair each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pos {
    Adj,
    Adv,
    Noun,
    Verb,
}

impl Pos {
    pub const ALL: [Pos; 4] = [Pos::Adj, Pos::Adv, Pos::Noun, Pos::Verb];

    fn name(self) -> &'static str {
        match self {
            Pos::Adj => "adj",
            Pos::Adv => "adv",
            Pos::Noun => "noun",
            Pos::Verb => "verb",
        }
    }

    fn index_file(self) -> String {
        format!("index.{}", self.name())
    }

    fn exc_file(self) -> String {
        format!("{}.exc", self.name())
    }
}

/// Penn-Treebank tags the builder emits. Declaration order is the ASCII
/// order of the tag strings, so an ordered set of tags joins into the
/// canonical label directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Tag {
    Jj,
    Jjr,
    Jjs,
    Nn,
    Nns,
    Rb,
    Rbr,
    Rbs,
    Vb,
    Vbd,
    Vbg,
    Vbn,
    Vbp,
    Vbz,
}

impl Tag {
    fn as_str(self) -> &'static str {
        match self {
            Tag::Jj => "JJ",
            Tag::Jjr => "JJR",
            Tag::Jjs => "JJS",
            Tag::Nn => "NN",
            Tag::Nns => "NNS",
            Tag::Rb => "RB",
            Tag::Rbr => "RBR",
            Tag::Rbs => "RBS",
            Tag::Vb => "VB",
            Tag::Vbd => "VBD",
            Tag::Vbg => "VBG",
            Tag::Vbn => "VBN",
            Tag::Vbp => "VBP",
            Tag::Vbz => "VBZ",
        }
    }
}

/// Weight bucket: `floor(log2(count) + 0.5)`, 0 for unseen words.
fn quantize_weight(count: u64) -> u32 {
    if count == 0 {
        return 0;
    }
    ((count as f64).log2() + 0.5) as u32
}

pub struct DictBuilder {
    basedir: PathBuf,
    nns_exc: Exceptions,
    jjr_exc: Exceptions,
    jjs_exc: Exceptions,
    rbr_exc: Exceptions,
    rbs_exc: Exceptions,
    vbz_exc: Exceptions,
    vbd_exc: Exceptions,
    vbn_exc: Exceptions,
    vbg_exc: Exceptions,
    weight: HashMap<String, u32>,
    skip: BTreeSet<String>,
    words: BTreeMap<String, BTreeSet<Tag>>,
}

impl DictBuilder {
    /// Load the exception tables and the `cntlist` frequency file from a
    /// WordNet directory. Index scanning happens per-POS afterwards, once
    /// all skip lists are in.
    pub fn from_wordnet(basedir: &Path) -> Result<Self, Error> {
        let mut builder = DictBuilder {
            basedir: basedir.to_path_buf(),
            nns_exc: Exceptions::new(),
            jjr_exc: Exceptions::new(),
            jjs_exc: Exceptions::new(),
            rbr_exc: Exceptions::new(),
            rbs_exc: Exceptions::new(),
            vbz_exc: Exceptions::new(),
            vbd_exc: Exceptions::new(),
            vbn_exc: Exceptions::new(),
            vbg_exc: Exceptions::new(),
            weight: HashMap::new(),
            // Articles must never be substitutable, or the decryptor's
            // article capture would swallow a substitute word.
            skip: ["a", "an"].into_iter().map(str::to_string).collect(),
            words: BTreeMap::new(),
        };
        builder.read_exceptions()?;
        builder.read_cntlist()?;
        Ok(builder)
    }

    fn read_file(&self, name: &str) -> Result<String, Error> {
        let path = self.basedir.join(name);
        info!(path = %path.display(), "reading");
        fs::read_to_string(&path).map_err(|e| Error::io(path, e))
    }

    /// `*.exc` lines are `inflected base`; the tables map base to inflected.
    fn exc_pairs(text: &str) -> impl Iterator<Item = (&str, &str)> {
        text.lines().filter_map(|line| {
            let mut fields = line.split_whitespace();
            let inflected = fields.next()?;
            let base = fields.next()?;
            Some((inflected, base))
        })
    }

    fn read_exceptions(&mut self) -> Result<(), Error> {
        for (inflected, base) in Self::exc_pairs(&self.read_file(&Pos::Noun.exc_file())?) {
            self.nns_exc.insert(base.to_string(), inflected.to_string());
        }

        // Adjectives and adverbs: a comparative ends in `r`, a superlative
        // in `t`; anything else is not an inflection we emit.
        for (inflected, base) in Self::exc_pairs(&self.read_file(&Pos::Adj.exc_file())?) {
            if inflected.ends_with('r') {
                self.jjr_exc.insert(base.to_string(), inflected.to_string());
            } else if inflected.ends_with('t') {
                self.jjs_exc.insert(base.to_string(), inflected.to_string());
            }
        }
        for (inflected, base) in Self::exc_pairs(&self.read_file(&Pos::Adv.exc_file())?) {
            if inflected.ends_with('r') {
                self.rbr_exc.insert(base.to_string(), inflected.to_string());
            } else if inflected.ends_with('t') {
                self.rbs_exc.insert(base.to_string(), inflected.to_string());
            }
        }

        // Verb exceptions are classified by the shape of the first
        // `_`-separated token; the probes append a `_` terminator so the
        // suffix alternations below stop at the token boundary.
        let past_re = Regex::new(r"^[^_]+([deklmtwy]|ang?|on)_").expect("static pattern");
        let participle_re =
            Regex::new(r"^[^_]+(ne|ung|en|ain|rn|un|wn)_").expect("static pattern");
        let gerund_re = Regex::new(r"^[^_]+ing_").expect("static pattern");
        for (inflected, base) in Self::exc_pairs(&self.read_file(&Pos::Verb.exc_file())?) {
            let probe = format!("{inflected}_");
            if inflected.ends_with('s') {
                self.vbz_exc.insert(base.to_string(), inflected.to_string());
            } else if past_re.is_match(&probe) && !inflected.ends_with("ne") {
                self.vbd_exc.insert(base.to_string(), inflected.to_string());
            } else if participle_re.is_match(&probe) {
                self.vbn_exc.insert(base.to_string(), inflected.to_string());
            } else if gerund_re.is_match(&probe) {
                self.vbg_exc.insert(base.to_string(), inflected.to_string());
            }
        }
        Ok(())
    }

    /// Accumulate per-lemma tag counts, then quantize into weight buckets.
    fn read_cntlist(&mut self) -> Result<(), Error> {
        let text = self.read_file("cntlist")?;
        let mut counts: HashMap<String, u64> = HashMap::new();
        for line in text.lines() {
            let mut fields = line.split_whitespace();
            let (Some(count), Some(sense)) = (fields.next(), fields.next()) else {
                continue;
            };
            let Ok(count) = count.parse::<u64>() else {
                continue;
            };
            let sense = sense.split_once(':').map_or(sense, |(head, _)| head);
            let lemma = sense.split_once('%').map_or(sense, |(head, _)| head);
            *counts.entry(lemma.to_string()).or_insert(0) += count;
        }
        for (lemma, count) in counts {
            self.weight.insert(lemma, quantize_weight(count));
        }
        Ok(())
    }

    /// Add a skip list: one word per line (a tab-separated POS column and
    /// `#` comments are tolerated). Skip words are still written to `w2g`,
    /// with the empty sentinel label, so the transformer knows them.
    pub fn read_skip(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let word = line.split('\t').next().unwrap_or(line);
            self.skip.insert(word.to_lowercase());
        }
    }

    pub fn read_skip_file(&mut self, path: &Path) -> Result<(), Error> {
        info!(path = %path.display(), "reading skip list");
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        self.read_skip(&text);
        Ok(())
    }

    /// Scan one `index.*` file and emit surface forms for every headword.
    pub fn scan_index(&mut self, pos: Pos) -> Result<(), Error> {
        let text = self.read_file(&pos.index_file())?;
        for line in text.lines() {
            // License header lines start with whitespace.
            if line.starts_with(' ') {
                continue;
            }
            let mut fields = line.split(' ');
            let (Some(w), Some(tag)) = (fields.next(), fields.next()) else {
                continue;
            };
            if w.len() < 2 || !w.bytes().all(|b| b.is_ascii_alphabetic()) {
                continue;
            }
            match tag {
                "a" => {
                    self.add_pos(w.to_string(), Tag::Jj);
                    self.add_pos(morph::comparative(w, &self.jjr_exc), Tag::Jjr);
                    self.add_pos(morph::superlative(w, &self.jjs_exc), Tag::Jjs);
                }
                "r" => {
                    self.add_pos(w.to_string(), Tag::Rb);
                    self.add_pos(morph::comparative(w, &self.rbr_exc), Tag::Rbr);
                    self.add_pos(morph::superlative(w, &self.rbs_exc), Tag::Rbs);
                }
                "n" => {
                    self.add_pos(w.to_string(), Tag::Nn);
                    self.add_pos(morph::plural(w, &self.nns_exc), Tag::Nns);
                }
                "v" => {
                    self.add_pos(w.to_string(), Tag::Vb);
                    self.add_pos(w.to_string(), Tag::Vbp);
                    self.add_pos(morph::pres_3rd(w, &self.vbz_exc), Tag::Vbz);
                    self.add_pos(morph::past(w, &self.vbd_exc), Tag::Vbd);
                    self.add_pos(morph::past_participle(w, &self.vbn_exc), Tag::Vbn);
                    if !w.contains('_') {
                        self.add_pos(morph::gerund(w, &self.vbg_exc), Tag::Vbg);
                    }
                }
                other => debug!(word = w, tag = other, "unknown POS tag, skipped"),
            }
        }
        Ok(())
    }

    fn add_pos(&mut self, w: String, tag: Tag) {
        let w = w.to_lowercase();
        if self.skip.contains(&w) {
            return;
        }
        self.words.entry(w).or_default().insert(tag);
    }

    /// Group, sort, and write the two databases into `outdir`.
    pub fn write(&self, outdir: &Path) -> Result<(), Error> {
        let mut groups: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for (w, tags) in &self.words {
            let weight = self.weight.get(w.as_str()).copied().unwrap_or(0);
            let tags: Vec<&str> = tags.iter().map(|t| t.as_str()).collect();
            let label = format!("{}:{}", tags.join("+"), weight);
            groups.entry(label).or_default().push(w);
        }
        // `words` iterates lexicographically, so each member list arrives
        // sorted; keep the sort explicit anyway since positions freeze here.
        for members in groups.values_mut() {
            members.sort_unstable();
        }
        for (label, members) in &groups {
            debug!(label = %label, members = members.len(), "group");
        }
        info!(groups = groups.len(), words = self.words.len(), "writing databases");

        let g2w_path = outdir.join("g2w.cdb");
        write_cdb(&g2w_path, groups.iter().map(|(label, members)| {
            (label.as_bytes().to_vec(), members.join(" ").into_bytes())
        }))?;

        let w2g_path = outdir.join("w2g.cdb");
        let regular = groups.iter().flat_map(|(label, members)| {
            members.iter().enumerate().map(move |(position, w)| {
                (w.as_bytes().to_vec(), format!("{label},{position}").into_bytes())
            })
        });
        let skipped = self
            .skip
            .iter()
            .map(|w| (w.as_bytes().to_vec(), b",0".to_vec()));
        write_cdb(&w2g_path, regular.chain(skipped))
    }
}

fn write_cdb(
    path: &Path,
    entries: impl Iterator<Item = (Vec<u8>, Vec<u8>)>,
) -> Result<(), Error> {
    let mut writer = CdbWriter::create(path).map_err(|e| Error::io(path, e))?;
    for (key, value) in entries {
        writer.put(&key, &value).map_err(|e| Error::io(path, e))?;
    }
    writer.finish().map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::Dictionary;
    use std::fs;

    fn write_wordnet(dir: &Path) {
        fs::write(
            dir.join("index.noun"),
            "  1 This line is a license header\n\
             fox n 1 0 1\n\
             goose n 1 0 1\n\
             elephant n 1 0 1\n\
             x n 1 0 1\n\
             ice_cream n 1 0 1\n",
        )
        .unwrap();
        fs::write(dir.join("index.verb"), "go v 1 0 1\nwalk v 1 0 1\n").unwrap();
        fs::write(dir.join("index.adj"), "happy a 1 0 1\nquick a 1 0 1\n").unwrap();
        fs::write(dir.join("index.adv"), "soon r 1 0 1\n").unwrap();
        fs::write(dir.join("noun.exc"), "geese goose\n").unwrap();
        fs::write(dir.join("verb.exc"), "went go\ngone go\ngoes go\n").unwrap();
        fs::write(dir.join("adj.exc"), "happier happy\nhappiest happy\n").unwrap();
        fs::write(dir.join("adv.exc"), "").unwrap();
        fs::write(dir.join("cntlist"), "120 fox%1:05:00:: 1\n8 walk%2:38:00:: 3\n").unwrap();
    }

    fn build(dir: &Path) -> Dictionary {
        let mut builder = DictBuilder::from_wordnet(dir).unwrap();
        builder.read_skip("the\tDT # most common word\n# comment only\n");
        for pos in Pos::ALL {
            builder.scan_index(pos).unwrap();
        }
        builder.write(dir).unwrap();
        Dictionary::open(dir).unwrap()
    }

    #[test]
    fn groups_words_and_positions() {
        let dir = tempfile::tempdir().unwrap();
        write_wordnet(dir.path());
        let dict = build(dir.path());

        // fox has a cntlist weight of floor(log2(120) + 0.5) = 7, so it
        // lands in its own group; the unweighted nouns share NN:0.
        let fox = dict.lookup_word("fox").unwrap().unwrap();
        assert_eq!(fox.label, "NN:7");
        assert_eq!(dict.members("NN:7").unwrap(), vec!["fox"]);

        let elephant = dict.lookup_word("elephant").unwrap().unwrap();
        assert_eq!(elephant.label, "NN:0");
        assert_eq!(dict.members("NN:0").unwrap(), vec!["elephant", "goose"]);
        assert_eq!(elephant.position, 0);

        // Every member round-trips to its own (label, position).
        for (position, member) in dict.members("NN:0").unwrap().iter().enumerate() {
            let entry = dict.lookup_word(member).unwrap().unwrap();
            assert_eq!(entry.label, "NN:0");
            assert_eq!(entry.position, position);
        }
    }

    #[test]
    fn exceptions_and_regular_inflections() {
        let dir = tempfile::tempdir().unwrap();
        write_wordnet(dir.path());
        let dict = build(dir.path());

        // Exception-table inflections of "go".
        assert_eq!(dict.lookup_word("went").unwrap().unwrap().label, "VBD:0");
        assert_eq!(dict.lookup_word("gone").unwrap().unwrap().label, "VBN:0");
        assert_eq!(dict.lookup_word("goes").unwrap().unwrap().label, "VBZ:0");
        assert_eq!(dict.lookup_word("going").unwrap().unwrap().label, "VBG:0");

        // Regular verb: past and participle coincide, giving a merged tag
        // set in ASCII order.
        assert_eq!(dict.lookup_word("walked").unwrap().unwrap().label, "VBD+VBN:0");
        assert_eq!(dict.lookup_word("walk").unwrap().unwrap().label, "VB+VBP:3");

        // Adjective exceptions and the sorted label for base forms.
        assert_eq!(dict.lookup_word("happier").unwrap().unwrap().label, "JJR:0");
        assert_eq!(dict.lookup_word("happiest").unwrap().unwrap().label, "JJS:0");
        assert_eq!(dict.lookup_word("quicker").unwrap().unwrap().label, "JJR:0");
        assert_eq!(dict.lookup_word("geese").unwrap().unwrap().label, "NNS:0");
    }

    #[test]
    fn filters_and_skip_entries() {
        let dir = tempfile::tempdir().unwrap();
        write_wordnet(dir.path());
        let dict = build(dir.path());

        // Too short, and not pure ASCII-alphabetic.
        assert!(dict.lookup_word("x").unwrap().is_none());
        assert!(dict.lookup_word("ice_cream").unwrap().is_none());

        // Skip-list words and the built-in articles carry the sentinel.
        for w in ["the", "a", "an"] {
            let entry = dict.lookup_word(w).unwrap().unwrap();
            assert_eq!(entry.label, "", "{w}");
            assert_eq!(entry.position, 0);
        }
    }

    #[test]
    fn weight_quantization() {
        assert_eq!(quantize_weight(0), 0);
        assert_eq!(quantize_weight(1), 0);
        assert_eq!(quantize_weight(2), 1);
        assert_eq!(quantize_weight(8), 3);
        assert_eq!(quantize_weight(120), 7);
        assert_eq!(quantize_weight(1500), 11);
    }
}
