//! Online dictionary: the two immutable maps a transform session reads.
//!
//! `w2g.cdb` maps a lowercased surface word to `LABEL,POSITION`; `g2w.cdb`
//! maps a group label to its space-separated, lexicographically frozen member
//! list. An empty label marks a skip-list word: known, never substituted.

use std::path::Path;

use crate::cdb::Cdb;
use crate::error::Error;

/// Where a word sits in its group: `(label, position)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordEntry {
    pub label: String,
    pub position: usize,
}

pub struct Dictionary {
    w2g: Cdb,
    g2w: Cdb,
}

impl Dictionary {
    /// Open `w2g.cdb` and `g2w.cdb` under `basedir`. Missing or unreadable
    /// files fail here, at session creation, not mid-transform.
    pub fn open(basedir: &Path) -> Result<Self, Error> {
        let w2g_path = basedir.join("w2g.cdb");
        let w2g = Cdb::open(&w2g_path).map_err(|e| Error::io(w2g_path, e))?;
        let g2w_path = basedir.join("g2w.cdb");
        let g2w = Cdb::open(&g2w_path).map_err(|e| Error::io(g2w_path, e))?;
        Ok(Dictionary { w2g, g2w })
    }

    /// Resolve a lowercased word. `Ok(None)` means unknown; an entry with an
    /// empty label means "known, do not substitute".
    pub fn lookup_word(&self, w: &str) -> Result<Option<WordEntry>, Error> {
        let raw = match self.w2g.get(w.as_bytes()) {
            None => return Ok(None),
            Some(raw) => raw,
        };
        let raw = std::str::from_utf8(raw)
            .map_err(|_| Error::corrupt(w, "w2g value is not UTF-8"))?;
        let (label, position) = raw
            .split_once(',')
            .ok_or_else(|| Error::corrupt(w, "w2g value is not of the form LABEL,POSITION"))?;
        let position = position
            .parse()
            .map_err(|_| Error::corrupt(w, format!("position {position:?} is not an integer")))?;
        Ok(Some(WordEntry {
            label: label.to_string(),
            position,
        }))
    }

    /// The frozen member list of a group. A label that `w2g` references but
    /// `g2w` lacks means the dictionary pair is corrupt.
    pub fn members(&self, label: &str) -> Result<Vec<String>, Error> {
        let raw = self
            .g2w
            .get(label.as_bytes())
            .ok_or_else(|| Error::UnknownGroup {
                label: label.to_string(),
            })?;
        let raw = std::str::from_utf8(raw)
            .map_err(|_| Error::corrupt(label, "g2w value is not UTF-8"))?;
        Ok(raw.split(' ').map(str::to_string).collect())
    }
}
