//! Minimal reader/writer for djb's constant database format.
//!
//! The two dictionary files (`w2g.cdb`, `g2w.cdb`) use this layout so that
//! databases built by earlier installations keep working and new ones stay
//! readable by them:
//!
//! - 2048-byte header: 256 little-endian `(table_offset, slot_count)` u32
//!   pairs, one per hash bucket.
//! - records: `(key_len, value_len)` as LE u32, then key bytes, value bytes.
//! - 256 hash tables of `(hash, record_offset)` LE u32 slot pairs; a zero
//!   record offset marks an empty slot.
//!
//! Writers size each table at twice its entry count and place entries by
//! open addressing from slot `(hash >> 8) % slots`.

use std::fs::{self, File};
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

/// cdb hash: start at 5381, then `h = (h * 33) ^ byte` per byte.
fn hash(key: &[u8]) -> u32 {
    let mut h: u32 = 5381;
    for &b in key {
        h = (h << 5).wrapping_add(h) ^ u32::from(b);
    }
    h
}

/// An immutable database, fully resident in memory. Shareable across
/// sessions for the life of the process.
pub struct Cdb {
    data: Vec<u8>,
}

impl Cdb {
    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(Cdb { data: fs::read(path)? })
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Cdb { data }
    }

    fn u32_at(&self, off: usize) -> Option<u32> {
        let bytes = self.data.get(off..off.checked_add(4)?)?;
        Some(u32::from_le_bytes(bytes.try_into().ok()?))
    }

    /// Look up `key`. Structurally impossible offsets in a damaged file read
    /// as "absent" rather than panicking.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        let h = hash(key);
        let bucket = (h as usize % 256) * 8;
        let table = self.u32_at(bucket)? as usize;
        let slots = self.u32_at(bucket + 4)? as usize;
        if slots == 0 {
            return None;
        }
        let start = (h >> 8) as usize % slots;
        for probe in 0..slots {
            let slot = table + ((start + probe) % slots) * 8;
            let slot_hash = self.u32_at(slot)?;
            let record = self.u32_at(slot + 4)? as usize;
            if record == 0 {
                return None;
            }
            if slot_hash != h {
                continue;
            }
            let klen = self.u32_at(record)? as usize;
            let vlen = self.u32_at(record + 4)? as usize;
            let kstart = record.checked_add(8)?;
            let vstart = kstart.checked_add(klen)?;
            if self.data.get(kstart..vstart)? == key {
                return self.data.get(vstart..vstart.checked_add(vlen)?);
            }
        }
        None
    }
}

/// Streaming writer: records go out as they arrive, the header and hash
/// tables are written on [`CdbWriter::finish`].
pub struct CdbWriter {
    file: BufWriter<File>,
    pos: u32,
    tables: Vec<Vec<(u32, u32)>>,
}

impl CdbWriter {
    pub fn create(path: &Path) -> io::Result<Self> {
        let mut file = BufWriter::new(File::create(path)?);
        // Header placeholder, rewritten by finish().
        file.write_all(&[0u8; 2048])?;
        Ok(CdbWriter {
            file,
            pos: 2048,
            tables: vec![Vec::new(); 256],
        })
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) -> io::Result<()> {
        let h = hash(key);
        self.file.write_all(&(key.len() as u32).to_le_bytes())?;
        self.file.write_all(&(value.len() as u32).to_le_bytes())?;
        self.file.write_all(key)?;
        self.file.write_all(value)?;
        self.tables[h as usize % 256].push((h, self.pos));
        self.pos += 8 + key.len() as u32 + value.len() as u32;
        Ok(())
    }

    pub fn finish(mut self) -> io::Result<()> {
        let mut header = [0u8; 2048];
        for (bucket, entries) in self.tables.iter().enumerate() {
            let slots = entries.len() * 2;
            header[bucket * 8..bucket * 8 + 4].copy_from_slice(&self.pos.to_le_bytes());
            header[bucket * 8 + 4..bucket * 8 + 8].copy_from_slice(&(slots as u32).to_le_bytes());
            if slots == 0 {
                continue;
            }
            let mut table = vec![(0u32, 0u32); slots];
            for &(h, record) in entries {
                let mut slot = (h >> 8) as usize % slots;
                while table[slot].1 != 0 {
                    slot = (slot + 1) % slots;
                }
                table[slot] = (h, record);
            }
            for (h, record) in table {
                self.file.write_all(&h.to_le_bytes())?;
                self.file.write_all(&record.to_le_bytes())?;
            }
            self.pos += slots as u32 * 8;
        }
        let mut file = self.file.into_inner().map_err(|e| e.into_error())?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&header)?;
        file.flush()
    }
}
