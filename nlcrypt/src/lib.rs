//! nlcrypt — a format-preserving text transformer that disguises ciphertext
//! as grammatically plausible prose.
//!
//! Each recognizable English word is replaced by another word from the same
//! morphological group (same part-of-speech tags, same frequency bucket);
//! each recognizable letter or digit by another character of the same class.
//! The substitution is deterministic under the key and exactly invertible.
//!
//! This is explicitly **not** a secure cipher: HMAC-MD5 and RC4 are broken,
//! keystream reuse across messages is possible, and the output leaks word
//! classes and lengths on purpose. The primitives are kept bit-exact so
//! ciphertexts and dictionaries from earlier installations stay valid.
//!
//! ```no_run
//! use nlcrypt::NlCrypt;
//! # fn main() -> Result<(), nlcrypt::Error> {
//! let mut session = NlCrypt::new(b"secret", false, false, ".".as_ref())?;
//! let disguised = session.feed("The quick brown fox jumps over the lazy dog.")?;
//! # Ok(()) }
//! ```

#![forbid(unsafe_code)]

pub mod builder;
pub mod cdb;
pub mod charclass;
pub mod dict;
pub mod engine;
mod error;
pub mod morph;
pub mod rc4;
pub mod xform;

pub use builder::{DictBuilder, Pos};
pub use dict::Dictionary;
pub use error::Error;
pub use xform::{adjust_caps, NlCrypt};
