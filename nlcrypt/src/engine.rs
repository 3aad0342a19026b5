//! Keystream engine: turns `(index, label, modulus)` into a permuted index.
//!
//! The key state is an HMAC-MD5 instance. Each call snapshots the running
//! digest by finalizing a *clone* of the MAC, so reading never consumes the
//! state; in CBC mode the RC4 output is folded back into the live MAC, which
//! makes chaining strictly sequential and order-sensitive.
//!
//! For a fixed state, direction, label and modulus the mapping is translation
//! by a constant in Z/nZ, hence a bijection on `{0, …, n-1}`. Encrypt and
//! decrypt stay inverses as long as both sessions issue the same sequence of
//! `(label, n)` arguments, which the transformer guarantees.

use hmac::{Hmac, Mac};
use md5::Md5;

use crate::rc4::Rc4;

type HmacMd5 = Hmac<Md5>;

/// Exclusively owned by one transform session; sharing it between sessions
/// would break the invertibility contract.
pub struct Keystream {
    mac: HmacMd5,
    reverse: bool,
    cbc: bool,
}

impl Keystream {
    pub fn new(key: &[u8], reverse: bool, cbc: bool) -> Self {
        let mac = HmacMd5::new_from_slice(key).expect("HMAC can take key of any size");
        Keystream { mac, reverse, cbc }
    }

    /// Map `i0` to another index of the same `n`-element domain.
    ///
    /// `label` must be short ASCII (a group label or a character-class id);
    /// it keys otherwise identical domains apart. Callers must uphold
    /// `i0 < n`; violating it is a bug upstream, not a runtime condition.
    pub fn permute(&mut self, i0: usize, label: &str, n: usize) -> usize {
        assert!(n >= 1 && i0 < n, "index {i0} out of domain {n}");

        let digest = self.mac.clone().finalize().into_bytes();

        let mut v = Vec::with_capacity(4 + label.len());
        v.extend_from_slice(&(n as u32).to_le_bytes());
        v.extend_from_slice(label.as_bytes());
        Rc4::new(digest.as_slice()).apply_keystream(&mut v);

        if self.cbc {
            self.mac.update(&v);
        }

        let x = u32::from_le_bytes([v[0], v[1], v[2], v[3]]) as u64;
        let n = n as u64;
        let i0 = i0 as u64;
        let i1 = if self.reverse {
            (i0 + n - x % n) % n
        } else {
            (i0 + x) % n
        };
        i1 as usize
    }
}
