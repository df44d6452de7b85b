//! # Canonical Serialization — Fixed-Order Byte Concatenation
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! used in digest computation and signing across the credential registry.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through `CanonicalBytes::new()`, which drives a value's
//! [`Canonical`] implementation through a [`CanonicalWriter`].
//!
//! Any function requiring canonical bytes for digest computation must accept
//! `&CanonicalBytes`, so ad-hoc byte assembly cannot reach the hash function.
//!
//! ## Encoding Rules
//!
//! Field bytes are concatenated without separators or length prefixes, in the
//! order fixed by each type. The order is part of a fact's wire identity:
//! reordering fields changes every hash computed over it.
//!
//! 1. **Strings** — raw UTF-8 bytes.
//! 2. **`u64`** — 8 bytes, big-endian.
//! 3. **`u128`** — 16 bytes, big-endian.
//! 4. **Flags** — a single byte, `1` or `0`.
//! 5. **Optional values** — absent values contribute no bytes.
//! 6. **Sequences** — element bytes concatenated in order.

/// Bytes produced exclusively by fixed-order canonical encoding.
///
/// # Invariants
///
/// - The only constructors are `CanonicalBytes::new()` and
///   `CanonicalBytes::from_parts()`.
/// - Field order is fixed by each type's [`Canonical`] implementation.
/// - Integer fields are big-endian.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any [`Canonical`] value.
    pub fn new(obj: &impl Canonical) -> Self {
        let mut writer = CanonicalWriter::default();
        obj.write_canonical(&mut writer);
        Self(writer.finish())
    }

    /// Construct canonical bytes by writing parts directly.
    ///
    /// Used for composite messages that are not themselves domain values,
    /// e.g. the signed message `network_id ++ fact_hash`.
    pub fn from_parts(write: impl FnOnce(&mut CanonicalWriter)) -> Self {
        let mut writer = CanonicalWriter::default();
        write(&mut writer);
        Self(writer.finish())
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A value with a canonical, hash-stable byte representation.
pub trait Canonical {
    /// Append this value's canonical bytes to the writer.
    fn write_canonical(&self, w: &mut CanonicalWriter);
}

/// Append-only buffer used to assemble canonical bytes.
#[derive(Debug, Default)]
pub struct CanonicalWriter {
    buf: Vec<u8>,
}

impl CanonicalWriter {
    /// Append raw UTF-8 bytes of a string.
    pub fn put_str(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(s.as_bytes());
        self
    }

    /// Append raw bytes.
    pub fn put_bytes(&mut self, b: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(b);
        self
    }

    /// Append a `u64` as 8 big-endian bytes.
    pub fn put_u64(&mut self, v: u64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    /// Append a `u128` as 16 big-endian bytes.
    pub fn put_u128(&mut self, v: u128) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    /// Append a flag as a single `1`/`0` byte.
    pub fn put_flag(&mut self, v: bool) -> &mut Self {
        self.buf.push(u8::from(v));
        self
    }

    /// Append a nested canonical value.
    pub fn put(&mut self, v: &impl Canonical) -> &mut Self {
        v.write_canonical(self);
        self
    }

    /// Append an optional canonical value; `None` contributes nothing.
    pub fn put_opt<T: Canonical>(&mut self, v: Option<&T>) -> &mut Self {
        if let Some(v) = v {
            v.write_canonical(self);
        }
        self
    }

    /// Append every element of a sequence in order.
    pub fn put_all<'a, T: Canonical + 'a>(
        &mut self,
        items: impl IntoIterator<Item = &'a T>,
    ) -> &mut Self {
        for item in items {
            item.write_canonical(self);
        }
        self
    }

    fn finish(self) -> Vec<u8> {
        self.buf
    }
}

impl Canonical for str {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put_str(self);
    }
}

impl Canonical for String {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put_str(self);
    }
}

impl Canonical for u64 {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put_u64(*self);
    }
}

impl Canonical for bool {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put_flag(*self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        name: String,
        count: u64,
    }

    impl Canonical for Pair {
        fn write_canonical(&self, w: &mut CanonicalWriter) {
            w.put_str(&self.name).put_u64(self.count);
        }
    }

    #[test]
    fn test_string_then_u64_layout() {
        let cb = CanonicalBytes::new(&Pair {
            name: "ab".to_string(),
            count: 1,
        });
        assert_eq!(cb.as_bytes(), &[b'a', b'b', 0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_field_order_changes_bytes() {
        let a = CanonicalBytes::from_parts(|w| {
            w.put_str("x").put_str("y");
        });
        let b = CanonicalBytes::from_parts(|w| {
            w.put_str("y").put_str("x");
        });
        assert_ne!(a, b);
    }

    #[test]
    fn test_flag_bytes() {
        let cb = CanonicalBytes::from_parts(|w| {
            w.put_flag(true).put_flag(false);
        });
        assert_eq!(cb.as_bytes(), &[1, 0]);
    }

    #[test]
    fn test_u128_is_big_endian() {
        let cb = CanonicalBytes::from_parts(|w| {
            w.put_u128(258);
        });
        assert_eq!(cb.len(), 16);
        assert_eq!(&cb.as_bytes()[14..], &[1, 2]);
    }

    #[test]
    fn test_optional_none_contributes_nothing() {
        let none: Option<&String> = None;
        let cb = CanonicalBytes::from_parts(|w| {
            w.put_opt(none);
        });
        assert!(cb.is_empty());
    }

    #[test]
    fn test_sequence_concatenates_in_order() {
        let items = vec!["a".to_string(), "bc".to_string()];
        let cb = CanonicalBytes::from_parts(|w| {
            w.put_all(&items);
        });
        assert_eq!(cb.as_bytes(), b"abc");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Canonicalization is deterministic: same input always produces same bytes.
        #[test]
        fn canonical_bytes_deterministic(s in "[a-zA-Z0-9_ ]{0,50}", n in any::<u64>()) {
            let a = CanonicalBytes::from_parts(|w| { w.put_str(&s).put_u64(n); });
            let b = CanonicalBytes::from_parts(|w| { w.put_str(&s).put_u64(n); });
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
        }

        /// The encoded length is exactly the UTF-8 length plus the fixed integer width.
        #[test]
        fn canonical_bytes_length(s in "\\PC{0,40}", n in any::<u64>()) {
            let cb = CanonicalBytes::from_parts(|w| { w.put_str(&s).put_u64(n); });
            prop_assert_eq!(cb.len(), s.len() + 8);
        }
    }
}
