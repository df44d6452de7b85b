//! # Digest Test Vectors
//!
//! Pins the SHA-256 output of the canonical pipeline against published
//! vectors, so a change in the writer's byte layout is caught even when
//! every in-crate round trip still agrees with itself.

use credreg_core::{sha256_digest, Address, Amount, CanonicalBytes, Date};

#[test]
fn abc_vector() {
    let cb = CanonicalBytes::from_parts(|w| {
        w.put_str("abc");
    });
    assert_eq!(
        sha256_digest(&cb).to_hex(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn split_writes_hash_like_one_write() {
    let joined = CanonicalBytes::from_parts(|w| {
        w.put_str("abc");
    });
    let split = CanonicalBytes::from_parts(|w| {
        w.put_str("a").put_str("b").put_bytes(b"c");
    });
    assert_eq!(sha256_digest(&joined), sha256_digest(&split));
}

#[test]
fn mixed_field_layout() {
    let addr = Address::new("alicemca").unwrap();
    let date = Date::parse("2025-01-01").unwrap();
    let cb = CanonicalBytes::from_parts(|w| {
        w.put(&addr).put(&date).put_u64(7).put(&Amount::new(7)).put_flag(true);
    });
    // 8 + 10 + 8 + 16 + 1
    assert_eq!(cb.len(), 43);
    assert_eq!(&cb.as_bytes()[..8], b"alicemca");
    assert_eq!(cb.as_bytes()[42], 1);
}
