//! One-time codes and password-reset secrets.

use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub const OTP_LEN: usize = 6;
const RESET_SECRET_BYTES: usize = 32;

/// Six ASCII digits, uniformly random over 000000..=999999.
pub fn generate_otp() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{n:06}")
}

pub fn is_otp_shape(s: &str) -> bool {
    s.len() == OTP_LEN && s.bytes().all(|b| b.is_ascii_digit())
}

/// Hex encoding of 32 random bytes; mailed to the user, never stored.
pub fn generate_reset_secret() -> String {
    let mut buf = [0u8; RESET_SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// What gets stored and looked up for a reset secret.
pub fn digest_reset_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Constant-time string comparison.
///
/// Both inputs are padded to the longer length with different fill bytes, so
/// a length mismatch does not return early.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let max_len = a.len().max(b.len());
    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = (a.len() as u64).ct_eq(&(b.len() as u64));
    let contents_equal = a_padded.ct_eq(&b_padded);
    (lengths_equal & contents_equal).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..200 {
            let otp = generate_otp();
            assert!(is_otp_shape(&otp), "bad otp {otp}");
        }
    }

    #[test]
    fn otp_shape_rejects_non_digits() {
        assert!(!is_otp_shape("12345"));
        assert!(!is_otp_shape("1234567"));
        assert!(!is_otp_shape("12a456"));
        assert!(is_otp_shape("000000"));
    }

    #[test]
    fn reset_secret_is_random_hex() {
        let a = generate_reset_secret();
        let b = generate_reset_secret();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn digest_matches_known_sha256() {
        assert_eq!(
            digest_reset_secret("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(digest_reset_secret("abc"), "abc");
    }

    #[test]
    fn constant_time_eq_basics() {
        assert!(constant_time_eq("123456", "123456"));
        assert!(!constant_time_eq("123456", "123457"));
        assert!(!constant_time_eq("123", "123456"));
    }

    #[test]
    fn constant_time_eq_handles_prefixes_and_empty() {
        assert!(!constant_time_eq("123456", "123"));
        assert!(!constant_time_eq("", "000000"));
        assert!(constant_time_eq("", ""));
        // Zero bytes must not collide with the padding of a shorter input.
        assert!(!constant_time_eq("12\0", "12"));
    }
}
