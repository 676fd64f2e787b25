//! Utility modules for the keyed PRF and the filter-sizing conventions used
//! by the secure-index scheme.

/// The keyed pseudorandom function that underlies both trapdoor derivation
/// and the per-document re-hash step.
pub mod prf {
  use hmac::{Hmac, Mac};
  use sha2::Sha256;

  use crate::errors::ErrorInvalidParameters;
  use crate::errors::ResultBoxedError;

  type HmacSha256 = Hmac<Sha256>;

  /// Widest supported truncation. Outputs are machine words; filter
  /// positions are reduced modulo the filter width downstream, so wider
  /// truncations would not buy additional filter resolution.
  pub const MAX_PRF_BITS: usize = 64;

  /// Computes HMAC-SHA256 over `message` under `key`, reads the digest as a
  /// big-endian integer and truncates it to its low `bits` bits. Identical
  /// `(key, message, bits)` triples always produce identical outputs; search
  /// recall depends on this.
  pub fn prf(key: &[u8], message: &str, bits: usize) -> ResultBoxedError<u64> {
    if bits == 0 || bits > MAX_PRF_BITS {
      return Err(Box::new(ErrorInvalidParameters::new(&format!(
        "PRF truncation width must sit in [1, {}], got: {}",
        MAX_PRF_BITS, bits,
      ))));
    }
    let mut mac =
      HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(message.as_bytes());
    let digest = mac.finalize().into_bytes();

    // The low 64 bits of the big-endian digest are its trailing 8 bytes
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&digest[digest.len() - 8..]);
    let full = u64::from_be_bytes(tail);
    if bits == MAX_PRF_BITS {
      Ok(full)
    } else {
      Ok(full & ((1u64 << bits) - 1))
    }
  }
}

/// Sizing helpers for choosing filter parameters from a target
/// false-positive rate. Pure numerics, not part of the protocol itself.
pub mod sizing {
  use crate::errors::ErrorInvalidParameters;
  use crate::errors::ResultBoxedError;

  /// Returns the ideal filter width in bits for holding `expected_keywords`
  /// unique keywords at false-positive rate `fp_rate`:
  /// `m = -(n * ln p) / (ln 2)^2`, rounded to nearest.
  pub fn optimal_filter_len(
    fp_rate: f64,
    expected_keywords: usize,
  ) -> ResultBoxedError<usize> {
    if !(fp_rate > 0.0 && fp_rate < 1.0) {
      return Err(Box::new(ErrorInvalidParameters::new(&format!(
        "false-positive target must sit in (0, 1), got: {}",
        fp_rate,
      ))));
    }
    if expected_keywords == 0 {
      return Err(Box::new(ErrorInvalidParameters::new(
        "expected keyword count must be positive",
      )));
    }
    let ln2 = std::f64::consts::LN_2;
    let len = -(expected_keywords as f64 * fp_rate.ln()) / (ln2 * ln2);
    Ok(len.round() as usize)
  }

  /// Returns the ideal number of hash positions per keyword for a filter of
  /// `filter_len` bits holding `expected_keywords` unique keywords:
  /// `r = (m / n) * ln 2`, rounded to nearest and floored at one.
  pub fn optimal_hash_count(
    filter_len: usize,
    expected_keywords: usize,
  ) -> ResultBoxedError<usize> {
    if expected_keywords == 0 {
      return Err(Box::new(ErrorInvalidParameters::new(
        "expected keyword count must be positive",
      )));
    }
    let count = (filter_len as f64 / expected_keywords as f64)
      * std::f64::consts::LN_2;
    Ok((count.round() as usize).max(1))
  }
}

#[cfg(test)]
mod tests {
  use super::prf::{prf, MAX_PRF_BITS};
  use super::sizing::{optimal_filter_len, optimal_hash_count};
  use rand::rngs::StdRng;
  use rand::{Rng, SeedableRng};

  #[test]
  fn prf_is_deterministic() {
    let a = prf(b"subkey-material", "covid", 16).unwrap();
    let b = prf(b"subkey-material", "covid", 16).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn prf_respects_range_bound() {
    for bits in [1, 5, 8, 13, 16, 32, 63] {
      let out = prf(b"subkey-material", "fever", bits).unwrap();
      assert!(out < 1u64 << bits, "bits: {}, out: {}", bits, out);
    }
    // the full-width case cannot overflow by construction
    prf(b"subkey-material", "fever", MAX_PRF_BITS).unwrap();
  }

  #[test]
  fn prf_output_changes_with_message() {
    // At full width a collision between distinct messages is a 2^-64 event
    let mut rng = StdRng::from_seed([7u8; 32]);
    for _ in 0..100 {
      let m1 = format!("word-{}", rng.gen::<u64>());
      let m2 = format!("word-{}", rng.gen::<u64>());
      if m1 == m2 {
        continue;
      }
      let o1 = prf(b"subkey-material", &m1, MAX_PRF_BITS).unwrap();
      let o2 = prf(b"subkey-material", &m2, MAX_PRF_BITS).unwrap();
      assert_ne!(o1, o2, "collision for {} / {}", m1, m2);
    }
  }

  #[test]
  fn prf_narrow_width_collisions_stay_rare() {
    // At 16 bits the occasional collision is expected; most pairs differ
    let mut rng = StdRng::from_seed([8u8; 32]);
    let mut distinct = 0;
    let total = 200;
    for i in 0..total {
      let m1 = format!("left-{}-{}", i, rng.gen::<u64>());
      let m2 = format!("right-{}-{}", i, rng.gen::<u64>());
      let o1 = prf(b"subkey-material", &m1, 16).unwrap();
      let o2 = prf(b"subkey-material", &m2, 16).unwrap();
      if o1 != o2 {
        distinct += 1;
      }
    }
    assert!(distinct >= total - 5, "distinct pairs: {}/{}", distinct, total);
  }

  #[test]
  fn prf_output_changes_with_key() {
    let o1 = prf(b"subkey-one", "cough", MAX_PRF_BITS).unwrap();
    let o2 = prf(b"subkey-two", "cough", MAX_PRF_BITS).unwrap();
    assert_ne!(o1, o2);
  }

  #[test]
  fn prf_rejects_invalid_width() {
    assert!(prf(b"subkey-material", "covid", 0).is_err());
    assert!(prf(b"subkey-material", "covid", MAX_PRF_BITS + 1).is_err());
  }

  #[test]
  fn sizing_matches_textbook_values() {
    // n = 100, p = 1% gives m ~ 958.5 bits and r ~ 6.6 hashes
    assert_eq!(optimal_filter_len(0.01, 100).unwrap(), 959);
    assert_eq!(optimal_hash_count(959, 100).unwrap(), 7);

    // n = 50, p = 0.1%
    assert_eq!(optimal_filter_len(0.001, 50).unwrap(), 719);
    assert_eq!(optimal_hash_count(719, 50).unwrap(), 10);
  }

  #[test]
  fn sizing_floors_hash_count_at_one() {
    assert_eq!(optimal_hash_count(1, 100).unwrap(), 1);
  }

  #[test]
  fn sizing_rejects_invalid_targets() {
    assert!(optimal_filter_len(0.0, 100).is_err());
    assert!(optimal_filter_len(1.0, 100).is_err());
    assert!(optimal_filter_len(-0.5, 100).is_err());
    assert!(optimal_filter_len(0.01, 0).is_err());
    assert!(optimal_hash_count(1024, 0).is_err());
  }
}
