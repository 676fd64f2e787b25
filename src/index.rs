//! The per-document secure index: scheme parameters, the Bloom filter the
//! index is stored as, the re-hash step binding trapdoor values to a
//! document id, and the index builder with its padding countermeasure.

use std::collections::HashSet;

use rand::Rng;
use rand_core::RngCore;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInvalidParameters, ResultBoxedError};
use crate::keys::{MasterKey, Trapdoor};
use crate::utils::prf::{prf, MAX_PRF_BITS};
use crate::utils::sizing;

/// The `IndexParams` struct fixes the scheme-wide filter parameters: every
/// document's filter uses the same width `filter_len`, the same number of
/// positions per keyword `hash_count`, and the same PRF truncation width
/// `prf_bits`, so filters stay comparable across documents.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct IndexParams {
  filter_len: usize,
  hash_count: usize,
  prf_bits: usize,
}
impl IndexParams {
  pub fn new(
    filter_len: usize,
    hash_count: usize,
    prf_bits: usize,
  ) -> ResultBoxedError<Self> {
    if filter_len == 0 {
      return Err(Box::new(ErrorInvalidParameters::new(
        "filter width must be positive",
      )));
    }
    if hash_count == 0 {
      return Err(Box::new(ErrorInvalidParameters::new(
        "hash count must be positive",
      )));
    }
    if prf_bits == 0 || prf_bits > MAX_PRF_BITS {
      return Err(Box::new(ErrorInvalidParameters::new(&format!(
        "PRF truncation width must sit in [1, {}], got: {}",
        MAX_PRF_BITS, prf_bits,
      ))));
    }
    Ok(Self {
      filter_len,
      hash_count,
      prf_bits,
    })
  }

  /// Derives the filter width and hash count from a target false-positive
  /// rate and the expected number of unique keywords per document
  pub fn from_rates(
    fp_rate: f64,
    expected_keywords: usize,
    prf_bits: usize,
  ) -> ResultBoxedError<Self> {
    let filter_len = sizing::optimal_filter_len(fp_rate, expected_keywords)?;
    let hash_count = sizing::optimal_hash_count(filter_len, expected_keywords)?;
    Self::new(filter_len, hash_count, prf_bits)
  }

  pub fn filter_len(&self) -> usize {
    self.filter_len
  }

  pub fn hash_count(&self) -> usize {
    self.hash_count
  }

  pub fn prf_bits(&self) -> usize {
    self.prf_bits
  }
}

/// The `FilterIndex` trait is the capability interface the index builder and
/// the search engine program against. Alternative index structures (e.g. a
/// counting filter) can substitute for `BloomFilter` by implementing it.
pub trait FilterIndex {
  /// Records the given integer positions, each reduced modulo the filter
  /// width. Idempotent and order-independent.
  fn insert(&mut self, positions: &[u64]);

  /// Membership test: true iff every position maps to a set bit. False
  /// positives occur at the filter's inherent rate; false negatives never.
  fn query(&self, positions: &[u64]) -> bool;

  /// Fraction of set bits, in `[0, 1]`
  fn density(&self) -> f64;
}

/// A fixed-width bit array, one per document, all zero at construction.
/// Mutated only while its document's index is being built and padded;
/// read-only once published to the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloomFilter {
  bits: Vec<bool>,
}
impl BloomFilter {
  pub fn new(filter_len: usize) -> ResultBoxedError<Self> {
    if filter_len == 0 {
      return Err(Box::new(ErrorInvalidParameters::new(
        "filter width must be positive",
      )));
    }
    Ok(Self {
      bits: vec![false; filter_len],
    })
  }

  pub fn len(&self) -> usize {
    self.bits.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bits.is_empty()
  }

  pub fn as_slice(&self) -> &[bool] {
    &self.bits
  }

  /// Serializes the filter for upload to the server
  pub fn to_bytes(&self) -> ResultBoxedError<Vec<u8>> {
    Ok(bincode::serialize(self)?)
  }

  /// Parses a filter received over the wire
  pub fn from_bytes(bytes: &[u8]) -> ResultBoxedError<Self> {
    Ok(bincode::deserialize(bytes)?)
  }

  fn set(&mut self, position: u64) {
    let len = self.bits.len() as u64;
    self.bits[(position % len) as usize] = true;
  }
}
impl FilterIndex for BloomFilter {
  fn insert(&mut self, positions: &[u64]) {
    for &position in positions {
      self.set(position);
    }
  }

  /// Scans every position unconditionally before answering, so query time
  /// does not depend on which position is the first miss.
  fn query(&self, positions: &[u64]) -> bool {
    let len = self.bits.len() as u64;
    let mut all_set = true;
    for &position in positions {
      if !self.bits[(position % len) as usize] {
        all_set = false;
      }
    }
    all_set
  }

  fn density(&self) -> f64 {
    let set = self.bits.iter().filter(|&&bit| bit).count();
    set as f64 / self.bits.len() as f64
  }
}

/// Binds a trapdoor to a single document: each trapdoor value is re-hashed
/// with the document id as the HMAC key and the value's decimal rendering as
/// the message. The same keyword therefore lands on unrelated positions in
/// different documents' filters. Build and search both go through this
/// function; the scheme's recall hinges on the two sides staying symmetric.
pub fn bind_to_document(
  document_id: &str,
  trapdoor: &Trapdoor,
) -> ResultBoxedError<Vec<u64>> {
  trapdoor
    .as_slice()
    .iter()
    .map(|value| {
      prf(document_id.as_bytes(), &value.to_string(), trapdoor.prf_bits())
    })
    .collect()
}

/// Flips `fake_count` uniformly random positions of `filter` to one. This is
/// the leakage countermeasure applied after keyword insertion: it equalizes
/// the apparent bit density as a function of total word count rather than
/// unique keyword count. The random source is caller-supplied so tests can
/// seed or skip it.
pub fn pad_filter<R: RngCore>(
  filter: &mut BloomFilter,
  fake_count: usize,
  rng: &mut R,
) {
  let len = filter.len() as u64;
  for _ in 0..fake_count {
    filter.set(rng.gen_range(0..len));
  }
}

/// Builds the secure index for one document. Keywords are deduplicated,
/// each unique keyword's trapdoor is bound to `document_id`, the resulting
/// positions are inserted into a fresh filter, and `(u - v) * r` padding
/// bits are flipped, where `u` counts keyword occurrences and `v` unique
/// keywords. An empty keyword list yields an all-zero filter.
pub fn build_index<R: RngCore>(
  key: &MasterKey,
  params: &IndexParams,
  document_id: &str,
  keywords: &[String],
  rng: &mut R,
) -> ResultBoxedError<BloomFilter> {
  if key.prf_bits() != params.prf_bits() {
    return Err(Box::new(ErrorInvalidParameters::new(&format!(
      "key truncation width {} does not match params width {}",
      key.prf_bits(),
      params.prf_bits(),
    ))));
  }
  if key.subkey_count() != params.hash_count() {
    return Err(Box::new(ErrorInvalidParameters::new(&format!(
      "key subkey count {} does not match params hash count {}",
      key.subkey_count(),
      params.hash_count(),
    ))));
  }

  let mut filter = BloomFilter::new(params.filter_len())?;
  let unique: HashSet<&str> =
    keywords.iter().map(String::as_str).collect();
  for word in &unique {
    let trapdoor = key.trapdoor(word)?;
    let positions = bind_to_document(document_id, &trapdoor)?;
    filter.insert(&positions);
  }

  let fake_count = (keywords.len() - unique.len()) * params.hash_count();
  pad_filter(&mut filter, fake_count, rng);
  Ok(filter)
}
