//! Client-side key material: the master key of `r` subkeys and the trapdoor
//! tokens derived from it.

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInvalidParameters, ResultBoxedError};
use crate::utils::prf::{prf, MAX_PRF_BITS};

/// The `MasterKey` holds the `r` client subkeys, each carrying exactly
/// `bits` bits of entropy. It is created once per client session, stays on
/// the client, and is threaded explicitly through every call that needs it.
/// There is no `Clone`: a single owner passes it by reference.
#[derive(Debug, Serialize, Deserialize)]
pub struct MasterKey {
  subkeys: Vec<Vec<u8>>,
  bits: usize,
}
impl MasterKey {
  /// Draws `subkey_count` subkeys of `ceil(bits / 8)` bytes each from the
  /// system CSPRNG. The spare high bits of the leading byte are cleared, so
  /// a subkey holds exactly `bits` bits of declared entropy; HMAC consumes
  /// the key as opaque bytes either way.
  pub fn generate(bits: usize, subkey_count: usize) -> ResultBoxedError<Self> {
    if bits == 0 || bits > MAX_PRF_BITS {
      return Err(Box::new(ErrorInvalidParameters::new(&format!(
        "subkey width must sit in [1, {}], got: {}",
        MAX_PRF_BITS, bits,
      ))));
    }
    if subkey_count == 0 {
      return Err(Box::new(ErrorInvalidParameters::new(
        "subkey count must be positive",
      )));
    }
    let byte_len = (bits + 7) / 8;
    let excess = byte_len * 8 - bits;
    let mut subkeys = Vec::with_capacity(subkey_count);
    for _ in 0..subkey_count {
      let mut subkey = vec![0u8; byte_len];
      OsRng.fill_bytes(&mut subkey);
      subkey[0] &= 0xff >> excess;
      subkeys.push(subkey);
    }
    Ok(Self { subkeys, bits })
  }

  /// Derives the trapdoor for `word`: one PRF output per subkey, in subkey
  /// order. The order is load-bearing, since the server re-derives
  /// per-document values positionally.
  pub fn trapdoor(&self, word: &str) -> ResultBoxedError<Trapdoor> {
    let values = self
      .subkeys
      .iter()
      .map(|subkey| prf(subkey, word, self.bits))
      .collect::<ResultBoxedError<Vec<u64>>>()?;
    Ok(Trapdoor {
      values,
      bits: self.bits,
    })
  }

  /// Returns the number of subkeys, i.e. the scheme's `r`
  pub fn subkey_count(&self) -> usize {
    self.subkeys.len()
  }

  /// Returns the PRF truncation width the subkeys were generated for
  pub fn prf_bits(&self) -> usize {
    self.bits
  }
}

/// The `Trapdoor` is the opaque query token the client computes for a single
/// keyword: the keyword's PRF image under every subkey, in subkey order. It
/// reveals nothing about the keyword to a party without the master key, and
/// it is the only keyword-derived value the server ever sees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trapdoor {
  values: Vec<u64>,
  bits: usize,
}
impl Trapdoor {
  pub fn as_slice(&self) -> &[u64] {
    &self.values
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Returns the PRF truncation width the values were truncated to
  pub fn prf_bits(&self) -> usize {
    self.bits
  }

  /// Serializes the trapdoor for transport to the server
  pub fn to_bytes(&self) -> ResultBoxedError<Vec<u8>> {
    Ok(bincode::serialize(self)?)
  }

  /// Parses a trapdoor received over the wire
  pub fn from_bytes(bytes: &[u8]) -> ResultBoxedError<Self> {
    Ok(bincode::deserialize(bytes)?)
  }

  /// Serializes the trapdoor as a base64-encoded string
  pub fn to_base64(&self) -> ResultBoxedError<String> {
    Ok(base64::encode(self.to_bytes()?))
  }

  /// Parses a trapdoor from a base64-encoded string
  pub fn from_base64(encoded: &str) -> ResultBoxedError<Self> {
    Self::from_bytes(&base64::decode(encoded)?)
  }
}
