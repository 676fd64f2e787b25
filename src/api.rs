//! The `api` module is the public entry point for the secure-index scheme.
//! The client side generates a [`MasterKey`], derives [`Trapdoor`]s and
//! builds per-document filters; the server side holds an [`IndexStore`] and
//! answers trapdoor queries over every stored document.

use std::collections::HashMap;

use rand_core::OsRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub use crate::index::{BloomFilter, FilterIndex, IndexParams};
pub use crate::keys::{MasterKey, Trapdoor};

use crate::errors::{ErrorUnknownDocument, ResultBoxedError};
use crate::index::{bind_to_document, build_index};

/// The `IndexStore` is the server-side collection of per-document filters.
/// A document id always maps to a complete filter: insertion moves the
/// finished filter in, so a partially-built index is never visible. The
/// store holds filters only; ciphertext blobs keyed by the same document
/// ids live with the storage layer that fronts this scheme.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct IndexStore {
  indices: HashMap<String, BloomFilter>,
}
impl IndexStore {
  pub fn new() -> Self {
    Self {
      indices: HashMap::new(),
    }
  }

  /// Publishes the finished filter for `document_id`, replacing any
  /// previous filter for that document wholesale
  pub fn insert(&mut self, document_id: String, filter: BloomFilter) {
    self.indices.insert(document_id, filter);
  }

  /// Matches a trapdoor against every stored document: the trapdoor is
  /// re-bound to each document id and the document's filter queried with
  /// the resulting positions. Documents are tested in parallel; the result
  /// order is unspecified and callers should treat it as a set.
  pub fn search(&self, trapdoor: &Trapdoor) -> ResultBoxedError<Vec<String>> {
    let matches = self
      .indices
      .par_iter()
      .map(|(document_id, filter)| -> ResultBoxedError<Option<String>> {
        let positions = bind_to_document(document_id, trapdoor)?;
        if filter.query(&positions) {
          Ok(Some(document_id.clone()))
        } else {
          Ok(None)
        }
      })
      .collect::<ResultBoxedError<Vec<Option<String>>>>()?;
    Ok(matches.into_iter().flatten().collect())
  }

  /// Tests a trapdoor against a single stored document. Unlike `search`,
  /// asking about an id the store has never seen is an error here.
  pub fn query_document(
    &self,
    document_id: &str,
    trapdoor: &Trapdoor,
  ) -> ResultBoxedError<bool> {
    let filter = self
      .indices
      .get(document_id)
      .ok_or_else(|| ErrorUnknownDocument::new(document_id))?;
    let positions = bind_to_document(document_id, trapdoor)?;
    Ok(filter.query(&positions))
  }

  /// Returns the stored filter for a document id, if any
  pub fn get(&self, document_id: &str) -> Option<&BloomFilter> {
    self.indices.get(document_id)
  }

  pub fn contains(&self, document_id: &str) -> bool {
    self.indices.contains_key(document_id)
  }

  pub fn len(&self) -> usize {
    self.indices.len()
  }

  pub fn is_empty(&self) -> bool {
    self.indices.is_empty()
  }
}

/// Builds the filters for a batch of documents, in parallel across
/// documents. Each document's filter is built independently; padding
/// randomness comes from the system CSPRNG. The caller publishes the
/// returned filters into an [`IndexStore`].
pub fn build_indexes(
  key: &MasterKey,
  params: &IndexParams,
  documents: &[(String, Vec<String>)],
) -> ResultBoxedError<Vec<(String, BloomFilter)>> {
  documents
    .par_iter()
    .map(
      |(document_id, keywords)| -> ResultBoxedError<(String, BloomFilter)> {
        let filter =
          build_index(key, params, document_id, keywords, &mut OsRng)?;
        Ok((document_id.clone(), filter))
      },
    )
    .collect()
}
