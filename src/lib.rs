//! `zidx` implements a searchable symmetric encryption scheme built on
//! per-document secure indexes in the style of Goh's z-idx construction.
//! A client holding a master key derives, per keyword, an opaque trapdoor;
//! an untrusted server holding one Bloom filter per document can test the
//! trapdoor against every stored document without learning the keyword or
//! the document contents.

pub mod api;
pub mod errors;
pub mod index;
pub mod keys;
pub mod utils;
