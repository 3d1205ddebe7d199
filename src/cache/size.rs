use crate::utils::num::usize_to_u64;
use std::sync::Arc;

/// Approximate in-memory footprint of a cached value, used when the caller
/// does not pass an explicit size to `set`.
pub trait CacheWeight {
    fn weight(&self) -> u64;
}

impl CacheWeight for Vec<u8> {
    fn weight(&self) -> u64 {
        usize_to_u64(self.len())
    }
}

impl CacheWeight for Vec<f32> {
    fn weight(&self) -> u64 {
        usize_to_u64(std::mem::size_of_val(self.as_slice()))
    }
}

impl CacheWeight for String {
    fn weight(&self) -> u64 {
        usize_to_u64(self.len())
    }
}

impl CacheWeight for serde_json::Value {
    fn weight(&self) -> u64 {
        serde_json::to_vec(self).map(|v| usize_to_u64(v.len())).unwrap_or(0)
    }
}

impl<T: CacheWeight + ?Sized> CacheWeight for Arc<T> {
    fn weight(&self) -> u64 {
        (**self).weight()
    }
}

impl CacheWeight for [u8] {
    fn weight(&self) -> u64 {
        usize_to_u64(self.len())
    }
}

/// The artifact kinds produced by the indexing pipeline.
#[derive(Clone, Debug, PartialEq)]
pub enum Artifact {
    /// Encoded image or media bytes (thumbnails, previews).
    Bytes(Arc<[u8]>),
    /// Embedding vectors.
    Vector(Arc<[f32]>),
    Text(String),
    Json(serde_json::Value),
}

impl CacheWeight for Artifact {
    fn weight(&self) -> u64 {
        match self {
            Artifact::Bytes(b) => usize_to_u64(b.len()),
            Artifact::Vector(v) => usize_to_u64(std::mem::size_of_val(&**v)),
            Artifact::Text(s) => s.weight(),
            Artifact::Json(j) => j.weight(),
        }
    }
}

impl From<Vec<u8>> for Artifact {
    fn from(v: Vec<u8>) -> Self {
        Artifact::Bytes(v.into())
    }
}

impl From<Vec<f32>> for Artifact {
    fn from(v: Vec<f32>) -> Self {
        Artifact::Vector(v.into())
    }
}

impl From<String> for Artifact {
    fn from(s: String) -> Self {
        Artifact::Text(s)
    }
}

impl From<serde_json::Value> for Artifact {
    fn from(v: serde_json::Value) -> Self {
        Artifact::Json(v)
    }
}
