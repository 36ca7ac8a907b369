//! Exact nearest-neighbor index over chunk vectors
//!
//! Brute force: every query scores every stored vector.

use rayon::prelude::*;
use std::cmp::Ordering;

use crate::error::{Error, Result};

/// One search hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Insertion position of the stored vector
    pub index: usize,
    /// Euclidean distance to the query
    pub distance: f32,
}

/// Flat (uncompressed, unpartitioned) L2 index
///
/// Built once from a fixed set of vectors and read-only afterwards.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    /// Vector length fixed at build time
    dimensions: usize,
    /// Row-major vectors, `len * dimensions` values
    data: Vec<f32>,
    /// Stored vector count
    len: usize,
}

impl FlatL2Index {
    /// Build an index over `vectors`; at least one vector is required
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let dimensions = match vectors.first() {
            Some(first) => first.len(),
            None => {
                return Err(Error::empty_corpus("cannot build an index over zero vectors"));
            }
        };
        if dimensions == 0 {
            return Err(Error::embedding("vectors must have at least one dimension"));
        }

        let len = vectors.len();
        let mut data = Vec::with_capacity(len * dimensions);
        for vector in vectors {
            if vector.len() != dimensions {
                return Err(Error::DimensionMismatch {
                    expected: dimensions,
                    actual: vector.len(),
                });
            }
            data.extend_from_slice(&vector);
        }

        Ok(Self {
            dimensions,
            data,
            len,
        })
    }

    /// Vector length
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Stored vector count
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; an index is never built empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stored vector at `index`
    pub fn vector(&self, index: usize) -> Option<&[f32]> {
        if index >= self.len {
            return None;
        }
        let start = index * self.dimensions;
        Some(&self.data[start..start + self.dimensions])
    }

    /// The `k` closest vectors by ascending distance, lower index first on ties
    ///
    /// Returns every stored vector when `k` exceeds the index size.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let distances: Vec<f32> = self
            .data
            .par_chunks_exact(self.dimensions)
            .map(|stored| squared_l2(stored, query))
            .collect();

        let mut ranked: Vec<(usize, f32)> = distances.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| match a.1.total_cmp(&b.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });

        Ok(ranked
            .into_iter()
            .take(k.min(self.len))
            .map(|(index, squared)| Neighbor {
                index,
                distance: squared.sqrt(),
            })
            .collect())
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
