//! In-memory flat vector index.
//!
//! Every search is a brute-force scan over all stored vectors. The index lives
//! for one request and is never persisted.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{GenieError, Result};
use crate::models::SearchHit;

/// How query and stored vectors are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    /// Squared Euclidean distance; lower scores are closer.
    #[default]
    L2,
    /// Cosine similarity; higher scores are closer.
    Cosine,
    /// Raw dot product; higher scores are closer.
    InnerProduct,
}

impl DistanceMetric {
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::L2 => squared_l2(a, b),
            DistanceMetric::Cosine => cosine_similarity(a, b),
            DistanceMetric::InnerProduct => dot(a, b),
        }
    }

    /// Orders scores best first.
    fn rank(&self, a: f32, b: f32) -> Ordering {
        let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        match self {
            DistanceMetric::L2 => ord,
            DistanceMetric::Cosine | DistanceMetric::InnerProduct => ord.reverse(),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DistanceMetric::L2 => "l2",
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::InnerProduct => "inner_product",
        };
        f.write_str(name)
    }
}

impl FromStr for DistanceMetric {
    type Err = GenieError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l2" | "euclidean" => Ok(DistanceMetric::L2),
            "cosine" => Ok(DistanceMetric::Cosine),
            "inner_product" | "ip" | "dot" => Ok(DistanceMetric::InnerProduct),
            other => Err(GenieError::config(format!(
                "unknown distance metric '{}', expected l2, cosine or inner_product",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
struct IndexEntry {
    text: String,
    vector: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct VectorIndex {
    metric: DistanceMetric,
    dimension: Option<usize>,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            metric,
            dimension: None,
            entries: Vec::new(),
        }
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Dimension fixed by the first inserted vector.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds a chunk. Its position is its insertion order.
    pub fn insert(&mut self, text: impl Into<String>, vector: Vec<f32>) -> Result<usize> {
        if vector.is_empty() {
            return Err(GenieError::index("cannot index an empty vector"));
        }
        match self.dimension {
            Some(expected) if expected != vector.len() => {
                return Err(GenieError::index(format!(
                    "dimension mismatch: expected {}, got {}",
                    expected,
                    vector.len()
                )));
            }
            Some(_) => {}
            None => self.dimension = Some(vector.len()),
        }

        self.entries.push(IndexEntry {
            text: text.into(),
            vector,
        });
        Ok(self.entries.len() - 1)
    }

    /// Returns up to `k` hits, best first. Equal scores keep chunk order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(expected) = self.dimension {
            if expected != query.len() {
                return Err(GenieError::index(format!(
                    "query dimension mismatch: expected {}, got {}",
                    expected,
                    query.len()
                )));
            }
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, self.metric.score(query, &entry.vector)))
            .collect();

        // sort_by is stable, so ties stay in chunk order
        scored.sort_by(|a, b| self.metric.rank(a.1, b.1));

        let hits = scored
            .into_iter()
            .take(k)
            .map(|(position, score)| SearchHit {
                position,
                content: self.entries[position].text.clone(),
                score,
            })
            .collect::<Vec<_>>();

        log::debug!("Index search returned {} of {} chunks", hits.len(), self.entries.len());
        Ok(hits)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
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

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot(a, b) / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(metric: DistanceMetric) -> VectorIndex {
        let mut index = VectorIndex::new(metric);
        index.insert("east", vec![1.0, 0.0]).unwrap();
        index.insert("north", vec![0.0, 1.0]).unwrap();
        index.insert("far east", vec![10.0, 0.0]).unwrap();
        index
    }

    #[test]
    fn l2_prefers_the_nearest_point() {
        let index = index_with(DistanceMetric::L2);
        let hits = index.search(&[0.9, 0.1], 3).unwrap();
        let order: Vec<&str> = hits.iter().map(|h| h.content.as_str()).collect();
        assert_eq!(order, vec!["east", "north", "far east"]);
        assert!((hits[0].score - 0.02).abs() < 1e-6);
    }

    #[test]
    fn cosine_ignores_magnitude() {
        let index = index_with(DistanceMetric::Cosine);
        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        // "east" and "far east" point the same way; the tie keeps insertion order
        assert_eq!(hits[0].content, "east");
        assert_eq!(hits[1].content, "far east");
        assert!((hits[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn inner_product_rewards_magnitude() {
        let index = index_with(DistanceMetric::InnerProduct);
        let hits = index.search(&[1.0, 0.0], 1).unwrap();
        assert_eq!(hits[0].content, "far east");
        assert_eq!(hits[0].position, 2);
    }

    #[test]
    fn k_caps_the_result_count() {
        let index = index_with(DistanceMetric::L2);
        assert_eq!(index.search(&[0.0, 0.0], 0).unwrap().len(), 0);
        assert_eq!(index.search(&[0.0, 0.0], 2).unwrap().len(), 2);
        assert_eq!(index.search(&[0.0, 0.0], 10).unwrap().len(), 3);
    }

    #[test]
    fn rejects_mixed_dimensions() {
        let mut index = VectorIndex::new(DistanceMetric::L2);
        index.insert("a", vec![1.0, 2.0, 3.0]).unwrap();
        assert!(matches!(index.insert("b", vec![1.0]), Err(GenieError::Index(_))));
        assert!(matches!(index.insert("c", vec![]), Err(GenieError::Index(_))));
        assert!(index.search(&[1.0, 2.0], 1).is_err());
        assert_eq!(index.len(), 1);
        assert_eq!(index.dimension(), Some(3));
    }

    #[test]
    fn metric_names_round_trip_through_config_strings() {
        assert_eq!("L2".parse::<DistanceMetric>().unwrap(), DistanceMetric::L2);
        assert_eq!("cosine".parse::<DistanceMetric>().unwrap(), DistanceMetric::Cosine);
        assert_eq!("ip".parse::<DistanceMetric>().unwrap(), DistanceMetric::InnerProduct);
        assert_eq!(DistanceMetric::InnerProduct.to_string(), "inner_product");
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
