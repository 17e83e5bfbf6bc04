//! Isolation forest for multivariate outlier scoring.
//!
//! Each tree recursively splits a random subsample on a random feature at a
//! random threshold. Points that are isolated in few splits get short paths
//! and high scores. Scores follow the usual normalization
//! `s = 2^(-E[h(x)] / c(n))`, and the highest `contamination` share of
//! scores is labelled anomalous.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

use crate::domain::error::DomainError;
use crate::domain::stats::{check_rectangular, percentile};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Forest parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsolationForest {
    trees: usize,
    sample_size: usize,
    contamination: f64,
    seed: u64,
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self {
            trees: 100,
            sample_size: 256,
            contamination: 0.05,
            seed: 42,
        }
    }
}

/// Score and label for one input row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsolationScore {
    pub score: f64,
    pub anomalous: bool,
}

impl IsolationForest {
    /// Build a forest configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidContamination`] unless
    /// `0 < contamination <= 0.5`.
    pub fn try_new(
        trees: usize,
        sample_size: usize,
        contamination: f64,
        seed: u64,
    ) -> Result<Self, DomainError> {
        if !(contamination > 0.0 && contamination <= 0.5) {
            return Err(DomainError::InvalidContamination {
                value: contamination,
            });
        }
        Ok(Self {
            trees: trees.max(1),
            sample_size: sample_size.max(2),
            contamination,
            seed,
        })
    }

    #[must_use]
    pub const fn contamination(&self) -> f64 {
        self.contamination
    }

    /// Fit the forest on `rows` and score the same rows.
    ///
    /// Deterministic for a fixed seed. An empty input yields an empty output.
    ///
    /// # Errors
    ///
    /// Fails if the rows are ragged.
    pub fn fit_predict(&self, rows: &[Vec<f64>]) -> Result<Vec<IsolationScore>, DomainError> {
        check_rectangular(rows)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let psi = self.sample_size.min(rows.len());
        let norm = average_path_length(psi);
        let scores: Vec<f64> = if norm > 0.0 {
            let forest = self.grow(rows, psi);
            rows.iter()
                .map(|row| {
                    let mean_path = forest.iter().map(|tree| tree.path_length(row, 0)).sum::<f64>()
                        / forest.len() as f64;
                    2f64.powf(-mean_path / norm)
                })
                .collect()
        } else {
            vec![0.5; rows.len()]
        };

        let threshold =
            percentile(&scores, 100.0 * (1.0 - self.contamination)).unwrap_or(f64::INFINITY);
        Ok(scores
            .into_iter()
            .map(|score| IsolationScore {
                score,
                anomalous: score > threshold,
            })
            .collect())
    }

    fn grow(&self, rows: &[Vec<f64>], psi: usize) -> Vec<Node> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let height_limit = (psi as f64).log2().ceil() as usize;
        (0..self.trees)
            .map(|_| {
                let indices = sample(&mut rng, rows.len(), psi).into_vec();
                Node::build(rows, indices, 0, height_limit, &mut rng)
            })
            .collect()
    }
}

enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn build(
        rows: &[Vec<f64>],
        indices: Vec<usize>,
        depth: usize,
        height_limit: usize,
        rng: &mut StdRng,
    ) -> Self {
        if depth >= height_limit || indices.len() <= 1 {
            return Node::Leaf {
                size: indices.len(),
            };
        }

        let width = rows[indices[0]].len();
        let splittable: Vec<(usize, f64, f64)> = (0..width)
            .filter_map(|feature| {
                let (min, max) = indices.iter().fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(lo, hi), &i| (lo.min(rows[i][feature]), hi.max(rows[i][feature])),
                );
                (max > min).then_some((feature, min, max))
            })
            .collect();
        if splittable.is_empty() {
            return Node::Leaf {
                size: indices.len(),
            };
        }

        let (feature, min, max) = splittable[rng.gen_range(0..splittable.len())];
        let threshold = rng.gen_range(min..max);
        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| rows[i][feature] < threshold);

        Node::Split {
            feature,
            threshold,
            left: Box::new(Node::build(rows, left, depth + 1, height_limit, rng)),
            right: Box::new(Node::build(rows, right, depth + 1, height_limit, rng)),
        }
    }

    fn path_length(&self, row: &[f64], depth: usize) -> f64 {
        match self {
            Node::Leaf { size } => depth as f64 + average_path_length(*size),
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] < *threshold {
                    left.path_length(row, depth + 1)
                } else {
                    right.path_length(row, depth + 1)
                }
            }
        }
    }
}

/// Average path length of an unsuccessful BST search over `n` points.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster_with_outlier() -> Vec<Vec<f64>> {
        let mut rows: Vec<Vec<f64>> = (0..99)
            .map(|i| {
                let x = f64::from(i % 10) * 0.1;
                let y = f64::from(i / 10) * 0.1;
                vec![x, y, 1.0]
            })
            .collect();
        rows.push(vec![25.0, -30.0, 1.0]);
        rows
    }

    #[test]
    fn contamination_is_validated() {
        assert!(IsolationForest::try_new(100, 256, 0.0, 42).is_err());
        assert!(IsolationForest::try_new(100, 256, 0.7, 42).is_err());
        assert!(IsolationForest::try_new(100, 256, 0.05, 42).is_ok());
    }

    #[test]
    fn far_point_scores_highest_and_is_flagged() {
        let rows = cluster_with_outlier();
        let scores = IsolationForest::default().fit_predict(&rows).unwrap();
        let outlier = scores[99];
        assert!(outlier.anomalous);
        assert!(scores[..99].iter().all(|s| s.score < outlier.score));
    }

    #[test]
    fn flags_roughly_the_contamination_share() {
        let rows = cluster_with_outlier();
        let flagged = IsolationForest::default()
            .fit_predict(&rows)
            .unwrap()
            .iter()
            .filter(|s| s.anomalous)
            .count();
        assert!((1..=5).contains(&flagged), "flagged {flagged}");
    }

    #[test]
    fn fixed_seed_is_deterministic() {
        let rows = cluster_with_outlier();
        let forest = IsolationForest::default();
        assert_eq!(forest.fit_predict(&rows).unwrap(), forest.fit_predict(&rows).unwrap());
    }

    #[test]
    fn identical_rows_are_never_flagged() {
        let rows = vec![vec![1.0, 1.0]; 20];
        let scores = IsolationForest::default().fit_predict(&rows).unwrap();
        assert!(scores.iter().all(|s| !s.anomalous));
    }

    #[test]
    fn tiny_inputs_do_not_panic() {
        let forest = IsolationForest::default();
        assert!(forest.fit_predict(&[]).unwrap().is_empty());
        assert_eq!(forest.fit_predict(&[vec![3.0]]).unwrap().len(), 1);
    }

    #[test]
    fn path_length_normalizer_matches_known_values() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        assert!((average_path_length(256) - 10.244_770_920_116_851).abs() < 1e-6);
    }
}
