//! Continuous-improvement advisor
//!
//! Tracks overall performance between cycles, adapts a step size, and
//! clusters a batch of generated ideas to point at the least-explored
//! region of the idea space.

use rand::Rng;
use std::collections::BTreeSet;

const STEP_GROWTH: f64 = 1.1;
const STEP_DECAY: f64 = 0.9;

/// Guideline added when a suggestion asks for more diverse ideas
pub const DIVERSITY_GUIDELINE: (&str, &str) =
    ("diversity", "Increase focus on generating diverse ideas");
/// Guideline added when a suggestion asks for more practical ideas
pub const PRACTICALITY_GUIDELINE: (&str, &str) =
    ("practicality", "Prioritize practical and implementable ideas");

/// Performance history and adaptive step size
#[derive(Debug, Clone)]
pub struct Advisor {
    step_size: f64,
    history: Vec<f64>,
}

impl Advisor {
    pub fn new(initial_step_size: f64) -> Self {
        Self {
            step_size: initial_step_size,
            history: Vec::new(),
        }
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Append `performance`; grow the step on improvement, shrink it otherwise
    pub fn record_performance(&mut self, performance: f64) {
        if let Some(&previous) = self.history.last() {
            if performance > previous {
                self.step_size *= STEP_GROWTH;
            } else {
                self.step_size *= STEP_DECAY;
            }
        }
        self.history.push(performance);
        tracing::debug!(
            performance,
            step_size = self.step_size,
            "Recorded advisor performance"
        );
    }
}

/// Guideline matching a "more diverse" / "more practical" request, if any
pub fn adaptation_for(feedback: &str) -> Option<(&'static str, &'static str)> {
    let lowered = feedback.to_lowercase();
    if lowered.contains("more diverse") {
        Some(DIVERSITY_GUIDELINE)
    } else if lowered.contains("more practical") {
        Some(PRACTICALITY_GUIDELINE)
    } else {
        None
    }
}

/// Per-word occurrence counts over the batch vocabulary (sorted word order)
pub fn vectorize_ideas(ideas: &[String]) -> Vec<Vec<f64>> {
    let vocabulary: BTreeSet<&str> = ideas
        .iter()
        .flat_map(|idea| idea.split_whitespace())
        .collect();

    ideas
        .iter()
        .map(|idea| {
            let words: Vec<&str> = idea.split_whitespace().collect();
            vocabulary
                .iter()
                .map(|v| words.iter().filter(|w| *w == v).count() as f64)
                .collect()
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// K-means clustering
// ─────────────────────────────────────────────────────────────────────────────

/// K-Means clustering with k-means++ seeding
#[derive(Debug, Clone)]
pub struct KMeans {
    /// Number of clusters
    k: usize,
    /// Maximum iterations
    max_iter: usize,
    centroids: Vec<Vec<f64>>,
    assignments: Vec<usize>,
    /// Sum of squared distances to assigned centroids
    inertia: f64,
    fitted: bool,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 100,
            centroids: Vec::new(),
            assignments: Vec::new(),
            inertia: f64::INFINITY,
            fitted: false,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Fit the model; empty input or `k == 0` leaves it unfitted
    pub fn fit<R: Rng + ?Sized>(&mut self, data: &[Vec<f64>], rng: &mut R) {
        if data.is_empty() || self.k == 0 {
            return;
        }

        let n_features = data[0].len();

        self.centroids = self.init_centroids(data, rng);
        self.assignments = data.iter().map(|s| self.nearest_centroid(s)).collect();

        for _ in 0..self.max_iter {
            // Empty clusters keep their previous centroid
            let mut sums = vec![vec![0.0; n_features]; self.k];
            let mut counts = vec![0usize; self.k];
            for (sample, &c) in data.iter().zip(&self.assignments) {
                counts[c] += 1;
                for (acc, &val) in sums[c].iter_mut().zip(sample) {
                    *acc += val;
                }
            }
            for (c, (sum, &count)) in sums.into_iter().zip(&counts).enumerate() {
                if count > 0 {
                    self.centroids[c] = sum.into_iter().map(|v| v / count as f64).collect();
                }
            }

            let next: Vec<usize> = data.iter().map(|s| self.nearest_centroid(s)).collect();
            if next == self.assignments {
                break;
            }
            self.assignments = next;
        }

        self.inertia = data
            .iter()
            .zip(&self.assignments)
            .map(|(sample, &c)| distance_squared(sample, &self.centroids[c]))
            .sum();
        self.fitted = true;
    }

    fn init_centroids<R: Rng + ?Sized>(&self, data: &[Vec<f64>], rng: &mut R) -> Vec<Vec<f64>> {
        let mut centroids = Vec::with_capacity(self.k);
        centroids.push(data[rng.random_range(0..data.len())].clone());

        while centroids.len() < self.k {
            let distances: Vec<f64> = data
                .iter()
                .map(|sample| {
                    centroids
                        .iter()
                        .map(|c| distance_squared(sample, c))
                        .fold(f64::INFINITY, f64::min)
                })
                .collect();

            let total: f64 = distances.iter().sum();
            let target = rng.random::<f64>() * total;

            // Rounding can leave the running sum short of target; fall back to the last sample
            let mut chosen = data.len() - 1;
            let mut cumsum = 0.0;
            for (i, &d) in distances.iter().enumerate() {
                cumsum += d;
                if cumsum >= target {
                    chosen = i;
                    break;
                }
            }
            centroids.push(data[chosen].clone());
        }

        centroids
    }

    fn nearest_centroid(&self, sample: &[f64]) -> usize {
        self.centroids
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                distance_squared(sample, a)
                    .partial_cmp(&distance_squared(sample, b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    pub fn predict(&self, sample: &[f64]) -> Option<usize> {
        if !self.fitted {
            return None;
        }
        Some(self.nearest_centroid(sample))
    }

    pub fn labels(&self) -> &[usize] {
        &self.assignments
    }

    pub fn centroids(&self) -> &[Vec<f64>] {
        &self.centroids
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Member count of every cluster `0..k`, including empty ones
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for &label in &self.assignments {
            if let Some(size) = sizes.get_mut(label) {
                *size += 1;
            }
        }
        sizes
    }

    /// Index of the smallest cluster; lowest index wins ties
    pub fn least_populated(&self) -> usize {
        self.cluster_sizes()
            .iter()
            .enumerate()
            .min_by_key(|(_, size)| **size)
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

fn distance_squared(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
