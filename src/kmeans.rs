use log::{debug, info, warn};
use rand::Rng;

use crate::error::{Result, SegmentationError};
use crate::features::Feature;

/// Iteration cap used when the caller does not pick one.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Trained centroids plus the label of every input feature.
///
/// `labels[i]` is the cluster of `features[i]` and always indexes into
/// `centroids`. The model is read-only once built.
#[derive(Debug, Clone)]
pub struct ClusterModel {
    centroids: Vec<Feature>,
    labels: Vec<usize>,
    iterations: usize,
    converged: bool,
}

impl ClusterModel {
    pub fn centroids(&self) -> &[Feature] {
        &self.centroids
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Number of assignment passes that ran.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// `false` when the run stopped on the iteration cap.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Label of the centroid nearest to `query`.
    pub fn predict(&self, query: &Feature) -> usize {
        predict(&self.centroids, query)
    }
}

#[inline(always)]
pub fn distance_squared(a: &Feature, b: &Feature) -> f32 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    let d2 = a[2] - b[2];
    d0 * d0 + d1 * d1 + d2 * d2
}

/// Index of the centroid nearest to `query` by squared Euclidean distance.
/// Ties go to the lowest index.
pub fn predict(centroids: &[Feature], query: &Feature) -> usize {
    let mut best_idx = 0;
    let mut best_dist = f32::INFINITY;
    for (idx, c) in centroids.iter().enumerate() {
        let dist = distance_squared(query, c);
        if dist < best_dist {
            best_dist = dist;
            best_idx = idx;
        }
    }
    best_idx
}

/// Partition `features` into `k` clusters with Lloyd's algorithm.
///
/// Centroids are seeded with k-means++ drawn from `rng`, so a seeded generator
/// gives a reproducible model. Each pass assigns every feature to its nearest
/// centroid and then moves each centroid to the mean of its members; a
/// centroid left without members keeps its previous position. The loop stops
/// once a pass changes no assignment, or after `max_iterations` passes.
///
/// Fewer features than `k` is allowed: the surplus centroids duplicate
/// existing points and may end up empty.
pub fn cluster<R: Rng + ?Sized>(
    features: &[Feature],
    k: usize,
    max_iterations: usize,
    rng: &mut R,
) -> Result<ClusterModel> {
    if k < 1 {
        return Err(SegmentationError::InvalidK(k));
    }
    if features.is_empty() {
        return Err(SegmentationError::EmptyFeatures);
    }

    let max_iterations = max_iterations.max(1);
    let mut centroids = seed_centroids(features, k, rng);
    let mut labels = vec![usize::MAX; features.len()];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        iterations += 1;

        let changed = assign(features, &centroids, &mut labels);
        debug!("kmeans iter={iterations} reassigned={changed}");
        if changed == 0 {
            converged = true;
            break;
        }

        recompute_centroids(features, &labels, &mut centroids);
    }

    if converged {
        info!("kmeans converged after {iterations} iterations (k={k}, n={})", features.len());
    } else {
        warn!("kmeans stopped at iteration cap {max_iterations} (k={k})");
    }

    Ok(ClusterModel {
        centroids,
        labels,
        iterations,
        converged,
    })
}

/// k-means++ seeding: the first centroid is uniform, each later one is drawn
/// with probability proportional to its squared distance from the nearest
/// centroid chosen so far.
fn seed_centroids<R: Rng + ?Sized>(features: &[Feature], k: usize, rng: &mut R) -> Vec<Feature> {
    let n = features.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(features[rng.gen_range(0..n)]);

    let mut nearest: Vec<f32> = features
        .iter()
        .map(|f| distance_squared(f, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = nearest.iter().map(|&d| d as f64).sum();

        let idx = if total > 0.0 {
            let mut target = rng.r#gen::<f64>() * total;
            let mut chosen = None;
            let mut last_positive = 0;
            for (i, &d) in nearest.iter().enumerate() {
                if d <= 0.0 {
                    continue;
                }
                last_positive = i;
                target -= d as f64;
                if target < 0.0 {
                    chosen = Some(i);
                    break;
                }
            }
            // float rounding can leave a sliver of `target` after the last point
            chosen.unwrap_or(last_positive)
        } else {
            // every point already sits on a centroid
            rng.gen_range(0..n)
        };

        let next = features[idx];
        for (d, f) in nearest.iter_mut().zip(features) {
            *d = d.min(distance_squared(f, &next));
        }
        centroids.push(next);
    }

    centroids
}

/// Assign every feature to its nearest centroid, returning how many labels moved.
fn assign(features: &[Feature], centroids: &[Feature], labels: &mut [usize]) -> usize {
    let mut changed = 0;
    for (label, f) in labels.iter_mut().zip(features) {
        let best = predict(centroids, f);
        if *label != best {
            *label = best;
            changed += 1;
        }
    }
    changed
}

fn recompute_centroids(features: &[Feature], labels: &[usize], centroids: &mut [Feature]) {
    let k = centroids.len();
    let mut sums = vec![[0.0f64; 3]; k];
    let mut counts = vec![0usize; k];

    for (f, &label) in features.iter().zip(labels) {
        let sum = &mut sums[label];
        sum[0] += f[0] as f64;
        sum[1] += f[1] as f64;
        sum[2] += f[2] as f64;
        counts[label] += 1;
    }

    for ((centroid, sum), &count) in centroids.iter_mut().zip(&sums).zip(&counts) {
        if count == 0 {
            continue;
        }
        let n = count as f64;
        *centroid = [
            (sum[0] / n) as f32,
            (sum[1] / n) as f32,
            (sum[2] / n) as f32,
        ];
    }
}
