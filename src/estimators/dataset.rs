// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Nearest-neighbour radii for kNN entropy estimators.
//!
//! Queries in 1 to [`MAX_TREE_DIMENSION`] dimensions go through a kiddo KD-tree
//! for every metric; wider data uses a brute-force scan parallelised over query
//! points with rayon.

use kiddo::traits::DistanceMetric;
use kiddo::{ImmutableKdTree, Manhattan, SquaredEuclidean};
use ndarray::ArrayView2;
use rayon::prelude::*;
use std::num::NonZeroUsize;

use super::Metric;
use crate::error::EstimatorError;

/// Widest data handled by the KD-tree path.
pub const MAX_TREE_DIMENSION: usize = 10;

/// Chebyshev distance (L-infinity norm) for kiddo.
pub struct ChebyshevDistance;

impl<const K: usize> DistanceMetric<f64, K> for ChebyshevDistance {
    fn dist(a: &[f64; K], b: &[f64; K]) -> f64 {
        let mut max = 0.0;
        for i in 0..K {
            let diff = (a[i] - b[i]).abs();
            if diff > max {
                max = diff;
            }
        }
        max
    }

    fn dist1(a: f64, b: f64) -> f64 {
        (a - b).abs()
    }

    // The box bound is the largest per-axis offset, not their sum
    fn accumulate(rd: f64, delta: f64) -> f64 {
        rd.max(delta)
    }
}

/// Distances to the 1st..`k_max`-th neighbour of every point, self excluded.
///
/// `radii[j][i]` is the distance from point `i` to its `(j + 1)`-th neighbour.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborRadii {
    radii: Vec<Vec<f64>>,
}

impl NeighborRadii {
    /// Radii to the `k`-th neighbour (`1 <= k <= k_max`).
    pub fn kth(&self, k: usize) -> &[f64] {
        &self.radii[k - 1]
    }

    pub fn k_max(&self) -> usize {
        self.radii.len()
    }

    /// Assemble from per-point rows `[r_1, ..., r_kmax]`.
    fn from_rows(rows: Vec<Vec<f64>>, k_max: usize) -> Self {
        let mut radii = vec![Vec::with_capacity(rows.len()); k_max];
        for row in rows {
            for (j, r) in row.into_iter().enumerate() {
                radii[j].push(r);
            }
        }
        Self { radii }
    }
}

/// Fixed-dimension point cloud backed by an immutable KD-tree.
pub struct NdDataset<const K: usize> {
    pub points: Vec<[f64; K]>,
    pub tree: ImmutableKdTree<f64, K>,
}

impl<const K: usize> NdDataset<K> {
    pub fn from_view(data: ArrayView2<'_, f64>) -> Self {
        let points = to_points::<K>(data);
        let tree = ImmutableKdTree::new_from_slice(&points);
        Self { points, tree }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Neighbour radii for `k = 1..=k_max`. Requires `k_max < len()`.
    pub fn neighbor_radii(&self, metric: Metric, k_max: usize) -> NeighborRadii {
        let query = NonZeroUsize::new(k_max + 1).unwrap_or(NonZeroUsize::MIN);
        let rows = self
            .points
            .iter()
            .map(|p| match metric {
                Metric::Manhattan => {
                    let neigh = self.tree.nearest_n::<Manhattan>(p, query);
                    neigh.iter().skip(1).map(|nn| nn.distance).collect()
                }
                Metric::Chebyshev => {
                    let neigh = self.tree.nearest_n::<ChebyshevDistance>(p, query);
                    neigh.iter().skip(1).map(|nn| nn.distance).collect()
                }
                // SquaredEuclidean reports squared distances
                Metric::Euclidean => {
                    let neigh = self.tree.nearest_n::<SquaredEuclidean>(p, query);
                    neigh.iter().skip(1).map(|nn| nn.distance.sqrt()).collect()
                }
            })
            .collect();
        NeighborRadii::from_rows(rows, k_max)
    }
}

fn to_points<const K: usize>(data: ArrayView2<'_, f64>) -> Vec<[f64; K]> {
    data.rows()
        .into_iter()
        .map(|row| {
            let mut p = [0.0; K];
            for (dst, &src) in p.iter_mut().zip(row.iter()) {
                *dst = src;
            }
            p
        })
        .collect()
}

fn distance(metric: Metric, a: &[f64], b: &[f64]) -> f64 {
    let diffs = a.iter().zip(b).map(|(x, y)| (x - y).abs());
    match metric {
        Metric::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
        Metric::Manhattan => diffs.sum(),
        Metric::Chebyshev => diffs.fold(0.0, f64::max),
    }
}

/// O(N^2) neighbour radii for any metric and dimension.
pub fn brute_force_radii(data: ArrayView2<'_, f64>, metric: Metric, k_max: usize) -> NeighborRadii {
    let points: Vec<Vec<f64>> = data.rows().into_iter().map(|r| r.to_vec()).collect();
    let rows = (0..points.len())
        .into_par_iter()
        .map(|i| {
            let mut dists: Vec<f64> = points
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, q)| distance(metric, &points[i], q))
                .collect();
            dists.select_nth_unstable_by(k_max - 1, f64::total_cmp);
            let mut nearest = dists[..k_max].to_vec();
            nearest.sort_unstable_by(f64::total_cmp);
            nearest
        })
        .collect();
    NeighborRadii::from_rows(rows, k_max)
}

macro_rules! tree_radii {
    ($data:expr, $metric:expr, $k_max:expr, [$($dim:literal),+]) => {
        match $data.ncols() {
            $($dim => NdDataset::<$dim>::from_view($data).neighbor_radii($metric, $k_max),)+
            _ => brute_force_radii($data, $metric, $k_max),
        }
    };
}

/// Neighbour radii for `k = 1..=k_max` over the rows of `data`.
pub fn neighbor_radii(
    data: ArrayView2<'_, f64>,
    metric: Metric,
    k_max: usize,
) -> Result<NeighborRadii, EstimatorError> {
    let (n, dimension) = data.dim();
    if dimension == 0 {
        return Err(EstimatorError::InvalidInput("sample has no columns".into()));
    }
    if k_max == 0 {
        return Err(EstimatorError::InvalidInput("neighbour index must be at least 1".into()));
    }
    if k_max >= n {
        return Err(EstimatorError::InvalidInput(format!(
            "{n} samples are too few for the {k_max}-th neighbour"
        )));
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(EstimatorError::InvalidInput("sample contains non-finite values".into()));
    }

    Ok(tree_radii!(data, metric, k_max, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]))
}
