//! Fixed-origin visiting order search.
//!
//! Exhaustive: every ordering of the non-origin stops is costed, so the
//! work grows as (n-1)!. `SolveOptions::max_points` bounds the input size.

use rayon::prelude::*;
use tracing::debug;

use crate::error::{Error, Result};
use crate::point::{Point, PointSequence};

/// Largest input (origin included) accepted by default: 9! orderings.
pub const DEFAULT_MAX_POINTS: usize = 10;

#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Maximum number of points, origin included.
    pub max_points: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_POINTS,
        }
    }
}

/// Best ordering found together with its straight-line cost.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSolution {
    pub points: PointSequence,
    pub cost: f64,
}

/// Order `points` so the summed straight-line distance from `points[0]`
/// through every other stop is minimal.
///
/// Returns an empty sequence for fewer than two points. Ties keep the
/// ordering that comes first in lexicographic index order.
pub fn solve(points: &[Point], options: &SolveOptions) -> Result<PointSequence> {
    Ok(solve_with_cost(points, options)?
        .map(|solution| solution.points)
        .unwrap_or_default())
}

/// Like [`solve`], also reporting the cost. `None` for fewer than two points.
pub fn solve_with_cost(points: &[Point], options: &SolveOptions) -> Result<Option<OrderSolution>> {
    if points.len() < 2 {
        return Ok(None);
    }
    if points.len() > options.max_points {
        return Err(Error::TooManyPoints {
            max: options.max_points,
            actual: points.len(),
        });
    }
    if let Some(index) = points.iter().position(|point| !point.is_finite()) {
        return Err(Error::NonFinitePoint {
            index,
            point: points[index],
        });
    }

    let matrix = distance_matrix(points);
    let stops = points.len() - 1;
    debug!(stops, orderings = factorial(stops), "searching visiting orders");

    // Lexicographic order groups orderings by their first stop, so each
    // block can be searched on its own and reduced in block order.
    let blocks: Vec<(f64, Vec<usize>)> = (1..=stops)
        .into_par_iter()
        .map(|first| best_in_block(first, stops, &matrix))
        .collect();

    let mut best: Option<(f64, Vec<usize>)> = None;
    for (cost, order) in blocks {
        if best.as_ref().is_none_or(|(best_cost, _)| cost < *best_cost) {
            best = Some((cost, order));
        }
    }

    Ok(best.map(|(cost, order)| OrderSolution {
        points: std::iter::once(points[0])
            .chain(order.into_iter().map(|index| points[index]))
            .collect(),
        cost,
    }))
}

/// Summed straight-line distance along `points` in the given order.
///
/// The first leg is added to the separately summed remaining legs, the
/// same association the search uses, so equal orderings compare equal.
pub fn path_cost(points: &[Point]) -> f64 {
    let Some((origin, stops)) = points.split_first() else {
        return 0.0;
    };
    let Some(first) = stops.first() else {
        return 0.0;
    };
    let tail = stops
        .windows(2)
        .map(|pair| pair[0].euclidean(&pair[1]))
        .fold(0.0, |total, leg| total + leg);
    origin.euclidean(first) + tail
}

/// Best ordering among those visiting `first` right after the origin.
fn best_in_block(first: usize, stops: usize, matrix: &[Vec<f64>]) -> (f64, Vec<usize>) {
    let mut rest: Vec<usize> = (1..=stops).filter(|&index| index != first).collect();
    let mut best_cost = f64::INFINITY;
    let mut best_rest = rest.clone();

    loop {
        let mut tail = 0.0;
        let mut previous = first;
        for &index in &rest {
            tail += matrix[previous][index];
            previous = index;
        }
        let cost = matrix[0][first] + tail;

        if cost < best_cost {
            best_cost = cost;
            best_rest.copy_from_slice(&rest);
        }

        if !next_permutation(&mut rest) {
            break;
        }
    }

    let mut order = Vec::with_capacity(stops);
    order.push(first);
    order.extend(best_rest);
    (best_cost, order)
}

/// Advance to the next lexicographic permutation. False once the last
/// permutation has been reached.
fn next_permutation(items: &mut [usize]) -> bool {
    if items.len() < 2 {
        return false;
    }

    let mut pivot = items.len() - 1;
    while pivot > 0 && items[pivot - 1] >= items[pivot] {
        pivot -= 1;
    }
    if pivot == 0 {
        return false;
    }

    let mut successor = items.len() - 1;
    while items[successor] <= items[pivot - 1] {
        successor -= 1;
    }
    items.swap(pivot - 1, successor);
    items[pivot..].reverse();
    true
}

fn distance_matrix(points: &[Point]) -> Vec<Vec<f64>> {
    points
        .iter()
        .map(|from| points.iter().map(|to| from.euclidean(to)).collect())
        .collect()
}

fn factorial(n: usize) -> u64 {
    (1..=n as u64).fold(1, u64::saturating_mul)
}

/// Bounded worker pool for solving many independent point sets.
///
/// Every search, including its internal parallelism, runs on the pool's
/// threads, so concurrent factorial work is capped at `threads`.
pub struct SolverPool {
    pool: rayon::ThreadPool,
    options: SolveOptions,
}

impl SolverPool {
    pub fn new(threads: usize, options: SolveOptions) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|index| format!("order-solver-{index}"))
            .build()?;
        Ok(Self { pool, options })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Solve each sequence; results are in input order.
    pub fn solve_all(&self, batch: &[PointSequence]) -> Vec<Result<PointSequence>> {
        self.pool.install(|| {
            batch
                .par_iter()
                .map(|points| solve(points, &self.options))
                .collect()
        })
    }
}
