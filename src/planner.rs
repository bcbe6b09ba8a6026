//! Ordering and routing composed, plus the caller-owned point list.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::osrm::RouteResult;
use crate::point::{Point, PointSequence};
use crate::retry::{retry, CancelToken, RetryPolicy};
use crate::solver::{path_cost, solve_with_cost, OrderSolution, SolveOptions};
use crate::store;
use crate::traits::RouteProvider;

/// Points in visiting order and the road route through them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedRoute {
    pub points: PointSequence,
    /// Summed straight-line distance along `points`, in degrees.
    pub straight_line_cost: f64,
    pub route: RouteResult,
}

pub struct RoutePlanner<R> {
    provider: R,
    options: SolveOptions,
    retry: RetryPolicy,
}

impl<R: RouteProvider> RoutePlanner<R> {
    pub fn new(provider: R) -> Self {
        Self {
            provider,
            options: SolveOptions::default(),
            retry: RetryPolicy::routing(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: SolveOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Best visiting order with `points[0]` pinned as origin.
    pub fn optimize(&self, points: &[Point]) -> Result<OrderSolution> {
        solve_with_cost(points, &self.options)?
            .ok_or_else(|| Error::insufficient_points(points.len()))
    }

    /// Optionally reorder `points`, then fetch the road route through them.
    pub fn plan(&self, points: &[Point], optimize: bool, cancel: &CancelToken) -> Result<PlannedRoute> {
        if points.len() < 2 {
            return Err(Error::insufficient_points(points.len()));
        }

        let (order, straight_line_cost) = if optimize {
            let solution = self.optimize(points)?;
            (solution.points, solution.cost)
        } else {
            (points.to_vec(), path_cost(points))
        };

        let route = retry(&self.retry, cancel, Error::is_transient, |_| {
            self.provider.route_for(&order)
        })?;

        info!(
            stops = order.len(),
            distance_m = route.distance,
            duration_s = route.duration,
            "route planned"
        );

        Ok(PlannedRoute {
            points: order,
            straight_line_cost,
            route,
        })
    }
}

/// Mutable point list owned by the caller between planning calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanningSession {
    points: PointSequence,
}

impl PlanningSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: PointSequence) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn origin(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn add(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn remove(&mut self, index: usize) -> Option<Point> {
        (index < self.points.len()).then(|| self.points.remove(index))
    }

    /// Start over from a new origin; any previous stops are dropped.
    pub fn set_origin(&mut self, origin: Point) {
        self.points.clear();
        self.points.push(origin);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Reorder the stored points in place. Lists under two points are left as is.
    pub fn optimize(&mut self, options: &SolveOptions) -> Result<()> {
        if let Some(solution) = solve_with_cost(&self.points, options)? {
            self.points = solution.points;
        }
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        store::save_points(path, &self.points)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_points(store::load_points(path)?))
    }
}
