//! Voronoi point picking.
//!
//! The Voronoi cell containing a pointer is the cell of its nearest site, so
//! the subdivision is stored as a 2-d tree over the sites and located with a
//! nearest-neighbour query.

use ordered_float::OrderedFloat;

use crate::core::Point;
use crate::interaction::HitTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn of(depth: usize) -> Self {
        if depth % 2 == 0 { Self::X } else { Self::Y }
    }

    fn coordinate(self, point: Point) -> f64 {
        match self {
            Self::X => point.x,
            Self::Y => point.y,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct KdNode {
    site: usize,
    axis: Axis,
    left: Option<usize>,
    right: Option<usize>,
}

/// Nearest-site picker over rendered point positions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VoronoiPicker {
    sites: Vec<(Point, HitTarget)>,
    nodes: Vec<KdNode>,
    root: Option<usize>,
    max_distance: Option<f64>,
}

impl VoronoiPicker {
    /// Builds the subdivision once; sites with non-finite coordinates are dropped.
    #[must_use]
    pub fn build(sites: impl IntoIterator<Item = (Point, HitTarget)>) -> Self {
        let sites: Vec<(Point, HitTarget)> = sites
            .into_iter()
            .filter(|(point, _)| point.is_finite())
            .collect();
        let mut order: Vec<usize> = (0..sites.len()).collect();
        let mut nodes = Vec::with_capacity(sites.len());
        let root = build_node(&sites, &mut order, 0, &mut nodes);
        Self {
            sites,
            nodes,
            root,
            max_distance: None,
        }
    }

    /// Ignores pointers farther than `max_distance` px from every site.
    #[must_use]
    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = Some(max_distance);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Target of the site nearest to `pointer`. Ties resolve to the earlier site.
    #[must_use]
    pub fn pick(&self, pointer: Point) -> Option<&HitTarget> {
        if !pointer.is_finite() {
            return None;
        }
        let mut best: Option<(OrderedFloat<f64>, usize)> = None;
        self.search(self.root, pointer, &mut best);
        let (distance_squared, site) = best?;
        if let Some(max_distance) = self.max_distance {
            if distance_squared.0 > max_distance * max_distance {
                return None;
            }
        }
        self.sites.get(site).map(|(_, target)| target)
    }

    fn search(
        &self,
        node: Option<usize>,
        pointer: Point,
        best: &mut Option<(OrderedFloat<f64>, usize)>,
    ) {
        let Some(node) = node.and_then(|index| self.nodes.get(index)) else {
            return;
        };
        let site_point = self.sites[node.site].0;
        let candidate = (OrderedFloat(site_point.distance_squared(pointer)), node.site);
        if best.is_none_or(|current| candidate < current) {
            *best = Some(candidate);
        }

        let delta = node.axis.coordinate(pointer) - node.axis.coordinate(site_point);
        let (near, far) = if delta < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };
        self.search(near, pointer, best);
        if best.is_none_or(|(distance, _)| delta * delta <= distance.0) {
            self.search(far, pointer, best);
        }
    }
}

fn build_node(
    sites: &[(Point, HitTarget)],
    order: &mut [usize],
    depth: usize,
    nodes: &mut Vec<KdNode>,
) -> Option<usize> {
    if order.is_empty() {
        return None;
    }
    let axis = Axis::of(depth);
    order.sort_by(|a, b| {
        OrderedFloat(axis.coordinate(sites[*a].0))
            .cmp(&OrderedFloat(axis.coordinate(sites[*b].0)))
            .then_with(|| a.cmp(b))
    });
    let median = order.len() / 2;
    let site = order[median];
    let (left_half, rest) = order.split_at_mut(median);
    let right_half = &mut rest[1..];
    let left = build_node(sites, left_half, depth + 1, nodes);
    let right = build_node(sites, right_half, depth + 1, nodes);
    nodes.push(KdNode {
        site,
        axis,
        left,
        right,
    });
    Some(nodes.len() - 1)
}
