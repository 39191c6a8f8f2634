//! k-nearest-neighbor candidate graph over edges treated as points in 4-D endpoint space.

use mingle_graph::Graph;
use rstar::RTree;
use rstar::primitives::GeomWithData;

/// An edge `[x0, y0, x1, y1]` seen as a point.
pub type Point4 = [f64; 4];

/// A nearest-neighbor index over keyed 4-D points.
pub trait SpatialIndex<K> {
    fn build(points: Vec<(Point4, K)>) -> Self
    where
        Self: Sized;

    /// Up to `k` entries ordered by ascending Euclidean distance to `point`.
    fn nearest(&self, point: &Point4, k: usize) -> Vec<(K, f64)>;
}

fn distance_2(a: &Point4, b: &Point4) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// R*-tree backed index.
pub struct RTreeIndex<K> {
    tree: RTree<GeomWithData<Point4, K>>,
}

impl<K: Clone> SpatialIndex<K> for RTreeIndex<K> {
    fn build(points: Vec<(Point4, K)>) -> Self {
        let entries = points
            .into_iter()
            .map(|(p, key)| GeomWithData::new(p, key))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    fn nearest(&self, point: &Point4, k: usize) -> Vec<(K, f64)> {
        self.tree
            .nearest_neighbor_iter(point)
            .take(k)
            .map(|entry| (entry.data.clone(), distance_2(entry.geom(), point).sqrt()))
            .collect()
    }
}

/// Linear-scan index; the reference the R*-tree is checked against.
#[derive(Debug, Clone)]
pub struct BruteForceIndex<K> {
    points: Vec<(Point4, K)>,
}

impl<K: Clone> SpatialIndex<K> for BruteForceIndex<K> {
    fn build(points: Vec<(Point4, K)>) -> Self {
        Self { points }
    }

    fn nearest(&self, point: &Point4, k: usize) -> Vec<(K, f64)> {
        let mut scored: Vec<(f64, usize)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, (p, _))| (distance_2(p, point), i))
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        scored
            .into_iter()
            .take(k)
            .map(|(d2, i)| (self.points[i].1.clone(), d2.sqrt()))
            .collect()
    }
}

/// Connects every node to its `k` nearest other nodes. `point` maps a node label to its position.
///
/// Each node sees itself as its own nearest hit, so `k + 1` entries are requested and the self
/// match dropped. Edges already present are kept as they are.
pub fn build_proximity_graph<I, N, E, F>(graph: &mut Graph<N, E>, k: usize, mut point: F)
where
    I: SpatialIndex<String>,
    E: Default,
    F: FnMut(&N) -> Point4,
{
    let points: Vec<(Point4, String)> = graph
        .nodes()
        .map(|(id, label)| (point(label), id.to_string()))
        .collect();
    let queries: Vec<(Point4, String)> = points.clone();
    let index = I::build(points);

    let mut added = 0usize;
    for (p, id) in &queries {
        for (other, _) in index
            .nearest(p, k.saturating_add(1))
            .into_iter()
            .filter(|(other, _)| other != id)
            .take(k)
        {
            if !graph.has_edge(id, &other) {
                graph.add_edge(id, &other, E::default());
                added += 1;
            }
        }
    }
    tracing::debug!(nodes = queries.len(), k, edges = added, "built proximity graph");
}
