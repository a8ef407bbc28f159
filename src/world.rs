//! Simulated clusters and the nodes they carry.
//!
//! A [`World`] is built in one go by [`World::generate`] and replaced wholesale
//! whenever the viewport changes; nothing in it survives a rebuild.

use std::f64::consts::TAU;

use log::debug;
use rand::Rng;

use crate::config::BackgroundConfig;
use crate::math::{fibonacci_sphere_point, length};
use crate::node::Node;

/// Drawing-surface dimensions in world units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Viewport { width, height }
    }

    /// A viewport with no area cannot host a world
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Camera position; projection is relative to this point
    pub fn center(&self) -> [f64; 2] {
        [self.width / 2.0, self.height / 2.0]
    }
}

/// One rotating sphere of nodes.
///
/// Radius, depth and spin are fixed at construction. Position, velocity and
/// the rotation angles only change through the physics step.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub(crate) position: [f64; 2],
    depth: f64,
    pub(crate) velocity: [f64; 2],
    pub(crate) angle_y: f64,
    pub(crate) angle_x: f64,
    spin_y: f64,
    spin_x: f64,
    radius: f64,
}

impl Cluster {
    /// A non-rotating cluster
    pub fn new(position: [f64; 2], depth: f64, velocity: [f64; 2], radius: f64) -> Self {
        Cluster {
            position,
            depth,
            velocity,
            angle_y: 0.0,
            angle_x: 0.0,
            spin_y: 0.0,
            spin_x: 0.0,
            radius,
        }
    }

    /// Sets initial angles `[y, x]` and per-tick speeds `[y, x]`
    pub fn with_rotation(mut self, angles: [f64; 2], spin: [f64; 2]) -> Self {
        [self.angle_y, self.angle_x] = angles;
        [self.spin_y, self.spin_x] = spin;
        self
    }

    fn spawn<R: Rng + ?Sized>(viewport: Viewport, config: &BackgroundConfig, rng: &mut R) -> Self {
        let spawn = &config.spawn;
        let spin_y = lerp(spawn.spin, rng.gen());
        Cluster {
            position: random_position(viewport, rng),
            depth: (rng.gen::<f64>() - 0.5) * spawn.depth_range,
            velocity: [
                (rng.gen::<f64>() - 0.5) * spawn.drift_speed,
                (rng.gen::<f64>() - 0.5) * spawn.drift_speed,
            ],
            angle_y: rng.gen::<f64>() * TAU,
            angle_x: rng.gen::<f64>() * TAU,
            spin_y,
            spin_x: spin_y * spawn.spin_x_ratio,
            radius: config.cluster_base_radius * lerp(spawn.radius_factor, rng.gen()),
        }
    }

    pub fn position(&self) -> [f64; 2] {
        self.position
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn velocity(&self) -> [f64; 2] {
        self.velocity
    }

    /// Current rotation `[y, x]`
    pub fn angles(&self) -> [f64; 2] {
        [self.angle_y, self.angle_x]
    }

    /// Per-tick rotation speed `[y, x]`
    pub fn spin(&self) -> [f64; 2] {
        [self.spin_y, self.spin_x]
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Centre distance to another cluster
    pub fn distance_to(&self, other: &Cluster) -> f64 {
        length([
            self.position[0] - other.position[0],
            self.position[1] - other.position[1],
        ])
    }

    /// Nodes spread over this cluster's sphere
    pub fn fibonacci_nodes(&self, count: usize) -> Vec<Node> {
        (0..count)
            .map(|i| Node::new(fibonacci_sphere_point(i, count, self.radius)))
            .collect()
    }
}

/// A cluster together with the nodes it owns
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterGroup {
    pub(crate) cluster: Cluster,
    pub(crate) nodes: Vec<Node>,
}

impl ClusterGroup {
    pub fn new(cluster: Cluster, nodes: Vec<Node>) -> Self {
        ClusterGroup { cluster, nodes }
    }

    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

/// Every cluster of one mounted background, in draw order
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    viewport: Viewport,
    pub(crate) groups: Vec<ClusterGroup>,
}

impl World {
    pub fn new(viewport: Viewport, groups: Vec<ClusterGroup>) -> Self {
        World { viewport, groups }
    }

    /// Builds a world from hand-placed clusters with Fibonacci nodes
    pub fn from_clusters(
        viewport: Viewport,
        clusters: Vec<Cluster>,
        nodes_per_cluster: usize,
    ) -> Self {
        let groups = clusters
            .into_iter()
            .map(|cluster| {
                let nodes = cluster.fibonacci_nodes(nodes_per_cluster);
                ClusterGroup::new(cluster, nodes)
            })
            .collect();
        World::new(viewport, groups)
    }

    /// Randomly places `config.cluster_count` clusters inside the viewport.
    ///
    /// Each cluster is resampled while it sits closer than
    /// `r_a + r_b + placement_padding` to one already placed, at most
    /// `max_placement_attempts` times; after that the overlap is accepted.
    pub fn generate<R: Rng + ?Sized>(
        viewport: Viewport,
        config: &BackgroundConfig,
        rng: &mut R,
    ) -> Self {
        let padding = config.spawn.placement_padding;
        let max_attempts = config.spawn.max_placement_attempts;
        let mut groups: Vec<ClusterGroup> = Vec::with_capacity(config.cluster_count);

        for index in 0..config.cluster_count {
            let mut cluster = Cluster::spawn(viewport, config, rng);

            let mut attempts = 0;
            while overlaps_any(&cluster, &groups, padding) {
                if attempts >= max_attempts {
                    debug!(
                        "cluster {} still overlaps after {} placement attempts, keeping it",
                        index, attempts
                    );
                    break;
                }
                cluster.position = random_position(viewport, rng);
                attempts += 1;
            }

            let nodes = cluster.fibonacci_nodes(config.nodes_per_cluster);
            groups.push(ClusterGroup::new(cluster, nodes));
        }

        debug!(
            "generated world {}x{} with {} clusters",
            viewport.width,
            viewport.height,
            groups.len()
        );
        World::new(viewport, groups)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn groups(&self) -> &[ClusterGroup] {
        &self.groups
    }

    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.groups.iter().map(|group| &group.cluster)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.groups.iter().flat_map(|group| group.nodes.iter())
    }

    pub fn node_count(&self) -> usize {
        self.groups.iter().map(|group| group.nodes.len()).sum()
    }
}

fn overlaps_any(cluster: &Cluster, placed: &[ClusterGroup], padding: f64) -> bool {
    placed.iter().any(|group| {
        let other = &group.cluster;
        cluster.distance_to(other) < cluster.radius + other.radius + padding
    })
}

fn random_position<R: Rng + ?Sized>(viewport: Viewport, rng: &mut R) -> [f64; 2] {
    [
        rng.gen::<f64>() * viewport.width,
        rng.gen::<f64>() * viewport.height,
    ]
}

fn lerp([lo, hi]: [f64; 2], t: f64) -> f64 {
    lo + (hi - lo) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generated_clusters_respect_config_ranges() {
        let config = BackgroundConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let world = World::generate(Viewport::new(1280.0, 720.0), &config, &mut rng);

        assert_eq!(world.groups().len(), 6);
        assert_eq!(world.node_count(), 6 * 60);
        for cluster in world.clusters() {
            assert!(cluster.radius() >= 80.0 * 0.6 && cluster.radius() < 80.0 * 1.4);
            assert!(cluster.depth().abs() <= 300.0);
            assert!(cluster.velocity().iter().all(|v| v.abs() <= 0.15));
            let [spin_y, spin_x] = cluster.spin();
            assert!((0.001..0.002).contains(&spin_y));
            assert!((spin_x - spin_y * 0.5).abs() < 1e-15);
            let [x, y] = cluster.position();
            assert!((0.0..1280.0).contains(&x) && (0.0..720.0).contains(&y));
        }
    }

    #[test]
    fn placement_avoids_overlap_when_there_is_room() {
        let mut config = BackgroundConfig::default();
        config.cluster_count = 3;
        config.spawn.max_placement_attempts = 1000;
        let mut rng = StdRng::seed_from_u64(3);
        let world = World::generate(Viewport::new(4000.0, 4000.0), &config, &mut rng);

        let clusters: Vec<&Cluster> = world.clusters().collect();
        for (i, a) in clusters.iter().enumerate() {
            for b in &clusters[i + 1..] {
                assert!(a.distance_to(b) >= a.radius() + b.radius() + 100.0);
            }
        }
    }

    #[test]
    fn placement_gives_up_in_a_tiny_viewport() {
        let mut config = BackgroundConfig::default();
        config.cluster_count = 10;
        let mut rng = StdRng::seed_from_u64(11);
        let world = World::generate(Viewport::new(10.0, 10.0), &config, &mut rng);
        assert_eq!(world.groups().len(), 10);
    }

    #[test]
    fn viewport_usability() {
        assert!(Viewport::new(1.0, 1.0).is_usable());
        assert!(!Viewport::new(0.0, 100.0).is_usable());
        assert!(!Viewport::new(f64::NAN, 100.0).is_usable());
        assert_eq!(Viewport::new(200.0, 100.0).center(), [100.0, 50.0]);
    }
}
