//! One simulation tick: drift, bounce, spin and pairwise repulsion.

use crate::config::PhysicsConfig;
use crate::math::length;
use crate::world::{Cluster, Viewport, World};

/// Advances every cluster in `world` by one tick
pub fn step(world: &mut World, config: &PhysicsConfig) {
    let viewport = world.viewport();
    for group in world.groups.iter_mut() {
        advance(&mut group.cluster, viewport, config.bounds_margin);
    }

    let n = world.groups.len();
    for i in 0..n {
        let (head, tail) = world.groups.split_at_mut(i + 1);
        let a = &mut head[i].cluster;
        for group in tail.iter_mut() {
            repel(a, &mut group.cluster, config);
        }
    }
}

/// Linear motion, rotation and reflective bounce for a single cluster.
///
/// The bounce only flips the velocity; a cluster may stay outside the
/// margin for a few ticks while it turns around.
pub fn advance(cluster: &mut Cluster, viewport: Viewport, margin: f64) {
    cluster.position[0] += cluster.velocity[0];
    cluster.position[1] += cluster.velocity[1];

    let [spin_y, spin_x] = cluster.spin();
    cluster.angle_y += spin_y;
    cluster.angle_x += spin_x;

    let [x, y] = cluster.position;
    if x < -margin || x > viewport.width + margin {
        cluster.velocity[0] = -cluster.velocity[0];
    }
    if y < -margin || y > viewport.height + margin {
        cluster.velocity[1] = -cluster.velocity[1];
    }
}

/// Pushes two clusters apart when their rims come within
/// `repulsion_padding` of each other.
///
/// Returns the overlap that was resolved, or `None` if the pair was clear.
pub fn repel(a: &mut Cluster, b: &mut Cluster, config: &PhysicsConfig) -> Option<f64> {
    let delta = [
        a.position[0] - b.position[0],
        a.position[1] - b.position[1],
    ];
    let min_distance = a.radius() + b.radius() + config.repulsion_padding;
    let distance = length(delta);
    if !(distance < min_distance) {
        return None;
    }

    let overlap = min_distance - distance;
    // Coincident centres get an arbitrary but finite direction
    let normal = if distance > 0.0 {
        [delta[0] / distance, delta[1] / distance]
    } else {
        [1.0, 0.0]
    };

    let push = config.repulsion_gain * overlap;
    let shift = config.separation * overlap;
    for axis in 0..2 {
        a.velocity[axis] += normal[axis] * push;
        b.velocity[axis] -= normal[axis] * push;
        a.position[axis] += normal[axis] * shift;
        b.position[axis] -= normal[axis] * shift;
    }
    Some(overlap)
}
