use crate::math::{depth_alpha, multiply_matrix_vector, perspective_scale, rotation_yx};
use crate::world::{Cluster, World};

/// Computes screen position, scale and alpha for every node in the world.
///
/// Each node is rotated about Y then X in its cluster's frame, moved to the
/// cluster's world position and depth, and projected towards a camera at the
/// viewport centre. The cluster depth never changes; only the rotated local
/// depth varies over time.
pub fn project(world: &mut World, focal_length: f64) {
    let center = world.viewport().center();
    for group in world.groups.iter_mut() {
        let cluster = &group.cluster;
        let [angle_y, angle_x] = cluster.angles();
        let rotation = rotation_yx(angle_y, angle_x);

        for node in group.nodes.iter_mut() {
            let rotated = multiply_matrix_vector(&rotation, &node.local());
            let world_position = to_world(cluster, &rotated);

            let Some(scale) = perspective_scale(focal_length, world_position[2]) else {
                node.hide();
                continue;
            };
            let screen = [
                center[0] + (world_position[0] - center[0]) * scale,
                center[1] + (world_position[1] - center[1]) * scale,
            ];
            if !(screen[0].is_finite() && screen[1].is_finite()) {
                node.hide();
                continue;
            }

            node.screen_position = screen;
            node.scale = scale;
            node.alpha = depth_alpha(scale);
        }
    }
}

/// Translates a rotated local offset into world space
fn to_world(cluster: &Cluster, rotated: &[f64; 3]) -> [f64; 3] {
    let [x, y] = cluster.position();
    [rotated[0] + x, rotated[1] + y, rotated[2] + cluster.depth()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::world::{ClusterGroup, Viewport};

    fn single(cluster: Cluster, local: [f64; 3]) -> World {
        World::new(
            Viewport::new(400.0, 300.0),
            vec![ClusterGroup::new(cluster, vec![Node::new(local)])],
        )
    }

    #[test]
    fn origin_node_at_depth_zero_lands_on_cluster() {
        let cluster = Cluster::new([100.0, 100.0], 0.0, [0.0, 0.0], 10.0);
        let mut world = single(cluster, [0.0; 3]);
        project(&mut world, 800.0);
        let node = &world.groups()[0].nodes()[0];
        assert_eq!(node.screen_position(), [100.0, 100.0]);
        assert_eq!(node.scale(), 1.0);
        assert_eq!(node.alpha(), 1.0);
    }

    #[test]
    fn farther_nodes_shrink_towards_center() {
        let cluster = Cluster::new([300.0, 150.0], 800.0, [0.0, 0.0], 10.0);
        let mut world = single(cluster, [0.0; 3]);
        project(&mut world, 800.0);
        let node = &world.groups()[0].nodes()[0];
        assert_eq!(node.scale(), 0.5);
        assert_eq!(node.screen_position(), [250.0, 150.0]);
        assert!((node.alpha() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn rotation_about_y_moves_x_into_depth() {
        let cluster = Cluster::new([0.0, 0.0], 0.0, [0.0, 0.0], 10.0)
            .with_rotation([std::f64::consts::FRAC_PI_2, 0.0], [0.0, 0.0]);
        let mut world = single(cluster, [10.0, 0.0, 0.0]);
        project(&mut world, 800.0);
        // x rotates onto +z: slightly farther away
        let node = &world.groups()[0].nodes()[0];
        assert!((node.scale() - 800.0 / 810.0).abs() < 1e-9);
    }

    #[test]
    fn node_behind_camera_is_hidden() {
        let cluster = Cluster::new([0.0, 0.0], -900.0, [0.0, 0.0], 10.0);
        let mut world = single(cluster, [0.0; 3]);
        project(&mut world, 800.0);
        let node = &world.groups()[0].nodes()[0];
        assert!(!node.is_visible());
        assert_eq!(node.alpha(), 0.0);
    }
}
