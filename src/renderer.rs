use crate::config::BackgroundConfig;
use crate::graphics::DrawSurface;
use crate::world::World;

/// What one frame put on the surface
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub edges: usize,
    pub nodes: usize,
}

/// Draws the projected world, cluster by cluster: connection edges first,
/// then the node discs on top of them.
///
/// Edges only join nodes of the same cluster whose screen distance is below
/// `connection_distance`; their alpha falls off as `1 - d²/threshold²`.
pub fn render<S: DrawSurface + ?Sized>(
    world: &World,
    config: &BackgroundConfig,
    surface: &mut S,
) -> FrameStats {
    let mut stats = FrameStats::default();
    let threshold_sq = config.connection_distance * config.connection_distance;
    let edge_alpha = config.render.edge_intensity * config.opacity;

    for group in world.groups() {
        let nodes = group.nodes();

        if threshold_sq > 0.0 {
            for (i, n1) in nodes.iter().enumerate() {
                if !n1.is_visible() {
                    continue;
                }
                let [x1, y1] = n1.screen_position();
                for n2 in nodes[i + 1..].iter().filter(|n| n.is_visible()) {
                    let [x2, y2] = n2.screen_position();
                    let (dx, dy) = (x1 - x2, y1 - y2);
                    let dist_sq = dx * dx + dy * dy;
                    if dist_sq < threshold_sq {
                        let alpha = (1.0 - dist_sq / threshold_sq) * n1.alpha() * edge_alpha;
                        surface.stroke_line([x1, y1], [x2, y2], config.color, alpha);
                        stats.edges += 1;
                    }
                }
            }
        }

        for node in nodes.iter().filter(|n| n.is_visible()) {
            let size = config.render.node_size * node.scale();
            let alpha = node.alpha() * config.opacity;
            surface.fill_circle(node.screen_position(), size, config.color, alpha);
            stats.nodes += 1;
        }
    }
    stats
}
