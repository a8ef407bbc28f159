//! Configuration for the neural background.
//!
//! Every option has a default, so a YAML file only needs to name what it
//! overrides:
//!
//! ```yaml
//! color: "236, 72, 153"     # edge/node colour as an "r, g, b" triplet
//! opacity: 0.6              # multiplier for everything drawn
//! cluster_count: 8
//! nodes_per_cluster: 60
//! cluster_base_radius: 80.0
//! connection_distance: 40.0 # screen-space edge threshold
//! perspective: 800.0        # focal length
//!
//! spawn:
//!   placement_padding: 100.0
//!   max_placement_attempts: 20
//!
//! physics:
//!   bounds_margin: 150.0
//!   repulsion_padding: 50.0
//!
//! render:
//!   node_size: 1.5
//!   edge_intensity: 0.6
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::graphics::Rgb;

/// Top-level options recognised by the background.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BackgroundConfig {
    pub color: Rgb,
    /// Multiplies the alpha of every line and disc as it is drawn. Overlapping
    /// shapes therefore blend at the reduced alpha, unlike fading a finished
    /// layer as a whole.
    pub opacity: f64,
    pub cluster_count: usize,
    pub nodes_per_cluster: usize,
    pub cluster_base_radius: f64,
    pub connection_distance: f64,
    pub perspective: f64,
    pub spawn: SpawnConfig,
    pub physics: PhysicsConfig,
    pub render: RenderConfig,
}

/// Randomisation ranges used when a world is (re)generated.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SpawnConfig {
    /// Extra spacing between cluster rims the placement tries to keep.
    pub placement_padding: f64,
    /// Resamples per cluster before an overlapping position is accepted.
    pub max_placement_attempts: u32,
    /// Radius multiplier range applied to `cluster_base_radius`.
    pub radius_factor: [f64; 2],
    /// Velocity components are drawn from `[-drift_speed/2, drift_speed/2)`.
    pub drift_speed: f64,
    /// Cluster depth is drawn from `[-depth_range/2, depth_range/2)`.
    pub depth_range: f64,
    /// Per-tick rotation speed range about the Y axis.
    pub spin: [f64; 2],
    /// Rotation speed about X relative to the speed about Y.
    pub spin_x_ratio: f64,
}

/// Tuning for the per-tick physics step.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicsConfig {
    /// Slack beyond the viewport edges before a cluster bounces.
    pub bounds_margin: f64,
    /// Extra spacing between rims before repulsion kicks in.
    pub repulsion_padding: f64,
    /// Velocity nudge per unit of overlap.
    pub repulsion_gain: f64,
    /// Fraction of the overlap applied directly to positions.
    pub separation: f64,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Node disc radius at projected scale 1.0.
    pub node_size: f64,
    /// Edge alpha multiplier.
    pub edge_intensity: f64,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        BackgroundConfig {
            color: Rgb::new(139, 92, 246),
            opacity: 1.0,
            cluster_count: 6,
            nodes_per_cluster: 60,
            cluster_base_radius: 80.0,
            connection_distance: 40.0,
            perspective: 800.0,
            spawn: SpawnConfig::default(),
            physics: PhysicsConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        SpawnConfig {
            placement_padding: 100.0,
            max_placement_attempts: 20,
            radius_factor: [0.6, 1.4],
            drift_speed: 0.3,
            depth_range: 600.0,
            spin: [0.001, 0.002],
            spin_x_ratio: 0.5,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            bounds_margin: 150.0,
            repulsion_padding: 50.0,
            repulsion_gain: 0.005,
            separation: 0.05,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            node_size: 1.5,
            edge_intensity: 0.6,
        }
    }
}

impl BackgroundConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: BackgroundConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: BackgroundConfig = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the simulation cannot render sensibly.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.opacity) {
            let reason = format!("{} is outside 0..=1", self.opacity);
            return Err(invalid("opacity", reason));
        }
        if self.nodes_per_cluster == 0 {
            return Err(invalid("nodes_per_cluster", "must be at least 1".into()));
        }
        positive("cluster_base_radius", self.cluster_base_radius)?;
        positive("perspective", self.perspective)?;
        non_negative("connection_distance", self.connection_distance)?;

        let spawn = &self.spawn;
        non_negative("spawn.placement_padding", spawn.placement_padding)?;
        non_negative("spawn.drift_speed", spawn.drift_speed)?;
        non_negative("spawn.depth_range", spawn.depth_range)?;
        non_negative("spawn.spin_x_ratio", spawn.spin_x_ratio)?;
        ordered_range("spawn.radius_factor", spawn.radius_factor)?;
        ordered_range("spawn.spin", spawn.spin)?;
        if spawn.radius_factor[0] <= 0.0 {
            let reason = "lower bound must be positive".to_string();
            return Err(invalid("spawn.radius_factor", reason));
        }

        let physics = &self.physics;
        non_negative("physics.bounds_margin", physics.bounds_margin)?;
        non_negative("physics.repulsion_padding", physics.repulsion_padding)?;
        non_negative("physics.repulsion_gain", physics.repulsion_gain)?;
        non_negative("physics.separation", physics.separation)?;

        non_negative("render.node_size", self.render.node_size)?;
        non_negative("render.edge_intensity", self.render.edge_intensity)?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> Error {
    Error::InvalidConfig { field, reason }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{} must be a positive number", value)))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{} must be a non-negative number", value)))
    }
}

fn ordered_range(field: &'static str, [lo, hi]: [f64; 2]) -> Result<()> {
    if lo.is_finite() && hi.is_finite() && lo <= hi {
        Ok(())
    } else {
        Err(invalid(field, format!("[{}, {}] is not an ordered range", lo, hi)))
    }
}
