//! An animated "neural sphere" background: drifting, rotating clusters of
//! nodes on Fibonacci spheres, perspective-projected and joined by fading
//! intra-cluster edges.
//!
//! [`NeuralBackground`] owns the simulated [`World`] and draws one frame per
//! [`tick`](NeuralBackground::tick) onto any [`DrawSurface`].

pub mod config;
pub mod error;
pub mod graphics;
pub mod math;
pub mod node;
pub mod physics;
pub mod projector;
pub mod renderer;
pub mod terminal;
pub mod widget;
pub mod world;

pub use config::{BackgroundConfig, PhysicsConfig, RenderConfig, SpawnConfig};
pub use error::{Error, Result};
pub use graphics::{DrawSurface, PixelCanvas, Rgb};
pub use node::Node;
pub use renderer::FrameStats;
pub use terminal::TerminalCanvas;
pub use widget::{FrameOutcome, LoopState, NeuralBackground};
pub use world::{Cluster, ClusterGroup, Viewport, World};
