use std::time::Instant;

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::BackgroundConfig;
use crate::graphics::DrawSurface;
use crate::physics;
use crate::projector;
use crate::renderer::{self, FrameStats};
use crate::world::{Viewport, World};

/// Lifecycle of the animation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Not mounted; `tick` does nothing
    Idle,
    /// Mounted; the host calls `tick` once per display refresh
    Running,
}

/// Result of a single `tick`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The background is not mounted
    Idle,
    /// No usable surface or world this frame; nothing was advanced
    Skipped,
    /// The world was stepped and drawn
    Drawn(FrameStats),
}

/// The animated neural background component.
///
/// Owns the single mutable [`World`] and drives physics, projection and
/// rendering from [`tick`](Self::tick). Stopping the animation is a matter of
/// no longer calling `tick`, or calling [`unmount`](Self::unmount).
pub struct NeuralBackground {
    config: BackgroundConfig,
    rng: StdRng,
    state: LoopState,
    viewport: Option<Viewport>,
    world: Option<World>,
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl NeuralBackground {
    pub fn new(config: BackgroundConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// A background whose worlds are reproducible for a given seed
    pub fn with_seed(config: BackgroundConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: BackgroundConfig, rng: StdRng) -> Self {
        NeuralBackground {
            config,
            rng,
            state: LoopState::Idle,
            viewport: None,
            world: None,
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
        }
    }

    pub fn config(&self) -> &BackgroundConfig {
        &self.config
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    /// Frames drawn per second, refreshed about once a second
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Starts the loop and builds the first world
    pub fn mount(&mut self, width: f64, height: f64) {
        if self.state == LoopState::Running {
            debug!("mount while running, treating as resize");
        } else {
            info!("mounting neural background at {}x{}", width, height);
            self.state = LoopState::Running;
            self.frames_since_last_update = 0;
            self.last_fps_calculation = Instant::now();
        }
        self.rebuild(Viewport::new(width, height));
    }

    /// Discards the current world and builds a new one for the new size
    pub fn resize(&mut self, width: f64, height: f64) {
        if self.state == LoopState::Idle {
            trace!("resize to {}x{} ignored while idle", width, height);
            return;
        }
        debug!("resizing to {}x{}", width, height);
        self.rebuild(Viewport::new(width, height));
    }

    /// Rebuilds the world at the current size with fresh randomness
    pub fn regenerate(&mut self) {
        if let Some(viewport) = self.viewport {
            self.rebuild(viewport);
        }
    }

    /// Stops the loop and drops the world
    pub fn unmount(&mut self) {
        if self.state == LoopState::Running {
            info!("unmounting neural background");
        }
        self.state = LoopState::Idle;
        self.viewport = None;
        self.world = None;
        self.fps = 0.0;
    }

    /// Runs one frame: physics, projection, then drawing.
    ///
    /// With no surface, or before a usable size has been seen, the frame is
    /// skipped without touching the world; the next tick tries again.
    pub fn tick<S: DrawSurface + ?Sized>(&mut self, surface: Option<&mut S>) -> FrameOutcome {
        if self.state == LoopState::Idle {
            return FrameOutcome::Idle;
        }
        let (Some(surface), Some(world)) = (surface, self.world.as_mut()) else {
            trace!("no drawing surface or world, skipping frame");
            return FrameOutcome::Skipped;
        };

        surface.clear();
        physics::step(world, &self.config.physics);
        projector::project(world, self.config.perspective);
        let stats = renderer::render(world, &self.config, surface);

        self.count_frame();
        FrameOutcome::Drawn(stats)
    }

    fn rebuild(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        self.world = None;
        if !viewport.is_usable() {
            debug!(
                "viewport {}x{} has no area, waiting for a resize",
                viewport.width, viewport.height
            );
            return;
        }
        self.world = Some(World::generate(viewport, &self.config, &mut self.rng));
    }

    fn count_frame(&mut self) {
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{PixelCanvas, Rgb};

    fn canvas() -> PixelCanvas {
        PixelCanvas::new(160, 90, 0.125, Rgb::new(0, 0, 0))
    }

    #[test]
    fn idle_until_mounted() {
        let mut background = NeuralBackground::with_seed(BackgroundConfig::default(), 1);
        let mut surface = canvas();
        assert_eq!(background.state(), LoopState::Idle);
        assert_eq!(background.tick(Some(&mut surface)), FrameOutcome::Idle);

        background.resize(100.0, 100.0);
        assert!(background.world().is_none());
    }

    #[test]
    fn mount_tick_unmount() {
        let mut background = NeuralBackground::with_seed(BackgroundConfig::default(), 1);
        let mut surface = canvas();
        background.mount(1280.0, 720.0);
        assert_eq!(background.state(), LoopState::Running);

        let FrameOutcome::Drawn(stats) = background.tick(Some(&mut surface)) else {
            panic!("expected a drawn frame");
        };
        assert!(stats.nodes > 0);

        background.unmount();
        assert_eq!(background.state(), LoopState::Idle);
        assert!(background.world().is_none());
        assert_eq!(background.tick(Some(&mut surface)), FrameOutcome::Idle);
    }

    #[test]
    fn missing_surface_skips_without_advancing() {
        let mut background = NeuralBackground::with_seed(BackgroundConfig::default(), 5);
        background.mount(800.0, 600.0);
        let before = background.world().cloned();

        assert_eq!(background.tick(None::<&mut PixelCanvas>), FrameOutcome::Skipped);
        assert_eq!(background.world().cloned(), before);
    }

    #[test]
    fn empty_viewport_waits_for_resize() {
        let mut background = NeuralBackground::with_seed(BackgroundConfig::default(), 5);
        let mut surface = canvas();
        background.mount(0.0, 0.0);
        assert_eq!(background.state(), LoopState::Running);
        assert_eq!(background.tick(Some(&mut surface)), FrameOutcome::Skipped);

        background.resize(1280.0, 720.0);
        assert!(matches!(background.tick(Some(&mut surface)), FrameOutcome::Drawn(_)));
    }
}
