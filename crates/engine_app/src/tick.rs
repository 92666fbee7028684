//! Fixed-timestep driver.
//!
//! Each iteration runs the frame lifecycle in order:
//!
//! 1. Input edge: apply scripted input and promote held keys.
//! 2. Tick the active scene.
//! 3. Frame start: advance the frame clock, notify the scene.
//! 4. Draw the active scene and present the recorded commands.

use std::time::{Duration, Instant};

use engine_scene::{
    AppContext, Color, FrameClock, InputState, Millis, Scene, SceneError, SceneManager,
};
use tracing::{debug, info, warn};

use crate::config::TickConfig;

/// Feeds input for a tick: `(tick_id, now_ms, input)`.
pub type InputScript = Box<dyn FnMut(u64, Millis, &mut InputState)>;

/// The driver's loop state.
pub struct TickLoop {
    /// Ticks completed so far.
    tick_id: u64,
    config: TickConfig,
    app: AppContext,
    scenes: SceneManager,
    input: Option<InputScript>,
    /// Draw commands presented by the last frame.
    presented: usize,
}

impl TickLoop {
    /// Create a loop with no scene loaded.
    #[must_use]
    pub fn new(config: TickConfig) -> Self {
        let mut app = AppContext::new(config.viewport, 0);
        *app.frames_mut() = FrameClock::with_frame_time(0, config.frame_ms());
        Self {
            tick_id: 0,
            config,
            app,
            scenes: SceneManager::new(),
            input: None,
            presented: 0,
        }
    }

    /// Drive input from `script` instead of leaving it idle.
    pub fn set_input(&mut self, script: impl FnMut(u64, Millis, &mut InputState) + 'static) {
        self.input = Some(Box::new(script));
    }

    /// Load `scene`, tearing down the current one.
    pub fn change_scene(&mut self, scene: Box<dyn Scene>) {
        self.scenes.change_scene(scene);
    }

    /// Ticks completed so far.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// The context handed to the scene each frame.
    #[must_use]
    pub fn app(&self) -> &AppContext {
        &self.app
    }

    /// Draw commands presented by the last frame.
    #[must_use]
    pub fn presented(&self) -> usize {
        self.presented
    }

    /// Run one full frame at `now_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NoActiveScene`] if no scene is loaded.
    pub fn tick(&mut self, now_ms: Millis) -> Result<(), SceneError> {
        if let Some(script) = self.input.as_mut() {
            script(self.tick_id, now_ms, self.app.input_mut());
        }
        self.app.input_mut().on_tick_start(now_ms);

        self.scenes.on_tick(&self.app)?;

        self.app.frames_mut().advance(now_ms);
        self.scenes.on_frame_start()?;

        self.app.canvas().clear(Color::BLACK);
        self.scenes.on_draw(&self.app)?;
        self.presented = self.app.canvas().take().len();

        self.tick_id += 1;
        debug!(
            tick_id = self.tick_id,
            delta_t = self.app.frames().delta_t(),
            presented = self.presented,
            "tick complete"
        );
        Ok(())
    }

    /// Run until `max_ticks` is reached, or forever when it is 0.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NoActiveScene`] if no scene is loaded.
    pub fn run(&mut self) -> Result<(), SceneError> {
        let tick_duration = Duration::from_secs_f64(1.0 / self.config.tick_rate);
        let started = Instant::now();
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting tick loop"
        );

        loop {
            let start = Instant::now();
            let now_ms = Millis::try_from(started.elapsed().as_millis()).unwrap_or(Millis::MAX);
            self.tick(now_ms)?;

            tick_count += 1;
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                info!(ticks = tick_count, "tick loop complete");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for TickLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickLoop")
            .field("tick_id", &self.tick_id)
            .field("config", &self.config)
            .field("scenes", &self.scenes)
            .field("scripted_input", &self.input.is_some())
            .finish()
    }
}
