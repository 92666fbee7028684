//! The current scene, and switching between scenes.

use tracing::{debug, info};

use crate::context::AppContext;
use crate::error::SceneError;
use crate::scene::{Scene, SceneId};

/// Owns the active [`Scene`] and forwards frame events to it.
#[derive(Default)]
pub struct SceneManager {
    current: Option<Box<dyn Scene>>,
}

impl SceneManager {
    /// Create a manager with no scene loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in `scene`. The outgoing scene is torn down and dropped before
    /// the call returns.
    pub fn change_scene(&mut self, scene: Box<dyn Scene>) {
        let incoming = scene.id();
        if let Some(mut outgoing) = self.current.replace(scene) {
            debug!(scene = %outgoing.id(), "tearing down scene");
            outgoing.on_tear_down();
        }
        info!(scene = %incoming, "scene changed");
    }

    /// Id of the active scene.
    #[must_use]
    pub fn current_id(&self) -> Option<SceneId> {
        self.current.as_ref().map(|scene| scene.id())
    }

    /// Returns `true` if a scene is loaded.
    #[must_use]
    pub fn has_scene(&self) -> bool {
        self.current.is_some()
    }

    /// Tick the active scene.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NoActiveScene`] if nothing is loaded.
    pub fn on_tick(&mut self, app: &AppContext) -> Result<(), SceneError> {
        self.active()?.tick(app);
        Ok(())
    }

    /// Notify the active scene that a frame is starting.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NoActiveScene`] if nothing is loaded.
    pub fn on_frame_start(&mut self) -> Result<(), SceneError> {
        self.active()?.on_frame_start();
        Ok(())
    }

    /// Draw the active scene.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NoActiveScene`] if nothing is loaded.
    pub fn on_draw(&mut self, app: &AppContext) -> Result<(), SceneError> {
        self.active()?.draw(app);
        Ok(())
    }

    fn active(&mut self) -> Result<&mut Box<dyn Scene>, SceneError> {
        self.current.as_mut().ok_or(SceneError::NoActiveScene)
    }
}

impl std::fmt::Debug for SceneManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneManager")
            .field("current", &self.current_id())
            .finish()
    }
}
