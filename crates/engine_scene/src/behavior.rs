//! The capabilities frame drivers dispatch on.
//!
//! Components provide these through
//! [`Component::provide`](engine_component::Component::provide), e.g.
//! `capabilities.provide::<dyn Tickable>(this.clone())`.

use crate::context::AppContext;
use crate::scene::SceneContext;

/// Per-frame logic.
pub trait Tickable {
    /// Advance one frame.
    fn tick(&mut self, app: &AppContext);

    /// Advance one frame inside a scene. Defaults to [`Tickable::tick`].
    fn tick_in_scene(&mut self, app: &AppContext, scene: &SceneContext) {
        let _ = scene;
        self.tick(app);
    }
}

/// Per-frame rendering.
pub trait Drawable {
    /// Emit this frame's draw commands.
    fn draw(&mut self, app: &AppContext);

    /// Draw order key. Lower is drawn earlier.
    fn z_index(&self) -> f64 {
        0.0
    }
}
