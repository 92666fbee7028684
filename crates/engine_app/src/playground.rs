//! The playground scene: a player steered by input, and debris falling past.
//!
//! Debris that touches the player's collider loses health. Debris that dies
//! or falls out of the viewport is dropped, and its destruction observer
//! removes it from the scene context.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use engine_collision::{Collider, SphereCollider};
use engine_component::{
    Capabilities, Component, ComponentError, Dependent, DependentComponent, Resolver, Sibling,
};
use engine_math::{TransformComponent, Vec2, Vec3};
use engine_scene::{
    AppContext, Color, ContinuousForceComponent, Drawable, GameplayEntity, HealthComponent,
    InputState, Key, Millis, Rect, Scene, SceneContext, SceneId, Tickable,
};
use tracing::{debug, info, warn};

const PLAYER_SPEED: f32 = 4.0;
const PLAYER_SIZE: f32 = 32.0;
const DEBRIS_SIZE: f32 = 16.0;
const DEBRIS_HEALTH: i32 = 3;
const DEBRIS_FALL_SPEED: f32 = 3.0;
const SPAWN_EVERY: u64 = 20;

/// Moves the transform with WASD. Held keys move twice as fast.
#[derive(Debug)]
pub struct PlayerController {
    transform: Sibling<TransformComponent>,
    speed: f32,
}

impl PlayerController {
    fn heading(input: &InputState) -> (Vec3, bool) {
        let mut heading = Vec3::ZERO;
        let mut held = false;
        for (key, direction) in [
            (Key::W, Vec3::NEG_Y),
            (Key::A, Vec3::NEG_X),
            (Key::S, Vec3::Y),
            (Key::D, Vec3::X),
        ] {
            if input.is_down(key) {
                heading += direction;
                held |= input.is_held(key);
            }
        }
        (heading.normalize_or_zero(), held)
    }
}

impl Tickable for PlayerController {
    fn tick(&mut self, app: &AppContext) {
        let (heading, held) = Self::heading(app.input());
        if heading == Vec3::ZERO {
            return;
        }
        let boost = if held { 2.0 } else { 1.0 };
        let offset = heading * self.speed * boost * app.frames().delta_t();
        let bounds = app.viewport();
        self.transform.with_mut(|t| {
            t.translate(offset);
            t.position.x = t.position.x.clamp(0.0, bounds.x);
            t.position.y = t.position.y.clamp(0.0, bounds.y);
        });
    }
}

impl Component for PlayerController {
    type Kind = Dependent;

    fn type_name() -> &'static str {
        "PlayerController"
    }

    fn provide(this: &Rc<RefCell<Self>>, capabilities: &mut Capabilities) {
        capabilities.provide::<dyn Tickable>(this.clone());
    }
}

impl DependentComponent for PlayerController {
    /// Pixels per frame.
    type Args = f32;

    fn construct(resolver: &Resolver<'_>, speed: f32) -> Result<Self, ComponentError> {
        let transform =
            resolver.require::<TransformComponent>("PlayerController requires a TransformComponent")?;
        Ok(Self { transform, speed })
    }
}

/// A solid rectangle centred on the transform.
#[derive(Debug)]
pub struct RectSprite {
    transform: Sibling<TransformComponent>,
    size: Vec2,
    color: Color,
}

impl Drawable for RectSprite {
    fn draw(&mut self, app: &AppContext) {
        let size = self.size;
        let color = self.color;
        self.transform.with(|t| {
            let size = size * t.scale;
            let rect = Rect {
                origin: t.position.truncate() - size / 2.0,
                size,
            };
            app.canvas().fill_rect(rect, color, f64::from(t.position.z));
        });
    }

    fn z_index(&self) -> f64 {
        self.transform
            .with(|t| f64::from(t.position.z))
            .unwrap_or(0.0)
    }
}

impl Component for RectSprite {
    type Kind = Dependent;

    fn type_name() -> &'static str {
        "RectSprite"
    }

    fn provide(this: &Rc<RefCell<Self>>, capabilities: &mut Capabilities) {
        capabilities.provide::<dyn Drawable>(this.clone());
    }
}

impl DependentComponent for RectSprite {
    /// Size in pixels and fill colour.
    type Args = (Vec2, Color);

    fn construct(resolver: &Resolver<'_>, (size, color): (Vec2, Color)) -> Result<Self, ComponentError> {
        let transform =
            resolver.require::<TransformComponent>("RectSprite requires a TransformComponent")?;
        Ok(Self {
            transform,
            size,
            color,
        })
    }
}

/// Cycles through `keys`, holding each for `hold_ticks` ticks.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    keys: Vec<Key>,
    hold_ticks: u64,
}

impl ScriptedInput {
    /// Cycle through `keys`. A `hold_ticks` of 0 counts as 1.
    #[must_use]
    pub fn new(keys: Vec<Key>, hold_ticks: u64) -> Self {
        Self {
            keys,
            hold_ticks: hold_ticks.max(1),
        }
    }

    /// Press the key scheduled for `tick` and release the rest.
    pub fn apply(&self, tick: u64, now_ms: Millis, input: &mut InputState) {
        if self.keys.is_empty() {
            input.release_all();
            return;
        }
        let phase = (tick / self.hold_ticks) as usize % self.keys.len();
        let current = self.keys[phase];
        for key in &self.keys {
            if *key != current {
                input.release(*key);
            }
        }
        input.press(current, now_ms);
    }
}

impl Default for ScriptedInput {
    /// A square: up, right, down, left.
    fn default() -> Self {
        Self::new(vec![Key::W, Key::D, Key::S, Key::A], 30)
    }
}

/// Player plus falling debris.
#[derive(Debug)]
pub struct PlaygroundScene {
    id: SceneId,
    context: SceneContext,
    player: GameplayEntity,
    debris: Vec<GameplayEntity>,
    ticks: u64,
    spawned: u64,
}

impl PlaygroundScene {
    /// Build the scene with the player at the bottom centre of `viewport`.
    pub fn new(viewport: Vec2) -> Result<Self> {
        let context = SceneContext::new();
        let mut player = GameplayEntity::new();
        let start = Vec3::new(viewport.x / 2.0, viewport.y - PLAYER_SIZE, 2.0);

        let components = player.components_mut();
        components.insert(TransformComponent::from_position(start));
        components.attach::<PlayerController>(PLAYER_SPEED)?;
        components.attach::<RectSprite>((Vec2::splat(PLAYER_SIZE), Color::BLUE))?;
        components.attach::<SphereCollider>(PLAYER_SIZE / 2.0)?;
        context.register(player.entity_mut())?;

        let scene = Self {
            id: SceneId::issue(),
            context,
            player,
            debris: Vec::new(),
            ticks: 0,
            spawned: 0,
        };
        info!(scene = %scene.id, player = %scene.player.id(), "playground ready");
        Ok(scene)
    }

    /// Ids of the scene's live entities.
    #[must_use]
    pub fn context(&self) -> &SceneContext {
        &self.context
    }

    /// The input-driven player entity.
    #[must_use]
    pub fn player(&self) -> &GameplayEntity {
        &self.player
    }

    /// Debris still falling, oldest first.
    #[must_use]
    pub fn debris(&self) -> &[GameplayEntity] {
        &self.debris
    }

    /// Drop a piece of debris at `position`.
    pub fn spawn_debris(&mut self, position: Vec3) -> Result<()> {
        let mut debris = GameplayEntity::new();
        let components = debris.components_mut();
        components.insert(TransformComponent::from_position(position));
        components.insert(HealthComponent::new(DEBRIS_HEALTH));
        components.attach::<ContinuousForceComponent>((Vec3::Y, DEBRIS_FALL_SPEED))?;
        components.attach::<RectSprite>((Vec2::splat(DEBRIS_SIZE), Color::RED))?;
        self.context.register(debris.entity_mut())?;

        debug!(entity = %debris.id(), x = position.x, "debris spawned");
        self.debris.push(debris);
        self.spawned += 1;
        Ok(())
    }

    fn next_spawn_point(&self, viewport: Vec2) -> Vec3 {
        // Spread spawns across the width without a random source.
        let x = (self.spawned as f32 * 97.0).rem_euclid(viewport.x);
        Vec3::new(x, -DEBRIS_SIZE, 1.0)
    }

    fn hit_debris(&self) {
        let colliders = self.player.components().query::<dyn Collider>();
        for debris in &self.debris {
            let Some(position) = debris
                .components()
                .get::<TransformComponent>()
                .map(|t| t.position)
            else {
                continue;
            };
            let hit = colliders
                .clone()
                .any(|collider| collider.try_borrow().is_ok_and(|c| c.overlaps(position)));
            if hit {
                if let Some(mut health) = debris.components().get_mut::<HealthComponent>() {
                    health.damage(1);
                }
            }
        }
    }

    fn cull_debris(&mut self, viewport: Vec2) {
        let before = self.debris.len();
        self.debris.retain(|debris| {
            let components = debris.components();
            let alive = components
                .get::<HealthComponent>()
                .is_some_and(|h| h.is_alive());
            let on_screen = components
                .get::<TransformComponent>()
                .is_some_and(|t| t.position.y <= viewport.y + DEBRIS_SIZE);
            alive && on_screen
        });
        let culled = before - self.debris.len();
        if culled > 0 {
            debug!(culled, remaining = self.context.len(), "debris culled");
        }
    }
}

impl Tickable for PlaygroundScene {
    fn tick(&mut self, app: &AppContext) {
        self.player.tick(app, &self.context);
        for debris in &self.debris {
            debris.tick(app, &self.context);
        }

        self.hit_debris();
        self.cull_debris(app.viewport());

        if self.ticks % SPAWN_EVERY == 0 {
            let at = self.next_spawn_point(app.viewport());
            if let Err(err) = self.spawn_debris(at) {
                warn!(error = %err, "failed to spawn debris");
            }
        }
        self.ticks += 1;
    }
}

impl Drawable for PlaygroundScene {
    fn draw(&mut self, app: &AppContext) {
        let mut entities: Vec<&GameplayEntity> =
            self.debris.iter().chain(std::iter::once(&self.player)).collect();
        entities.sort_by(|a, b| a.z_index().total_cmp(&b.z_index()));
        for entity in entities {
            entity.draw(app);
        }
    }
}

impl Scene for PlaygroundScene {
    fn id(&self) -> SceneId {
        self.id
    }

    fn on_tear_down(&mut self) {
        info!(scene = %self.id, debris = self.debris.len(), "playground torn down");
        self.debris.clear();
    }
}
