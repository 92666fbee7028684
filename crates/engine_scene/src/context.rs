//! Per-frame application context handed to tickables and drawables.

use std::cell::RefCell;
use std::collections::HashMap;

use engine_math::Vec2;

/// Milliseconds since the application started.
pub type Millis = u64;

/// Frame timing.
#[derive(Debug, Clone)]
pub struct FrameClock {
    number: u64,
    delta_t: f32,
    fps: f32,
    last_frame_ms: Millis,
    expected_frame_ms: f64,
}

impl FrameClock {
    /// Target frame time at 60 frames per second.
    pub const DEFAULT_FRAME_MS: f64 = 1000.0 / 60.0;

    /// Create a clock targeting 60 FPS, starting at `start_ms`.
    #[must_use]
    pub fn new(start_ms: Millis) -> Self {
        Self::with_frame_time(start_ms, Self::DEFAULT_FRAME_MS)
    }

    /// Create a clock targeting `expected_frame_ms` per frame.
    #[must_use]
    pub fn with_frame_time(start_ms: Millis, expected_frame_ms: f64) -> Self {
        Self {
            number: 0,
            delta_t: 1.0,
            fps: 0.0,
            last_frame_ms: start_ms,
            expected_frame_ms,
        }
    }

    /// Mark the start of a new frame at `now_ms`.
    ///
    /// A frame measured at zero milliseconds counts as one millisecond.
    pub fn advance(&mut self, now_ms: Millis) {
        self.number += 1;
        let elapsed = now_ms.saturating_sub(self.last_frame_ms).max(1);
        self.delta_t = (elapsed as f64 / self.expected_frame_ms) as f32;
        self.fps = 1000.0 / elapsed as f32;
        self.last_frame_ms = now_ms;
    }

    /// Frames started so far.
    #[must_use]
    pub fn number(&self) -> u64 {
        self.number
    }

    /// How long the last frame took, as a multiple of the target frame time.
    /// `1.0` before the first frame.
    #[must_use]
    pub fn delta_t(&self) -> f32 {
        self.delta_t
    }

    /// Frames per second implied by the last frame.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// Keys the input layer tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyState {
    Down,
    Held,
}

/// Which keys are pressed, and for how long.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: HashMap<Key, (KeyState, Millis)>,
}

impl InputState {
    /// A key pressed for longer than this counts as held.
    pub const HELD_THRESHOLD_MS: Millis = 200;

    /// Create an input state with nothing pressed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` going down at `now_ms`. Repeated presses keep the
    /// original timestamp.
    pub fn press(&mut self, key: Key, now_ms: Millis) {
        self.keys.entry(key).or_insert((KeyState::Down, now_ms));
    }

    /// Record `key` going up.
    pub fn release(&mut self, key: Key) {
        self.keys.remove(&key);
    }

    /// Release every key.
    pub fn release_all(&mut self) {
        self.keys.clear();
    }

    /// Promote keys pressed long enough to held. Call once per tick.
    pub fn on_tick_start(&mut self, now_ms: Millis) {
        for (state, since) in self.keys.values_mut() {
            if *state == KeyState::Down && now_ms.saturating_sub(*since) > Self::HELD_THRESHOLD_MS {
                *state = KeyState::Held;
            }
        }
    }

    /// Returns `true` if `key` is pressed.
    #[must_use]
    pub fn is_down(&self, key: Key) -> bool {
        self.keys.contains_key(&key)
    }

    /// Returns `true` if `key` has been pressed past the held threshold.
    #[must_use]
    pub fn is_held(&self, key: Key) -> bool {
        matches!(self.keys.get(&key), Some((KeyState::Held, _)))
    }

    /// Returns `true` if `key` has been pressed for longer than `duration` ms.
    #[must_use]
    pub fn has_been_down_for(&self, key: Key, duration: Millis, now_ms: Millis) -> bool {
        self.keys
            .get(&key)
            .is_some_and(|(_, since)| now_ms.saturating_sub(*since) > duration)
    }
}

/// An RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel, 255 is opaque.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// An opaque colour.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// An axis-aligned rectangle in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Top-left corner.
    pub origin: Vec2,
    /// Width and height in pixels.
    pub size: Vec2,
}

/// One recorded draw operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole target.
    Clear(Color),
    /// Fill a rectangle.
    FillRect { rect: Rect, color: Color, z: f64 },
}

/// Headless draw target. Records commands for the frame driver to present.
#[derive(Debug, Default)]
pub struct Canvas {
    commands: RefCell<Vec<DrawCommand>>,
}

impl Canvas {
    /// Fill the whole target with `color`.
    pub fn clear(&self, color: Color) {
        self.commands.borrow_mut().push(DrawCommand::Clear(color));
    }

    /// Fill `rect` with `color` at depth `z`.
    pub fn fill_rect(&self, rect: Rect, color: Color, z: f64) {
        self.commands
            .borrow_mut()
            .push(DrawCommand::FillRect { rect, color, z });
    }

    /// Take every command recorded since the last call.
    pub fn take(&self) -> Vec<DrawCommand> {
        std::mem::take(&mut *self.commands.borrow_mut())
    }

    /// Number of commands waiting to be presented.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.borrow().len()
    }

    /// Returns `true` if no commands are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.borrow().is_empty()
    }
}

/// Everything a tickable or drawable may read during a frame.
#[derive(Debug)]
pub struct AppContext {
    viewport: Vec2,
    frames: FrameClock,
    input: InputState,
    canvas: Canvas,
}

impl AppContext {
    /// Create a context for a viewport of `viewport` pixels, starting the
    /// frame clock at `start_ms`.
    #[must_use]
    pub fn new(viewport: Vec2, start_ms: Millis) -> Self {
        Self {
            viewport,
            frames: FrameClock::new(start_ms),
            input: InputState::new(),
            canvas: Canvas::default(),
        }
    }

    /// Display bounds in pixels.
    #[must_use]
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Frame timing.
    #[must_use]
    pub fn frames(&self) -> &FrameClock {
        &self.frames
    }

    /// Frame timing, for the frame driver.
    pub fn frames_mut(&mut self) -> &mut FrameClock {
        &mut self.frames
    }

    /// Keyboard state.
    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Keyboard state, for the input source.
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    /// The draw target for this frame.
    #[must_use]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clock_delta() {
        let mut clock = FrameClock::with_frame_time(0, 10.0);
        assert_eq!(clock.number(), 0);
        assert!((clock.delta_t() - 1.0).abs() < f32::EPSILON);

        clock.advance(20);
        assert_eq!(clock.number(), 1);
        assert!((clock.delta_t() - 2.0).abs() < f32::EPSILON);
        assert!((clock.fps() - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_frame_clock_zero_elapsed_counts_as_one_ms() {
        let mut clock = FrameClock::with_frame_time(100, 10.0);
        clock.advance(100);
        assert!((clock.delta_t() - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_input_down_and_held() {
        let mut input = InputState::new();
        input.press(Key::W, 0);
        assert!(input.is_down(Key::W));
        assert!(!input.is_held(Key::W));

        input.on_tick_start(InputState::HELD_THRESHOLD_MS + 1);
        assert!(input.is_held(Key::W));
        assert!(input.has_been_down_for(Key::W, 150, 200));

        input.release(Key::W);
        assert!(!input.is_down(Key::W));
        assert!(!input.is_down(Key::S));
    }

    #[test]
    fn test_held_threshold_is_exclusive() {
        let mut input = InputState::new();
        input.press(Key::Space, 100);

        input.on_tick_start(100 + InputState::HELD_THRESHOLD_MS);
        assert!(!input.is_held(Key::Space));
        assert!(!input.has_been_down_for(Key::Space, 50, 150));

        input.on_tick_start(101 + InputState::HELD_THRESHOLD_MS);
        assert!(input.is_held(Key::Space));
        assert!(input.has_been_down_for(Key::Space, 50, 151));
    }

    #[test]
    fn test_canvas_records_and_drains() {
        let canvas = Canvas::default();
        canvas.clear(Color::BLACK);
        canvas.fill_rect(
            Rect {
                origin: Vec2::ZERO,
                size: Vec2::ONE,
            },
            Color::BLUE,
            0.0,
        );
        assert_eq!(canvas.len(), 2);
        let commands = canvas.take();
        assert_eq!(commands[0], DrawCommand::Clear(Color::BLACK));
        assert!(canvas.is_empty());
    }
}
