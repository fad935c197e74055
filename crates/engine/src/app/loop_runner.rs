use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::content::ContentError;
use crate::sim::{ConfigError, Engine, SimConfig, WorldDefinition};
use crate::StartupError;

use super::input::ActionStates;
use super::metrics::MetricsAccumulator;
use super::overlay::OverlayData;
use super::rendering::{Camera, Renderer};
use super::{InputAction, InputSnapshot, MetricsHandle};

pub const SLOW_FRAME_ENV_VAR: &str = "ADVENTURE_SLOW_FRAME_MS";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
    pub max_render_fps: Option<u32>,
    pub initial_zoom: f32,
    pub overlay_visible: bool,
    pub sim: SimConfig,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Adventure".to_string(),
            window_width: 1280,
            window_height: 720,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            simulated_slow_frame_ms: 0,
            max_render_fps: None,
            initial_zoom: 2.0,
            overlay_visible: false,
            sim: SimConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to load world content: {0}")]
    Content(#[from] ContentError),
    #[error("invalid world configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig, world: WorldDefinition) -> Result<(), AppError> {
    run_app_with_metrics(config, world, MetricsHandle::default())
}

pub fn run_app_with_metrics(
    config: LoopConfig,
    world: WorldDefinition,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError> {
    let mut engine = Engine::new(world, config.sim.clone())?;

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    let slow_frame_delay = resolve_slow_frame_delay(config.simulated_slow_frame_ms);
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);
    let size = window.inner_size();
    let mut input_collector = InputCollector::new(size.width, size.height);
    let mut camera = Camera::new(engine.hero().rect().center(), config.initial_zoom);

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        zoom = camera.zoom(),
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut overlay_visible = config.overlay_visible;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    input_collector.set_window_size(new_size.width, new_size.height);
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    input_collector.set_window_size(size.width, size.height);
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    if input_collector.take_overlay_toggle_pressed() {
                        overlay_visible = !overlay_visible;
                        info!(overlay_visible, "overlay_toggled");
                    }

                    if slow_frame_delay > Duration::ZERO {
                        // Debug perturbation only; the fps cap sleeps separately below.
                        thread::sleep(slow_frame_delay);
                    }

                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(clamped_frame_dt);

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        let snapshot = input_collector.snapshot_for_tick();
                        camera.apply_zoom_steps(snapshot.zoom_delta_steps());
                        let report = engine.tick(&snapshot.tick_input(), fixed_dt_seconds);
                        metrics_accumulator.record_tick(&report);
                    }
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep =
                        compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    camera.center = engine.hero().rect().center();
                    if let Some(state) = engine.render_state() {
                        let session = engine.session();
                        let active_quest = session.active_quest.as_ref().and_then(|id| {
                            engine
                                .quests()
                                .status(id)
                                .map(|status| (id.as_str(), status))
                        });
                        let overlay = overlay_visible.then(|| OverlayData {
                            metrics: metrics_handle.snapshot(),
                            render_fps_cap: effective_render_cap,
                            map_id: engine.current_map_id().as_str(),
                            hero_position: engine.hero().position(),
                            zoom: camera.zoom(),
                            talking: session.talking,
                            active_quest,
                            ticks: engine.ticks(),
                        });
                        if let Err(error) = renderer.render(&state, &camera, overlay.as_ref()) {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }
                    }
                    last_present_instant = Instant::now();
                    metrics_accumulator.record_frame(raw_frame_dt);

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        metrics_handle.publish(snapshot);
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            worst_frame_ms = snapshot.worst_frame_ms,
                            map_switches = snapshot.map_switches,
                            wander_commits = snapshot.wander_commits,
                            map = %engine.current_map_id(),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                info!(ticks = engine.ticks(), map = %engine.current_map_id(), "shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Accumulates window input between ticks. Held keys are level state;
/// talk, overlay, and zoom keys latch one edge per physical press.
#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    talk_key_is_down: bool,
    talk_pressed_edge: bool,
    overlay_toggle_is_down: bool,
    overlay_toggle_pressed_edge: bool,
    zoom_in_key_is_down: bool,
    zoom_out_key_is_down: bool,
    pending_zoom_steps: i32,
    action_states: ActionStates,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        self.update_action_state_from_physical_key(key_event.physical_key, is_pressed);
        self.handle_talk_key_state(is_talk_key(key_event.physical_key), key_event.state);
        self.handle_overlay_toggle_key_state(
            is_overlay_toggle_key(key_event.physical_key),
            key_event.state,
        );
        self.handle_zoom_in_key_state(is_zoom_in_key(key_event.physical_key), key_event.state);
        self.handle_zoom_out_key_state(is_zoom_out_key(key_event.physical_key), key_event.state);
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.talk_pressed_edge,
            self.action_states,
            self.pending_zoom_steps,
            self.window_width,
            self.window_height,
        );
        self.talk_pressed_edge = false;
        self.pending_zoom_steps = 0;
        snapshot
    }

    fn take_overlay_toggle_pressed(&mut self) -> bool {
        let was_pressed = self.overlay_toggle_pressed_edge;
        self.overlay_toggle_pressed_edge = false;
        was_pressed
    }

    fn update_action_state_from_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        match key {
            PhysicalKey::Code(KeyCode::KeyW) | PhysicalKey::Code(KeyCode::ArrowUp) => {
                self.action_states.set(InputAction::MoveUp, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyS) | PhysicalKey::Code(KeyCode::ArrowDown) => {
                self.action_states.set(InputAction::MoveDown, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
                self.action_states.set(InputAction::MoveLeft, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
                self.action_states.set(InputAction::MoveRight, is_pressed);
            }
            PhysicalKey::Code(KeyCode::Escape) => {
                self.action_states.set(InputAction::Quit, is_pressed);
                if is_pressed {
                    self.mark_quit_requested();
                }
            }
            _ => {}
        }
    }

    fn handle_talk_key_state(&mut self, is_talk_key: bool, state: ElementState) {
        if !is_talk_key {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.talk_key_is_down {
                    self.talk_pressed_edge = true;
                }
                self.talk_key_is_down = true;
            }
            ElementState::Released => self.talk_key_is_down = false,
        }
    }

    fn handle_overlay_toggle_key_state(&mut self, is_toggle_key: bool, state: ElementState) {
        if !is_toggle_key {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.overlay_toggle_is_down {
                    self.overlay_toggle_pressed_edge = true;
                }
                self.overlay_toggle_is_down = true;
            }
            ElementState::Released => self.overlay_toggle_is_down = false,
        }
    }

    fn handle_zoom_in_key_state(&mut self, is_zoom_in_key: bool, state: ElementState) {
        if !is_zoom_in_key {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.zoom_in_key_is_down {
                    self.pending_zoom_steps = self.pending_zoom_steps.saturating_add(1);
                }
                self.zoom_in_key_is_down = true;
            }
            ElementState::Released => self.zoom_in_key_is_down = false,
        }
    }

    fn handle_zoom_out_key_state(&mut self, is_zoom_out_key: bool, state: ElementState) {
        if !is_zoom_out_key {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.zoom_out_key_is_down {
                    self.pending_zoom_steps = self.pending_zoom_steps.saturating_sub(1);
                }
                self.zoom_out_key_is_down = true;
            }
            ElementState::Released => self.zoom_out_key_is_down = false,
        }
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

/// Consumes whole fixed steps from the accumulator, at most
/// `max_ticks_per_frame`. Whatever backlog is still a full step or more
/// after the cap is dropped rather than carried into the next frame.
fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;
    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    parse_slow_frame_delay(env::var(SLOW_FRAME_ENV_VAR), config_slow_frame_ms)
}

fn parse_slow_frame_delay(
    value: Result<String, env::VarError>,
    config_slow_frame_ms: u64,
) -> Duration {
    match value {
        Ok(value) => match value.trim().parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!(
                    env_var = SLOW_FRAME_ENV_VAR,
                    value = value.as_str(),
                    "invalid slow-frame env var value; falling back to config"
                );
                Duration::from_millis(config_slow_frame_ms)
            }
        },
        Err(env::VarError::NotPresent) => Duration::from_millis(config_slow_frame_ms),
        Err(err) => {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                error = %err,
                "unable to read slow-frame env var; falling back to config"
            );
            Duration::from_millis(config_slow_frame_ms)
        }
    }
}

fn is_talk_key(key: PhysicalKey) -> bool {
    matches!(
        key,
        PhysicalKey::Code(KeyCode::Space) | PhysicalKey::Code(KeyCode::KeyE)
    )
}

fn is_overlay_toggle_key(key: PhysicalKey) -> bool {
    matches!(key, PhysicalKey::Code(KeyCode::F3))
}

fn is_zoom_in_key(key: PhysicalKey) -> bool {
    matches!(
        key,
        PhysicalKey::Code(KeyCode::Equal) | PhysicalKey::Code(KeyCode::NumpadAdd)
    )
}

fn is_zoom_out_key(key: PhysicalKey) -> bool {
    matches!(
        key,
        PhysicalKey::Code(KeyCode::Minus) | PhysicalKey::Code(KeyCode::NumpadSubtract)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(600), max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let result = plan_sim_steps(Duration::from_millis(50), Duration::from_millis(16), 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(2));
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let result = plan_sim_steps(Duration::from_millis(120), Duration::from_millis(16), 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn talk_press_is_edge_triggered_for_single_tick() {
        let mut input = InputCollector::new(1280, 720);
        input.handle_talk_key_state(true, ElementState::Pressed);

        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();

        assert!(first.talk_pressed());
        assert!(first.tick_input().toggle_talk);
        assert!(!second.talk_pressed());
    }

    #[test]
    fn held_talk_key_does_not_retrigger_until_released() {
        let mut input = InputCollector::default();

        input.handle_talk_key_state(true, ElementState::Pressed);
        let first = input.snapshot_for_tick();
        input.handle_talk_key_state(true, ElementState::Pressed);
        let second = input.snapshot_for_tick();
        input.handle_talk_key_state(true, ElementState::Released);
        input.handle_talk_key_state(true, ElementState::Pressed);
        let third = input.snapshot_for_tick();

        assert!(first.talk_pressed());
        assert!(!second.talk_pressed());
        assert!(third.talk_pressed());
    }

    #[test]
    fn talk_keys_are_space_and_e() {
        assert!(is_talk_key(PhysicalKey::Code(KeyCode::Space)));
        assert!(is_talk_key(PhysicalKey::Code(KeyCode::KeyE)));
        assert!(!is_talk_key(PhysicalKey::Code(KeyCode::Enter)));
    }

    #[test]
    fn wasd_and_arrow_keys_map_to_actions() {
        let mut input = InputCollector::default();
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyW), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::ArrowLeft), true);

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.is_down(InputAction::MoveUp));
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(!snapshot.is_down(InputAction::MoveDown));
    }

    #[test]
    fn held_direction_persists_across_ticks_until_released() {
        let mut input = InputCollector::default();
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyD), true);
        assert!(input.snapshot_for_tick().is_down(InputAction::MoveRight));
        assert!(input.snapshot_for_tick().is_down(InputAction::MoveRight));

        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyD), false);
        assert!(!input.snapshot_for_tick().is_down(InputAction::MoveRight));
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = InputCollector::default();
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::Escape), true);

        assert!(input.quit_requested);
        assert!(input.snapshot_for_tick().quit_requested());
    }

    #[test]
    fn f3_toggle_is_edge_triggered() {
        let mut input = InputCollector::default();

        input.handle_overlay_toggle_key_state(true, ElementState::Pressed);
        assert!(input.take_overlay_toggle_pressed());

        input.handle_overlay_toggle_key_state(true, ElementState::Pressed);
        assert!(!input.take_overlay_toggle_pressed());

        input.handle_overlay_toggle_key_state(true, ElementState::Released);
        input.handle_overlay_toggle_key_state(true, ElementState::Pressed);
        assert!(input.take_overlay_toggle_pressed());
    }

    #[test]
    fn zoom_keys_are_edge_triggered_only() {
        let mut input = InputCollector::new(1280, 720);

        input.handle_zoom_in_key_state(true, ElementState::Pressed);
        assert_eq!(input.snapshot_for_tick().zoom_delta_steps(), 1);

        input.handle_zoom_in_key_state(true, ElementState::Pressed);
        assert_eq!(input.snapshot_for_tick().zoom_delta_steps(), 0);

        input.handle_zoom_in_key_state(true, ElementState::Released);
        input.handle_zoom_in_key_state(true, ElementState::Pressed);
        assert_eq!(input.snapshot_for_tick().zoom_delta_steps(), 1);

        input.handle_zoom_out_key_state(true, ElementState::Pressed);
        assert_eq!(input.snapshot_for_tick().zoom_delta_steps(), -1);
    }

    #[test]
    fn snapshot_carries_window_size() {
        let mut input = InputCollector::new(1280, 720);
        input.set_window_size(640, 480);
        assert_eq!(input.snapshot_for_tick().window_size(), (640, 480));
    }

    #[test]
    fn slow_frame_env_value_overrides_config_when_valid() {
        assert_eq!(
            parse_slow_frame_delay(Ok(" 40 ".to_string()), 5),
            Duration::from_millis(40)
        );
        assert_eq!(
            parse_slow_frame_delay(Ok("soon".to_string()), 5),
            Duration::from_millis(5)
        );
        assert_eq!(
            parse_slow_frame_delay(Err(env::VarError::NotPresent), 7),
            Duration::from_millis(7)
        );
    }

    #[test]
    fn target_frame_duration_for_60hz_is_expected() {
        assert_eq!(target_frame_duration(None), None);
        let duration = target_frame_duration(Some(60)).expect("duration");
        assert!((duration.as_secs_f64() - (1.0 / 60.0)).abs() < 0.000_001);
    }

    #[test]
    fn compute_cap_sleep_only_when_under_budget() {
        let target = target_frame_duration(Some(60));
        assert_eq!(compute_cap_sleep(Duration::from_millis(20), target), Duration::ZERO);
        assert!(compute_cap_sleep(Duration::from_millis(5), target) > Duration::ZERO);
    }

    #[test]
    fn normalize_render_fps_cap_disables_zero() {
        assert_eq!(normalize_render_fps_cap(Some(0)), None);
        assert_eq!(normalize_render_fps_cap(Some(60)), Some(60));
        assert_eq!(format_render_cap(None), "off");
    }
}
