//! GUI controller implementation
//!
//! Drives the frame loop from a repeating Slint timer on the UI thread. Each
//! tick gathers the keyboard and gamepad commands received since the last
//! tick, steps the `AppController` and pushes the resulting scene into the
//! window models.

use crate::{MainWindow, PlotLabel, PlotStroke};
use anyhow::{Context, Result};
use microspec_gui::controller::AppController;
use microspec_gui::error::{MicrospecError, get_user_friendly_error};
use microspec_gui::input::{CommandBatch, GamepadReader, KeyInput, command_for_key};
use microspec_gui::plot::{Point, Rgb, Scene};
use slint::platform::Key;
use slint::{ComponentHandle, ModelRc, SharedString, Timer, TimerMode, VecModel};
use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// GUI controller managing the window and the frame timer
pub struct GuiController {
    /// Main window
    window: MainWindow,
    /// Application controller, only touched from the UI thread
    app_controller: Rc<RefCell<AppController>>,
    /// Commands from key presses waiting for the next frame
    pending: Rc<RefCell<CommandBatch>>,
    /// Time between frames
    frame_interval: Duration,
}

impl GuiController {
    /// Create the window for `app_controller`, refreshed `frame_rate` times a second
    pub fn new(app_controller: AppController, frame_rate: u32) -> Result<Self> {
        let window = MainWindow::new().context("Failed to create main window")?;

        let (width, height) = app_controller.window_size();
        window.set_caption(app_controller.caption().into());
        window.set_canvas_width(to_length(width));
        window.set_canvas_height(to_length(height));
        info!("Display window size: {}x{}", width, height);

        let scene = app_controller.scene();
        window.set_background_color(to_color(scene.background));
        apply_scene(&window, &scene);

        let pending = Rc::new(RefCell::new(CommandBatch::new()));
        let key_pending = Rc::clone(&pending);
        window.on_key_pressed(move |text: SharedString| {
            if let Some(command) = key_input(&text).and_then(command_for_key) {
                debug!("Key {:?} -> {:?}", text.as_str(), command);
                key_pending.borrow_mut().push(command);
            }
        });

        Ok(Self {
            window,
            app_controller: Rc::new(RefCell::new(app_controller)),
            pending,
            frame_interval: Duration::from_millis(1000 / u64::from(frame_rate.max(1))),
        })
    }

    /// Show the window and run the frame loop until the user quits
    ///
    /// A dev-kit error stops the loop and is returned after the window closes.
    pub fn run(self) -> Result<()> {
        let failure: Rc<RefCell<Option<MicrospecError>>> = Rc::new(RefCell::new(None));
        let mut gamepad = GamepadReader::new();

        let timer = Timer::default();
        {
            let window = self.window.as_weak();
            let app_controller = Rc::clone(&self.app_controller);
            let pending = Rc::clone(&self.pending);
            let failure = Rc::clone(&failure);

            timer.start(TimerMode::Repeated, self.frame_interval, move || {
                let Some(window) = window.upgrade() else {
                    return;
                };

                let mut commands: CommandBatch = pending.borrow_mut().drain(..).collect();
                commands.extend(gamepad.poll());

                let mut controller = app_controller.borrow_mut();
                match controller.step(commands) {
                    Ok(_) if controller.quit_requested() => {
                        debug!("Quit command received, closing window");
                        stop_event_loop();
                    }
                    Ok(scene) => apply_scene(&window, &scene),
                    Err(e) => {
                        error!("Frame loop stopped: {}", e);
                        error!("{}", get_user_friendly_error(&e));
                        *failure.borrow_mut() = Some(e);
                        stop_event_loop();
                    }
                }
            });
        }

        info!("Frame loop running every {:?}", self.frame_interval);
        self.window.run().context("Slint event loop failed")?;
        timer.stop();

        if let Some(e) = failure.borrow_mut().take() {
            return Err(e).context("Dev-kit communication failed");
        }
        Ok(())
    }
}

fn stop_event_loop() {
    if let Err(e) = slint::quit_event_loop() {
        warn!("Failed to quit event loop: {}", e);
    }
}

/// Push `scene` into the window models
fn apply_scene(window: &MainWindow, scene: &Scene) {
    let strokes: Vec<PlotStroke> = scene
        .segments
        .iter()
        .map(|segment| PlotStroke {
            commands: path_commands(&[segment.from, segment.to]).into(),
            color: to_color(segment.color),
        })
        .chain(scene.polylines.iter().map(|polyline| PlotStroke {
            commands: path_commands(&polyline.points).into(),
            color: to_color(polyline.color),
        }))
        .collect();

    let labels: Vec<PlotLabel> = scene
        .labels
        .iter()
        .map(|label| PlotLabel {
            x: to_length(label.position.x),
            y: to_length(label.position.y),
            text: label.text.as_str().into(),
            color: to_color(label.color),
            font_size: to_length_u32(label.size_pt),
        })
        .collect();

    window.set_strokes(ModelRc::new(VecModel::from(strokes)));
    window.set_labels(ModelRc::new(VecModel::from(labels)));
}

/// SVG path data through `points`
fn path_commands(points: &[Point]) -> String {
    let mut commands = String::with_capacity(points.len() * 10);
    for (index, point) in points.iter().enumerate() {
        let verb = if index == 0 { 'M' } else { 'L' };
        // Centre on the pixel so 1px lines stay crisp
        let _ = write!(commands, "{verb}{}.5 {}.5 ", point.x, point.y);
    }
    commands.truncate(commands.trim_end().len());
    commands
}

/// Toolkit-independent key for Slint key event text
fn key_input(text: &str) -> Option<KeyInput> {
    let mut chars = text.chars();
    let key = chars.next()?;
    if chars.next().is_some() {
        return None;
    }

    let input = match key {
        k if k == char::from(Key::LeftArrow) => KeyInput::ArrowLeft,
        k if k == char::from(Key::RightArrow) => KeyInput::ArrowRight,
        k if k == char::from(Key::UpArrow) => KeyInput::ArrowUp,
        k if k == char::from(Key::DownArrow) => KeyInput::ArrowDown,
        k if k == char::from(Key::Home) => KeyInput::Home,
        k if k == char::from(Key::End) => KeyInput::End,
        k if k == char::from(Key::Escape) => KeyInput::Escape,
        k => KeyInput::Char(k),
    };
    Some(input)
}

fn to_color(rgb: Rgb) -> slint::Color {
    slint::Color::from_rgb_u8(rgb.r, rgb.g, rgb.b)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "screen coordinates are far below f32 precision limits"
)]
fn to_length(value: i32) -> f32 {
    value as f32
}

#[expect(
    clippy::cast_precision_loss,
    reason = "font sizes are small integers"
)]
fn to_length_u32(value: u32) -> f32 {
    value as f32
}
