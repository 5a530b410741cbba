//! Application controller implementation
//!
//! Owns the dev-kit and everything the viewer shows. The GUI calls
//! [`AppController::step`] once per frame with the commands gathered since the
//! last frame and paints the returned scene.

use crate::config::AppConfig;
use crate::device::{AutoExposeResult, DevKit, PixelRange, display_serial_number};
use crate::error::{MicrospecError, Result};
use crate::exposure::Exposure;
use crate::input::Command;
use crate::plot::{
    LabelTones, Peak, PlotLayout, PlotView, Scene, ThresholdLevels, compose, find_peak,
};
use tracing::{debug, info};

/// Application logic controller
pub struct AppController {
    /// Connected dev-kit
    kit: Box<dyn DevKit>,
    /// Plot geometry for the configured binning
    layout: PlotLayout,
    /// Meaningful pixel range
    range: PixelRange,
    /// Auto-expose reference lines
    levels: ThresholdLevels,
    /// Exposure as last read back from the dev-kit
    exposure: Exposure,
    /// Outcome of the last auto-expose run
    auto_expose: AutoExposeResult,
    /// Readout colors
    tones: LabelTones,
    /// Pixel under the cursor line, always inside `range`
    cursor_pixel: usize,
    /// Latest captured counts, zeros until the first frame arrives
    counts: Vec<u16>,
    /// Peak of `counts` inside `range`
    peak: Option<Peak>,
    /// Frames the dev-kit failed to deliver
    dropped_frames: u64,
    quit_requested: bool,
}

impl AppController {
    /// Create the controller for a configured dev-kit
    ///
    /// Reads the current exposure back from the dev-kit so the readout starts
    /// from the value the firmware actually holds.
    pub fn new(mut kit: Box<dyn DevKit>, config: &AppConfig) -> Result<Self> {
        let exposure = kit.get_exposure()?;
        let frame_len = config.sensor.binning.frame_len();
        let range = config.pixel_range();
        let counts = vec![0; frame_len];
        let peak = find_peak(&counts, range);

        info!(
            "Viewer ready: {} pixels, meaningful range {}..={}, exposure {}",
            frame_len, range.start, range.stop, exposure
        );

        Ok(Self {
            kit,
            layout: PlotLayout::new(&config.display, frame_len),
            range,
            levels: ThresholdLevels {
                target: config.auto_expose.target,
                tolerance: config.auto_expose.tolerance,
                max_dark: config.display.max_dark,
            },
            exposure,
            auto_expose: AutoExposeResult::default(),
            tones: LabelTones::default(),
            cursor_pixel: usize::from(range.stop),
            counts,
            peak,
            dropped_frames: 0,
            quit_requested: false,
        })
    }

    /// Window title
    pub fn caption(&self) -> String {
        format!(
            "Chromation Kit: {}",
            display_serial_number(self.kit.serial_number())
        )
    }

    /// Window `(width, height)` in screen pixels
    pub fn window_size(&self) -> (i32, i32) {
        self.layout.window_size()
    }

    /// Apply one command
    pub fn handle_command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Quit => {
                info!("Quit requested");
                self.quit_requested = true;
            }
            Command::AutoExpose => {
                let result = self.kit.auto_expose()?;
                self.auto_expose = result;
                self.exposure = self.kit.get_exposure()?;
                self.tones = LabelTones::after_auto_expose();
                info!(
                    "Auto-expose {} after {} iterations, exposure now {}",
                    if result.success { "hit target" } else { "gave up" },
                    result.iterations,
                    self.exposure
                );
            }
            Command::IncreaseExposure => self.step_exposure(Exposure::step_up)?,
            Command::DecreaseExposure => self.step_exposure(Exposure::step_down)?,
            Command::MoveCursor(motion) => {
                self.cursor_pixel = motion.apply(self.cursor_pixel, self.range);
            }
        }
        Ok(())
    }

    fn step_exposure(&mut self, step: fn(Exposure) -> Exposure) -> Result<()> {
        let current = self.kit.get_exposure()?;
        self.kit.set_exposure(step(current))?;
        self.exposure = self.kit.get_exposure()?;
        self.tones = LabelTones::after_exposure_step();
        info!("Exposure {} -> {}", current, self.exposure);
        Ok(())
    }

    /// Capture one frame, keeping the previous counts if it was dropped
    pub fn capture(&mut self) -> Result<()> {
        match self.kit.capture_frame()? {
            Some(frame) => {
                if frame.pixels.len() != self.layout.frame_len() {
                    return Err(MicrospecError::Protocol {
                        command: "CaptureFrame",
                        reason: format!(
                            "expected {} pixels, got {}",
                            self.layout.frame_len(),
                            frame.pixels.len()
                        ),
                    });
                }
                self.counts = frame.pixels;
            }
            None => {
                self.dropped_frames += 1;
                debug!(
                    "Dropped frame, showing previous data ({} dropped so far)",
                    self.dropped_frames
                );
            }
        }
        self.peak = find_peak(&self.counts, self.range);
        Ok(())
    }

    /// Drawing of the current state
    pub fn scene(&self) -> Scene {
        compose(
            &self.layout,
            &PlotView {
                counts: &self.counts,
                range: self.range,
                cursor_pixel: self.cursor_pixel,
                peak: self.peak,
                exposure: self.exposure,
                auto_expose: self.auto_expose,
                tones: self.tones,
                levels: self.levels,
            },
        )
    }

    /// Run one frame: apply `commands`, capture, and compose the scene
    ///
    /// Stops applying commands once quit is requested and skips the capture.
    pub fn step<I>(&mut self, commands: I) -> Result<Scene>
    where
        I: IntoIterator<Item = Command>,
    {
        for command in commands {
            self.handle_command(command)?;
            if self.quit_requested {
                return Ok(self.scene());
            }
        }
        self.capture()?;
        Ok(self.scene())
    }

    /// Whether the user asked to quit
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Latest counts, pixel 1 first
    pub fn counts(&self) -> &[u16] {
        &self.counts
    }

    /// Peak of the latest counts inside the meaningful range
    pub fn peak(&self) -> Option<Peak> {
        self.peak
    }

    /// Pixel under the cursor line
    pub fn cursor_pixel(&self) -> usize {
        self.cursor_pixel
    }

    /// Exposure as last read back from the dev-kit
    pub fn exposure(&self) -> Exposure {
        self.exposure
    }

    /// Outcome of the last auto-expose run
    pub fn auto_expose_result(&self) -> AutoExposeResult {
        self.auto_expose
    }

    /// Current readout colors
    pub fn tones(&self) -> LabelTones {
        self.tones
    }

    /// Frames dropped since startup
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }
}
