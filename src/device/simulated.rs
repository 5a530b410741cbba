//! Simulated dev-kit
//!
//! Produces a synthetic emission spectrum whose height follows the exposure
//! time, and runs an auto-expose loop shaped like the firmware's. Used when no
//! hardware is attached and throughout the tests.

use crate::device::kit::{
    AutoExposeConfig, AutoExposeResult, Binning, DevKit, FULL_SCALE_COUNTS, Frame, LedState,
    PixelRange, SensorConfig,
};
use crate::device::setup::STUCK_MAX_EXPOSURE;
use crate::error::{MicrospecError, Result, StringError};
use crate::exposure::Exposure;
use tracing::debug;

/// Counts every pixel reads with the shutter closed
const DARK_COUNTS: u32 = 1800;

/// Counts gained per exposure cycle at the top of the main emission line
const PEAK_COUNTS_PER_CYCLE: u32 = 160;

/// Emission line: centre as a fraction of the frame, width in pixels, relative height
const LINES: [(f64, f64, f64); 3] = [(0.765, 5.0, 1.0), (0.64, 3.0, 0.45), (0.87, 8.0, 0.25)];

/// In-memory stand-in for a dev-kit
#[derive(Debug, Clone)]
pub struct SimulatedKit {
    serial_number: String,
    sensor: SensorConfig,
    exposure: Exposure,
    auto_expose: AutoExposeConfig,
    bridge_leds: [LedState; 1],
    sensor_leds: [LedState; 2],
    frames_captured: u32,
    drop_every: Option<u32>,
    stuck_config_writes: u32,
    disconnected: bool,
}

impl SimulatedKit {
    /// Create a simulated dev-kit in its power-on state
    pub fn new(serial_number: impl Into<String>) -> Self {
        Self {
            serial_number: serial_number.into(),
            sensor: SensorConfig {
                binning: Binning::On,
                gain: 0x01,
                row_bitmap: 0x1F,
            },
            exposure: Exposure::default(),
            auto_expose: AutoExposeConfig {
                max_tries: 12,
                pixels: Binning::On.default_pixel_range(),
                target: 46420,
                tolerance: 3277,
                max_exposure: 10000,
            },
            bridge_leds: [LedState::Off],
            sensor_leds: [LedState::Off; 2],
            frames_captured: 0,
            drop_every: None,
            stuck_config_writes: 0,
            disconnected: false,
        }
    }

    /// Drop every `n`th captured frame
    #[must_use]
    pub fn with_dropped_frames(mut self, n: u32) -> Self {
        self.drop_every = (n > 0).then_some(n);
        self
    }

    /// Make the next `writes` auto-expose config writes read back a stuck `max_exposure`
    #[must_use]
    pub fn with_stuck_max_exposure(mut self, writes: u32) -> Self {
        self.stuck_config_writes = writes;
        self
    }

    /// Fail every following command as if the USB cable were pulled
    pub fn disconnect(&mut self) {
        self.disconnected = true;
    }

    /// Current LED settings: bridge LED 0, sensor LEDs 0 and 1
    pub fn leds(&self) -> (LedState, [LedState; 2]) {
        (self.bridge_leds[0], self.sensor_leds)
    }

    /// Current sensor configuration
    pub fn sensor_config(&self) -> SensorConfig {
        self.sensor
    }

    /// Number of capture requests so far, dropped ones included
    pub fn frames_captured(&self) -> u32 {
        self.frames_captured
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.disconnected {
            Err(MicrospecError::SerialLink(StringError::new(
                "simulated dev-kit disconnected",
            )))
        } else {
            Ok(())
        }
    }

    /// Synthetic counts for every pixel at `exposure`
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        reason = "pixel indices are below 1000 and counts are clamped to u16 range"
    )]
    fn spectrum(&self, exposure: Exposure, frame: u32) -> Vec<u16> {
        let len = self.sensor.binning.frame_len();
        let peak_signal = f64::from(exposure.cycles()) * f64::from(PEAK_COUNTS_PER_CYCLE);
        (1..=len)
            .map(|pixel| {
                let position = pixel as f64;
                let shape: f64 = LINES
                    .iter()
                    .map(|&(centre, width, height)| {
                        let offset = (position - centre * len as f64) / width;
                        height * (-0.5 * offset * offset).exp()
                    })
                    .sum();
                let seed = (pixel as u32)
                    .wrapping_mul(7919)
                    .wrapping_add(frame.wrapping_mul(104_729));
                let ripple = f64::from(seed % 61) - 30.0;
                let counts = f64::from(DARK_COUNTS) + peak_signal * shape + ripple;
                counts.clamp(0.0, f64::from(FULL_SCALE_COUNTS)) as u16
            })
            .collect()
    }

    fn peak_in(pixels: &[u16], range: PixelRange) -> u16 {
        let start = usize::from(range.start).saturating_sub(1);
        let stop = usize::from(range.stop).min(pixels.len());
        pixels
            .get(start..stop)
            .and_then(|slice| slice.iter().copied().max())
            .unwrap_or(0)
    }
}

impl DevKit for SimulatedKit {
    fn serial_number(&self) -> &str {
        &self.serial_number
    }

    fn set_bridge_led(&mut self, led: u8, state: LedState) -> Result<()> {
        self.ensure_connected()?;
        let slot = self
            .bridge_leds
            .get_mut(usize::from(led))
            .ok_or(MicrospecError::DeviceStatus {
                command: "SetBridgeLED",
                status: 1,
            })?;
        *slot = state;
        Ok(())
    }

    fn set_sensor_led(&mut self, led: u8, state: LedState) -> Result<()> {
        self.ensure_connected()?;
        let slot = self
            .sensor_leds
            .get_mut(usize::from(led))
            .ok_or(MicrospecError::DeviceStatus {
                command: "SetSensorLED",
                status: 1,
            })?;
        *slot = state;
        Ok(())
    }

    fn set_sensor_config(&mut self, config: SensorConfig) -> Result<()> {
        self.ensure_connected()?;
        self.sensor = config;
        Ok(())
    }

    fn set_exposure(&mut self, exposure: Exposure) -> Result<()> {
        self.ensure_connected()?;
        self.exposure = exposure;
        Ok(())
    }

    fn get_exposure(&mut self) -> Result<Exposure> {
        self.ensure_connected()?;
        Ok(self.exposure)
    }

    fn set_auto_expose_config(&mut self, config: &AutoExposeConfig) -> Result<()> {
        self.ensure_connected()?;
        self.auto_expose = *config;
        if self.stuck_config_writes > 0 {
            self.stuck_config_writes -= 1;
            self.auto_expose.max_exposure = STUCK_MAX_EXPOSURE;
        }
        Ok(())
    }

    fn get_auto_expose_config(&mut self) -> Result<AutoExposeConfig> {
        self.ensure_connected()?;
        Ok(self.auto_expose)
    }

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "next exposure is clamped to 1..=max_exposure"
    )]
    fn auto_expose(&mut self) -> Result<AutoExposeResult> {
        self.ensure_connected()?;
        let config = self.auto_expose;
        let target = f64::from(config.target);
        let dark = f64::from(DARK_COUNTS);
        let max_exposure = config.max_exposure.max(1);

        let mut iterations = 0;
        while iterations < u16::from(config.max_tries) {
            iterations += 1;
            let peak = Self::peak_in(&self.spectrum(self.exposure, 0), config.pixels);
            if peak.abs_diff(config.target) <= config.tolerance {
                debug!("Simulated auto-expose hit target in {} iterations", iterations);
                return Ok(AutoExposeResult {
                    success: true,
                    iterations,
                });
            }

            let signal = (f64::from(peak) - dark).max(1.0);
            let scaled = f64::from(self.exposure.cycles()) * (target - dark) / signal;
            let next =
                Exposure::from_cycles(scaled.round().clamp(1.0, f64::from(max_exposure)) as u16);
            if next == self.exposure {
                break;
            }
            self.exposure = next;
        }

        Ok(AutoExposeResult {
            success: false,
            iterations,
        })
    }

    fn capture_frame(&mut self) -> Result<Option<Frame>> {
        self.ensure_connected()?;
        self.frames_captured += 1;
        if self
            .drop_every
            .is_some_and(|n| self.frames_captured % n == 0)
        {
            debug!("Simulated dropped frame #{}", self.frames_captured);
            return Ok(None);
        }
        Ok(Some(Frame {
            pixels: self.spectrum(self.exposure, self.frames_captured),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_length_follows_binning() {
        let mut kit = SimulatedKit::new("SIM");
        assert_eq!(kit.capture_frame().unwrap().unwrap().pixels.len(), 392);

        kit.set_sensor_config(SensorConfig {
            binning: Binning::Off,
            gain: 0x01,
            row_bitmap: 0x1F,
        })
        .unwrap();
        assert_eq!(kit.capture_frame().unwrap().unwrap().pixels.len(), 784);
    }

    #[test]
    fn test_longer_exposure_raises_peak() {
        let mut kit = SimulatedKit::new("SIM");
        let range = Binning::On.default_pixel_range();

        kit.set_exposure(Exposure::from_ms(1.0)).unwrap();
        let short = SimulatedKit::peak_in(&kit.capture_frame().unwrap().unwrap().pixels, range);
        kit.set_exposure(Exposure::from_ms(4.0)).unwrap();
        let long = SimulatedKit::peak_in(&kit.capture_frame().unwrap().unwrap().pixels, range);

        assert!(long > short, "peak {long} should exceed {short}");
    }

    #[test]
    fn test_auto_expose_hits_target() {
        let mut kit = SimulatedKit::new("SIM");
        let result = kit.auto_expose().unwrap();
        assert!(result.success);
        assert!(result.iterations >= 1);

        let pixels = kit.capture_frame().unwrap().unwrap().pixels;
        let peak = SimulatedKit::peak_in(&pixels, Binning::On.default_pixel_range());
        assert!(peak.abs_diff(46420) <= 3277 + 60, "peak {peak} off target");
    }

    #[test]
    fn test_auto_expose_gives_up_when_capped() {
        let mut kit = SimulatedKit::new("SIM");
        let mut config = kit.get_auto_expose_config().unwrap();
        config.max_exposure = 10;
        kit.set_auto_expose_config(&config).unwrap();

        let result = kit.auto_expose().unwrap();
        assert!(!result.success);
        assert_eq!(kit.get_exposure().unwrap().cycles(), 10);
    }

    #[test]
    fn test_dropped_frames() {
        let mut kit = SimulatedKit::new("SIM").with_dropped_frames(3);
        assert!(kit.capture_frame().unwrap().is_some());
        assert!(kit.capture_frame().unwrap().is_some());
        assert!(kit.capture_frame().unwrap().is_none());
        assert!(kit.capture_frame().unwrap().is_some());
        assert_eq!(kit.frames_captured(), 4);
    }

    #[test]
    fn test_stuck_max_exposure() {
        let mut kit = SimulatedKit::new("SIM").with_stuck_max_exposure(1);
        let config = kit.get_auto_expose_config().unwrap();

        kit.set_auto_expose_config(&config).unwrap();
        assert_eq!(kit.get_auto_expose_config().unwrap().max_exposure, 4112);
        kit.set_auto_expose_config(&config).unwrap();
        assert_eq!(kit.get_auto_expose_config().unwrap().max_exposure, 10000);
    }

    #[test]
    fn test_disconnect_fails_commands() {
        let mut kit = SimulatedKit::new("SIM");
        kit.disconnect();
        assert!(matches!(
            kit.capture_frame(),
            Err(MicrospecError::SerialLink(_))
        ));
    }
}
