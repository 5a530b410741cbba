//! Spectrometer dev-kit communication
//!
//! # Overview
//!
//! - **`DevKit` trait**: blocking commands to configure the sensor, set and read
//!   the exposure, run the firmware auto-expose loop and capture frames
//! - **`SerialKit`**: a dev-kit attached over USB serial
//! - **`SimulatedKit`**: synthetic spectra for running without hardware
//! - **`configure_devkit`**: power-on configuration applied before the first frame
//!
//! # Example Usage
//!
//! ```
//! use microspec_gui::device::{DevKit, SimulatedKit};
//!
//! let mut kit = SimulatedKit::new("CHROMATION000001");
//! let frame = kit.capture_frame()?.expect("simulated frames are never dropped by default");
//! assert_eq!(frame.pixels.len(), 392);
//! # Ok::<(), microspec_gui::error::MicrospecError>(())
//! ```

pub mod kit;
pub mod protocol;
pub mod serial;
pub mod setup;
pub mod simulated;

pub use kit::{
    AutoExposeConfig, AutoExposeResult, Binning, DevKit, FULL_SCALE_COUNTS, Frame, LedState,
    PixelRange, SensorConfig,
};
pub use serial::{SERIAL_NUMBER_PREFIX, SerialKit};
pub use setup::configure_devkit;
pub use simulated::SimulatedKit;

use crate::config::{DeviceBackend, DeviceSettings};
use crate::error::Result;
use tracing::info;

/// Serial number reported by the simulated backend
pub const SIMULATED_SERIAL_NUMBER: &str = "CHROMATION-SIMULATED";

/// Open the dev-kit backend selected in `settings`
pub fn open(settings: &DeviceSettings) -> Result<Box<dyn DevKit>> {
    match settings.backend {
        DeviceBackend::Serial => Ok(Box::new(SerialKit::open(settings)?)),
        DeviceBackend::Simulated => {
            info!("Using simulated dev-kit");
            Ok(Box::new(SimulatedKit::new(SIMULATED_SERIAL_NUMBER)))
        }
    }
}

/// Serial number as shown in the window caption, without the vendor prefix
pub fn display_serial_number(serial_number: &str) -> &str {
    let trimmed = serial_number.trim();
    trimmed
        .strip_prefix(SERIAL_NUMBER_PREFIX)
        .unwrap_or(trimmed)
        .trim_start_matches(['-', '_'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_serial_number_strips_prefix() {
        assert_eq!(display_serial_number("CHROMATION125129"), "125129");
        assert_eq!(display_serial_number("CHROMATION-SIMULATED"), "SIMULATED");
        assert_eq!(display_serial_number("091103"), "091103");
    }

    #[test]
    fn test_open_simulated_backend() {
        let settings = DeviceSettings {
            backend: DeviceBackend::Simulated,
            ..DeviceSettings::default()
        };
        let kit = open(&settings).unwrap();
        assert_eq!(kit.serial_number(), SIMULATED_SERIAL_NUMBER);
    }
}
