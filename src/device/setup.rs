//! Dev-kit power-on configuration

use crate::device::kit::{AutoExposeConfig, DevKit, LedState, SensorConfig};
use crate::error::{MicrospecError, Result};
use crate::exposure::Exposure;
use tracing::{info, warn};

/// `max_exposure` value the firmware sometimes reports after dropping a config write
pub const STUCK_MAX_EXPOSURE: u16 = 4112;

/// Config writes attempted before giving up on a stuck `max_exposure`
pub const MAX_CONFIG_WRITES: u32 = 50;

/// Put the dev-kit into the state the viewer expects
///
/// Turns the indicator LEDs green, applies the sensor configuration and the
/// initial exposure, then writes the auto-expose configuration. The firmware
/// occasionally drops that last write and reports `max_exposure` as 4112; the
/// write is repeated until the read-back matches, up to [`MAX_CONFIG_WRITES`].
///
/// Returns the auto-expose configuration as read back from the dev-kit.
pub fn configure_devkit<K: DevKit + ?Sized>(
    kit: &mut K,
    sensor: SensorConfig,
    exposure: Exposure,
    auto_expose: &AutoExposeConfig,
) -> Result<AutoExposeConfig> {
    kit.set_bridge_led(0, LedState::Green)?;
    kit.set_sensor_led(0, LedState::Green)?;
    kit.set_sensor_led(1, LedState::Green)?;

    kit.set_sensor_config(sensor)?;
    info!(
        "Sensor configured: binning {:?}, gain {:#04x}, rows {:#04x}",
        sensor.binning, sensor.gain, sensor.row_bitmap
    );

    kit.set_exposure(exposure)?;
    info!("Initial exposure: {} ({} cycles)", exposure, exposure.cycles());

    let is_stuck = |readback: &AutoExposeConfig| {
        readback.max_exposure == STUCK_MAX_EXPOSURE
            && auto_expose.max_exposure != STUCK_MAX_EXPOSURE
    };

    kit.set_auto_expose_config(auto_expose)?;
    let mut readback = kit.get_auto_expose_config()?;
    let mut writes = 1;
    if is_stuck(&readback) {
        info!("Waiting for firmware...");
    }
    while is_stuck(&readback) {
        if writes >= MAX_CONFIG_WRITES {
            warn!("Auto-expose config still reads back stuck after {} writes", writes);
            return Err(MicrospecError::Protocol {
                command: "SetAutoExposeConfig",
                reason: format!("max_exposure stuck at {STUCK_MAX_EXPOSURE} after {writes} writes"),
            });
        }
        kit.set_auto_expose_config(auto_expose)?;
        readback = kit.get_auto_expose_config()?;
        writes += 1;
    }

    info!(
        "Maximum exposure for auto-expose: {} cycles",
        readback.max_exposure
    );
    Ok(readback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::kit::{Binning, PixelRange};
    use crate::device::simulated::SimulatedKit;

    fn sensor() -> SensorConfig {
        SensorConfig {
            binning: Binning::On,
            gain: 0x01,
            row_bitmap: 0x1F,
        }
    }

    fn auto_expose() -> AutoExposeConfig {
        AutoExposeConfig {
            max_tries: 12,
            pixels: PixelRange::new(220, 373),
            target: 46420,
            tolerance: 3277,
            max_exposure: 10000,
        }
    }

    fn configure(kit: &mut SimulatedKit) -> Result<AutoExposeConfig> {
        configure_devkit(kit, sensor(), Exposure::from_ms(1.0), &auto_expose())
    }

    #[test]
    fn test_configure_sets_leds_and_exposure() {
        let mut kit = SimulatedKit::new("SIM");
        let readback = configure(&mut kit).unwrap();

        assert_eq!(readback, auto_expose());
        assert_eq!(kit.leds(), (LedState::Green, [LedState::Green; 2]));
        assert_eq!(kit.get_exposure().unwrap().cycles(), 50);
        assert_eq!(kit.sensor_config(), sensor());
    }

    #[test]
    fn test_configure_retries_stuck_max_exposure() {
        let mut kit = SimulatedKit::new("SIM").with_stuck_max_exposure(3);
        let readback = configure(&mut kit).unwrap();
        assert_eq!(readback.max_exposure, 10000);
    }

    #[test]
    fn test_configure_gives_up_on_permanently_stuck_firmware() {
        let mut kit = SimulatedKit::new("SIM").with_stuck_max_exposure(u32::MAX);
        let err = configure(&mut kit).unwrap_err();
        assert!(matches!(
            err,
            MicrospecError::Protocol {
                command: "SetAutoExposeConfig",
                ..
            }
        ));
    }

    #[test]
    fn test_configure_propagates_device_errors() {
        let mut kit = SimulatedKit::new("SIM");
        kit.disconnect();
        assert!(configure_devkit(&mut kit, sensor(), Exposure::default(), &auto_expose()).is_err());
    }
}
