#![no_main]

use libfuzzer_sys::fuzz_target;
use microspec_gui::config::AppConfig;

fuzz_target!(|data: &[u8]| {
    // Parsing may fail; validating or deriving device settings must not panic
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(config) = serde_json::from_str::<AppConfig>(s) {
            if config.validate().is_ok() {
                let _ = config.auto_expose_config();
                let _ = config.initial_exposure();
            }
        }
    }
});
