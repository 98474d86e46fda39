use std::time::Duration;

/// Runtime options for the clock thread. Built once by the embedder and
/// passed by reference; nothing here is global.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pace emulation to the frame interval instead of running flat out.
    pub throttle: bool,
    /// Wall-clock duration of one frame when throttled.
    pub frame_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            throttle: true,
            // NTSC frame rate, ~60 Hz.
            frame_interval: Duration::from_nanos(16_666_667),
        }
    }
}
