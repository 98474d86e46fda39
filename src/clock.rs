use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::nes::Nes;

struct ClockControl {
    running: AtomicBool,
    paused: AtomicBool,
    throttle: AtomicBool,
}

/// Owns the emulation thread. The machine runs frame by frame; when
/// throttled, the remainder of each frame interval is slept away rather
/// than spun.
pub struct Clock {
    handle: JoinHandle<Nes>,
    control: Arc<ClockControl>,
}

impl Clock {
    pub fn spawn(mut nes: Nes, config: &Config) -> Clock {
        let control = Arc::new(ClockControl {
            running: AtomicBool::new(true),
            paused: AtomicBool::new(false),
            throttle: AtomicBool::new(config.throttle),
        });
        let frame_interval = config.frame_interval;

        let thread_control = Arc::clone(&control);
        let handle = thread::spawn(move || {
            let mut frame_start = Instant::now();

            while thread_control.running.load(Ordering::Relaxed) {
                if thread_control.paused.load(Ordering::Relaxed) {
                    thread::sleep(Duration::from_millis(5));
                    frame_start = Instant::now();
                    continue;
                }

                nes.run_frame();

                if thread_control.throttle.load(Ordering::Relaxed) {
                    let elapsed = frame_start.elapsed();
                    if elapsed < frame_interval {
                        thread::sleep(frame_interval - elapsed);
                    }
                }
                frame_start = Instant::now();
            }

            nes
        });

        Clock { handle, control }
    }

    pub fn pause(&self) {
        self.control.paused.store(true, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.control.paused.store(false, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.control.paused.load(Ordering::Relaxed)
    }

    pub fn set_throttle(&self, throttle: bool) {
        self.control.throttle.store(throttle, Ordering::Relaxed);
    }

    /// Stop the loop and hand the machine back.
    ///
    /// Panics if the emulation thread itself panicked; there is no machine
    /// left to return in that case.
    pub fn stop(self) -> Nes {
        self.control.running.store(false, Ordering::Relaxed);
        self.handle.join().expect("clock thread panicked")
    }
}
