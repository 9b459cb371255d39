use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use ceres80_core::Ceres80;
use log::{error, info, warn};
use thiserror::Error;
use typed_builder::TypedBuilder;

/// How long a paused or idle drive loop sleeps before checking again.
const PAUSE_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct ControllerConfig {
    /// Target frames per second when pacing.
    #[builder(default = ceres80_core::FRAMES_PER_SECOND)]
    pub frame_rate: u32,
    /// Sleep between frames to hold `frame_rate`. Off runs flat out.
    #[builder(default = true)]
    pub pace: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ControllerConfig {
    fn frame_time(&self) -> Option<Duration> {
        if self.pace && self.frame_rate > 0 {
            Some(Duration::from_secs_f64(1.0 / f64::from(self.frame_rate)))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// LCD contents after a frame, as returned by `Ceres80::framebuffer`.
    Frame(Vec<u8>),
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("emulator is already running")]
    AlreadyRunning,
    #[error("failed to spawn drive thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Runs a [`Ceres80`] on a background thread, one frame at a time.
///
/// The machine sits behind `Arc<Mutex<_>>` so a host can inspect it
/// between frames. Pause and stop requests are picked up before each frame.
pub struct EmulatorController {
    machine: Arc<Mutex<Ceres80>>,
    config: ControllerConfig,
    events: Sender<ControllerEvent>,
    cancel: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl EmulatorController {
    /// Wrap `machine` and return the receiving end of the frame channel.
    pub fn new(machine: Ceres80, config: ControllerConfig) -> (Self, Receiver<ControllerEvent>) {
        let (events, receiver) = mpsc::channel();
        let controller = Self {
            machine: Arc::new(Mutex::new(machine)),
            config,
            events,
            cancel: Arc::new(AtomicBool::new(false)),
            paused: Arc::new(AtomicBool::new(false)),
            worker: None,
        };
        (controller, receiver)
    }

    pub fn machine(&self) -> Arc<Mutex<Ceres80>> {
        Arc::clone(&self.machine)
    }

    pub fn config(&self) -> ControllerConfig {
        self.config
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    /// Start the drive loop. Fails if one is already active.
    pub fn start(&mut self) -> Result<(), ControllerError> {
        if self.is_running() {
            return Err(ControllerError::AlreadyRunning);
        }
        // Reap a loop that ended on its own.
        self.join_worker();

        self.cancel.store(false, Ordering::Release);
        self.paused.store(false, Ordering::Release);

        let drive = DriveLoop {
            machine: Arc::clone(&self.machine),
            events: self.events.clone(),
            cancel: Arc::clone(&self.cancel),
            paused: Arc::clone(&self.paused),
            frame_time: self.config.frame_time(),
        };

        let worker = thread::Builder::new()
            .name("ceres80_drive".into())
            .spawn(move || drive.run())
            .map_err(|e| {
                error!("Failed to spawn Ceres80 drive thread: {e}");
                ControllerError::Spawn(e)
            })?;

        self.worker = Some(worker);
        info!("emulator started");
        Ok(())
    }

    /// Cancel the drive loop, wait for it to finish its current frame, and
    /// reset the machine. Does nothing if no loop is active.
    pub fn stop(&mut self) {
        if self.worker.is_none() {
            return;
        }
        self.cancel.store(true, Ordering::Release);
        self.join_worker();
        self.paused.store(false, Ordering::Release);

        match self.machine.lock() {
            Ok(mut machine) => machine.reset(),
            Err(_) => warn!("machine lock poisoned, skipping reset"),
        }
        info!("emulator stopped");
    }

    /// Flip the pause gate and return the new state (`true` = paused).
    pub fn toggle_pause(&self) -> bool {
        let paused = !self.paused.fetch_xor(true, Ordering::AcqRel);
        info!("emulator {}", if paused { "paused" } else { "resumed" });
        paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Ceres80 drive thread panicked");
            }
        }
    }
}

impl Drop for EmulatorController {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Release);
        self.join_worker();
    }
}

/// State moved onto the drive thread.
struct DriveLoop {
    machine: Arc<Mutex<Ceres80>>,
    events: Sender<ControllerEvent>,
    cancel: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    frame_time: Option<Duration>,
}

impl DriveLoop {
    fn run(self) {
        while !self.cancel.load(Ordering::Acquire) {
            if self.paused.load(Ordering::Acquire) {
                thread::sleep(PAUSE_POLL);
                continue;
            }

            let started = Instant::now();
            let (frame, idle) = match self.machine.lock() {
                Ok(mut machine) => {
                    machine.run_frame();
                    (machine.framebuffer(), machine.cycles_per_frame() == 0)
                }
                Err(_) => {
                    error!("machine lock poisoned, stopping drive loop");
                    break;
                }
            };

            // The host may have dropped the receiver; keep running regardless.
            let _ = self.events.send(ControllerEvent::Frame(frame));

            let mut rest = self
                .frame_time
                .and_then(|frame_time| frame_time.checked_sub(started.elapsed()));
            // At speed 0 a frame does no work; do not spin on the lock.
            if idle {
                rest = Some(rest.map_or(PAUSE_POLL, |rest| rest.max(PAUSE_POLL)));
            }
            if let Some(rest) = rest {
                thread::sleep(rest);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ceres80_core::{SCREEN_HEIGHT, SCREEN_WIDTH};

    const RECV_TIMEOUT: Duration = Duration::from_secs(5);

    fn looping_machine() -> Ceres80 {
        let mut machine = Ceres80::new().unwrap();
        // JR -2
        machine.load_rom(&[0x18, 0xFE]).unwrap();
        machine
    }

    #[test]
    fn config_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.frame_rate, 60);
        assert!(config.pace);

        let config = ControllerConfig::builder().pace(false).build();
        assert_eq!(config.frame_time(), None);
    }

    #[test]
    fn start_twice_is_rejected() {
        let config = ControllerConfig::builder().pace(false).build();
        let (mut controller, frames) = EmulatorController::new(looping_machine(), config);

        controller.start().unwrap();
        assert!(matches!(
            controller.start(),
            Err(ControllerError::AlreadyRunning)
        ));

        let ControllerEvent::Frame(frame) = frames.recv_timeout(RECV_TIMEOUT).unwrap();
        assert_eq!(frame.len(), SCREEN_WIDTH * SCREEN_HEIGHT);

        controller.stop();
        assert!(!controller.is_running());
    }

    #[test]
    fn stop_resets_and_allows_restart() {
        let config = ControllerConfig::builder().pace(false).build();
        let (mut controller, frames) = EmulatorController::new(looping_machine(), config);

        controller.start().unwrap();
        frames.recv_timeout(RECV_TIMEOUT).unwrap();
        controller.stop();

        {
            let machine = controller.machine();
            let machine = machine.lock().unwrap();
            assert_eq!(machine.registers().pc, 0);
        }

        controller.start().unwrap();
        frames.recv_timeout(RECV_TIMEOUT).unwrap();
        controller.stop();
    }

    #[test]
    fn pause_gates_frames() {
        let config = ControllerConfig::builder().frame_rate(120).build();
        let (mut controller, frames) = EmulatorController::new(looping_machine(), config);

        assert!(controller.toggle_pause());
        assert!(controller.is_paused());
        // `start` always begins unpaused.
        controller.start().unwrap();
        assert!(!controller.is_paused());
        frames.recv_timeout(RECV_TIMEOUT).unwrap();

        assert!(controller.toggle_pause());
        // Let an in-flight frame land, then the channel must go quiet.
        thread::sleep(Duration::from_millis(250));
        while frames.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(50));
        assert!(frames.try_recv().is_err());

        assert!(!controller.toggle_pause());
        frames.recv_timeout(RECV_TIMEOUT).unwrap();
        controller.stop();
    }

    #[test]
    fn zero_speed_loop_does_not_spin() {
        let mut machine = looping_machine();
        machine.set_speed(0).unwrap();
        let config = ControllerConfig::builder().pace(false).build();
        let (mut controller, frames) = EmulatorController::new(machine, config);

        controller.start().unwrap();
        thread::sleep(Duration::from_millis(200));
        controller.stop();

        // One frame per poll interval at most, so about 20 here.
        let count = frames.try_iter().count();
        assert!(count >= 1, "{count}");
        assert!(count < 100, "{count}");
    }

    #[test]
    fn stop_without_start_is_a_no_op() {
        let (mut controller, _frames) =
            EmulatorController::new(looping_machine(), ControllerConfig::default());
        controller.stop();
        assert!(!controller.is_running());
    }
}
