use std::time::Instant;

use crate::models::error::SessionError;
use crate::models::frame::{CaptureCounters, StepOptions};
use crate::models::report::{CaptureOutcome, CaptureReport};
use crate::session::cancellation::CancellationToken;
use crate::session::lifecycle::DeviceSession;
use crate::traits::device_collaborator::DeviceCollaborator;
use crate::traits::session_delegate::{ProgressEvent, StatusLevel};

/// Step-based acquisition loop over a ready session.
///
/// Each iteration emits a progress signal when the accepted count is a
/// multiple of `target_fps`, then steps the device:
/// - an empty bundle is retried without consuming budget
/// - a non-empty bundle increments the accepted count
/// - the loop completes once the count exceeds `target_fps * step_budget`
///   (so `F*S + 1` bundles are accepted) or the safety ceiling
///
/// Faults raised while stepping are handled at one place in [`run`]: the
/// fault is reported, the session is stopped, and the run is marked
/// aborted. Every run then ends with a final idempotent stop.
///
/// [`run`]: CaptureLoop::run
pub struct CaptureLoop {
    cancel: CancellationToken,
    counters: CaptureCounters,
    empty_bundles: u64,
    resets: u64,
}

impl CaptureLoop {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            counters: CaptureCounters::default(),
            empty_bundles: 0,
            resets: 0,
        }
    }

    /// Counters of the current or most recent run.
    pub fn counters(&self) -> CaptureCounters {
        self.counters
    }

    /// Run the loop to completion, cancellation, or abort.
    ///
    /// The session is always stopped when this returns. The only `Err`s are a
    /// session that was never initialized and an invalid configuration; step
    /// faults are reported in the returned [`CaptureReport`] with an
    /// `Aborted` outcome.
    pub fn run<D: DeviceCollaborator + ?Sized>(
        &mut self,
        session: &mut DeviceSession<'_, D>,
    ) -> Result<CaptureReport, SessionError> {
        self.counters = CaptureCounters::default();
        self.empty_bundles = 0;
        self.resets = 0;

        let delegate = session.delegate().clone();
        if let Err(e) = session
            .config()
            .validate()
            .and_then(|_| session.begin_capture())
        {
            session.stop();
            return Err(e);
        }

        let started = Instant::now();
        let report = match self.drive(session) {
            Ok(outcome) => CaptureReport::new(
                outcome,
                self.counters,
                self.empty_bundles,
                self.resets,
                started.elapsed(),
            ),
            Err(fault) => {
                delegate.on_error(&fault);
                delegate.on_status(StatusLevel::Info, "Stopping devices...");
                session.stop();
                CaptureReport::aborted(
                    fault,
                    self.counters,
                    self.empty_bundles,
                    self.resets,
                    started.elapsed(),
                )
            }
        };

        delegate.on_status(StatusLevel::Info, "Final stop of devices...");
        session.stop();
        delegate.on_status(StatusLevel::Info, "Finished...");
        Ok(report)
    }

    fn drive<D: DeviceCollaborator + ?Sized>(
        &mut self,
        session: &mut DeviceSession<'_, D>,
    ) -> Result<CaptureOutcome, SessionError> {
        let config = session.config().clone();
        let delegate = session.delegate().clone();
        let fps = u64::from(config.target_fps);
        let target = config.frame_target();
        let options = StepOptions {
            display: config.display_enabled,
            save_with_key: config.save_with_key,
        };

        let reset_targets: Vec<String> = config.device_ids.iter().cloned().collect();
        let reset_interval = match config.reset_interval {
            Some(_) if reset_targets.is_empty() => {
                delegate.on_status(
                    StatusLevel::Warning,
                    "Reset interval ignored: no device ids selected",
                );
                None
            }
            interval => interval,
        };

        let mut consecutive_empty: u64 = 0;
        loop {
            if self.cancel.is_cancelled() {
                delegate.on_status(StatusLevel::Info, "Capture cancelled...");
                return Ok(CaptureOutcome::Cancelled);
            }

            let count = self.counters.accepted_frames;
            if count % fps == 0 {
                delegate.on_progress(ProgressEvent::Step { count });
            }

            self.counters.elapsed_ticks += 1;
            let bundle = session.step(options)?;

            if bundle.is_empty() {
                self.empty_bundles += 1;
                consecutive_empty += 1;
                delegate.on_status(StatusLevel::Warning, "Empty...");
                if let Some(limit) = config.max_consecutive_empty {
                    if consecutive_empty > limit {
                        return Err(SessionError::EmptyBundleLimit {
                            consecutive: consecutive_empty,
                        });
                    }
                }
                continue;
            }

            consecutive_empty = 0;
            self.counters.accepted_frames += 1;
            let count = self.counters.accepted_frames;

            if let Some(interval) = reset_interval {
                if count % interval == 0 {
                    let index = ((count / interval - 1) % reset_targets.len() as u64) as usize;
                    session.reset_device(&reset_targets[index])?;
                    self.resets += 1;
                }
            }

            if count > target || count > config.step_ceiling {
                return Ok(CaptureOutcome::Completed);
            }
        }
    }
}
