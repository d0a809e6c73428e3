use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::models::config::SessionConfig;
use crate::models::error::SessionError;
use crate::models::report::BenchmarkReport;
use crate::session::lifecycle::DeviceSession;
use crate::traits::device_collaborator::DeviceCollaborator;
use crate::traits::session_delegate::{LogDelegate, ProgressEvent, SessionDelegate, StatusLevel};

/// Measures the latency of repeated device init/stop cycles.
///
/// One full validation cycle (initialize, warm-up, stop) runs first to make
/// sure the device is reachable. After that each cycle opens a fresh session
/// over the same collaborator, initializes it bare, and stops it. The first
/// failing cycle ends the benchmark.
pub struct Benchmark {
    delegate: Arc<dyn SessionDelegate>,
}

impl Benchmark {
    pub fn new() -> Self {
        Self {
            delegate: Arc::new(LogDelegate),
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn SessionDelegate>) {
        self.delegate = delegate;
    }

    pub fn run<D: DeviceCollaborator + ?Sized>(
        &self,
        device: &mut D,
        config: &SessionConfig,
        iterations: u32,
    ) -> Result<BenchmarkReport, SessionError> {
        if iterations == 0 {
            return Err(SessionError::InvalidConfiguration(
                "benchmark iterations must be positive".into(),
            ));
        }

        let config = SessionConfig {
            benchmark_mode: true,
            ..config.clone()
        };

        {
            let mut session = self.open_session(device, &config);
            session.initialize()?;
            session.warm_up(config.warmup_frame_count())?;
            session.stop();
        }

        let mut cycles: Vec<Duration> = Vec::with_capacity(iterations as usize);
        for iteration in 0..iterations {
            let started = Instant::now();
            {
                let mut session = self.open_session(device, &config);
                session
                    .initialize_bare()
                    .map_err(|e| SessionError::BenchmarkCycle {
                        iteration,
                        reason: Box::new(e),
                    })?;
                session.stop();
            }
            cycles.push(started.elapsed());
            self.delegate.on_progress(ProgressEvent::Cycle {
                completed: iteration + 1,
                total: iterations,
            });
        }

        let report = BenchmarkReport::from_cycles(&cycles);
        self.delegate.on_status(
            StatusLevel::Info,
            &format!("Finished in {:.6}", report.mean_cycle().as_secs_f64()),
        );
        Ok(report)
    }

    fn open_session<'a, D: DeviceCollaborator + ?Sized>(
        &self,
        device: &'a mut D,
        config: &SessionConfig,
    ) -> DeviceSession<'a, D> {
        let mut session = DeviceSession::new(device, config.clone());
        session.set_delegate(Arc::clone(&self.delegate));
        session
    }
}

impl Default for Benchmark {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the benchmark with `config.benchmark_iterations` cycles, logging to `log`.
pub fn run_benchmark<D: DeviceCollaborator + ?Sized>(
    device: &mut D,
    config: &SessionConfig,
) -> Result<BenchmarkReport, SessionError> {
    Benchmark::new().run(device, config, config.benchmark_iterations)
}
