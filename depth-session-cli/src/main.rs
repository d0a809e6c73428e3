mod args;

use std::process::ExitCode;

use clap::Parser;

use depth_session_core::{
    run_benchmark, write_report, CancellationToken, CaptureLoop, DeviceSession, SessionConfig,
    SessionError,
};
use depth_session_sim::SimulatedDevice;

use args::Args;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), SessionError> {
    let config = args.session_config()?;
    log_config(&config);

    let mut device = build_device(args, &config);

    if args.test_init_runtime {
        let report = run_benchmark(&mut device, &config)?;
        log::info!(
            "{} cycles, mean {:.3} ms (min {:.3} ms, max {:.3} ms)",
            report.iterations,
            report.mean_cycle_ms,
            report.min_cycle_ms,
            report.max_cycle_ms
        );
        if let Some(path) = &args.report {
            write_report(&report, path)?;
        }
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        log::warn!("ctrl + c detected");
        handler_token.cancel();
    }) {
        log::warn!("failed to install Ctrl+C handler: {}", e);
    }

    let report = {
        let mut session = DeviceSession::new(&mut device, config.clone());
        session.initialize()?;
        session.warm_up(config.warmup_frame_count())?;
        CaptureLoop::new(cancel).run(&mut session)?
    };

    log::info!(
        "{} frames accepted over {} steps ({} empty) in {:.2}s",
        report.counters.accepted_frames,
        report.counters.elapsed_ticks,
        report.empty_bundles,
        report.elapsed_secs
    );
    if let Some(path) = &args.report {
        write_report(&report, path)?;
    }
    report.into_result().map(|_| ())
}

fn build_device(args: &Args, config: &SessionConfig) -> SimulatedDevice {
    let mut device = SimulatedDevice::new(args.sim_serials.clone())
        .with_selection(config.device_ids.clone());
    if !args.sim_unpaced {
        device = device.with_pacing(config.target_fps);
    }
    if let Some(dir) = &args.calibration_dir {
        device = device.with_calibration_dir(dir.clone());
    }
    if let Some(n) = args.sim_empty_every {
        device = device.with_empty_every(n);
    }
    if let Some(n) = args.sim_fail_after {
        device = device.with_fail_after(n);
    }
    device
}

fn log_config(config: &SessionConfig) {
    log::info!("========================================");
    log::info!(">>>>> config <<<<<");
    match serde_json::to_value(config) {
        Ok(serde_json::Value::Object(fields)) => {
            for (key, value) in fields {
                log::info!("{} : {}", key, value);
            }
        }
        _ => log::info!("{:?}", config),
    }
    log::info!("========================================");
}
