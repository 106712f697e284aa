use std::path::PathBuf;
use std::str::FromStr;

use heatguard_lib::bus::event_types::{is_alert, EVENT_SIMULATION_LIFECYCLE, EVENT_SUBJECT_UPDATED};
use heatguard_lib::bus::BusEvent;
use heatguard_lib::config::load_app_config;
use heatguard_lib::simulation::{ScenarioKind, TickPeriod};
use heatguard_lib::subject::generate_roster;
use heatguard_lib::{AppError, AppState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::broadcast;

const ROSTER_SIZE: usize = 5;

#[derive(Debug, Default)]
struct CliOptions {
    scenario: Option<ScenarioKind>,
    tick_period: Option<TickPeriod>,
    duration_ms: Option<u64>,
    base_url: Option<String>,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "heatguard=debug,info".parse().expect("valid env filter")),
        )
        .init();

    if let Err(error) = run().await {
        eprintln!("heatguard failed: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let Some(options) = parse_args(std::env::args().skip(1))? else {
        print_help();
        return Ok(());
    };

    let mut config = load_app_config(options.config_path.as_deref())?;
    if let Some(period) = options.tick_period {
        config.simulation.tick_period = period;
    }
    if let Some(duration_ms) = options.duration_ms {
        config.simulation.duration_ms = duration_ms;
    }
    if let Some(base_url) = options.base_url {
        config.prediction.base_url = base_url;
    }
    config.validate()?;

    let state = AppState::new(config)?;
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let roster = generate_roster(ROSTER_SIZE, &state.profiles, &mut rng);
    let target = roster[0].clone();
    for subject in roster {
        state.dashboard.insert_subject(subject);
    }

    let scenario = options.scenario.unwrap_or(ScenarioKind::HeatUp);
    let mut rx = state.bus.subscribe();
    let run_id = state.engine.start(scenario, &target).await?;
    tracing::info!(
        "running {scenario} for {} ({}) against {}",
        target.name,
        target.id,
        state.config.prediction.predict_url()
    );

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(error) = signal {
                    tracing::warn!("failed to listen for ctrl-c: {error}");
                }
                tracing::info!("interrupted, stopping simulation");
                if !state.engine.stop() {
                    break;
                }
            }
            received = rx.recv() => {
                match received {
                    Ok(event) => {
                        log_event(&event);
                        if is_run_end(&event, &run_id) {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("event log lagged, dropped {n} events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    if let Some(snapshot) = state.engine.snapshot() {
        let summary = serde_json::to_string_pretty(&snapshot)
            .map_err(|error| AppError::Config(format!("failed to render summary: {error}")))?;
        println!("{summary}");
    }
    let notifications = state.dashboard.notifications();
    if !notifications.is_empty() {
        println!("{} notification(s):", notifications.len());
        for notification in notifications.iter().rev() {
            println!("  [{:?}] {}", notification.severity, notification.message);
        }
    }
    Ok(())
}

fn log_event(event: &BusEvent) {
    if is_alert(event) {
        tracing::warn!("{} {}", event.event_type, event.payload);
    } else if event.event_type == EVENT_SUBJECT_UPDATED {
        tracing::debug!(
            "{} subject={} risk_color={}",
            event.event_type,
            event.subject_id.as_deref().unwrap_or("-"),
            event.payload["risk_color"]
        );
    } else {
        tracing::info!("{} {}", event.event_type, event.payload);
    }
}

fn is_run_end(event: &BusEvent, run_id: &str) -> bool {
    event.event_type == EVENT_SIMULATION_LIFECYCLE
        && event.run_id.as_deref() == Some(run_id)
        && event.payload["event"]["kind"] == "ended"
}

/// Returns `None` when help was requested.
fn parse_args(args: impl Iterator<Item = String>) -> Result<Option<CliOptions>, AppError> {
    let mut options = CliOptions::default();
    let mut args = args;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(None);
        }

        let (flag, inline_value) = match arg.split_once('=') {
            Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
            None => (arg.clone(), None),
        };
        let mut value = || {
            inline_value
                .clone()
                .or_else(|| args.next())
                .ok_or_else(|| AppError::Config(format!("{flag} requires a value")))
        };

        match flag.as_str() {
            "--scenario" => {
                options.scenario = Some(ScenarioKind::from_str(&value()?).map_err(AppError::Config)?);
            }
            "--tick-ms" => {
                let millis = parse_number(&flag, &value()?)?;
                options.tick_period = Some(TickPeriod::try_from(millis).map_err(AppError::Config)?);
            }
            "--duration-ms" => options.duration_ms = Some(parse_number(&flag, &value()?)?),
            "--url" => options.base_url = Some(value()?),
            "--config" => options.config_path = Some(PathBuf::from(value()?)),
            "--seed" => options.seed = Some(parse_number(&flag, &value()?)?),
            _ => {
                return Err(AppError::Config(format!(
                    "unknown argument '{arg}'. Use --help for usage"
                )))
            }
        }
    }

    Ok(Some(options))
}

fn parse_number(flag: &str, value: &str) -> Result<u64, AppError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|error| AppError::Config(format!("invalid {flag} value '{value}': {error}")))
}

fn print_help() {
    println!("Heat-stress scenario simulator");
    println!();
    println!("Usage:");
    println!("  heatguard [options]");
    println!();
    println!("Options:");
    println!("  --scenario heatup|cooldown   Scenario to run (default: heatup)");
    println!("  --tick-ms 200|500|1000|2000  Tick period (default: 1000)");
    println!("  --duration-ms <n>            Run duration (default: 30000)");
    println!("  --url <base-url>             Prediction service base URL");
    println!("  --config <path>              JSON config file (or HEATGUARD_CONFIG)");
    println!("  --seed <n>                   Seed for the synthetic roster");
    println!("  -h, --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> impl Iterator<Item = String> {
        values
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn test_parse_both_flag_forms() {
        let options = parse_args(args(&[
            "--scenario=cooldown",
            "--tick-ms",
            "500",
            "--duration-ms=4000",
            "--seed",
            "42",
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(options.scenario, Some(ScenarioKind::CoolDown));
        assert_eq!(options.tick_period, Some(TickPeriod::Millis500));
        assert_eq!(options.duration_ms, Some(4_000));
        assert_eq!(options.seed, Some(42));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_args(args(&["--tick-ms", "750"])).is_err());
        assert!(parse_args(args(&["--scenario"])).is_err());
        assert!(parse_args(args(&["--frobnicate"])).is_err());
        assert!(parse_args(args(&["--help"])).unwrap().is_none());
    }
}
