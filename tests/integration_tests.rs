//! Integration tests for the aqi-widget library and CLI

use std::io::Write;
use std::process::Command;

use aqi_widget::source::{NoDelay, RngSource, SequenceRandom};
use aqi_widget::{
    AirQualityError, AqiCategory, AqiWidget, Categorizer, MemoryDisplay, OutOfRangePolicy,
    RequestState, Severity, SimulatedSource, SimulationConfig,
};

fn reliable_widget(seed: u64) -> AqiWidget<SimulatedSource<RngSource, NoDelay>, MemoryDisplay> {
    let source = SimulatedSource::new(SimulationConfig::reliable(), RngSource::seeded(seed), NoDelay);
    AqiWidget::new(source, Categorizer::default(), MemoryDisplay::new())
}

fn fast_config_file(extra: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "[simulation]\nmin_delay_ms = 0\nmax_delay_ms = 0\n{extra}"
    )
    .unwrap();
    file
}

/// Every successful lookup lands on the display with its category
#[tokio::test]
async fn test_reliable_lookups_are_categorized() {
    let widget = reliable_widget(11);
    for _ in 0..100 {
        let reading = widget.submit("Berlin").await.unwrap();
        assert!((0..=300).contains(&reading.aqi));
        assert_eq!(reading.category(), Some(AqiCategory::for_value(reading.aqi)));
        assert_eq!(widget.state(), RequestState::Success(reading.aqi));
    }
    widget.with_sink(|display| assert_eq!(display.frames().len(), 200));
}

/// Same seed, same sequence of readings
#[tokio::test]
async fn test_seeded_lookups_are_reproducible() {
    let a = reliable_widget(5);
    let b = reliable_widget(5);
    for _ in 0..20 {
        assert_eq!(
            a.submit("Oslo").await.unwrap().aqi,
            b.submit("Oslo").await.unwrap().aqi
        );
    }
}

#[tokio::test]
async fn test_deny_list_beats_zero_failure_probability() {
    let settings = SimulationConfig {
        min_delay_ms: 0,
        max_delay_ms: 0,
        failure_probability: 0.0,
        ..SimulationConfig::default()
    };
    let source = SimulatedSource::new(settings, SequenceRandom::new([0.5]), NoDelay);
    let widget = AqiWidget::new(source, Categorizer::default(), MemoryDisplay::new());

    for name in ["london", "Paris", "TOKYO"] {
        let err = widget.submit(name).await.unwrap_err();
        assert!(matches!(err, AirQualityError::NoData { .. }));
    }
    assert_eq!(widget.state(), RequestState::Failed);

    // a location off the list still resolves afterwards
    assert!(widget.submit("Madrid").await.is_ok());
}

#[tokio::test]
async fn test_policy_changes_only_out_of_range_values() {
    let scan = Categorizer::standard(OutOfRangePolicy::ThresholdScan);
    let unexpected = Categorizer::standard(OutOfRangePolicy::Unexpected);

    for aqi in 0..=300 {
        assert_eq!(scan.categorize(aqi), unexpected.categorize(aqi));
    }
    assert_eq!(scan.categorize(301).category, Some(AqiCategory::Hazardous));
    assert!(unexpected.categorize(301).is_unknown());
    assert_eq!(scan.categorize(-1).category, Some(AqiCategory::Good));
    assert!(unexpected.categorize(-1).is_unknown());
}

#[tokio::test]
async fn test_whitespace_submit_renders_validation_frame() {
    let widget = reliable_widget(1);
    let err = widget.submit(" \t ").await.unwrap_err();
    assert!(matches!(err, AirQualityError::Validation { .. }));
    widget.with_sink(|display| {
        assert_eq!(display.frames().len(), 1);
        assert_eq!(display.frames()[0].status.severity, Severity::Error);
    });
    assert_eq!(widget.state(), RequestState::Idle);
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_aqi-widget"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("aqi-widget"));
    assert!(stdout.contains("Air quality index lookup"));
}

/// Test categorize subcommand JSON output
#[test]
fn test_cli_categorize_json() {
    let output = Command::new(env!("CARGO_BIN_EXE_aqi-widget"))
        .args(["categorize", "175", "--json"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let presentation: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(presentation["category"], "unhealthy");
    assert_eq!(presentation["color"], "#dc3545");
    assert_eq!(presentation["style_tag"], "aqi-unhealthy");
}

/// Negative values are accepted and follow the policy flag
#[test]
fn test_cli_categorize_negative_unexpected() {
    let output = Command::new(env!("CARGO_BIN_EXE_aqi-widget"))
        .args(["categorize", "-4", "--policy", "unexpected"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("AQI -4: unknown"));
    assert!(stdout.contains("Could not determine health advice"));
}

/// Test check subcommand against a deny-listed city
#[test]
fn test_cli_check_deny_listed_location() {
    let config = fast_config_file("");
    let output = Command::new(env!("CARGO_BIN_EXE_aqi-widget"))
        .arg("--config")
        .arg(config.path())
        .args(["check", "--location", "London"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Fetching AQI for London..."));
    assert!(stdout.contains("Error: Simulated error: No data is available for London."));
    assert!(stdout.contains("AQI: ---"));
}

/// Test check subcommand with failures disabled
#[test]
fn test_cli_check_success() {
    let config = fast_config_file("failure_probability = 0.0");
    let output = Command::new(env!("CARGO_BIN_EXE_aqi-widget"))
        .arg("--config")
        .arg(config.path())
        .args(["--seed", "3", "check", "--location", "Berlin"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("AQI fetched successfully!"));
}

/// Environment variables override the config file
#[test]
fn test_cli_env_override() {
    let config = fast_config_file("failure_probability = 0.0");
    let output = Command::new(env!("CARGO_BIN_EXE_aqi-widget"))
        .arg("--config")
        .arg(config.path())
        .args(["check", "--location", "Berlin"])
        .env("AQI_WIDGET_SIMULATION__FAILURE_PROBABILITY", "1")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Error: Simulated random server error. Please try again."));
}

/// Invalid values from the environment are rejected like file values
#[test]
fn test_cli_env_override_is_validated() {
    let config = fast_config_file("");
    let output = Command::new(env!("CARGO_BIN_EXE_aqi-widget"))
        .arg("--config")
        .arg(config.path())
        .args(["check", "--location", "Berlin"])
        .env("AQI_WIDGET_SIMULATION__FAILURE_PROBABILITY", "3")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failure probability"));
}

/// Test interactive mode reading from stdin
#[test]
fn test_cli_interactive() {
    use std::process::Stdio;

    let config = fast_config_file("failure_probability = 1.0");
    let mut child = Command::new(env!("CARGO_BIN_EXE_aqi-widget"))
        .arg("--config")
        .arg(config.path())
        .arg("interactive")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn command");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"\nBerlin\nquit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Please enter a location."));
    assert!(stdout.contains("Error: Simulated random server error. Please try again."));
}
