//! Tests for point construction.

use chrono::{Local, TimeZone, Utc};
use metricbridge::emit::build_point;
use metricbridge::types::ParsedCommand;

fn command() -> ParsedCommand {
    ParsedCommand {
        metric_name: "temperature".to_string(),
        field: "sensor1".to_string(),
        timestamp: Local.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap(),
    }
}

#[test]
fn test_point_shape() {
    let point = build_point(&command());
    assert_eq!(point.measurement, "temperature");
    assert_eq!(
        point.tags,
        vec![("camera".to_string(), "sensor1".to_string())]
    );
    assert_eq!(point.fields, vec![("activate".to_string(), 1)]);
}

#[test]
fn test_point_carries_emission_time_not_command_time() {
    let cmd = command();
    let point = build_point(&cmd);
    let now = Utc::now();

    // Emission instant, within a generous window around the call.
    let age = now.signed_duration_since(point.timestamp);
    assert!(age.num_seconds().abs() < 5, "unexpected point age: {age}");
    assert_ne!(point.timestamp, cmd.timestamp.with_timezone(&Utc));
}
