//! Tests for error types

use anova_lab::Error;

#[test]
fn test_insufficient_observations_error() {
    let error = Error::InsufficientObservations {
        group: "SA-C".to_string(),
        test: "Shapiro-Wilk",
        required: 3,
        actual: 2,
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("Insufficient observations"));
    assert!(error_str.contains("'SA-C'"));
    assert!(error_str.contains("Shapiro-Wilk requires at least 3, got 2"));
}

#[test]
fn test_degenerate_sample_error() {
    let error = Error::DegenerateSample("zero range".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Degenerate sample"));
    assert!(error_str.contains("zero range"));
}

#[test]
fn test_distribution_error() {
    let error = Error::Distribution("bad degrees of freedom".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Distribution error"));
    assert!(error_str.contains("bad degrees of freedom"));
}

#[test]
fn test_storage_error() {
    let error = Error::StorageError("file not found".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Storage error"));
    assert!(error_str.contains("file not found"));
}

#[test]
fn test_invalid_input_error() {
    let error = Error::InvalidInput("alpha must lie in (0, 1)".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid input"));
    assert!(error_str.contains("alpha must lie in (0, 1)"));
}

#[test]
fn test_for_group_relabels_sample_errors() {
    let error = Error::InsufficientObservations {
        group: "sample".to_string(),
        test: "Shapiro-Wilk",
        required: 3,
        actual: 1,
    }
    .for_group("SA-FPP");
    assert!(matches!(
        error,
        Error::InsufficientObservations { ref group, actual: 1, .. } if group == "SA-FPP"
    ));

    let error = Error::DegenerateSample("all values identical".to_string()).for_group("SA-C");
    assert!(format!("{error}").contains("group 'SA-C'"));

    let error = Error::InvalidInput("x".to_string()).for_group("SA-C");
    assert_eq!(format!("{error}"), "Invalid input: x");
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let error: Error = json_error.into();
    assert!(format!("{error}").contains("JSON error"));
}

#[test]
fn test_other_error() {
    let error = Error::Other("custom error message".to_string());
    let error_str = format!("{error}");
    assert_eq!(error_str, "custom error message");
}

#[test]
fn test_error_debug() {
    let error = Error::DegenerateSample("constant".to_string());
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("DegenerateSample"));
}

#[test]
fn test_result_type_alias() {
    #[allow(clippy::unnecessary_wraps)]
    fn returns_result() -> anova_lab::Result<i32> {
        Ok(42)
    }

    let result = returns_result();
    assert!(result.is_ok());
    assert_eq!(result.unwrap(), 42);
}

#[test]
fn test_result_type_alias_error() {
    fn returns_error() -> anova_lab::Result<i32> {
        Err(Error::Other("test error".to_string()))
    }

    let result = returns_error();
    assert!(result.is_err());
}
