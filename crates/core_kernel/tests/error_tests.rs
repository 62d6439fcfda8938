//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::ports::PortError;

#[test]
fn test_core_error_out_of_range() {
    let error = CoreError::out_of_range("credit_score", 1.5);

    match &error {
        CoreError::OutOfRange { field, value } => {
            assert_eq!(field, "credit_score");
            assert_eq!(value, "1.5");
        }
        _ => panic!("Expected OutOfRange error"),
    }
    assert_eq!(error.to_string(), "Value out of range: credit_score = 1.5");
}

#[test]
fn test_core_error_configuration() {
    let error = CoreError::Configuration("Missing config".to_string());

    match error {
        CoreError::Configuration(msg) => assert_eq!(msg, "Missing config"),
        _ => panic!("Expected Configuration error"),
    }
}

#[test]
fn test_port_error_classification() {
    let connection = PortError::connection("database unreachable");
    assert!(connection.is_transient());

    let query = PortError::query("syntax error at or near SELECT");
    assert!(!query.is_transient());
    assert!(query.to_string().contains("syntax error"));

    let transformation = PortError::Transformation {
        message: "bad row".to_string(),
    };
    assert!(!transformation.is_transient());
}
