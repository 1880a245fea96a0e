//! Tests for the error taxonomy

use tether_registry::{ComponentKey, Error};

struct Database;

#[test]
fn test_duplicate_key_error() {
    let error = Error::duplicate_key(ComponentKey::of::<Database>());
    match error {
        Error::DuplicateKey { component } => assert!(component.contains("Database")),
        _ => panic!("Expected DuplicateKey error"),
    }
}

#[test]
fn test_unresolved_error() {
    let error = Error::unresolved(ComponentKey::of::<Database>());
    match error {
        Error::UnresolvedDependency { component } => assert!(component.contains("Database")),
        _ => panic!("Expected UnresolvedDependency error"),
    }
}

#[test]
fn test_circular_error_display() {
    let error = Error::circular(ComponentKey::of::<Database>());
    let display = format!("{error}");
    assert!(display.contains("circular dependency"));
    assert!(display.contains("Database"));
}

#[test]
fn test_registration_error() {
    let error = Error::registration(ComponentKey::of::<Database>(), "connection refused");
    match error {
        Error::Registration { component, message } => {
            assert!(component.contains("Database"));
            assert_eq!(message, "connection refused");
        }
        _ => panic!("Expected Registration error"),
    }
}

#[test]
fn test_resolution_error() {
    let error = Error::resolution(ComponentKey::of::<Database>(), "migration failed");
    match error {
        Error::Resolution { component, message } => {
            assert!(component.contains("Database"));
            assert_eq!(message, "migration failed");
        }
        _ => panic!("Expected Resolution error"),
    }
}

#[test]
fn test_disposal_error() {
    let error = Error::disposal("deck-view", "socket already closed");
    match error {
        Error::Disposal { owner, message } => {
            assert_eq!(owner, "deck-view");
            assert_eq!(message, "socket already closed");
        }
        _ => panic!("Expected Disposal error"),
    }
}

#[test]
fn test_error_from_string() {
    let error: Error = "factory exploded".into();
    match error {
        Error::String(message) => assert_eq!(message, "factory exploded"),
        _ => panic!("Expected String error"),
    }
}

#[test]
fn test_component_key_identity() {
    assert_eq!(ComponentKey::of::<Database>(), ComponentKey::of::<Database>());
    assert_ne!(ComponentKey::of::<Database>(), ComponentKey::of::<u32>());
    assert!(format!("{}", ComponentKey::of::<Database>()).contains("Database"));
}
