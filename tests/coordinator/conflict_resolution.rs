//! Conflict Resolution Tests
//!
//! Strategy dispatch when a client and the server hold incompatible
//! proposed states for the same section.

use redline::{ConflictStrategy, Error, SectionId, SectionSpec, TransactionManager};

fn spec(text: &str) -> SectionSpec {
    SectionSpec::new("t", format!("<p>{text}</p>"), text)
}

#[test]
fn client_wins_returns_client_content() {
    let manager = TransactionManager::new(ConflictStrategy::ClientWins);
    let resolved = manager
        .resolve_conflict(&SectionId::from("a"), spec("clientX"), spec("serverY"), None)
        .unwrap();
    assert_eq!(resolved.text, "clientX");
}

#[test]
fn server_wins_returns_server_content() {
    let manager = TransactionManager::new(ConflictStrategy::ServerWins);
    let resolved = manager
        .resolve_conflict(&SectionId::from("a"), spec("clientX"), spec("serverY"), None)
        .unwrap();
    assert_eq!(resolved.text, "serverY");
}

#[test]
fn merge_runs_the_supplied_function() {
    let manager = TransactionManager::new(ConflictStrategy::Merge);
    let merge = |client: SectionSpec, server: SectionSpec| {
        SectionSpec::new("merged", "", format!("{}|{}", client.text, server.text))
    };
    let resolved = manager
        .resolve_conflict(
            &SectionId::from("a"),
            spec("clientX"),
            spec("serverY"),
            Some(&merge),
        )
        .unwrap();
    assert_eq!(resolved.text, "clientX|serverY");
}

#[test]
fn merge_without_function_keeps_server_content() {
    let manager = TransactionManager::new(ConflictStrategy::Merge);
    let resolved = manager
        .resolve_conflict(&SectionId::from("a"), spec("clientX"), spec("serverY"), None)
        .unwrap();
    assert_eq!(resolved.text, "serverY");
}

#[test]
fn manual_raises_a_conflict_signal() {
    let manager = TransactionManager::new(ConflictStrategy::Manual);
    let err = manager
        .resolve_conflict(&SectionId::from("a"), spec("clientX"), spec("serverY"), None)
        .unwrap_err();
    match err {
        Error::ManualResolutionRequired { section } => {
            assert_eq!(section, SectionId::from("a"));
        }
        other => panic!("expected ManualResolutionRequired, got {other:?}"),
    }
}

#[test]
fn strategy_is_fixed_per_manager_instance() {
    let manager = TransactionManager::new(ConflictStrategy::ClientWins);
    assert_eq!(manager.strategy(), ConflictStrategy::ClientWins);

    // A second resolution uses the same strategy; there is no per-call
    // override.
    for _ in 0..2 {
        let resolved = manager
            .resolve_conflict(&SectionId::from("a"), spec("c"), spec("s"), None)
            .unwrap();
        assert_eq!(resolved.text, "c");
    }
}
