//! Shared test setup: one-time logging and contact fixtures.

use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{Contact, PhoneNumber, RecordTree};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "debug");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_target(true)
            .with_thread_names(false)
            .with_test_writer()
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Contact with a known-valid phone number.
pub fn contact(last: &str, first: &str, area: u16, prefix: u16, line: u16) -> Contact {
    match PhoneNumber::new(area, prefix, line) {
        Ok(phone) => Contact::new(last, first, phone),
        Err(e) => panic!("invalid fixture phone number: {e}"),
    }
}

/// Tree built by inserting `contacts` in order.
pub fn tree_of(contacts: &[Contact]) -> RecordTree<Contact> {
    let mut tree = RecordTree::new();
    for contact in contacts {
        tree.insert(contact.clone());
    }
    tree
}

/// Sorted sequence: every insert lands in the greater slot of the last one.
pub fn chain(len: u32) -> RecordTree<Contact> {
    let mut tree = RecordTree::new();
    for i in 0..len {
        tree.insert(contact(&format!("N{i:07}"), "CHAIN", 100, 200, (i % 10_000) as u16));
    }
    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }

    #[test]
    fn chain_is_degenerate() {
        let tree = chain(50);
        assert_eq!(tree.depth(), 50);
        assert!(tree.is_ordered());
    }
}
