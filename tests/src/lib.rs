//! # NCF Sequencing Test Suite
//!
//! Unified test crate exercising the sequencing core through its public API.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── allocation_flows.rs   # End-to-end allocation, depletion, expiration
//! │   ├── configuration.rs      # Range authorization across sequences
//! │   └── concurrency.rs        # Many writers, one counter
//! └── benches/
//!     └── allocation_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ncf-tests
//! cargo test -p ncf-tests integration::concurrency
//! cargo bench -p ncf-tests
//! ```


/// Shared fixtures for the suite.
pub mod fixtures {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use ncf_sequencing::{
        CompanyId, FixedClock, InMemorySequenceStore, NewSequence, Sequence, SequenceApi,
        SequenceService, SequencingConfig, TypeCatalog,
    };

    /// Company used across the suite.
    pub const COMPANY: CompanyId = CompanyId(1);

    /// Shorthand date constructor.
    pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    /// Service, its backing store, and the clock pinned to 2025-07-01.
    pub struct Harness {
        /// Service under test.
        pub service: Arc<SequenceService>,
        /// Store and ledger behind it.
        pub store: InMemorySequenceStore,
        /// Settable clock.
        pub clock: Arc<FixedClock>,
    }

    /// Build a harness over the standard catalog.
    pub fn harness() -> Harness {
        harness_with(SequencingConfig::for_testing())
    }

    /// Build a harness with a custom configuration.
    pub fn harness_with(config: SequencingConfig) -> Harness {
        ncf_telemetry::try_init_test_logging();
        let clock = Arc::new(FixedClock::new(ymd(2025, 7, 1)));
        let (service, store) =
            SequenceService::in_memory(TypeCatalog::standard(), clock.clone(), config);
        Harness {
            service: Arc::new(service),
            store,
            clock,
        }
    }

    /// Create and activate a sequence authorized on 2025-06-01.
    pub async fn active_sequence(
        service: &SequenceService,
        type_code: &str,
        range_from: u64,
        range_to: u64,
    ) -> Sequence {
        let draft = service
            .create_sequence(NewSequence::new(
                COMPANY,
                type_code,
                range_from,
                range_to,
                ymd(2025, 6, 1),
            ))
            .await
            .expect("range accepted");
        service.activate(draft.id).await.expect("activation")
    }
}
