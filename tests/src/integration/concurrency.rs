//! # Concurrency
//!
//! Many writers against one counter. Every task retries its whole posting
//! operation on `LockConflict`, the way a document-posting caller would.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use futures::future::join_all;
    use ncf_sequencing::{
        IssuedDocument, NcfError, NewSequence, SequenceApi, SequenceService,
    };

    use crate::fixtures::{active_sequence, harness, ymd, COMPANY};

    async fn issue_with_retry(
        service: Arc<SequenceService>,
        type_code: &'static str,
        document_ref: String,
    ) -> IssuedDocument {
        loop {
            match service.issue(COMPANY, type_code, &document_ref).await {
                Ok(doc) => return doc,
                Err(e) if e.is_retryable() => tokio::time::sleep(Duration::from_millis(1)).await,
                Err(e) => panic!("unexpected allocation error: {e}"),
            }
        }
    }

    fn numbers(docs: &[IssuedDocument], prefix: &str) -> Vec<u64> {
        let mut numbers: Vec<u64> = docs
            .iter()
            .map(|d| d.identifier[prefix.len()..].parse().unwrap())
            .collect();
        numbers.sort_unstable();
        numbers
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_allocation_is_gapless_and_unique() {
        const TASKS: u64 = 64;
        let h = harness();
        let seq = active_sequence(&h.service, "01", 1, 1_000).await;

        let handles = (0..TASKS).map(|i| {
            tokio::spawn(issue_with_retry(
                Arc::clone(&h.service),
                "01",
                format!("INV/{i}"),
            ))
        });
        let docs: Vec<IssuedDocument> = join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(numbers(&docs, "B01"), (1..=TASKS).collect::<Vec<_>>());
        let stored = h.service.status(seq.id).await.unwrap();
        assert_eq!(stored.available, 1_000 - TASKS);
        assert_eq!(h.store.documents(COMPANY).len() as u64, TASKS);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_exhaustion_under_contention_never_overshoots() {
        let h = harness();
        let seq = active_sequence(&h.service, "31", 1, 10).await;

        let handles = (0..25).map(|i| {
            let service = Arc::clone(&h.service);
            tokio::spawn(async move {
                loop {
                    match service.issue(COMPANY, "31", &format!("ECF/{i}")).await {
                        Ok(doc) => return Some(doc),
                        Err(e) if e.is_retryable() => tokio::task::yield_now().await,
                        Err(NcfError::NoActiveSequence { .. }) | Err(NcfError::Depleted { .. }) => {
                            return None
                        }
                        Err(e) => panic!("unexpected allocation error: {e}"),
                    }
                }
            })
        });
        let docs: Vec<IssuedDocument> = join_all(handles)
            .await
            .into_iter()
            .filter_map(|r| r.unwrap())
            .collect();

        assert_eq!(numbers(&docs, "E31"), (1..=10).collect::<Vec<_>>());
        let stored = h.service.refresh_state(seq.id).await.unwrap();
        assert_eq!(stored.current_number, 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_independent_sequences_do_not_interfere() {
        let h = harness();
        active_sequence(&h.service, "01", 1, 500).await;
        active_sequence(&h.service, "02", 1, 500).await;

        let handles = (0..40).map(|i| {
            let type_code = if i % 2 == 0 { "01" } else { "02" };
            tokio::spawn(issue_with_retry(
                Arc::clone(&h.service),
                type_code,
                format!("DOC/{i}"),
            ))
        });
        let docs: Vec<IssuedDocument> = join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        let (b01, b02): (Vec<_>, Vec<_>) =
            docs.into_iter().partition(|d| d.identifier.starts_with("B01"));
        assert_eq!(numbers(&b01, "B01"), (1..=20).collect::<Vec<_>>());
        assert_eq!(numbers(&b02, "B02"), (1..=20).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_overlapping_authorizations_admit_one() {
        let h = harness();

        let handles = (0..8u64).map(|i| {
            let service = Arc::clone(&h.service);
            tokio::spawn(async move {
                // All candidates overlap 1-100
                service
                    .create_sequence(NewSequence::new(COMPANY, "01", 1 + i, 100 + i, ymd(2025, 6, 1)))
                    .await
            })
        });
        let results: Vec<_> = join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, NcfError::Validation(_))));
        assert_eq!(h.service.list_sequences(COMPANY, "01").await.unwrap().len(), 1);
    }
}
