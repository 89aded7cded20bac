//! # Allocation Flows
//!
//! End-to-end allocation through `SequenceApi`: sequential issuance up to
//! depletion, electronic formatting, expiration, and rollback behavior.

#[cfg(test)]
mod tests {
    use ncf_sequencing::{
        IssuedDocument, NcfError, SequenceApi, SequenceState, StockLevel,
    };

    use crate::fixtures::{active_sequence, harness, ymd, COMPANY};

    #[tokio::test]
    async fn test_physical_range_issues_every_number_then_depletes() {
        let h = harness();
        let seq = active_sequence(&h.service, "01", 1, 100).await;

        for n in 1..=100u64 {
            let doc = h
                .service
                .issue(COMPANY, "01", &format!("INV/2025/{n:04}"))
                .await
                .unwrap();
            assert_eq!(doc.identifier, format!("B01{n:08}"));
        }

        // Marked depleted by the last allocation, so nothing resolves
        let err = h.service.issue(COMPANY, "01", "INV/2025/0101").await.unwrap_err();
        assert!(matches!(err, NcfError::NoActiveSequence { .. }));

        let mut tx = h.service.begin().await.unwrap();
        let err = h.service.next_number(tx.as_mut(), seq.id).await.unwrap_err();
        assert!(matches!(err, NcfError::Depleted { current_number: 100, .. }));

        let status = h.service.status(seq.id).await.unwrap();
        assert_eq!(status.state, SequenceState::Depleted);
        assert_eq!(status.available, 0);
        assert_eq!(status.stock_level, StockLevel::Critical);
        assert_eq!(h.store.documents(COMPANY).len(), 100);
    }

    #[tokio::test]
    async fn test_electronic_range_formats_ten_digit_body() {
        let h = harness();
        let seq = active_sequence(&h.service, "31", 1, 5).await;

        let first = h.service.issue(COMPANY, "31", "ECF/1").await.unwrap();
        assert_eq!(first.identifier, "E310000000001");
        assert_eq!(first.identifier.len(), 13);

        for n in 2..=5 {
            h.service
                .issue(COMPANY, "31", &format!("ECF/{n}"))
                .await
                .unwrap();
        }

        let stored = h.service.refresh_state(seq.id).await.unwrap();
        assert_eq!(stored.current_number, stored.range_to);
        assert_eq!(stored.state, SequenceState::Depleted);
    }

    #[tokio::test]
    async fn test_expired_sequence_refuses_with_capacity_left() {
        let h = harness();
        let seq = active_sequence(&h.service, "01", 1, 100).await;
        h.service.issue(COMPANY, "01", "INV/1").await.unwrap();

        h.clock.set(ymd(2027, 1, 1));
        let err = h.service.issue(COMPANY, "01", "INV/2").await.unwrap_err();
        assert!(matches!(
            err,
            NcfError::Expired { expiration_date, .. } if expiration_date == ymd(2026, 12, 31)
        ));
        assert_eq!(h.service.status(seq.id).await.unwrap().available, 99);
    }

    #[tokio::test]
    async fn test_last_day_of_validity_still_allocates() {
        let h = harness();
        active_sequence(&h.service, "01", 1, 100).await;
        h.clock.set(ymd(2026, 12, 31));
        assert!(h.service.issue(COMPANY, "01", "INV/1").await.is_ok());
    }

    #[tokio::test]
    async fn test_exempt_type_allocates_years_later() {
        let h = harness();
        active_sequence(&h.service, "02", 1, 100).await;
        h.clock.set(ymd(2031, 3, 1));
        let doc = h.service.issue(COMPANY, "02", "TICKET/1").await.unwrap();
        assert_eq!(doc.identifier, "B0200000001");
    }

    #[tokio::test]
    async fn test_caller_binds_identifier_in_its_transaction() {
        let h = harness();
        let seq = active_sequence(&h.service, "01", 1, 100).await;

        let mut tx = h.service.begin().await.unwrap();
        let identifier = h.service.next_number(tx.as_mut(), seq.id).await.unwrap();
        tx.attach_document(IssuedDocument::posted(
            COMPANY,
            "INV/manual",
            &identifier,
            Some(seq.id),
        ))
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let docs = h.store.documents(COMPANY);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].identifier, "B0100000001");
    }

    #[tokio::test]
    async fn test_failed_posting_releases_number() {
        let h = harness();
        let seq = active_sequence(&h.service, "01", 1, 100).await;

        let mut tx = h.service.begin().await.unwrap();
        h.service.next_number(tx.as_mut(), seq.id).await.unwrap();
        tx.rollback().await;

        let doc = h.service.issue(COMPANY, "01", "INV/1").await.unwrap();
        assert_eq!(doc.identifier, "B0100000001");
    }

    #[tokio::test]
    async fn test_external_duplicate_halts_allocation() {
        let h = harness();
        let seq = active_sequence(&h.service, "01", 1, 100).await;
        h.service.issue(COMPANY, "01", "INV/1").await.unwrap();

        // Counter rewound behind the allocator's back
        h.store
            .apply_external_edit(seq.id, |row| row.current_number = 0)
            .unwrap();

        let err = h.service.issue(COMPANY, "01", "INV/2").await.unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(
            &err,
            NcfError::IntegrityViolation { identifier, document_ref, .. }
                if identifier == "B0100000001" && document_ref == "INV/1"
        ));
        // Still halted on retry
        assert!(h.service.issue(COMPANY, "01", "INV/2").await.unwrap_err().is_fatal());
    }

    #[tokio::test]
    async fn test_cancelled_duplicate_is_not_a_violation() {
        let h = harness();
        let seq = active_sequence(&h.service, "01", 1, 100).await;
        h.service.issue(COMPANY, "01", "INV/1").await.unwrap();
        assert!(h.store.cancel_document(COMPANY, "B0100000001"));
        h.store
            .apply_external_edit(seq.id, |row| row.current_number = 0)
            .unwrap();

        let doc = h.service.issue(COMPANY, "01", "INV/2").await.unwrap();
        assert_eq!(doc.identifier, "B0100000001");
    }
}
