//! # Configuration
//!
//! Range authorization across the lifetime of a document type: successive
//! ranges, migrated history, draft edits, status and alerts.

#[cfg(test)]
mod tests {
    use ncf_sequencing::{
        ErrorCategory, IssuedDocument, NcfError, NewSequence, SequenceAlert, SequenceApi,
        SequenceState, SequenceUpdate, SequencingConfig, StockLevel, ValidationError,
    };

    use crate::fixtures::{active_sequence, harness, harness_with, ymd, COMPANY};

    #[tokio::test]
    async fn test_successor_range_after_depletion() {
        let h = harness();
        active_sequence(&h.service, "01", 1, 3).await;
        for n in 1..=3 {
            h.service.issue(COMPANY, "01", &format!("INV/{n}")).await.unwrap();
        }
        assert!(matches!(
            h.service.issue(COMPANY, "01", "INV/4").await,
            Err(NcfError::NoActiveSequence { .. })
        ));

        // Touching the previous range is both overlap and retroactive; overlap wins
        let err = h
            .service
            .create_sequence(NewSequence::new(COMPANY, "01", 3, 50, ymd(2025, 7, 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, NcfError::Validation(ValidationError::Overlap { .. })));

        let next = h
            .service
            .create_sequence(NewSequence::new(COMPANY, "01", 4, 50, ymd(2025, 7, 1)))
            .await
            .unwrap();
        h.service.activate(next.id).await.unwrap();
        let doc = h.service.issue(COMPANY, "01", "INV/4").await.unwrap();
        assert_eq!(doc.identifier, "B0100000004");
    }

    #[tokio::test]
    async fn test_migrated_history_blocks_retroactive_range() {
        let h = harness();
        h.store.record_document(IssuedDocument::posted(
            COMPANY,
            "LEGACY/77",
            "E310000000077",
            None,
        ));

        let err = h
            .service
            .create_sequence(NewSequence::new(COMPANY, "31", 1, 500, ymd(2025, 6, 1)))
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
        let message = err.to_string();
        assert!(message.contains("E310000000077"));
        assert!(message.contains("78"));

        assert!(h
            .service
            .create_sequence(NewSequence::new(COMPANY, "31", 78, 500, ymd(2025, 6, 1)))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_ranges_must_ascend() {
        let h = harness();
        active_sequence(&h.service, "01", 101, 200).await;
        let err = h
            .service
            .create_sequence(NewSequence::new(COMPANY, "01", 1, 100, ymd(2025, 6, 1)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NcfError::Validation(ValidationError::NonAscending { previous_to: 200, .. })
        ));
    }

    #[tokio::test]
    async fn test_companies_are_isolated() {
        let h = harness();
        active_sequence(&h.service, "01", 1, 100).await;
        let other = h
            .service
            .create_sequence(NewSequence::new(
                ncf_sequencing::CompanyId(2),
                "01",
                1,
                100,
                ymd(2025, 6, 1),
            ))
            .await
            .unwrap();
        assert_eq!(other.range_from, 1);
    }

    #[tokio::test]
    async fn test_physical_capacity_enforced() {
        let h = harness();
        let err = h
            .service
            .create_sequence(NewSequence::new(COMPANY, "01", 1, 100_000_000, ymd(2025, 6, 1)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NcfError::Validation(ValidationError::ExceedsFormatCapacity { .. })
        ));
    }

    #[tokio::test]
    async fn test_draft_edit_then_activate() {
        let h = harness();
        let draft = h
            .service
            .create_sequence(NewSequence::new(COMPANY, "03", 1, 10, ymd(2025, 6, 1)))
            .await
            .unwrap();
        let edited = h
            .service
            .update_draft(
                draft.id,
                SequenceUpdate {
                    range_to: Some(1_000),
                    warning_threshold: Some(100),
                    ..SequenceUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.range_to, 1_000);
        assert_eq!(edited.state, SequenceState::Draft);

        // Edits still run the validator
        let err = h
            .service
            .update_draft(
                draft.id,
                SequenceUpdate {
                    range_to: Some(0),
                    ..SequenceUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, NcfError::Validation(ValidationError::MalformedRange { .. })));

        let active = h.service.activate(draft.id).await.unwrap();
        assert_eq!(active.state, SequenceState::Active);
        assert_eq!(active.warning_threshold, 100);
    }

    #[tokio::test]
    async fn test_activation_after_expiration_refused() {
        let h = harness();
        let draft = h
            .service
            .create_sequence(NewSequence::new(COMPANY, "01", 1, 100, ymd(2023, 3, 1)))
            .await
            .unwrap();
        assert_eq!(draft.expiration_date, Some(ymd(2024, 12, 31)));
        assert!(matches!(
            h.service.activate(draft.id).await,
            Err(NcfError::Expired { .. })
        ));
    }

    #[tokio::test]
    async fn test_status_and_alerts_track_consumption() {
        let h = harness_with(SequencingConfig {
            default_warning_threshold: 10,
            ..SequencingConfig::for_testing()
        });
        let seq = active_sequence(&h.service, "01", 1, 30).await;
        for n in 0..22 {
            h.service.issue(COMPANY, "01", &format!("INV/{n}")).await.unwrap();
        }

        let status = h.service.status(seq.id).await.unwrap();
        assert_eq!(status.available, 8);
        assert_eq!(status.stock_level, StockLevel::Low);
        assert_eq!(status.next_number, Some(23));

        h.clock.set(ymd(2026, 12, 15));
        let alerts = h
            .service
            .alerts(COMPANY, "01", &h.service.alert_policy())
            .await
            .unwrap();
        assert_eq!(alerts.len(), 2);
        assert!(alerts
            .iter()
            .any(|a| matches!(a, SequenceAlert::LowStock { available: 8, .. })));
        assert!(alerts
            .iter()
            .any(|a| matches!(a, SequenceAlert::ExpiringSoon { days: 16, .. })));
    }

    #[tokio::test]
    async fn test_metrics_are_exported() {
        let h = harness();
        active_sequence(&h.service, "01", 1, 100).await;
        h.service.issue(COMPANY, "01", "INV/1").await.unwrap();

        let text = ncf_telemetry::gather_metrics().unwrap();
        assert!(text.contains("ncf_allocator_allocations_total"));
        assert!(text.contains("ncf_sequence_numbers_available"));
    }
}
