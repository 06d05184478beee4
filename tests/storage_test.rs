//! Integration tests for the report store
//!
//! Tests pair-identity semantics, voting, retention, import/export, and
//! persistence degradation through the public API, over both in-memory
//! and file-backed persistence.

use std::sync::Arc;

use mcp_compat_reports::storage::{
    CompatStatus, FilePersistence, MemoryPersistence, ReportInput, ReportStore, Transport,
};

const TEST_MAX_REPORTS: usize = 50;

fn create_test_store() -> ReportStore {
    ReportStore::new(Arc::new(MemoryPersistence::new()), TEST_MAX_REPORTS)
}

fn input(client: &str, server: &str, status: CompatStatus) -> ReportInput {
    ReportInput {
        client_id: client.to_string(),
        client_name: format!("{} (pretty)", client),
        server_id: server.to_string(),
        server_name: format!("{} (pretty)", server),
        status,
        transport: Transport::Stdio,
        notes: String::new(),
        version: "1.0".to_string(),
    }
}

mod submission_tests {
    use super::*;

    #[tokio::test]
    async fn test_overwrite_invariant() {
        let store = create_test_store();

        let first = store
            .submit(input("cursor", "github-mcp", CompatStatus::Works))
            .await;
        store.upvote(&first.id).await.unwrap();

        let second = store
            .submit(input("cursor", "github-mcp", CompatStatus::Partial))
            .await;

        // One report for the pair, second submission's content, first
        // submission's id, votes preserved.
        let pair = store.for_pair("cursor", "github-mcp").await;
        assert_eq!(pair.len(), 1);
        assert_eq!(pair[0].status, CompatStatus::Partial);
        assert_eq!(pair[0].id, first.id);
        assert_eq!(pair[0].upvotes, 1);
        assert_eq!(second.id, first.id);
    }

    #[tokio::test]
    async fn test_distinct_pairs_coexist() {
        let store = create_test_store();

        store.submit(input("cursor", "github-mcp", CompatStatus::Works)).await;
        store.submit(input("cursor", "sqlite-mcp", CompatStatus::Works)).await;
        store.submit(input("zed", "github-mcp", CompatStatus::Broken)).await;

        assert_eq!(store.all().await.len(), 3);
        assert_eq!(store.for_client("cursor").await.len(), 2);
        assert_eq!(store.for_server("github-mcp").await.len(), 2);
        assert_eq!(store.for_pair("zed", "github-mcp").await.len(), 1);
    }

    #[tokio::test]
    async fn test_overwrite_keeps_position() {
        let store = create_test_store();

        store.submit(input("cursor", "github-mcp", CompatStatus::Works)).await;
        store.submit(input("zed", "sqlite-mcp", CompatStatus::Works)).await;
        store.submit(input("cursor", "github-mcp", CompatStatus::Broken)).await;

        let all = store.all().await;
        assert_eq!(all.len(), 2);
        // Resubmission updates in place rather than moving to the back.
        assert_eq!(all[0].client_id, "cursor");
        assert_eq!(all[0].status, CompatStatus::Broken);
        assert_eq!(all[1].client_id, "zed");
    }
}

mod retention_tests {
    use super::*;

    #[tokio::test]
    async fn test_retention_cap() {
        let store = create_test_store();

        // TEST_MAX_REPORTS + 10 distinct pairs: exactly the cap retained,
        // the oldest 10 evicted.
        for i in 0..TEST_MAX_REPORTS + 10 {
            store
                .submit(input(
                    &format!("client-{:03}", i),
                    "server",
                    CompatStatus::Works,
                ))
                .await;
        }

        let all = store.all().await;
        assert_eq!(all.len(), TEST_MAX_REPORTS);
        assert_eq!(all[0].client_id, "client-010");
        assert_eq!(
            all.last().unwrap().client_id,
            format!("client-{:03}", TEST_MAX_REPORTS + 9)
        );
    }
}

mod vote_tests {
    use super::*;

    #[tokio::test]
    async fn test_votes_accumulate() {
        let store = create_test_store();
        let report = store
            .submit(input("cursor", "github-mcp", CompatStatus::Works))
            .await;

        store.upvote(&report.id).await.unwrap();
        store.upvote(&report.id).await.unwrap();
        let after = store.downvote(&report.id).await.unwrap();

        assert_eq!(after.upvotes, 2);
        assert_eq!(after.downvotes, 1);
        // Only the vote counters moved.
        assert_eq!(after.status, CompatStatus::Works);
        assert_eq!(after.id, report.id);
    }

    #[tokio::test]
    async fn test_vote_on_unknown_id() {
        let store = create_test_store();
        assert!(store.upvote("missing").await.is_none());
        assert!(store.downvote("missing").await.is_none());
    }
}

mod import_export_tests {
    use super::*;

    #[tokio::test]
    async fn test_import_dedup_on_id() {
        let store = create_test_store();
        let existing = store
            .submit(input("cursor", "github-mcp", CompatStatus::Works))
            .await;

        let payload = serde_json::json!([
            {
                "id": existing.id,
                "client_id": "cursor",
                "server_id": "github-mcp",
                "status": "works"
            },
            {
                "id": "brand-new",
                "client_id": "zed",
                "server_id": "sqlite-mcp",
                "status": "partial"
            }
        ]);

        let merged = store.import(&payload.to_string()).await;

        assert_eq!(merged, 1);
        assert_eq!(store.all().await.len(), 2);
    }

    #[tokio::test]
    async fn test_import_garbage_returns_zero() {
        let store = create_test_store();
        assert_eq!(store.import("][").await, 0);
    }

    #[tokio::test]
    async fn test_export_is_parseable_json() {
        let store = create_test_store();
        store.submit(input("cursor", "github-mcp", CompatStatus::Works)).await;

        let exported = store.export().await;
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&exported).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0]["client_id"], "cursor");
    }
}

mod file_persistence_tests {
    use super::*;

    #[tokio::test]
    async fn test_reports_survive_store_recreation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.json");

        {
            let persistence = Arc::new(FilePersistence::new(&path).unwrap());
            let store = ReportStore::new(persistence, TEST_MAX_REPORTS);
            store.submit(input("cursor", "github-mcp", CompatStatus::Works)).await;
        }

        let persistence = Arc::new(FilePersistence::new(&path).unwrap());
        let store = ReportStore::new(persistence, TEST_MAX_REPORTS);

        let all = store.all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].client_id, "cursor");
    }

    #[tokio::test]
    async fn test_corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.json");
        std::fs::write(&path, "{{{{ definitely not json").unwrap();

        let persistence = Arc::new(FilePersistence::new(&path).unwrap());
        let store = ReportStore::new(persistence, TEST_MAX_REPORTS);

        assert!(store.all().await.is_empty());

        // Submitting afterwards replaces the corrupt blob.
        store.submit(input("cursor", "github-mcp", CompatStatus::Works)).await;
        assert_eq!(store.all().await.len(), 1);
    }
}
