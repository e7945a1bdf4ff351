//! Sample store used by `--demo`

use chrono::{Duration, Utc};
use serde_json::json;

use super::file_store::{join_path, MemoryFileStore};
use super::loader::DEFAULT_DOCUMENTS_DIR;

/// In-memory store holding a handful of records, one of them corrupt
pub fn seeded_store() -> MemoryFileStore {
    let now = Utc::now();
    let records = [
        ("q3-report", Some("Q3 Sales Report"), "report", 1),
        ("acme-contract", Some("Acme Services Agreement"), "contract", 3),
        ("invoice-0042", Some("Invoice #0042"), "invoice", 6),
        ("kickoff-memo", None, "memo", 12),
        ("website-proposal", Some("Website Redesign Proposal"), "proposal", 30),
    ];

    let mut store = MemoryFileStore::new().with_dir(DEFAULT_DOCUMENTS_DIR);
    for (id, title, doc_type, days_ago) in records {
        let record = json!({
            "id": id,
            "title": title,
            "type": doc_type,
            "updatedAt": (now - Duration::days(days_ago)).to_rfc3339(),
            "content": "",
        });
        store = store.with_file(
            &join_path(DEFAULT_DOCUMENTS_DIR, &format!("{id}.json")),
            record.to_string(),
        );
    }

    store
        .with_file(&join_path(DEFAULT_DOCUMENTS_DIR, "draft.json"), "{\"id\": \"draft\",")
        .with_file(&join_path(DEFAULT_DOCUMENTS_DIR, "README.txt"), "not a record")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loader::DocumentListLoader;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_seeded_store_loads() {
        let listing = DocumentListLoader::new(Arc::new(seeded_store()))
            .load()
            .await
            .unwrap();

        assert_eq!(listing.documents.len(), 5);
        assert_eq!(listing.skipped, 1);
        assert_eq!(listing.documents[0].id, "q3-report");
        assert_eq!(listing.documents[3].title, "Untitled Document");
    }
}
