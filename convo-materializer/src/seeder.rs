use convo_store::{AggregateDocument, CatalogSource, DocumentStore, StoreError};
use tracing::{debug, info, warn};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: usize,
    pub existing: usize,
    pub failed: usize,
}

/// One-shot bootstrap: ensure an aggregate document exists per catalog
/// entry, carrying the entry's display metadata. Seeding is
/// best-effort: an already-existing document (including one created by
/// a concurrent writer) is reported and skipped, never retried.
pub async fn seed_catalog<C, S>(catalog: &C, store: &S, catalog_id: &str) -> SeedSummary
where
    C: CatalogSource + ?Sized,
    S: DocumentStore + ?Sized,
{
    let document = match catalog.fetch_catalog(catalog_id).await {
        Ok(document) => document,
        Err(err) => {
            warn!("catalog {} unavailable, skipping seeding: {}", catalog_id, err);
            return SeedSummary::default();
        }
    };

    let mut summary = SeedSummary::default();
    for entry in document.links {
        match store.get_document(&entry.slug).await {
            Ok(_) => {
                debug!("aggregate {} already exists", entry.slug);
                summary.existing += 1;
                continue;
            }
            Err(StoreError::NotFound) => {}
            Err(err) => {
                warn!("failed to check aggregate {}: {}", entry.slug, err);
                summary.failed += 1;
                continue;
            }
        }
        let mut doc = AggregateDocument::new(&entry.slug);
        doc.title = Some(entry.title);
        doc.url = Some(entry.url);
        doc.badges = Some(entry.badges);
        match store.put_document(doc).await {
            Ok(_) => {
                info!("seeded aggregate {}", entry.slug);
                summary.created += 1;
            }
            Err(StoreError::Conflict) => {
                debug!("aggregate {} created concurrently", entry.slug);
                summary.existing += 1;
            }
            Err(err) => {
                warn!("failed to seed aggregate {}: {}", entry.slug, err);
                summary.failed += 1;
            }
        }
    }
    info!(
        "catalog seeding done: {} created, {} existing, {} failed",
        summary.created, summary.existing, summary.failed
    );
    summary
}
