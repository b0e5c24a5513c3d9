use uuid::Uuid;

use super::Database;
use crate::models::{CreateLookupInput, MissingItemKind};

/// Best-effort recorder tied to one request.
///
/// Every write is attempted at most once; failures are logged and dropped so
/// a broken database never changes what the visitor sees. Without a database
/// (or when the visit itself failed to record) every method is a no-op.
#[derive(Debug, Clone, Default)]
pub struct LookupLog {
    db: Option<Database>,
    visit: Option<Uuid>,
}

impl LookupLog {
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Record the visit and return a log bound to it.
    pub fn visit(db: Option<&Database>, url: &str, user_agent: &str, referer: &str) -> Self {
        let Some(db) = db else {
            return Self::disabled();
        };

        match db.record_visit(url, user_agent, referer) {
            Ok(visit) => Self {
                db: Some(db.clone()),
                visit: Some(visit.id),
            },
            Err(e) => {
                tracing::error!("Failed to store URL info: {e:#}");
                Self::disabled()
            }
        }
    }

    pub fn visit_id(&self) -> Option<Uuid> {
        self.visit
    }

    pub fn lookup(&self, input: CreateLookupInput) {
        let (Some(db), Some(visit)) = (&self.db, self.visit) else {
            return;
        };
        if let Err(e) = db.record_lookup(visit, input) {
            tracing::error!("Failed to store lookup info: {e:#}");
        }
    }

    pub fn missing(&self, item_type: MissingItemKind, item_value: &str, entry_context: Option<&str>) {
        let (Some(db), Some(visit)) = (&self.db, self.visit) else {
            return;
        };
        if let Err(e) = db.record_missing(visit, item_type, item_value, entry_context) {
            tracing::error!("Failed to store missing info: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    #[test]
    fn disabled_log_is_a_no_op() {
        let log = LookupLog::visit(None, "/", "", "");
        assert!(log.visit_id().is_none());
        log.missing(MissingItemKind::Entry, "cobol", None);
    }

    #[test]
    fn records_against_the_visit() {
        let db = db();
        let log = LookupLog::visit(Some(&db), "/api/v1/lookup", "ua", "");
        log.missing(MissingItemKind::Concept, "boolean", Some("python"));

        let items = db.missing_items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(Some(items[0].visit_id), log.visit_id());
    }

    #[test]
    fn unmigrated_database_is_swallowed() {
        let db = Database::open_memory().unwrap();
        let log = LookupLog::visit(Some(&db), "/", "", "");
        assert!(log.visit_id().is_none());
        log.lookup(CreateLookupInput {
            entry1: "python".into(),
            version1: "3".into(),
            entry2: String::new(),
            version2: String::new(),
            structure: "data_types".into(),
        });
    }
}
