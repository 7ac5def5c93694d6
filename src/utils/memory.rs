use std::cmp;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use lazy_static::lazy_static;
use serde::Serialize;
use serde_json::Value;
use crate::books::domain::model::BookEntity;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::persons::domain::model::PersonEntity;

// MemoryTables holds every table of the in-memory store. Both tables sit
// behind one lock so a loan transaction can touch persons and books at once.
#[derive(Debug, Default)]
pub struct MemoryTables {
    pub books: HashMap<String, BookEntity>,
    pub persons: HashMap<String, PersonEntity>,
}

#[derive(Debug, Default)]
pub struct MemoryDatabase {
    tables: Mutex<MemoryTables>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> LibraryResult<MutexGuard<'_, MemoryTables>> {
        self.tables.lock().map_err(|err| LibraryError::runtime(
            format!("memory tables poisoned {}", err).as_str(), None))
    }
}

lazy_static! {
    static ref SHARED_DB: Arc<MemoryDatabase> = Arc::new(MemoryDatabase::new());
}

// shared_memory_db returns the process-wide tables used by RepositoryStore::Memory.
pub fn shared_memory_db() -> Arc<MemoryDatabase> {
    SHARED_DB.clone()
}

// matches_predicate compares each predicate entry against the serialized
// attribute of the same name; booleans and numbers compare by their text.
pub(crate) fn matches_predicate<T: Serialize>(entity: &T, predicate: &HashMap<String, String>) -> bool {
    let value = match serde_json::to_value(entity) {
        Ok(Value::Object(map)) => map,
        _ => return false,
    };
    predicate.iter().all(|(k, expected)| {
        match value.get(k) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Bool(b)) => b.to_string() == *expected,
            Some(Value::Number(n)) => n.to_string() == *expected,
            _ => false,
        }
    })
}

// paginate orders records by key and resumes after the key carried in `page`.
pub(crate) fn paginate<T>(mut records: Vec<(String, T)>, page: Option<&str>,
                          page_size: usize) -> PaginatedResult<T> {
    records.sort_by(|a, b| a.0.cmp(&b.0));
    let start = match page {
        Some(after) => records.iter().position(|(k, _)| k.as_str() > after).unwrap_or(records.len()),
        None => 0,
    };
    let size = cmp::max(page_size, 1);
    let end = cmp::min(start + size, records.len());
    let next_page = if end < records.len() {
        records.get(end - 1).map(|(k, _)| k.to_string())
    } else {
        None
    };
    let page_records = records.into_iter().skip(start).take(end - start).map(|(_, v)| v).collect();
    PaginatedResult::new(page, page_size, next_page, page_records)
}
