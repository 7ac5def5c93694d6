use chrono::Utc;
use crate::books::domain::model::BookEntity;
use crate::persons::domain::model::PersonEntity;

// LoanWrite is one conditional row write. Each write carries the version the
// row had when it was read; `None` means the row must not exist yet.
#[derive(Debug, PartialEq, Clone)]
pub enum LoanWrite {
    PutPerson {
        person: PersonEntity,
        expected_version: Option<i64>,
    },
    DeletePerson {
        person_id: String,
        expected_version: i64,
    },
    PutBookAvailability {
        book_id: String,
        available: bool,
        expected_version: i64,
    },
    DeleteBook {
        book_id: String,
        expected_version: i64,
    },
}

// LoanTransaction groups the writes of one loan change; they are applied all or none
#[derive(Debug, PartialEq, Clone, Default)]
pub struct LoanTransaction {
    writes: Vec<LoanWrite>,
}

impl LoanTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    // save_person queues the person row and returns it as it will be stored
    pub fn save_person(&mut self, person: &PersonEntity, expected_version: Option<i64>) -> PersonEntity {
        let mut stored = person.clone();
        if let Some(version) = expected_version {
            stored.version = version + 1;
            stored.updated_at = Utc::now().naive_utc();
        }
        self.writes.push(LoanWrite::PutPerson { person: stored.clone(), expected_version });
        stored
    }

    pub fn delete_person(&mut self, person: &PersonEntity) {
        self.writes.push(LoanWrite::DeletePerson {
            person_id: person.person_id.to_string(),
            expected_version: person.version,
        });
    }

    pub fn set_availability(&mut self, book: &BookEntity) {
        self.writes.push(LoanWrite::PutBookAvailability {
            book_id: book.book_id.to_string(),
            available: book.available,
            expected_version: book.version,
        });
    }

    pub fn delete_book(&mut self, book: &BookEntity) {
        self.writes.push(LoanWrite::DeleteBook {
            book_id: book.book_id.to_string(),
            expected_version: book.version,
        });
    }

    pub fn writes(&self) -> &[LoanWrite] {
        &self.writes
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}
