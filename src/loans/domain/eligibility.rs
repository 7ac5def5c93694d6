use chrono::Utc;
use crate::books::domain::Book;
use crate::books::domain::model::BookEntity;
use crate::core::domain::{Configuration, Identifiable};
use crate::core::library::{LibraryError, LibraryResult, LoanRule};
use crate::persons::domain::model::PersonEntity;
use crate::persons::Person;

// LoanPolicy holds the thresholds a borrower has to meet
#[derive(Debug, PartialEq, Clone)]
pub struct LoanPolicy {
    pub min_borrower_age: i64,
    pub lending_city: String,
}

impl LoanPolicy {
    pub fn new(min_borrower_age: i64, lending_city: &str) -> Self {
        Self {
            min_borrower_age,
            lending_city: lending_city.to_string(),
        }
    }

    fn is_lending_city(&self, residence: &str) -> bool {
        residence.to_lowercase() == self.lending_city.to_lowercase()
    }
}

impl From<&Configuration> for LoanPolicy {
    fn from(config: &Configuration) -> Self {
        LoanPolicy::new(config.min_borrower_age, config.lending_city.as_str())
    }
}

// LoanOutcome is the set of rows a loan change produces. `borrowed` is the
// newly taken book, `released` the book handed back; both carry the
// availability they must be stored with.
#[derive(Debug, PartialEq, Clone)]
pub struct LoanOutcome {
    pub person: PersonEntity,
    pub borrowed: Option<BookEntity>,
    pub released: Option<BookEntity>,
}

// check_eligibility applies the loan rules in order: minor, residence, availability.
// The availability rule is skipped when the person already holds the book.
pub fn check_eligibility<P: Person, B: Book>(policy: &LoanPolicy, person: &P, book: &B,
                                             already_holding: bool) -> LibraryResult<()> {
    if person.age() < policy.min_borrower_age {
        return Err(LibraryError::loan_rule(
            LoanRule::Minor,
            format!("person {} is {} years old, borrowers must be at least {}",
                    person.id(), person.age(), policy.min_borrower_age).as_str()));
    }
    if !policy.is_lending_city(person.residence().as_str()) {
        return Err(LibraryError::loan_rule(
            LoanRule::Residence,
            format!("person {} lives in {}, borrowers must live in {}",
                    person.id(), person.residence(), policy.lending_city).as_str()));
    }
    if !already_holding && !book.is_available() {
        return Err(LibraryError::loan_rule(
            LoanRule::Unavailable,
            format!("book {} is not available", book.id()).as_str()));
    }
    Ok(())
}

// plan_assignment works out the rows to write when `person` is saved with its
// current `borrowed_book_id`. `previous` is the book the stored person row
// pointed at and `next` the book the new row points at. Nothing is persisted.
pub fn plan_assignment(policy: &LoanPolicy, person: &PersonEntity,
                       previous: Option<&BookEntity>, next: Option<&BookEntity>) -> LibraryResult<LoanOutcome> {
    let next_id = next.map(|b| b.book_id.as_str());
    if person.borrowed_book_id.as_deref() != next_id {
        return Err(LibraryError::runtime(
            format!("person {} references book {:?} but {:?} was loaded",
                    person.person_id, person.borrowed_book_id, next_id).as_str(), None));
    }
    let already_holding = match (previous, next) {
        (Some(prev), Some(next)) => prev.book_id == next.book_id,
        _ => false,
    };
    if let Some(book) = next {
        check_eligibility(policy, person, book, already_holding)?;
    }
    if already_holding {
        return Ok(LoanOutcome { person: person.clone(), borrowed: None, released: None });
    }

    let now = Utc::now().naive_utc();
    let borrowed = next.map(|book| {
        let mut book = book.clone();
        book.available = false;
        book.updated_at = now;
        book
    });
    let released = previous.map(|book| {
        let mut book = book.clone();
        book.available = true;
        book.updated_at = now;
        book
    });
    Ok(LoanOutcome { person: person.clone(), borrowed, released })
}
