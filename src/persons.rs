use crate::core::domain::Identifiable;

pub mod command;
pub mod domain;
pub mod dto;
pub mod factory;
pub mod repository;

pub trait Person: Identifiable {
    fn age(&self) -> i64;
    fn residence(&self) -> String;
    fn borrowed_book_id(&self) -> Option<String>;
    fn is_borrower(&self) -> bool {
        self.borrowed_book_id().is_some()
    }
}
