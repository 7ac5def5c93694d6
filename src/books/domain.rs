use crate::core::domain::Identifiable;

pub mod model;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

pub trait Book: Identifiable {
    fn title(&self) -> String;
    fn rating(&self) -> i64;
    fn is_available(&self) -> bool;
}
