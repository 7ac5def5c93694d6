use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::loans::domain::eligibility::LoanOutcome;
use crate::utils::date::serializer;

// LoanDto reports the result of a borrow or return
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct LoanDto {
    pub branch_id: String,
    pub person_id: String,
    pub book_id: Option<String>,
    pub released_book_id: Option<String>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
}

impl LoanDto {
    pub fn from_outcome(branch_id: &str, outcome: &LoanOutcome) -> Self {
        Self {
            branch_id: branch_id.to_string(),
            person_id: outcome.person.person_id.to_string(),
            book_id: outcome.person.borrowed_book_id.clone(),
            released_book_id: outcome.released.as_ref().map(|b| b.book_id.to_string()),
            created_at: Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::books::domain::model::BookEntity;
    use crate::loans::domain::eligibility::LoanOutcome;
    use crate::loans::dto::LoanDto;
    use crate::persons::domain::model::PersonEntity;

    #[tokio::test]
    async fn test_should_build_loan_from_outcome() {
        let released = BookEntity::new("1984", "George Orwell", "Science-Fiction", 5);
        let person = PersonEntity::new("Jean", "Dupont", 30, "Montreuil");
        let outcome = LoanOutcome { person: person.clone(), borrowed: None, released: Some(released.clone()) };
        let loan = LoanDto::from_outcome("main", &outcome);
        assert_eq!(person.person_id, loan.person_id);
        assert_eq!(None, loan.book_id);
        assert_eq!(Some(released.book_id), loan.released_book_id);
    }
}
