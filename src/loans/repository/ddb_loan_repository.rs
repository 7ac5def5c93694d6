use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, Delete, Put, TransactWriteItem, Update};
use chrono::Utc;

use crate::core::library::{LibraryError, LibraryResult};
use crate::loans::domain::model::{LoanTransaction, LoanWrite};
use crate::loans::repository::LoanRepository;
use crate::utils::ddb::{number, parse_item, string_date};

#[derive(Debug)]
pub struct DDBLoanRepository {
    client: Client,
    persons_table: String,
    books_table: String,
}

impl DDBLoanRepository {
    pub(crate) fn new(client: Client, persons_table: &str, books_table: &str) -> Self {
        Self {
            client,
            persons_table: persons_table.to_string(),
            books_table: books_table.to_string(),
        }
    }

    fn to_transact_item(&self, write: &LoanWrite) -> LibraryResult<TransactWriteItem> {
        let persons_table: &str = self.persons_table.as_ref();
        let books_table: &str = self.books_table.as_ref();
        let item = match write {
            LoanWrite::PutPerson { person, expected_version } => {
                let val = serde_json::to_value(person)?;
                let put = Put::builder()
                    .table_name(persons_table)
                    .set_item(Some(parse_item(val)?));
                let put = match expected_version {
                    Some(version) => put
                        .condition_expression("#version = :expected_version")
                        .expression_attribute_names("#version", "version")
                        .expression_attribute_values(":expected_version", number(*version)),
                    None => put.condition_expression("attribute_not_exists(person_id)"),
                };
                TransactWriteItem::builder().put(put.build()).build()
            }
            LoanWrite::DeletePerson { person_id, expected_version } => {
                let delete = Delete::builder()
                    .table_name(persons_table)
                    .key("person_id", AttributeValue::S(person_id.to_string()))
                    .condition_expression("#version = :expected_version")
                    .expression_attribute_names("#version", "version")
                    .expression_attribute_values(":expected_version", number(*expected_version))
                    .build();
                TransactWriteItem::builder().delete(delete).build()
            }
            LoanWrite::PutBookAvailability { book_id, available, expected_version } => {
                let update = Update::builder()
                    .table_name(books_table)
                    .key("book_id", AttributeValue::S(book_id.to_string()))
                    .update_expression("SET #available = :available, #version = :version, #updated_at = :updated_at")
                    .condition_expression("#version = :expected_version")
                    .expression_attribute_names("#available", "available")
                    .expression_attribute_names("#version", "version")
                    .expression_attribute_names("#updated_at", "updated_at")
                    .expression_attribute_values(":available", AttributeValue::Bool(*available))
                    .expression_attribute_values(":version", number(expected_version + 1))
                    .expression_attribute_values(":expected_version", number(*expected_version))
                    .expression_attribute_values(":updated_at", string_date(Utc::now().naive_utc()))
                    .build();
                TransactWriteItem::builder().update(update).build()
            }
            LoanWrite::DeleteBook { book_id, expected_version } => {
                let delete = Delete::builder()
                    .table_name(books_table)
                    .key("book_id", AttributeValue::S(book_id.to_string()))
                    .condition_expression("#version = :expected_version")
                    .expression_attribute_names("#version", "version")
                    .expression_attribute_values(":expected_version", number(*expected_version))
                    .build();
                TransactWriteItem::builder().delete(delete).build()
            }
        };
        Ok(item)
    }
}

#[async_trait]
impl LoanRepository for DDBLoanRepository {
    async fn commit(&self, tx: &LoanTransaction) -> LibraryResult<usize> {
        if tx.is_empty() {
            return Ok(0);
        }
        let items = tx.writes().iter()
            .map(|w| self.to_transact_item(w))
            .collect::<LibraryResult<Vec<TransactWriteItem>>>()?;
        self.client
            .transact_write_items()
            .set_transact_items(Some(items))
            .send()
            .await.map(|_| tx.writes().len()).map_err(LibraryError::from)
    }
}
