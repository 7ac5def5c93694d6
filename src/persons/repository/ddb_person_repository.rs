use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;

use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::persons::domain::model::PersonEntity;
use crate::persons::repository::{check_no_borrowed_book, PersonRepository};
use crate::utils::ddb::{add_filter_expr, from_ddb, number, page_limit, parse_date_attribute, parse_item, parse_number_attribute, parse_optional_string_attribute, parse_string_attribute, string_date, to_ddb_page};

#[derive(Debug)]
pub struct DDBPersonRepository {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DDBPersonRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
        }
    }
}

#[async_trait]
impl Repository<PersonEntity> for DDBPersonRepository {
    async fn create(&self, entity: &PersonEntity) -> LibraryResult<usize> {
        check_no_borrowed_book(entity)?;
        let table_name: &str = self.table_name.as_ref();
        let val = serde_json::to_value(entity)?;
        self.client
            .put_item()
            .table_name(table_name)
            .condition_expression("attribute_not_exists(person_id)")
            .set_item(Some(parse_item(val)?))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    // update writes the profile only; the borrowed book moves through loan transactions
    async fn update(&self, entity: &PersonEntity) -> LibraryResult<usize> {
        let now = Utc::now().naive_utc();
        let table_name: &str = self.table_name.as_ref();

        self.client
            .update_item()
            .table_name(table_name)
            .key("person_id", AttributeValue::S(entity.person_id.clone()))
            .update_expression("SET #version = :version, #first_name = :first, #last_name = :last, #age = :age, #residence = :residence, #updated_at = :updated_at")
            .expression_attribute_names("#version", "version")
            .expression_attribute_names("#first_name", "first_name")
            .expression_attribute_names("#last_name", "last_name")
            .expression_attribute_names("#age", "age")
            .expression_attribute_names("#residence", "residence")
            .expression_attribute_names("#updated_at", "updated_at")
            .expression_attribute_values(":old_version", number(entity.version))
            .expression_attribute_values(":version", number(entity.version + 1))
            .expression_attribute_values(":first", AttributeValue::S(entity.first_name.to_string()))
            .expression_attribute_values(":last", AttributeValue::S(entity.last_name.to_string()))
            .expression_attribute_values(":age", number(entity.age))
            .expression_attribute_values(":residence", AttributeValue::S(entity.residence.to_string()))
            .expression_attribute_values(":updated_at", string_date(now))
            .condition_expression("attribute_exists(#version) AND #version = :old_version")
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn get(&self, id: &str) -> LibraryResult<PersonEntity> {
        let table_name: &str = self.table_name.as_ref();
        self.client
            .query()
            .table_name(table_name)
            .limit(2)
            .consistent_read(true)
            .key_condition_expression("person_id = :person_id")
            .expression_attribute_values(":person_id", AttributeValue::S(id.to_string()))
            .send()
            .await.map_err(LibraryError::from).and_then(|res| {
            let items = res.items().unwrap_or_default();
            if items.len() > 1 {
                return Err(LibraryError::database(format!("too many persons for {}", id).as_str(), None, false));
            }
            items.first()
                .map(PersonEntity::from)
                .ok_or_else(|| LibraryError::not_found(format!("person not found for {}", id).as_str()))
        })
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        self.client.delete_item()
            .table_name(table_name)
            .key("person_id", AttributeValue::S(id.to_string()))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    // the index is keyed by borrowed_book_id, so only borrower lookups use it
    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<PersonEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let exclusive_start_key = to_ddb_page(page, predicate);
        let mut filter_expr = String::new();
        let mut filter_values = HashMap::new();
        for (k, v) in predicate {
            if k != "borrowed_book_id" {
                let ks = add_filter_expr(k.as_str(), &mut filter_expr);
                let value = if ks == "age" { AttributeValue::N(v.to_string()) } else { AttributeValue::S(v.to_string()) };
                filter_values.insert(format!(":{}", ks), value);
            }
        }
        let filter = if filter_expr.is_empty() { None } else { Some(filter_expr) };

        let (records, last_key): (Vec<PersonEntity>, Option<HashMap<String, AttributeValue>>) = if let Some(book_id) = predicate.get("borrowed_book_id") {
            let mut request = self.client
                .query()
                .table_name(table_name)
                .index_name(self.index_name.as_str())
                .limit(page_limit(page_size))
                .consistent_read(false)
                .set_exclusive_start_key(exclusive_start_key)
                .key_condition_expression("borrowed_book_id = :borrowed_book_id")
                .expression_attribute_values(":borrowed_book_id", AttributeValue::S(book_id.to_string()))
                .set_filter_expression(filter);
            for (k, v) in filter_values {
                request = request.expression_attribute_values(k, v);
            }
            let out = request.send().await?;
            (out.items().unwrap_or_default().iter().map(PersonEntity::from).collect(), out.last_evaluated_key().cloned())
        } else {
            let mut request = self.client
                .scan()
                .table_name(table_name)
                .limit(page_limit(page_size))
                .consistent_read(false)
                .set_exclusive_start_key(exclusive_start_key)
                .set_filter_expression(filter);
            for (k, v) in filter_values {
                request = request.expression_attribute_values(k, v);
            }
            let out = request.send().await?;
            (out.items().unwrap_or_default().iter().map(PersonEntity::from).collect(), out.last_evaluated_key().cloned())
        };
        Ok(from_ddb(page, page_size, last_key.as_ref(), records))
    }
}

#[async_trait]
impl PersonRepository for DDBPersonRepository {
    async fn find_by_borrowed_book(&self, book_id: &str) -> LibraryResult<Option<PersonEntity>> {
        let predicate = HashMap::from([
            ("borrowed_book_id".to_string(), book_id.to_string()),
        ]);
        let res = self.query(&predicate, None, 2).await?;
        Ok(res.records.into_iter().next())
    }
}

impl From<&HashMap<String, AttributeValue>> for PersonEntity {
    fn from(map: &HashMap<String, AttributeValue>) -> Self {
        PersonEntity {
            person_id: parse_string_attribute("person_id", map).unwrap_or_default(),
            version: parse_number_attribute("version", map),
            first_name: parse_string_attribute("first_name", map).unwrap_or_default(),
            last_name: parse_string_attribute("last_name", map).unwrap_or_default(),
            age: parse_number_attribute("age", map),
            residence: parse_string_attribute("residence", map).unwrap_or_default(),
            borrowed_book_id: parse_optional_string_attribute("borrowed_book_id", map),
            created_at: parse_date_attribute("created_at", map).unwrap_or(Utc::now().naive_utc()),
            updated_at: parse_date_attribute("updated_at", map).unwrap_or(Utc::now().naive_utc()),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use aws_sdk_dynamodb::Client;
    use lazy_static::lazy_static;

    use crate::core::repository::{Repository, RepositoryStore};
    use crate::loans::domain::model::LoanTransaction;
    use crate::loans::repository::LoanRepository;
    use crate::loans::repository::ddb_loan_repository::DDBLoanRepository;
    use crate::persons::domain::model::PersonEntity;
    use crate::persons::repository::PersonRepository;
    use crate::persons::repository::ddb_person_repository::DDBPersonRepository;
    use crate::utils::ddb::{build_db_client, create_table, delete_table, parse_item};

    lazy_static! {
        static ref CLIENT: AsyncOnce<Client> = AsyncOnce::new(async {
                let client = build_db_client(RepositoryStore::LocalDynamoDB).await;
                let _ = delete_table(&client, "persons").await;
                let _ = create_table(&client, "persons", "person_id", "borrowed_book_id", "person_id").await;
                client
            });
    }

    #[tokio::test]
    async fn test_should_map_item_to_person() {
        let mut person = PersonEntity::new("Sophie", "Petit", 28, "Paris");
        person.borrowed_book_id = Some("b1".to_string());
        let item = parse_item(serde_json::to_value(&person).expect("json")).expect("item");
        assert_eq!(person, PersonEntity::from(&item));
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB local"]
    async fn test_should_create_update_persons() {
        let persons_repo = DDBPersonRepository::new(CLIENT.get().await.clone(), "persons", "persons_ndx");
        let mut person = PersonEntity::new("Jean", "Dupont", 25, "Montreuil");
        assert_eq!(1, persons_repo.create(&person).await.expect("should create person"));

        person.age = 26;
        persons_repo.update(&person).await.expect("should update person");
        let loaded = persons_repo.get(person.person_id.as_str()).await.expect("should return person");
        assert_eq!(26, loaded.age);
        assert_eq!(1, loaded.version);
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB local"]
    async fn test_should_find_borrower() {
        let client = CLIENT.get().await.clone();
        let persons_repo = DDBPersonRepository::new(client.clone(), "persons", "persons_ndx");
        let loans_repo = DDBLoanRepository::new(client, "persons", "books");
        let mut person = PersonEntity::new("Marie", "Martin", 30, "Montreuil");
        person.borrowed_book_id = Some("ddb-book".to_string());
        assert!(persons_repo.create(&person).await.is_err());
        let mut tx = LoanTransaction::new();
        tx.save_person(&person, None);
        loans_repo.commit(&tx).await.expect("should commit");

        let found = persons_repo.find_by_borrowed_book("ddb-book").await.expect("should query");
        assert_eq!(Some(person.person_id.clone()), found.map(|p| p.person_id));
        assert!(persons_repo.find_by_borrowed_book("nobody").await.expect("should query").is_none());
    }
}
