use crate::{db::DbPool, entities::customer, errors::ServiceError};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct CustomerContact {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Clone)]
pub struct CustomerService {
    db: Arc<DbPool>,
}

impl CustomerService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Idempotent upsert keyed by normalized (lower-cased) email.
    /// Present fields overwrite, absent fields keep what is stored.
    #[instrument(skip(self, contact), fields(email = %contact.email))]
    pub async fn upsert(&self, contact: CustomerContact) -> Result<customer::Model, ServiceError> {
        let email = contact.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(ServiceError::ValidationError(
                "Customer email must not be empty".to_string(),
            ));
        }

        let existing = customer::Entity::find()
            .filter(customer::Column::Email.eq(email.clone()))
            .one(&*self.db)
            .await?;

        match existing {
            Some(found) => {
                let mut active_model: customer::ActiveModel = found.into();
                if contact.first_name.is_some() {
                    active_model.first_name = Set(contact.first_name);
                }
                if contact.last_name.is_some() {
                    active_model.last_name = Set(contact.last_name);
                }
                if contact.phone.is_some() {
                    active_model.phone = Set(contact.phone);
                }
                if contact.street.is_some() {
                    active_model.street = Set(contact.street);
                }
                if contact.city.is_some() {
                    active_model.city = Set(contact.city);
                }
                if contact.postal_code.is_some() {
                    active_model.postal_code = Set(contact.postal_code);
                }
                if contact.country.is_some() {
                    active_model.country = Set(contact.country);
                }
                active_model.updated_at = Set(Some(Utc::now()));
                debug!("customer record refreshed");
                active_model.update(&*self.db).await.map_err(ServiceError::from)
            }
            None => {
                let model = customer::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    email: Set(email),
                    first_name: Set(contact.first_name),
                    last_name: Set(contact.last_name),
                    phone: Set(contact.phone),
                    street: Set(contact.street),
                    city: Set(contact.city),
                    postal_code: Set(contact.postal_code),
                    country: Set(contact.country),
                    created_at: Set(Utc::now()),
                    updated_at: Set(None),
                };
                model.insert(&*self.db).await.map_err(ServiceError::from)
            }
        }
    }

    pub async fn list(&self) -> Result<Vec<customer::Model>, ServiceError> {
        customer::Entity::find()
            .order_by_asc(customer::Column::Email)
            .all(&*self.db)
            .await
            .map_err(ServiceError::from)
    }

    pub async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<customer::Model>, ServiceError> {
        customer::Entity::find()
            .filter(customer::Column::Email.eq(email.trim().to_lowercase()))
            .one(&*self.db)
            .await
            .map_err(ServiceError::from)
    }
}
