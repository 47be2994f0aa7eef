use crate::{db::DbPool, entities::collection, errors::ServiceError, services::slug};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CreateCollectionInput {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCollectionInput {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub position: Option<i32>,
}

#[derive(Clone)]
pub struct CollectionService {
    db: Arc<DbPool>,
}

impl CollectionService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        input: CreateCollectionInput,
    ) -> Result<collection::Model, ServiceError> {
        if input.title.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Collection title must not be empty".to_string(),
            ));
        }

        let txn = self.db.begin().await?;
        let slug = slug::claim_unique(&txn, &input.title, slug_taken).await?;

        let next_position = collection::Entity::find()
            .order_by_desc(collection::Column::Position)
            .one(&txn)
            .await?
            .map(|c| c.position + 1)
            .unwrap_or(0);

        let model = collection::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title.trim().to_string()),
            slug: Set(slug),
            description: Set(input.description),
            position: Set(next_position),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let created = model.insert(&txn).await?;
        txn.commit().await?;

        info!(collection_id = %created.id, slug = %created.slug, "collection created");
        Ok(created)
    }

    pub async fn list(&self) -> Result<Vec<collection::Model>, ServiceError> {
        collection::Entity::find()
            .order_by_asc(collection::Column::Position)
            .all(&*self.db)
            .await
            .map_err(ServiceError::from)
    }

    pub async fn get(&self, id: Uuid) -> Result<collection::Model, ServiceError> {
        collection::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Collection {} not found", id)))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<collection::Model, ServiceError> {
        collection::Entity::find()
            .filter(collection::Column::Slug.eq(slug))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Collection {} not found", slug)))
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateCollectionInput,
    ) -> Result<collection::Model, ServiceError> {
        let existing = self.get(id).await?;
        let mut active_model: collection::ActiveModel = existing.into();
        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "Collection title must not be empty".to_string(),
                ));
            }
            active_model.title = Set(title.trim().to_string());
        }
        if let Some(description) = input.description {
            active_model.description = Set(description);
        }
        if let Some(position) = input.position {
            active_model.position = Set(position);
        }
        active_model.updated_at = Set(Some(Utc::now()));
        active_model.update(&*self.db).await.map_err(ServiceError::from)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = collection::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Collection {} not found",
                id
            )));
        }
        Ok(())
    }
}

fn slug_taken<'a>(
    txn: &'a sea_orm::DatabaseTransaction,
    candidate: &str,
) -> futures::future::BoxFuture<'a, Result<bool, ServiceError>> {
    let candidate = candidate.to_string();
    Box::pin(async move {
        let count = collection::Entity::find()
            .filter(collection::Column::Slug.eq(candidate))
            .count(txn)
            .await?;
        Ok(count > 0)
    })
}
