use crate::{
    db::DbPool,
    entities::product,
    errors::ServiceError,
    services::slug,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CreateProductInput {
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub currency: String,
    pub images: Option<serde_json::Value>,
    pub collection_id: Option<Uuid>,
    pub tags: Option<serde_json::Value>,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProductInput {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub price_cents: Option<i64>,
    pub images: Option<Option<serde_json::Value>>,
    pub collection_id: Option<Option<Uuid>>,
    pub tags: Option<Option<serde_json::Value>>,
    pub active: Option<bool>,
    pub position: Option<i32>,
}

#[derive(Clone)]
pub struct ProductService {
    db: Arc<DbPool>,
}

impl ProductService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: CreateProductInput) -> Result<product::Model, ServiceError> {
        if input.title.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Product title must not be empty".to_string(),
            ));
        }
        if input.price_cents < 0 {
            return Err(ServiceError::ValidationError(
                "Product price must not be negative".to_string(),
            ));
        }

        let txn = self.db.begin().await?;
        let slug = slug::claim_unique(&txn, &input.title, slug_taken).await?;

        let next_position = product::Entity::find()
            .order_by_desc(product::Column::Position)
            .one(&txn)
            .await?
            .map(|p| p.position + 1)
            .unwrap_or(0);

        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title.trim().to_string()),
            slug: Set(slug),
            description: Set(input.description),
            price_cents: Set(input.price_cents),
            currency: Set(input.currency),
            images: Set(input.images),
            collection_id: Set(input.collection_id),
            tags: Set(input.tags),
            active: Set(input.active),
            position: Set(next_position),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let created = model.insert(&txn).await?;
        txn.commit().await?;

        info!(product_id = %created.id, slug = %created.slug, "product created");
        Ok(created)
    }

    pub async fn list(&self, only_active: bool) -> Result<Vec<product::Model>, ServiceError> {
        let mut query = product::Entity::find().order_by_asc(product::Column::Position);
        if only_active {
            query = query.filter(product::Column::Active.eq(true));
        }
        query.all(&*self.db).await.map_err(ServiceError::from)
    }

    pub async fn list_by_collection(
        &self,
        collection_id: Uuid,
    ) -> Result<Vec<product::Model>, ServiceError> {
        product::Entity::find()
            .filter(product::Column::CollectionId.eq(collection_id))
            .filter(product::Column::Active.eq(true))
            .order_by_asc(product::Column::Position)
            .all(&*self.db)
            .await
            .map_err(ServiceError::from)
    }

    pub async fn get(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<product::Model, ServiceError> {
        product::Entity::find()
            .filter(product::Column::Slug.eq(slug))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", slug)))
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let existing = self.get(id).await?;

        if let Some(price) = input.price_cents {
            if price < 0 {
                return Err(ServiceError::ValidationError(
                    "Product price must not be negative".to_string(),
                ));
            }
        }

        let mut active_model: product::ActiveModel = existing.into();
        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "Product title must not be empty".to_string(),
                ));
            }
            active_model.title = Set(title.trim().to_string());
        }
        if let Some(description) = input.description {
            active_model.description = Set(description);
        }
        if let Some(price_cents) = input.price_cents {
            active_model.price_cents = Set(price_cents);
        }
        if let Some(images) = input.images {
            active_model.images = Set(images);
        }
        if let Some(collection_id) = input.collection_id {
            active_model.collection_id = Set(collection_id);
        }
        if let Some(tags) = input.tags {
            active_model.tags = Set(tags);
        }
        if let Some(active) = input.active {
            active_model.active = Set(active);
        }
        if let Some(position) = input.position {
            active_model.position = Set(position);
        }
        active_model.updated_at = Set(Some(Utc::now()));

        active_model.update(&*self.db).await.map_err(ServiceError::from)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = product::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Product {} not found", id)));
        }
        Ok(())
    }

    /// Duplicates a product as an inactive draft. The copy and its slug
    /// claim commit or roll back together.
    #[instrument(skip(self))]
    pub async fn duplicate(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        let source = self.get(id).await?;

        let txn = self.db.begin().await?;
        let title = format!("{} (copy)", source.title);
        let slug = slug::claim_unique(&txn, &title, slug_taken).await?;

        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            slug: Set(slug),
            description: Set(source.description.clone()),
            price_cents: Set(source.price_cents),
            currency: Set(source.currency.clone()),
            images: Set(source.images.clone()),
            collection_id: Set(source.collection_id),
            tags: Set(source.tags.clone()),
            active: Set(false),
            position: Set(source.position + 1),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let copy = model.insert(&txn).await?;
        txn.commit().await?;

        info!(source_id = %id, copy_id = %copy.id, "product duplicated");
        Ok(copy)
    }
}

fn slug_taken<'a>(
    txn: &'a sea_orm::DatabaseTransaction,
    candidate: &str,
) -> futures::future::BoxFuture<'a, Result<bool, ServiceError>> {
    let candidate = candidate.to_string();
    Box::pin(async move {
        let count = product::Entity::find()
            .filter(product::Column::Slug.eq(candidate))
            .count(txn)
            .await?;
        Ok(count > 0)
    })
}
