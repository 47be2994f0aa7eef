use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Selectable shipping method. `price` and the order-total bounds are
/// admin-entered decimal strings, converted to cents by the pricing
/// pipeline; if both bounds are present, min ≤ max.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "shipping_options")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub carrier: String,
    pub shipping_type: ShippingType,
    pub title: String,
    #[sea_orm(nullable)]
    pub description: Option<String>,
    pub price: String,
    #[sea_orm(nullable)]
    pub min_order_total: Option<String>,
    #[sea_orm(nullable)]
    pub max_order_total: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, utoipa::ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ShippingType {
    #[sea_orm(string_value = "shipping")]
    Shipping,
    #[sea_orm(string_value = "clickncollect")]
    ClickNCollect,
    #[sea_orm(string_value = "service_points")]
    ServicePoints,
}
