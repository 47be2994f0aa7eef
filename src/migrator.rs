use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_orders_table::Migration),
            Box::new(m20240101_000002_create_order_items_table::Migration),
            Box::new(m20240101_000003_create_customers_table::Migration),
            Box::new(m20240101_000004_create_discount_codes_table::Migration),
            Box::new(m20240101_000005_create_shipping_options_table::Migration),
            Box::new(m20240101_000006_create_collections_table::Migration),
            Box::new(m20240101_000007_create_products_table::Migration),
            Box::new(m20240101_000008_create_website_settings_table::Migration),
            Box::new(m20240101_000009_create_admin_users_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::OrderNumber).string().not_null())
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(ColumnDef::new(Orders::PaymentStatus).string().not_null())
                        .col(ColumnDef::new(Orders::Email).string().not_null())
                        .col(ColumnDef::new(Orders::CustomerName).string().null())
                        .col(ColumnDef::new(Orders::ShippingAddress).string().null())
                        .col(
                            ColumnDef::new(Orders::SubtotalCents)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::ShippingCents)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::DiscountCents)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::TotalCents)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::RefundedCents)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::Currency).string().not_null())
                        .col(ColumnDef::new(Orders::DiscountCode).string().null())
                        .col(ColumnDef::new(Orders::ShippingOptionId).uuid().null())
                        .col(ColumnDef::new(Orders::ShippingTitle).string().null())
                        .col(
                            ColumnDef::new(Orders::PreferredPaymentMethod)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(Orders::PaymentIntentId).string().null())
                        .col(ColumnDef::new(Orders::ChargeId).string().null())
                        .col(ColumnDef::new(Orders::CaptureId).string().null())
                        .col(ColumnDef::new(Orders::TrackingNumber).string().null())
                        .col(ColumnDef::new(Orders::Tags).json().null())
                        .col(ColumnDef::new(Orders::Notes).string().null())
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_orders_order_number")
                        .table(Orders::Table)
                        .col(Orders::OrderNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        OrderNumber,
        Status,
        PaymentStatus,
        Email,
        CustomerName,
        ShippingAddress,
        SubtotalCents,
        ShippingCents,
        DiscountCents,
        TotalCents,
        RefundedCents,
        Currency,
        DiscountCode,
        ShippingOptionId,
        ShippingTitle,
        PreferredPaymentMethod,
        PaymentIntentId,
        ChargeId,
        CaptureId,
        TrackingNumber,
        Tags,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_order_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_order_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).uuid().null())
                        .col(ColumnDef::new(OrderItems::Title).string().not_null())
                        .col(ColumnDef::new(OrderItems::Sku).string().null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(OrderItems::UnitCents)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderItems::TotalCents)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductId,
        Title,
        Sku,
        Quantity,
        UnitCents,
        TotalCents,
        CreatedAt,
    }
}

mod m20240101_000003_create_customers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Customers::Email).string().not_null())
                        .col(ColumnDef::new(Customers::FirstName).string().null())
                        .col(ColumnDef::new(Customers::LastName).string().null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::Street).string().null())
                        .col(ColumnDef::new(Customers::City).string().null())
                        .col(ColumnDef::new(Customers::PostalCode).string().null())
                        .col(ColumnDef::new(Customers::Country).string().null())
                        .col(ColumnDef::new(Customers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Customers::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_customers_email")
                        .table(Customers::Table)
                        .col(Customers::Email)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        Id,
        Email,
        FirstName,
        LastName,
        Phone,
        Street,
        City,
        PostalCode,
        Country,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_discount_codes_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_discount_codes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DiscountCodes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DiscountCodes::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DiscountCodes::Code).string().not_null())
                        .col(
                            ColumnDef::new(DiscountCodes::DiscountType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DiscountCodes::AmountCents)
                                .big_integer()
                                .null(),
                        )
                        .col(ColumnDef::new(DiscountCodes::PercentOff).integer().null())
                        .col(
                            ColumnDef::new(DiscountCodes::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(DiscountCodes::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DiscountCodes::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_discount_codes_code")
                        .table(DiscountCodes::Table)
                        .col(DiscountCodes::Code)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DiscountCodes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum DiscountCodes {
        Table,
        Id,
        Code,
        DiscountType,
        AmountCents,
        PercentOff,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_shipping_options_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_shipping_options_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ShippingOptions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ShippingOptions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ShippingOptions::Carrier).string().not_null())
                        .col(
                            ColumnDef::new(ShippingOptions::ShippingType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ShippingOptions::Title).string().not_null())
                        .col(
                            ColumnDef::new(ShippingOptions::Description)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(ShippingOptions::Price).string().not_null())
                        .col(
                            ColumnDef::new(ShippingOptions::MinOrderTotal)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ShippingOptions::MaxOrderTotal)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ShippingOptions::Position)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ShippingOptions::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ShippingOptions::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ShippingOptions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ShippingOptions {
        Table,
        Id,
        Carrier,
        ShippingType,
        Title,
        Description,
        Price,
        MinOrderTotal,
        MaxOrderTotal,
        Position,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000006_create_collections_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_collections_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Collections::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Collections::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Collections::Title).string().not_null())
                        .col(ColumnDef::new(Collections::Slug).string().not_null())
                        .col(ColumnDef::new(Collections::Description).string().null())
                        .col(
                            ColumnDef::new(Collections::Position)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Collections::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Collections::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_collections_slug")
                        .table(Collections::Table)
                        .col(Collections::Slug)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Collections::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Collections {
        Table,
        Id,
        Title,
        Slug,
        Description,
        Position,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000007_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Title).string().not_null())
                        .col(ColumnDef::new(Products::Slug).string().not_null())
                        .col(ColumnDef::new(Products::Description).string().null())
                        .col(
                            ColumnDef::new(Products::PriceCents)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::Currency).string().not_null())
                        .col(ColumnDef::new(Products::Images).json().null())
                        .col(ColumnDef::new(Products::CollectionId).uuid().null())
                        .col(ColumnDef::new(Products::Tags).json().null())
                        .col(
                            ColumnDef::new(Products::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Products::Position)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_products_slug")
                        .table(Products::Table)
                        .col(Products::Slug)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_products_collection_id")
                        .table(Products::Table)
                        .col(Products::CollectionId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        Title,
        Slug,
        Description,
        PriceCents,
        Currency,
        Images,
        CollectionId,
        Tags,
        Active,
        Position,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000008_create_website_settings_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_website_settings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(WebsiteSettings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WebsiteSettings::Key)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WebsiteSettings::Value).text().not_null())
                        .col(
                            ColumnDef::new(WebsiteSettings::Encrypted)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(WebsiteSettings::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WebsiteSettings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum WebsiteSettings {
        Table,
        Key,
        Value,
        Encrypted,
        UpdatedAt,
    }
}

mod m20240101_000009_create_admin_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000009_create_admin_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AdminUsers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AdminUsers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AdminUsers::Email).string().not_null())
                        .col(
                            ColumnDef::new(AdminUsers::PasswordHash)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AdminUsers::Role)
                                .string()
                                .not_null()
                                .default("admin"),
                        )
                        .col(
                            ColumnDef::new(AdminUsers::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(AdminUsers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(AdminUsers::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_admin_users_email")
                        .table(AdminUsers::Table)
                        .col(AdminUsers::Email)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AdminUsers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum AdminUsers {
        Table,
        Id,
        Email,
        PasswordHash,
        Role,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}
