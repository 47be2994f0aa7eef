use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.3.0",
        description = r#"
# Storefront & Back-Office API

Storefront catalog browsing, checkout pricing, and payment processing,
plus the admin surface for orders, discounts, shipping options,
settings, and carrier integration.

## Authentication

Admin endpoints require a JWT obtained from `/api/v1/auth/login`:

```
Authorization: Bearer <token>
```

Storefront catalog and checkout endpoints are public. Webhook endpoints
are authenticated by provider signatures.

## Error Handling

Failures return a JSON body with `error`, `message`, and `timestamp`
fields and an appropriate status code (400 invalid input, 401
unauthenticated, 403 forbidden, 404 not found, 402 payment failure,
502 upstream provider failure).

## Money

All amounts are integer cents. Request fields documented as decimal
amounts accept strings with comma or dot separators ("12,50", "12.50")
or plain numbers.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        crate::auth::login,
        crate::auth::me,
        crate::handlers::checkout::list_shipping_options,
        crate::handlers::checkout::validate_discount,
        crate::handlers::checkout::create_payment_intent,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_order,
        crate::handlers::orders::update_order_status,
        crate::handlers::orders::update_order_tags,
        crate::handlers::orders::refund_order,
        crate::handlers::orders::create_payment_link,
        crate::handlers::orders::download_label,
        crate::handlers::discounts::list_discounts,
        crate::handlers::discounts::create_discount,
        crate::handlers::discounts::update_discount,
        crate::handlers::discounts::delete_discount,
        crate::handlers::shipping::list_options,
        crate::handlers::shipping::create_option,
        crate::handlers::shipping::update_option,
        crate::handlers::shipping::delete_option,
        crate::handlers::shipping::reorder_options,
        crate::handlers::shipping::shipping_quotes,
        crate::handlers::shipping::carriers,
        crate::handlers::shipping::service_points,
        crate::handlers::products::list_public_products,
        crate::handlers::products::get_public_product,
        crate::handlers::products::list_products,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::products::duplicate_product,
        crate::handlers::collections::list_public_collections,
        crate::handlers::collections::get_public_collection,
        crate::handlers::collections::create_collection,
        crate::handlers::collections::update_collection,
        crate::handlers::collections::delete_collection,
        crate::handlers::settings::list_settings,
        crate::handlers::settings::update_settings,
        crate::handlers::webhooks::stripe_webhook,
        crate::handlers::webhooks::sendcloud_webhook,
    ),
    tags(
        (name = "Auth", description = "Back-office authentication"),
        (name = "Checkout", description = "Public checkout pricing pipeline"),
        (name = "Orders", description = "Order management and refunds"),
        (name = "Discounts", description = "Discount code administration"),
        (name = "Shipping", description = "Shipping options and carrier integration"),
        (name = "Catalog", description = "Products and collections"),
        (name = "Settings", description = "Website settings and provider credentials"),
        (name = "Webhooks", description = "Inbound provider webhooks"),
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at /docs, serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
