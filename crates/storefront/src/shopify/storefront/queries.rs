//! GraphQL operation definitions for the Shopify Storefront API.

use graphql_client::GraphQLQuery;

// Custom scalars must be in scope where the derive expands, named exactly as
// in the schema
#[allow(clippy::upper_case_acronyms)]
type URL = String;

/// `cartCreate` mutation: turns checkout lines into a hosted checkout URL.
#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/storefront/schema.graphql",
    query_path = "graphql/storefront/mutations/cart_create.graphql",
    response_derives = "Debug, Clone"
)]
pub struct CreateCheckoutCart;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_serializes_lines() {
        let body = CreateCheckoutCart::build_query(create_checkout_cart::Variables {
            lines: vec![create_checkout_cart::CartLineInput {
                merchandise_id: "gid://shopify/ProductVariant/1".to_string(),
                quantity: Some(2),
            }],
        });

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["operationName"], "CreateCheckoutCart");
        assert!(json["query"].as_str().unwrap().contains("cartCreate"));
        assert_eq!(
            json["variables"]["lines"][0]["merchandiseId"],
            "gid://shopify/ProductVariant/1"
        );
        assert_eq!(json["variables"]["lines"][0]["quantity"], 2);
    }

    #[test]
    fn test_response_with_user_errors() {
        let raw = r#"{
            "cartCreate": {
                "cart": null,
                "userErrors": [{"code": "INVALID", "field": ["input", "lines", "0"], "message": "Variant is sold out"}]
            }
        }"#;
        let data: create_checkout_cart::ResponseData = serde_json::from_str(raw).unwrap();
        let payload = data.cart_create.unwrap();
        assert!(payload.cart.is_none());
        assert_eq!(payload.user_errors[0].message, "Variant is sold out");
        assert!(matches!(
            payload.user_errors[0].code,
            Some(create_checkout_cart::CartErrorCode::INVALID)
        ));
    }
}
