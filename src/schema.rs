// Diesel table definitions for the report store.

diesel::table! {
    reports (id) {
        id -> Text,
        created_at_ms -> BigInt,
        created_at -> Text,
        target_category -> Text,
        language -> Text,
        has_competitor_data -> Integer,
        payload_json -> Text,
    }
}
