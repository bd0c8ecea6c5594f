diesel::table! {
    scheduled_orders (id) {
        id -> Integer,
        ticker -> Text,
        market -> Text,
        signal_type -> Text,
        price -> Nullable<Text>,
        company_name -> Nullable<Text>,
        execute_after -> Timestamp,
        status -> Text,
        created_at -> Timestamp,
        executed_at -> Nullable<Timestamp>,
        error_message -> Nullable<Text>,
        signal_payload -> Text,
    }
}
