diesel::table! {
    stock_holdings (id) {
        id -> Integer,
        market -> Text,
        ticker -> Text,
        buy_price -> Text,
        buy_date -> Timestamp,
        current_price -> Text,
        last_updated -> Timestamp,
        target_price -> Nullable<Text>,
        stop_loss -> Nullable<Text>,
        trigger_type -> Nullable<Text>,
        sector -> Nullable<Text>,
        scenario -> Nullable<Text>,
    }
}

diesel::table! {
    trading_history (id) {
        id -> Integer,
        market -> Text,
        ticker -> Text,
        buy_price -> Text,
        sell_price -> Text,
        buy_date -> Timestamp,
        sell_date -> Timestamp,
        profit_rate -> Text,
        holding_days -> Integer,
        sector -> Nullable<Text>,
    }
}

diesel::table! {
    trade_logs (id) {
        id -> Integer,
        ticker -> Text,
        market -> Text,
        action -> Text,
        quantity -> BigInt,
        price -> Nullable<Text>,
        total_amount -> Nullable<Text>,
        timestamp -> Timestamp,
        order_no -> Nullable<Text>,
        success -> Bool,
        message -> Nullable<Text>,
    }
}
