//! Diesel table definitions, matching `migrations/`.

diesel::table! {
    posts (id) {
        id -> Int8,
        #[max_length = 30]
        nickname -> Varchar,
        token -> Text,
        numbers -> Array<Int4>,
        created_at -> Timestamptz,
    }
}
