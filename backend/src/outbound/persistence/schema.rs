//! Diesel table definitions. Must match `backend/migrations`.

diesel::table! {
    /// Library inventory. Removed books keep their row with
    /// `in_inventory = false`.
    books (id) {
        id -> Int4,
        title -> Varchar,
        author -> Varchar,
        genre -> Varchar,
        added_to_inventory -> Timestamptz,
        in_inventory -> Bool,
    }
}
