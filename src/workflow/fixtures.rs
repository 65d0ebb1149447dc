//! Literal documents, filters and updates used by the tour steps.

use mongodb::bson::{Document, doc};

/// Result cap for the projected find.
pub const PROJECTION_LIMIT: i64 = 2;

/// Group cap for the average-age aggregation.
pub const AGGREGATE_LIMIT: i64 = 4;

/// Two users sharing a name, each with an `age` array.
pub fn users_batch() -> Vec<Document> {
    vec![
        doc! {
            "login": "user_1",
            "email": "a@a.ua",
            "firstname": "Ivan",
            "lastname": "Tsygan",
            "age": [25, 10],
        },
        doc! {
            "login": "user_2",
            "email": "b@b.ua",
            "firstname": "Ivan",
            "lastname": "Tsygan",
            "age": [45, 16],
        },
    ]
}

/// Users inserted one at a time after the collection is dropped.
/// Only `user_1` starts with a `lastname`.
pub fn single_users() -> Vec<Document> {
    vec![
        doc! { "login": "user_1", "money": "80", "firstname": "Ivan", "lastname": "Tsygan" },
        doc! { "login": "user_2", "money": "125", "firstname": "Ivan" },
        doc! { "login": "user_3", "money": "140", "firstname": "Ivan" },
    ]
}

pub fn full_name_filter() -> Document {
    doc! { "firstname": "Ivan", "lastname": "Tsygan" }
}

pub fn first_name_filter() -> Document {
    doc! { "firstname": "Ivan" }
}

/// Keep only the name fields, drop `_id`.
pub fn name_projection() -> Document {
    doc! { "_id": 0, "firstname": 1, "lastname": 1 }
}

/// Case-insensitive match of "gan" anywhere in `lastname`.
pub fn lastname_pattern_filter() -> Document {
    doc! { "lastname": { "$regex": "gan", "$options": "i" } }
}

pub fn lastname_update() -> Document {
    doc! { "$set": { "lastname": "Tsygan" } }
}

pub fn login_filter(login: &str) -> Document {
    doc! { "login": login }
}

/// Replacement body for `user_1`; `login` and `money` are not carried over.
pub fn replacement_body() -> Document {
    doc! { "firstname": "Ivan", "lastname": "Tsygan" }
}

/// Ascending index on `login`.
pub fn index_keys() -> Document {
    doc! { "login": 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::default_index_name;

    #[test]
    fn users_batch_share_full_name() {
        let filter = full_name_filter();
        for user in users_batch() {
            for (field, value) in &filter {
                assert_eq!(user.get(field), Some(value));
            }
            assert_eq!(user.get_array("age").unwrap().len(), 2);
        }
    }

    #[test]
    fn only_first_single_user_has_lastname() {
        let users = single_users();
        assert_eq!(users.len(), 3);
        assert!(users[0].contains_key("lastname"));
        assert!(users[1..].iter().all(|user| !user.contains_key("lastname")));
    }

    #[test]
    fn index_keys_produce_login_1() {
        assert_eq!(default_index_name(&index_keys()), "login_1");
    }
}
