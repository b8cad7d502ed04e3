use uuid::Uuid;

pub(crate) mod auth;
pub(crate) mod companies;
pub(crate) mod health;
pub(crate) mod invitations;
pub(crate) mod setup;
pub(crate) mod shortcuts;
pub(crate) mod types;
pub(crate) mod users;

/// Fresh id for store-only records.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}
