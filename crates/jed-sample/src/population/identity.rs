//! Developer and reviewer identities read back from the store.

use std::collections::HashSet;

use time::OffsetDateTime;

use catalog::{Developer, Filter, Store, StoreError, User};

/// The parts of a user the extension phases need.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: i64,
    pub name: String,
    pub registered_at: OffsetDateTime,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            registered_at: user.registered_at,
        }
    }
}

/// Users that have a developer profile, ordered by id.
pub fn developers<S: Store>(store: &S) -> Result<Vec<Identity>, StoreError> {
    Ok(partition(store)?.0)
}

/// Users without a developer profile, ordered by id.
pub fn regular_users<S: Store>(store: &S) -> Result<Vec<Identity>, StoreError> {
    Ok(partition(store)?.1)
}

fn partition<S: Store>(store: &S) -> Result<(Vec<Identity>, Vec<Identity>), StoreError> {
    let developer_ids: HashSet<i64> = store
        .fetch::<Developer>(Filter::All)?
        .into_iter()
        .map(|(_, developer)| developer.user_id)
        .collect();

    Ok(store
        .fetch::<User>(Filter::All)?
        .iter()
        .map(|(_, user)| Identity::from(user))
        .partition(|identity| developer_ids.contains(&identity.id)))
}
