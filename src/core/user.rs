//! User operations - creation, lookup and dietary restrictions.

use crate::{
    entities::{Tags, User, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Creates a user with the given dietary restrictions.
///
/// # Errors
/// Returns an error if the name is blank or the insert fails.
pub async fn create_user(
    db: &DatabaseConnection,
    name: String,
    dietary_restrictions: Tags,
) -> Result<user::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "User name cannot be empty".to_string(),
        });
    }

    let user = user::ActiveModel {
        name: Set(name.trim().to_string()),
        dietary_restrictions: Set(dietary_restrictions),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    user.insert(db).await.map_err(Into::into)
}

/// Retrieves a user by ID.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Retrieves a user by ID, failing with [`Error::UserNotFound`] when absent.
pub async fn require_user(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    get_user_by_id(db, user_id)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })
}

/// Replaces a user's dietary restrictions.
pub async fn set_dietary_restrictions(
    db: &DatabaseConnection,
    user_id: i64,
    restrictions: Tags,
) -> Result<user::Model> {
    let mut user: user::ActiveModel = require_user(db, user_id).await?.into();
    user.dietary_restrictions = Set(restrictions);
    user.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_user_validation() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let result = create_user(&db, "  ".to_string(), Tags::default()).await;
        assert!(matches!(result, Err(Error::Config { message: _ })));
    }

    #[tokio::test]
    async fn test_restrictions_round_trip() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_user(&db, "Alice".to_string(), Tags::new(["lactose"])).await?;

        let found = require_user(&db, user.id).await?;
        assert_eq!(found.dietary_restrictions, Tags::new(["lactose"]));

        let updated = set_dietary_restrictions(&db, user.id, Tags::new(["gluten", "porc"])).await?;
        assert_eq!(updated.dietary_restrictions.0.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_require_missing_user() -> Result<()> {
        let db = setup_test_db().await?;
        let result = require_user(&db, 404).await;
        assert!(matches!(result, Err(Error::UserNotFound { id: 404 })));
        Ok(())
    }
}
