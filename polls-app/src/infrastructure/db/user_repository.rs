use super::entities::{user, user_profile, User, UserProfile};
use crate::domain;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr, PaginatorTrait, TransactionTrait};
use uuid::Uuid;

/// A validated registration: the user row, its hash and the mandatory profile.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user: domain::User,
    pub password_hash: String,
    pub avatar: String,
    pub bio: Option<String>,
}

/// Validated edits to an existing account. `avatar: None` keeps the current one.
#[derive(Debug, Clone)]
pub struct ProfileChanges {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

#[derive(Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<domain::User>, DbErr> {
        Ok(User::find_by_id(id).one(&self.db).await?.map(Into::into))
    }

    /// User plus stored password hash, for login.
    pub async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(domain::User, String)>, DbErr> {
        let row = User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;
        Ok(row.map(|m| {
            let hash = m.password_hash.clone();
            (m.into(), hash)
        }))
    }

    /// True when another account already uses `username`.
    pub async fn username_taken(
        &self,
        username: &str,
        except: Option<Uuid>,
    ) -> Result<bool, DbErr> {
        let mut query = User::find().filter(user::Column::Username.eq(username));
        if let Some(id) = except {
            query = query.filter(user::Column::Id.ne(id));
        }
        Ok(query.count(&self.db).await? > 0)
    }

    pub async fn create_with_profile(
        &self,
        account: &NewAccount,
    ) -> Result<domain::Profile, DbErr> {
        let txn = self.db.begin().await?;
        let now = chrono::Utc::now();

        let user = user::ActiveModel {
            id: Set(account.user.id),
            username: Set(account.user.username.clone()),
            email: Set(account.user.email.clone()),
            first_name: Set(account.user.first_name.clone()),
            last_name: Set(account.user.last_name.clone()),
            password_hash: Set(account.password_hash.clone()),
            is_staff: Set(account.user.is_staff),
            is_superuser: Set(account.user.is_superuser),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        }
        .insert(&txn)
        .await?;

        let profile = user_profile::ActiveModel {
            user_id: Set(user.id),
            avatar: Set(account.avatar.clone()),
            bio: Set(account.bio.clone()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(domain::Profile {
            user: user.into(),
            profile: profile.into(),
        })
    }

    pub async fn find_profile(&self, user_id: Uuid) -> Result<Option<domain::Profile>, DbErr> {
        let row = User::find_by_id(user_id)
            .find_also_related(UserProfile)
            .one(&self.db)
            .await?;

        Ok(match row {
            Some((user, Some(profile))) => Some(domain::Profile {
                user: user.into(),
                profile: profile.into(),
            }),
            _ => None,
        })
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<domain::Profile, DbErr> {
        let txn = self.db.begin().await?;

        let (user, profile) = User::find_by_id(user_id)
            .find_also_related(UserProfile)
            .one(&txn)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;
        let profile = profile.ok_or(DbErr::RecordNotFound("Profile not found".to_string()))?;

        let mut active: user::ActiveModel = user.into();
        active.username = Set(changes.username.clone());
        active.email = Set(changes.email.clone());
        active.first_name = Set(changes.first_name.clone());
        active.last_name = Set(changes.last_name.clone());
        active.updated_at = Set(Some(chrono::Utc::now()));
        let user = active.update(&txn).await?;

        let mut active_profile: user_profile::ActiveModel = profile.into();
        if let Some(avatar) = &changes.avatar {
            active_profile.avatar = Set(avatar.clone());
        }
        active_profile.bio = Set(changes.bio.clone());
        let profile = active_profile.update(&txn).await?;

        txn.commit().await?;
        Ok(domain::Profile {
            user: user.into(),
            profile: profile.into(),
        })
    }

    /// Removes the user; profile and votes go with it.
    pub async fn delete(&self, user_id: Uuid) -> Result<bool, DbErr> {
        let result = User::delete_by_id(user_id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

impl From<user::Model> for domain::User {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            first_name: m.first_name,
            last_name: m.last_name,
            is_staff: m.is_staff,
            is_superuser: m.is_superuser,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<user_profile::Model> for domain::UserProfile {
    fn from(m: user_profile::Model) -> Self {
        Self {
            user_id: m.user_id,
            avatar: m.avatar,
            bio: m.bio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::test_support;

    #[tokio::test]
    async fn test_create_and_find_profile() {
        let db = test_support::connection().await;
        let alice = test_support::seed_user(&db, "alice").await;
        let repo = UserRepository::new(db);

        let profile = repo.find_profile(alice.id).await.unwrap().unwrap();
        assert_eq!(profile.user.username, "alice");
        assert_eq!(profile.profile.avatar, "avatars/alice.png");
        assert!(!profile.user.is_admin());
    }

    #[tokio::test]
    async fn test_username_taken_excludes_self() {
        let db = test_support::connection().await;
        let alice = test_support::seed_user(&db, "alice").await;
        let repo = UserRepository::new(db);

        assert!(repo.username_taken("alice", None).await.unwrap());
        assert!(!repo.username_taken("alice", Some(alice.id)).await.unwrap());
        assert!(!repo.username_taken("bob", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_keeps_avatar_when_not_replaced() {
        let db = test_support::connection().await;
        let alice = test_support::seed_user(&db, "alice").await;
        let repo = UserRepository::new(db);

        let changes = ProfileChanges {
            username: "alice2".to_string(),
            email: "alice2@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            avatar: None,
            bio: Some("Curiouser and curiouser".to_string()),
        };
        let updated = repo.update_profile(alice.id, &changes).await.unwrap();
        assert_eq!(updated.user.username, "alice2");
        assert_eq!(updated.profile.avatar, "avatars/alice.png");
        assert_eq!(updated.profile.bio.as_deref(), Some("Curiouser and curiouser"));
    }

    #[tokio::test]
    async fn test_delete_removes_profile() {
        let db = test_support::connection().await;
        let alice = test_support::seed_user(&db, "alice").await;
        let repo = UserRepository::new(db);

        assert!(repo.delete(alice.id).await.unwrap());
        assert!(repo.find_profile(alice.id).await.unwrap().is_none());
        assert!(UserProfile::find_by_id(alice.id)
            .one(&repo.db)
            .await
            .unwrap()
            .is_none());
    }
}
