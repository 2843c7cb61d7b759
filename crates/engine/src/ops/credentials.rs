use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{EngineError, Identity, ResultEngine, auth, users, util};

use super::{Engine, with_tx};

impl Engine {
    /// Registers a new user.
    ///
    /// The username and password must match the credential allow-list
    /// (letters, digits, `_`, `.`). Only a salted hash of the password is
    /// stored. The builtin category set is seeded in the same transaction,
    /// so a registered user is fully usable once this returns.
    pub async fn register(&self, username: &str, password: &str) -> ResultEngine<()> {
        util::validate_credential(username, "username")?;
        util::validate_credential(password, "password")?;

        if users::Entity::find_by_id(username)
            .one(&self.database)
            .await?
            .is_some()
        {
            return Err(EngineError::AlreadyExists(username.to_string()));
        }

        let password_hash = auth::hash_password(password)?;
        with_tx!(self, |db_tx| {
            let user = users::ActiveModel {
                username: ActiveValue::Set(username.to_string()),
                password_hash: ActiveValue::Set(password_hash),
            };
            user.insert(&db_tx).await?;
            self.seed_builtin_categories(&db_tx, username).await?;
            Ok(())
        })
    }

    /// Checks a login attempt and returns the [`Identity`] proving it.
    ///
    /// An unknown username and a wrong password both come back as
    /// [`EngineError::InvalidCredentials`]; a hash computation is burned on
    /// the unknown-username path so the two cases also cost the same.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<Identity> {
        let user = users::Entity::find_by_id(username.trim())
            .one(&self.database)
            .await?;

        match user {
            Some(user) => {
                if auth::verify_password(password, &user.password_hash)? {
                    Ok(Identity::new(user.username))
                } else {
                    Err(EngineError::InvalidCredentials)
                }
            }
            None => {
                auth::burn_verification(password);
                Err(EngineError::InvalidCredentials)
            }
        }
    }
}
