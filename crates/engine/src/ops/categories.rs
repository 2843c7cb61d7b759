use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Category, Identity, ResultEngine, categories, util};

use super::{Engine, with_tx};

impl Engine {
    /// Maps user input onto the canonical category name, extending the
    /// registry when the normalized name is unknown.
    pub(super) async fn resolve_category(
        &self,
        db_tx: &DatabaseTransaction,
        owner: &str,
        input: &str,
    ) -> ResultEngine<String> {
        let display = util::normalize_category_display(input)?;
        let key = util::normalize_category_key(&display)?;

        if let Some(model) = categories::Entity::find()
            .filter(categories::Column::Owner.eq(owner))
            .filter(categories::Column::NameNorm.eq(key.clone()))
            .one(db_tx)
            .await?
        {
            return Ok(model.name);
        }

        let active = categories::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            owner: ActiveValue::Set(owner.to_string()),
            name: ActiveValue::Set(display.clone()),
            name_norm: ActiveValue::Set(key),
            is_builtin: ActiveValue::Set(false),
        };
        active.insert(db_tx).await?;
        Ok(display)
    }

    /// Looks up the canonical name for `input` without extending the
    /// registry. `None` when the user has no such category.
    pub(super) async fn find_category(
        &self,
        owner: &str,
        input: &str,
    ) -> ResultEngine<Option<String>> {
        let display = util::normalize_category_display(input)?;
        let key = util::normalize_category_key(&display)?;

        let model = categories::Entity::find()
            .filter(categories::Column::Owner.eq(owner))
            .filter(categories::Column::NameNorm.eq(key))
            .one(&self.database)
            .await?;
        Ok(model.map(|m| m.name))
    }

    pub(super) async fn seed_builtin_categories(
        &self,
        db_tx: &DatabaseTransaction,
        owner: &str,
    ) -> ResultEngine<()> {
        for name in categories::BUILTIN_CATEGORIES {
            let key = util::normalize_category_key(name)?;
            let active = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                owner: ActiveValue::Set(owner.to_string()),
                name: ActiveValue::Set(name.to_string()),
                name_norm: ActiveValue::Set(key),
                is_builtin: ActiveValue::Set(true),
            };
            active.insert(db_tx).await?;
        }
        Ok(())
    }

    /// Adds a category explicitly; returns its canonical name (the existing
    /// one when the normalized name is already registered).
    pub async fn add_category(&self, identity: &Identity, name: &str) -> ResultEngine<String> {
        with_tx!(self, |db_tx| {
            let canonical = self
                .resolve_category(&db_tx, identity.username(), name)
                .await?;
            Ok(canonical)
        })
    }

    /// All of the user's categories, builtin and custom, sorted by name.
    pub async fn list_categories(&self, identity: &Identity) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .filter(categories::Column::Owner.eq(identity.username()))
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }
}
