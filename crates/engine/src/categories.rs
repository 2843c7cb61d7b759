//! Category registry per user.
//!
//! Every user starts with the builtin set below; `resolve_category` grows the
//! registry when an entry or rule names something new. `name_norm` is the
//! lookup key (see `util::normalize_category_key`), so "Food", "food " and
//! "FOOD" land on the same row.

use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

pub(crate) const BUILTIN_CATEGORIES: [&str; 8] = [
    "Salary",
    "Food",
    "Rent",
    "Transport",
    "Entertainment",
    "Subscription",
    "Health",
    "Other",
];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner: String,
    pub name: String,
    pub name_norm: String,
    pub is_builtin: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::Owner",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A category as seen by callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    pub builtin: bool,
}

impl From<Model> for Category {
    fn from(model: Model) -> Self {
        Self {
            name: model.name,
            builtin: model.is_builtin,
        }
    }
}
