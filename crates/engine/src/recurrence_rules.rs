//! Recurring-rule primitives.
//!
//! A `RecurrenceRule` is a template for an automatically repeating entry:
//! kind, amount and category plus a schedule. `last_materialized` is the
//! schedule anchor; it only ever moves forward, one occurrence at a time, as
//! the catch-up loop writes the implied transactions into the ledger.

use chrono::{Days, Months, NaiveDate};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, TransactionKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// The first scheduled date strictly after `from`.
    ///
    /// Weekly advances by seven days. Monthly lands on the same day-of-month
    /// in the following month, clamped to that month's last valid day when
    /// the day does not exist (Jan 31 → Feb 28/29). `None` only at the edge
    /// of chrono's representable range.
    #[must_use]
    pub fn next_occurrence(self, from: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Weekly => from.checked_add_days(Days::new(7)),
            Self::Monthly => from.checked_add_months(Months::new(1)),
        }
    }
}

impl TryFrom<&str> for Frequency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(EngineError::KeyNotFound(format!(
                "invalid frequency: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub id: Uuid,
    pub owner: String,
    pub kind: TransactionKind,
    pub frequency: Frequency,
    pub amount: MoneyCents,
    pub category: String,
    pub last_materialized: NaiveDate,
}

impl RecurrenceRule {
    /// Builds a rule anchored at `last_materialized`; the first occurrence
    /// the catch-up loop writes is one period after the anchor.
    pub fn new(
        owner: String,
        kind: TransactionKind,
        frequency: Frequency,
        amount: MoneyCents,
        category: String,
        last_materialized: NaiveDate,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner,
            kind,
            frequency,
            amount,
            category,
            last_materialized,
        })
    }

    /// The next date this rule is due, from its current anchor.
    #[must_use]
    pub fn next_due(&self) -> Option<NaiveDate> {
        self.frequency.next_occurrence(self.last_materialized)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recurrence_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner: String,
    pub kind: String,
    pub frequency: String,
    pub amount_minor: i64,
    pub category: String,
    pub last_materialized: Date,
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

impl From<&RecurrenceRule> for ActiveModel {
    fn from(rule: &RecurrenceRule) -> Self {
        Self {
            id: ActiveValue::Set(rule.id.to_string()),
            owner: ActiveValue::Set(rule.owner.clone()),
            kind: ActiveValue::Set(rule.kind.as_str().to_string()),
            frequency: ActiveValue::Set(rule.frequency.as_str().to_string()),
            amount_minor: ActiveValue::Set(rule.amount.cents()),
            category: ActiveValue::Set(rule.category.clone()),
            last_materialized: ActiveValue::Set(rule.last_materialized),
        }
    }
}

impl TryFrom<Model> for RecurrenceRule {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("rule not exists".to_string()))?,
            owner: model.owner,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            frequency: Frequency::try_from(model.frequency.as_str())?,
            amount: MoneyCents::new(model.amount_minor),
            category: model.category,
            last_materialized: model.last_materialized,
        })
    }
}
