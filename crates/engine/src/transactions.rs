//! Ledger primitives.
//!
//! A `Transaction` is a single dated income or expense entry owned by one
//! user. Rows are immutable after insertion and removed only by an explicit
//! bulk clear; the autoincrement id is the arrival order used for listings.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::KeyNotFound(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub owner: String,
    pub kind: TransactionKind,
    pub occurred_on: NaiveDate,
    pub amount: MoneyCents,
    pub category: String,
    pub note: Option<String>,
}

impl Transaction {
    /// Builds a ledger entry, rejecting non-positive amounts. The sign of an
    /// entry is carried by `kind`, never by a negative amount.
    pub fn new(
        owner: String,
        kind: TransactionKind,
        occurred_on: NaiveDate,
        amount: MoneyCents,
        category: String,
        note: Option<String>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            owner,
            kind,
            occurred_on,
            amount,
            category,
            note,
        })
    }

    /// The entry's contribution to a balance: positive for income, negative
    /// for expense.
    #[must_use]
    pub fn signed_amount(&self) -> MoneyCents {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

/// Reduces a set of entries to a signed total.
///
/// Defined as `sum(income) - sum(expenses)`; the empty slice sums to zero and
/// the result does not depend on ordering.
#[must_use]
pub fn balance(transactions: &[Transaction]) -> MoneyCents {
    transactions.iter().map(Transaction::signed_amount).sum()
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner: String,
    pub kind: String,
    pub occurred_on: Date,
    pub amount_minor: i64,
    pub category: String,
    pub note: Option<String>,
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

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            owner: ActiveValue::Set(tx.owner.clone()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            occurred_on: ActiveValue::Set(tx.occurred_on),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            category: ActiveValue::Set(tx.category.clone()),
            note: ActiveValue::Set(tx.note.clone()),
            ..Default::default()
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            owner: model.owner,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            occurred_on: model.occurred_on,
            amount: MoneyCents::new(model.amount_minor),
            category: model.category,
            note: model.note,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: TransactionKind, cents: i64) -> Transaction {
        Transaction::new(
            "alice".to_string(),
            kind,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            MoneyCents::new(cents),
            "Other".to_string(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn balance_of_empty_slice_is_zero() {
        assert_eq!(balance(&[]), MoneyCents::ZERO);
    }

    #[test]
    fn balance_subtracts_expenses_from_income() {
        let entries = vec![
            entry(TransactionKind::Expense, 50_00),
            entry(TransactionKind::Income, 1000_00),
        ];
        assert_eq!(balance(&entries), MoneyCents::new(950_00));
    }

    #[test]
    fn balance_is_order_independent() {
        let mut entries = vec![
            entry(TransactionKind::Income, 10_00),
            entry(TransactionKind::Expense, 3_00),
            entry(TransactionKind::Income, 7_50),
        ];
        let forward = balance(&entries);
        entries.reverse();
        assert_eq!(balance(&entries), forward);
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        for cents in [0, -1] {
            let err = Transaction::new(
                "alice".to_string(),
                TransactionKind::Expense,
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                MoneyCents::new(cents),
                "Other".to_string(),
                None,
            )
            .unwrap_err();
            assert!(matches!(err, EngineError::InvalidAmount(_)));
        }
    }
}
