use chrono::NaiveDate;
use sea_orm::{QueryFilter, QueryOrder, Statement, TransactionTrait, prelude::*};

use crate::{Identity, MoneyCents, ResultEngine, Transaction, TransactionKind, transactions};

use super::{Engine, normalize_note, with_tx};

/// Aggregate totals for one user's ledger.
///
/// `balance == income - expenses`; all three are computed in SQL so they
/// stay correct however large the ledger grows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerTotals {
    pub balance: MoneyCents,
    pub income: MoneyCents,
    pub expenses: MoneyCents,
}

impl Engine {
    /// Appends one entry to the user's ledger.
    ///
    /// The category is resolved through the registry inside the same DB
    /// transaction as the insert. Returns the stored entry (with the
    /// canonical category name).
    pub async fn append(
        &self,
        identity: &Identity,
        kind: TransactionKind,
        occurred_on: NaiveDate,
        amount: MoneyCents,
        category: &str,
        note: Option<&str>,
    ) -> ResultEngine<Transaction> {
        let note = normalize_note(note);
        with_tx!(self, |db_tx| {
            let category = self
                .resolve_category(&db_tx, identity.username(), category)
                .await?;
            let tx = Transaction::new(
                identity.username().to_string(),
                kind,
                occurred_on,
                amount,
                category,
                note,
            )?;
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            Ok(tx)
        })
    }

    /// Lists the user's entries in append order, optionally restricted to
    /// one category (normalized match). A filter naming an unknown category
    /// is an empty listing, not an error.
    pub async fn list(
        &self,
        identity: &Identity,
        category: Option<&str>,
    ) -> ResultEngine<Vec<Transaction>> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::Owner.eq(identity.username()))
            .order_by_asc(transactions::Column::Id);

        if let Some(raw) = category {
            match self.find_category(identity.username(), raw).await? {
                Some(canonical) => {
                    query = query.filter(transactions::Column::Category.eq(canonical));
                }
                None => return Ok(Vec::new()),
            }
        }

        let models = query.all(&self.database).await?;
        models.into_iter().map(Transaction::try_from).collect()
    }

    /// Deletes every entry of the user. Idempotent; returns how many rows
    /// went away.
    pub async fn clear(&self, identity: &Identity) -> ResultEngine<u64> {
        let result = transactions::Entity::delete_many()
            .filter(transactions::Column::Owner.eq(identity.username()))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected)
    }

    /// Lists the whole ledger and folds it with [`crate::balance`].
    pub async fn balance_of(&self, identity: &Identity) -> ResultEngine<MoneyCents> {
        let entries = self.list(identity, None).await?;
        Ok(crate::balance(&entries))
    }

    async fn sum_for_kind(&self, owner: &str, kind: TransactionKind) -> ResultEngine<i64> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT COALESCE(SUM(amount_minor), 0) AS sum \
             FROM transactions \
             WHERE owner = ? AND kind = ?",
            [owner.into(), kind.as_str().into()],
        );
        let row = self.database.query_one(stmt).await?;
        Ok(row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0))
    }

    /// Returns the user's aggregate totals, computed in SQL.
    pub async fn statistics(&self, identity: &Identity) -> ResultEngine<LedgerTotals> {
        let income = self
            .sum_for_kind(identity.username(), TransactionKind::Income)
            .await?;
        let expenses = self
            .sum_for_kind(identity.username(), TransactionKind::Expense)
            .await?;

        Ok(LedgerTotals {
            balance: MoneyCents::new(income - expenses),
            income: MoneyCents::new(income),
            expenses: MoneyCents::new(expenses),
        })
    }
}
