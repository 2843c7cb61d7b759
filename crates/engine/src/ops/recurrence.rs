use chrono::NaiveDate;
use sea_orm::{
    QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    Frequency, Identity, MoneyCents, RecurrenceRule, ResultEngine, Transaction, TransactionKind,
    recurrence_rules, transactions,
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a recurring rule anchored at `starting`.
    ///
    /// Nothing is materialized here; the first occurrence lands one period
    /// after the anchor, on the next catch-up.
    pub async fn add_rule(
        &self,
        identity: &Identity,
        kind: TransactionKind,
        frequency: Frequency,
        amount: MoneyCents,
        category: &str,
        starting: NaiveDate,
    ) -> ResultEngine<RecurrenceRule> {
        with_tx!(self, |db_tx| {
            let category = self
                .resolve_category(&db_tx, identity.username(), category)
                .await?;
            let rule = RecurrenceRule::new(
                identity.username().to_string(),
                kind,
                frequency,
                amount,
                category,
                starting,
            )?;
            recurrence_rules::ActiveModel::from(&rule).insert(&db_tx).await?;
            Ok(rule)
        })
    }

    /// All of the user's recurring rules.
    pub async fn list_rules(&self, identity: &Identity) -> ResultEngine<Vec<RecurrenceRule>> {
        let models = recurrence_rules::Entity::find()
            .filter(recurrence_rules::Column::Owner.eq(identity.username()))
            .order_by_asc(recurrence_rules::Column::Category)
            .order_by_asc(recurrence_rules::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(RecurrenceRule::try_from).collect()
    }

    /// Materializes every occurrence the user's rules imply up to `today`,
    /// returning how many ledger entries were written.
    ///
    /// Each missed occurrence becomes one ledger entry dated at the
    /// occurrence, written in its own DB transaction together with the
    /// advance of the rule's anchor. A failure mid-loop therefore leaves the
    /// anchor at the last occurrence that actually persisted: re-running
    /// resumes where the loop stopped, without gaps or duplicates.
    ///
    /// The anchor advance is conditional on the anchor still holding its
    /// previous value. When a concurrent catch-up already moved it, the
    /// update matches zero rows and this run rolls back the occurrence and
    /// leaves the rule to the other session.
    pub async fn catch_up(&self, identity: &Identity, today: NaiveDate) -> ResultEngine<u64> {
        let models = recurrence_rules::Entity::find()
            .filter(recurrence_rules::Column::Owner.eq(identity.username()))
            .all(&self.database)
            .await?;

        let mut materialized = 0u64;
        for model in models {
            let mut rule = RecurrenceRule::try_from(model)?;
            while let Some(due) = rule.next_due() {
                if due > today {
                    break;
                }
                if !self.materialize_occurrence(&rule, due).await? {
                    break;
                }
                rule.last_materialized = due;
                materialized += 1;
            }
        }

        if materialized > 0 {
            tracing::info!(
                user = identity.username(),
                count = materialized,
                "materialized recurring transactions"
            );
        }
        Ok(materialized)
    }

    /// Writes one occurrence of `rule` dated `due` and advances the anchor,
    /// atomically. `false` means another session advanced the rule first.
    async fn materialize_occurrence(
        &self,
        rule: &RecurrenceRule,
        due: NaiveDate,
    ) -> ResultEngine<bool> {
        let tx = Transaction::new(
            rule.owner.clone(),
            rule.kind,
            due,
            rule.amount,
            rule.category.clone(),
            None,
        )?;

        let db_tx = self.database.begin().await?;
        transactions::ActiveModel::from(&tx).insert(&db_tx).await?;

        let advanced = recurrence_rules::Entity::update_many()
            .col_expr(
                recurrence_rules::Column::LastMaterialized,
                Expr::value(due),
            )
            .filter(recurrence_rules::Column::Id.eq(rule.id.to_string()))
            .filter(recurrence_rules::Column::LastMaterialized.eq(rule.last_materialized))
            .exec(&db_tx)
            .await?;

        if advanced.rows_affected == 0 {
            db_tx.rollback().await?;
            return Ok(false);
        }

        db_tx.commit().await?;
        Ok(true)
    }
}
