use chrono::NaiveDate;
use sea_orm::Database;

use engine::{Engine, EngineError, Frequency, Identity, MoneyCents, TransactionKind};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn registered(engine: &Engine, username: &str) -> Identity {
    engine.register(username, "Abc123").await.unwrap();
    engine.authenticate(username, "Abc123").await.unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn weekly_catch_up_materializes_each_missed_occurrence() {
    let engine = engine_with_db().await;
    let alice = registered(&engine, "alice").await;

    engine
        .add_rule(
            &alice,
            TransactionKind::Expense,
            Frequency::Weekly,
            MoneyCents::new(20_00),
            "Subscription",
            date(2024, 1, 1),
        )
        .await
        .unwrap();

    let materialized = engine.catch_up(&alice, date(2024, 1, 22)).await.unwrap();
    assert_eq!(materialized, 3);

    let entries = engine.list(&alice, None).await.unwrap();
    let days: Vec<NaiveDate> = entries.iter().map(|e| e.occurred_on).collect();
    assert_eq!(
        days,
        vec![date(2024, 1, 8), date(2024, 1, 15), date(2024, 1, 22)]
    );
    for entry in &entries {
        assert_eq!(entry.kind, TransactionKind::Expense);
        assert_eq!(entry.amount, MoneyCents::new(20_00));
        assert_eq!(entry.category, "Subscription");
    }

    let rules = engine.list_rules(&alice).await.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].last_materialized, date(2024, 1, 22));
}

#[tokio::test]
async fn catch_up_twice_is_idempotent() {
    let engine = engine_with_db().await;
    let alice = registered(&engine, "alice").await;

    engine
        .add_rule(
            &alice,
            TransactionKind::Income,
            Frequency::Weekly,
            MoneyCents::new(100_00),
            "Salary",
            date(2024, 1, 1),
        )
        .await
        .unwrap();

    let today = date(2024, 1, 31);
    let first = engine.catch_up(&alice, today).await.unwrap();
    assert_eq!(first, 4);

    // No time has passed: there is nothing left to materialize.
    let second = engine.catch_up(&alice, today).await.unwrap();
    assert_eq!(second, 0);
    assert_eq!(engine.list(&alice, None).await.unwrap().len(), 4);
}

#[tokio::test]
async fn monthly_rule_clamps_to_end_of_february() {
    let engine = engine_with_db().await;
    let alice = registered(&engine, "alice").await;

    // Leap year: Jan 31 anchors to Feb 29, not Mar 2.
    engine
        .add_rule(
            &alice,
            TransactionKind::Expense,
            Frequency::Monthly,
            MoneyCents::new(9_99),
            "Subscription",
            date(2024, 1, 31),
        )
        .await
        .unwrap();

    let materialized = engine.catch_up(&alice, date(2024, 2, 29)).await.unwrap();
    assert_eq!(materialized, 1);
    let entries = engine.list(&alice, None).await.unwrap();
    assert_eq!(entries[0].occurred_on, date(2024, 2, 29));

    engine.clear(&alice).await.unwrap();

    // Non-leap year: Jan 31 anchors to Feb 28.
    let bob = registered(&engine, "bob").await;
    engine
        .add_rule(
            &bob,
            TransactionKind::Expense,
            Frequency::Monthly,
            MoneyCents::new(9_99),
            "Subscription",
            date(2023, 1, 31),
        )
        .await
        .unwrap();

    engine.catch_up(&bob, date(2023, 3, 1)).await.unwrap();
    let entries = engine.list(&bob, None).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].occurred_on, date(2023, 2, 28));
}

#[tokio::test]
async fn monthly_catch_up_walks_every_missed_month() {
    let engine = engine_with_db().await;
    let alice = registered(&engine, "alice").await;

    engine
        .add_rule(
            &alice,
            TransactionKind::Income,
            Frequency::Monthly,
            MoneyCents::new(1500_00),
            "Salary",
            date(2024, 1, 31),
        )
        .await
        .unwrap();

    // Far in the past: the loop generates each occurrence, one by one.
    let materialized = engine.catch_up(&alice, date(2024, 5, 1)).await.unwrap();
    assert_eq!(materialized, 3);

    let days: Vec<NaiveDate> = engine
        .list(&alice, None)
        .await
        .unwrap()
        .iter()
        .map(|e| e.occurred_on)
        .collect();
    // After clamping to Feb 29 the anchor's day-of-month becomes 29.
    assert_eq!(
        days,
        vec![date(2024, 2, 29), date(2024, 3, 29), date(2024, 4, 29)]
    );
}

#[tokio::test]
async fn rules_with_nothing_due_materialize_nothing() {
    let engine = engine_with_db().await;
    let alice = registered(&engine, "alice").await;

    engine
        .add_rule(
            &alice,
            TransactionKind::Expense,
            Frequency::Weekly,
            MoneyCents::new(5_00),
            "Transport",
            date(2024, 6, 1),
        )
        .await
        .unwrap();

    // Today is before the first occurrence (anchor + 7 days).
    assert_eq!(engine.catch_up(&alice, date(2024, 6, 7)).await.unwrap(), 0);
    assert!(engine.list(&alice, None).await.unwrap().is_empty());

    // The day the occurrence falls due, it materializes.
    assert_eq!(engine.catch_up(&alice, date(2024, 6, 8)).await.unwrap(), 1);
}

#[tokio::test]
async fn catch_up_only_touches_the_callers_rules() {
    let engine = engine_with_db().await;
    let alice = registered(&engine, "alice").await;
    let bob = registered(&engine, "bob").await;

    engine
        .add_rule(
            &alice,
            TransactionKind::Expense,
            Frequency::Weekly,
            MoneyCents::new(20_00),
            "Subscription",
            date(2024, 1, 1),
        )
        .await
        .unwrap();

    // Bob catching up does not advance alice's rules.
    assert_eq!(engine.catch_up(&bob, date(2024, 2, 1)).await.unwrap(), 0);
    assert!(engine.list(&alice, None).await.unwrap().is_empty());

    let rules = engine.list_rules(&alice).await.unwrap();
    assert_eq!(rules[0].last_materialized, date(2024, 1, 1));
}

#[tokio::test]
async fn add_rule_rejects_non_positive_amounts() {
    let engine = engine_with_db().await;
    let alice = registered(&engine, "alice").await;

    let err = engine
        .add_rule(
            &alice,
            TransactionKind::Expense,
            Frequency::Monthly,
            MoneyCents::ZERO,
            "Rent",
            date(2024, 1, 1),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert!(engine.list_rules(&alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn materialized_entries_count_toward_balances() {
    let engine = engine_with_db().await;
    let alice = registered(&engine, "alice").await;

    engine
        .add_rule(
            &alice,
            TransactionKind::Income,
            Frequency::Monthly,
            MoneyCents::new(1000_00),
            "Salary",
            date(2024, 1, 1),
        )
        .await
        .unwrap();
    engine
        .add_rule(
            &alice,
            TransactionKind::Expense,
            Frequency::Weekly,
            MoneyCents::new(20_00),
            "Subscription",
            date(2024, 1, 1),
        )
        .await
        .unwrap();

    engine.catch_up(&alice, date(2024, 2, 1)).await.unwrap();

    // One salary (Feb 1) and four subscription hits (Jan 8/15/22/29).
    let totals = engine.statistics(&alice).await.unwrap();
    assert_eq!(totals.income, MoneyCents::new(1000_00));
    assert_eq!(totals.expenses, MoneyCents::new(80_00));
    assert_eq!(totals.balance, MoneyCents::new(920_00));
    assert_eq!(
        engine.balance_of(&alice).await.unwrap(),
        totals.balance
    );

    let subs = engine.list(&alice, Some("Subscription")).await.unwrap();
    assert_eq!(subs.len(), 4);
}
