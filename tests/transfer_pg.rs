//! Transfer engine against a live PostgreSQL.
//!
//! Run with `TEST_DATABASE_URL=... cargo test -- --ignored`.

mod common;

use std::sync::Arc;

use common::*;
use funds_ledger::{LedgerError, TransferEngine};

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_transfer_moves_funds_and_records_row() {
    let db = setup_db().await;
    let (a, _) = create_account(&db, "a", money("100.00")).await;
    let (b, _) = create_account(&db, "b", money("50.00")).await;
    let engine = TransferEngine::new(db.pool().clone());

    let transfer = engine.transfer(a, b, money("40.00")).await.unwrap();

    assert_eq!(transfer.origin_id, a);
    assert_eq!(transfer.destination_id, b);
    assert_eq!(transfer.amount, money("40.00"));
    assert!(transfer.id > 0);
    assert_eq!(balance_of(&db, a).await, money("60.00"));
    assert_eq!(balance_of(&db, b).await, money("90.00"));

    let stored = sqlx::query_as::<_, funds_ledger::Transfer>(
        "SELECT id, origin_id, destination_id, amount, created_at FROM transfers WHERE id = $1",
    )
    .bind(transfer.id)
    .fetch_one(db.pool())
    .await
    .unwrap();
    assert_eq!(stored, transfer);
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_insufficient_funds_changes_nothing() {
    let db = setup_db().await;
    let (a, _) = create_account(&db, "a", money("10.00")).await;
    let (b, _) = create_account(&db, "b", money("0")).await;
    let engine = TransferEngine::new(db.pool().clone());

    let result = engine.transfer(a, b, money("10.01")).await;

    assert_eq!(result, Err(LedgerError::InsufficientFunds));
    assert_eq!(balance_of(&db, a).await, money("10.00"));
    assert_eq!(balance_of(&db, b).await, money("0"));
    assert_eq!(transfer_count(&db, a).await, 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_exact_balance_can_be_sent() {
    let db = setup_db().await;
    let (a, _) = create_account(&db, "a", money("10.00")).await;
    let (b, _) = create_account(&db, "b", money("0")).await;
    let engine = TransferEngine::new(db.pool().clone());

    engine.transfer(a, b, money("10.00")).await.unwrap();

    assert_eq!(balance_of(&db, a).await, money("0"));
    assert_eq!(balance_of(&db, b).await, money("10.00"));
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_missing_destination_rolls_back() {
    let db = setup_db().await;
    let (a, _) = create_account(&db, "a", money("10.00")).await;
    let engine = TransferEngine::new(db.pool().clone());

    let result = engine.transfer(a, MISSING_ACCOUNT, money("1.00")).await;

    assert_eq!(result, Err(LedgerError::NoDestinationAccount));
    assert_eq!(balance_of(&db, a).await, money("10.00"));
    assert_eq!(transfer_count(&db, a).await, 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_missing_origin_reported_first() {
    let db = setup_db().await;
    let (b, _) = create_account(&db, "b", money("10.00")).await;
    let engine = TransferEngine::new(db.pool().clone());

    assert_eq!(
        engine.transfer(MISSING_ACCOUNT, b, money("1.00")).await,
        Err(LedgerError::NoOriginAccount)
    );
    // Both absent: origin wins
    assert_eq!(
        engine
            .transfer(MISSING_ACCOUNT, MISSING_ACCOUNT - 1, money("1.00"))
            .await,
        Err(LedgerError::NoOriginAccount)
    );
    assert_eq!(balance_of(&db, b).await, money("10.00"));
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_destination_overflow_rejected() {
    let db = setup_db().await;
    let (a, _) = create_account(&db, "a", money("10.00")).await;
    let (b, _) = create_account(&db, "b", money("21474836.00")).await;
    let engine = TransferEngine::new(db.pool().clone());

    let result = engine.transfer(a, b, money("1.00")).await;

    assert_eq!(result, Err(LedgerError::AmountTooLarge));
    assert_eq!(balance_of(&db, a).await, money("10.00"));
    assert_eq!(balance_of(&db, b).await, money("21474836.00"));
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_concurrent_transfers_serialize() {
    let db = setup_db().await;
    let (a, _) = create_account(&db, "a", money("100.00")).await;
    let (b, _) = create_account(&db, "b", money("0")).await;
    let engine = Arc::new(TransferEngine::new(db.pool().clone()));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.transfer(a, b, money("10.00")).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(balance_of(&db, a).await, money("0"));
    assert_eq!(balance_of(&db, b).await, money("100.00"));
    assert_eq!(transfer_count(&db, a).await, 10);
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_two_debits_race_for_one_balance() {
    let db = setup_db().await;
    let (x, _) = create_account(&db, "x", money("10.00")).await;
    let (y, _) = create_account(&db, "y", money("0")).await;
    let (z, _) = create_account(&db, "z", money("0")).await;
    let engine = TransferEngine::new(db.pool().clone());

    let (first, second) = tokio::join!(
        engine.transfer(x, y, money("6.00")),
        engine.transfer(x, z, money("6.00")),
    );

    let mut outcomes = [first.is_ok(), second.is_ok()];
    outcomes.sort();
    assert_eq!(outcomes, [false, true]);
    let failure = first.err().or(second.err()).unwrap();
    assert_eq!(failure, LedgerError::InsufficientFunds);
    assert_eq!(balance_of(&db, x).await, money("4.00"));
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_concurrent_overdraw_admits_exactly_available() {
    let db = setup_db().await;
    let (a, _) = create_account(&db, "a", money("50.00")).await;
    let (b, _) = create_account(&db, "b", money("0")).await;
    let engine = Arc::new(TransferEngine::new(db.pool().clone()));

    let handles: Vec<_> = (0..100)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.transfer(a, b, money("1.00")).await })
        })
        .collect();

    let mut committed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => committed += 1,
            Err(e) => assert_eq!(e, LedgerError::InsufficientFunds),
        }
    }

    assert_eq!(committed, 50);
    assert_eq!(balance_of(&db, a).await, money("0"));
    assert_eq!(balance_of(&db, b).await, money("50.00"));
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_opposing_transfers_do_not_deadlock() {
    let db = setup_db().await;
    let (a, _) = create_account(&db, "a", money("100.00")).await;
    let (b, _) = create_account(&db, "b", money("100.00")).await;
    let engine = Arc::new(TransferEngine::new(db.pool().clone()));

    let handles: Vec<_> = (0..40)
        .map(|i| {
            let engine = engine.clone();
            let (from, to) = if i % 2 == 0 { (a, b) } else { (b, a) };
            tokio::spawn(async move { engine.transfer(from, to, money("1.00")).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let total = balance_of(&db, a).await.cents() + balance_of(&db, b).await.cents();
    assert_eq!(total, money("200.00").cents());
    assert_eq!(balance_of(&db, a).await, money("100.00"));
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_login_credentials_lookup() {
    use funds_ledger::account::{AccountRepository, Cpf};

    let db = setup_db().await;
    let (a, cpf) = create_account(&db, "hunter2", money("5.00")).await;

    let cpf = Cpf::new(&cpf).unwrap();
    let credentials = AccountRepository::find_credentials(db.pool(), &cpf)
        .await
        .unwrap()
        .expect("account exists");

    assert_eq!(credentials.id, a);
    assert!(credentials.verify("hunter2"));
    assert!(!credentials.verify("hunter3"));
}
