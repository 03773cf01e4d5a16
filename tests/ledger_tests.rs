//! Token ledger invariant tests.
//!
//! The wallet invariants under test: balance never goes negative, every
//! transaction row satisfies balance_after == balance_before + amount, a
//! rejected debit leaves no trace, and the transaction chain reconstructs
//! the current balance exactly.

mod test_utils;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use polyglot::ledger::{LedgerError, TokenLedger, UsageMetadata};
use polyglot::models::{token_transaction, token_wallet};

use test_utils::*;

async fn wallet_for(db: &sea_orm::DatabaseConnection, shop_id: Uuid) -> token_wallet::Model {
    token_wallet::Entity::find()
        .filter(token_wallet::Column::ShopId.eq(shop_id))
        .one(db)
        .await
        .expect("query wallet")
        .expect("wallet exists")
}

async fn transactions_for(
    db: &sea_orm::DatabaseConnection,
    wallet_id: Uuid,
) -> Vec<token_transaction::Model> {
    token_transaction::Entity::find()
        .filter(token_transaction::Column::WalletId.eq(wallet_id))
        .order_by_asc(token_transaction::Column::CreatedAt)
        .all(db)
        .await
        .expect("query transactions")
}

#[tokio::test]
async fn test_credit_creates_wallet_on_first_use() {
    let db = setup_test_db().await.expect("db");
    let shop_id = create_shop(&db).await.expect("shop");
    let ledger = TokenLedger::new(db.clone());

    ledger
        .credit(shop_id, 1000, Some("charge-1".to_string()), Some(9.99))
        .await
        .expect("credit succeeds");

    let wallet = wallet_for(&db, shop_id).await;
    assert_eq!(wallet.balance, 1000);
    assert_eq!(wallet.total_purchased, 1000);
    assert_eq!(wallet.total_used, 0);

    let transactions = transactions_for(&db, wallet.id).await;
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].tx_type, "PURCHASE");
    assert_eq!(transactions[0].amount, 1000);
    assert_eq!(transactions[0].balance_before, 0);
    assert_eq!(transactions[0].balance_after, 1000);
    assert_eq!(transactions[0].charge_ref.as_deref(), Some("charge-1"));
}

#[tokio::test]
async fn test_debit_decrements_balance_and_logs_usage() {
    let db = setup_test_db().await.expect("db");
    let shop_id = create_shop(&db).await.expect("shop");
    create_wallet(&db, shop_id, 100).await.expect("wallet");
    let ledger = TokenLedger::new(db.clone());

    ledger
        .debit(
            shop_id,
            30,
            UsageMetadata {
                engine: Some("generative".to_string()),
                resource_id: None,
            },
        )
        .await
        .expect("debit succeeds");

    let wallet = wallet_for(&db, shop_id).await;
    assert_eq!(wallet.balance, 70);
    assert_eq!(wallet.total_used, 30);

    let transactions = transactions_for(&db, wallet.id).await;
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].tx_type, "USAGE");
    assert_eq!(transactions[0].amount, -30);
    assert_eq!(transactions[0].balance_before, 100);
    assert_eq!(transactions[0].balance_after, 70);
    assert_eq!(transactions[0].engine.as_deref(), Some("generative"));
}

#[tokio::test]
async fn test_rejected_debit_leaves_wallet_and_log_untouched() {
    let db = setup_test_db().await.expect("db");
    let shop_id = create_shop(&db).await.expect("shop");
    create_wallet(&db, shop_id, 40).await.expect("wallet");
    let ledger = TokenLedger::new(db.clone());

    let result = ledger.debit(shop_id, 100, UsageMetadata::default()).await;

    match result {
        Err(LedgerError::InsufficientTokens {
            required,
            available,
        }) => {
            assert_eq!(required, 100);
            assert_eq!(available, 40);
        }
        other => panic!("Expected InsufficientTokens, got {:?}", other),
    }

    let wallet = wallet_for(&db, shop_id).await;
    assert_eq!(wallet.balance, 40);
    assert_eq!(wallet.total_used, 0);
    assert!(transactions_for(&db, wallet.id).await.is_empty());
}

#[tokio::test]
async fn test_debit_without_wallet_reports_zero_available() {
    let db = setup_test_db().await.expect("db");
    let shop_id = create_shop(&db).await.expect("shop");
    let ledger = TokenLedger::new(db.clone());

    let result = ledger.debit(shop_id, 10, UsageMetadata::default()).await;

    match result {
        Err(LedgerError::InsufficientTokens {
            required,
            available,
        }) => {
            assert_eq!(required, 10);
            assert_eq!(available, 0);
        }
        other => panic!("Expected InsufficientTokens, got {:?}", other),
    }
}

#[tokio::test]
async fn test_debit_of_exact_balance_drains_wallet_to_zero() {
    let db = setup_test_db().await.expect("db");
    let shop_id = create_shop(&db).await.expect("shop");
    create_wallet(&db, shop_id, 25).await.expect("wallet");
    let ledger = TokenLedger::new(db.clone());

    ledger
        .debit(shop_id, 25, UsageMetadata::default())
        .await
        .expect("debit succeeds");

    assert_eq!(ledger.get_balance(shop_id).await.expect("balance"), 0);

    // The next debit of any size is rejected
    let result = ledger.debit(shop_id, 1, UsageMetadata::default()).await;
    assert!(matches!(
        result,
        Err(LedgerError::InsufficientTokens { .. })
    ));
}

#[tokio::test]
async fn test_non_positive_amounts_are_rejected() {
    let db = setup_test_db().await.expect("db");
    let shop_id = create_shop(&db).await.expect("shop");
    create_wallet(&db, shop_id, 100).await.expect("wallet");
    let ledger = TokenLedger::new(db.clone());

    assert!(matches!(
        ledger.debit(shop_id, 0, UsageMetadata::default()).await,
        Err(LedgerError::InvalidAmount { .. })
    ));
    assert!(matches!(
        ledger.debit(shop_id, -5, UsageMetadata::default()).await,
        Err(LedgerError::InvalidAmount { .. })
    ));
    assert!(matches!(
        ledger.credit(shop_id, 0, None, None).await,
        Err(LedgerError::InvalidAmount { .. })
    ));

    let wallet = wallet_for(&db, shop_id).await;
    assert_eq!(wallet.balance, 100);
    assert!(transactions_for(&db, wallet.id).await.is_empty());
}

/// For any interleaving of credits and debits, every row satisfies
/// balance_after == balance_before + amount, the chain reconstructs the
/// final balance, and total_purchased - total_used - balance == 0.
#[tokio::test]
async fn test_transaction_chain_reconstructs_balance() {
    let db = setup_test_db().await.expect("db");
    let shop_id = create_shop(&db).await.expect("shop");
    let ledger = TokenLedger::new(db.clone());

    ledger.credit(shop_id, 500, None, None).await.expect("credit");
    ledger
        .debit(shop_id, 120, UsageMetadata::default())
        .await
        .expect("debit");
    ledger
        .debit(shop_id, 80, UsageMetadata::default())
        .await
        .expect("debit");
    ledger.credit(shop_id, 50, None, None).await.expect("credit");
    ledger
        .debit(shop_id, 350, UsageMetadata::default())
        .await
        .expect("debit");
    // This one must bounce without corrupting the chain
    let _ = ledger.debit(shop_id, 1000, UsageMetadata::default()).await;

    let wallet = wallet_for(&db, shop_id).await;
    assert_eq!(wallet.balance, 0);
    assert_eq!(wallet.total_purchased, 550);
    assert_eq!(wallet.total_used, 550);
    assert_eq!(wallet.total_purchased - wallet.total_used - wallet.balance, 0);
    assert!(wallet.balance >= 0);

    let transactions = transactions_for(&db, wallet.id).await;
    assert_eq!(transactions.len(), 5);

    let mut replayed = 0;
    for tx in &transactions {
        assert_eq!(
            tx.balance_after,
            tx.balance_before + tx.amount,
            "transaction {} breaks the snapshot invariant",
            tx.id
        );
        assert_eq!(tx.balance_before, replayed, "chain is not contiguous");
        replayed = tx.balance_after;
    }
    assert_eq!(replayed, wallet.balance);
}

#[tokio::test]
async fn test_get_balance_is_zero_for_unknown_shop() {
    let db = setup_test_db().await.expect("db");
    let ledger = TokenLedger::new(db.clone());

    assert_eq!(
        ledger.get_balance(Uuid::new_v4()).await.expect("balance"),
        0
    );
}

#[tokio::test]
async fn test_sequential_debits_drain_exactly_to_rejection() {
    let db = setup_test_db().await.expect("db");
    let shop_id = create_shop(&db).await.expect("shop");
    create_wallet(&db, shop_id, 35).await.expect("wallet");
    let ledger = TokenLedger::new(db.clone());

    let mut successes = 0;
    for _ in 0..5 {
        match ledger.debit(shop_id, 10, UsageMetadata::default()).await {
            Ok(()) => successes += 1,
            Err(LedgerError::InsufficientTokens { .. }) => break,
            Err(other) => panic!("Unexpected error: {:?}", other),
        }
    }

    assert_eq!(successes, 3);
    assert_eq!(ledger.get_balance(shop_id).await.expect("balance"), 5);

    let wallet = wallet_for(&db, shop_id).await;
    assert_eq!(transactions_for(&db, wallet.id).await.len(), 3);
}
