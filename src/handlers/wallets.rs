//! # Wallet API Handlers
//!
//! Handlers for the token wallet: balance reads for the UI and the credit
//! endpoint called by the billing collaborator after a confirmed purchase.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, validation_error};
use crate::ledger::TokenLedger;
use crate::server::AppState;

/// Wallet snapshot response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WalletInfo {
    /// Shop the wallet belongs to
    pub shop_id: String,
    /// Current spendable balance
    pub balance: i64,
    /// Lifetime tokens credited via purchases
    pub total_purchased: i64,
    /// Lifetime tokens debited for usage
    pub total_used: i64,
}

/// Credit request issued by the billing collaborator after a confirmed
/// purchase
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreditRequest {
    /// Tokens to credit
    #[schema(example = 1000)]
    pub amount: i64,
    /// Billing-provider charge reference
    #[schema(example = "gid://billing/AppPurchaseOneTime/12345")]
    pub charge_ref: Option<String>,
    /// Amount paid in currency
    #[schema(example = 9.99)]
    pub amount_paid: Option<f64>,
}

/// Read the wallet for a shop; shops without a wallet report zero balances
#[utoipa::path(
    get,
    path = "/shops/{shop_id}/wallet",
    params(
        ("shop_id" = Uuid, Path, description = "Shop ID")
    ),
    responses(
        (status = 200, description = "Wallet snapshot", body = WalletInfo),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "wallets"
)]
pub async fn get_wallet(
    State(state): State<AppState>,
    Path(shop_id): Path<Uuid>,
) -> Result<Json<WalletInfo>, ApiError> {
    let ledger = TokenLedger::new(state.db.clone());
    let wallet = ledger.get_wallet(shop_id).await?;

    let info = match wallet {
        Some(wallet) => WalletInfo {
            shop_id: shop_id.to_string(),
            balance: wallet.balance,
            total_purchased: wallet.total_purchased,
            total_used: wallet.total_used,
        },
        None => WalletInfo {
            shop_id: shop_id.to_string(),
            balance: 0,
            total_purchased: 0,
            total_used: 0,
        },
    };

    Ok(Json(info))
}

/// Credit purchased tokens to a shop's wallet, creating it on first use
#[utoipa::path(
    post,
    path = "/shops/{shop_id}/wallet/credit",
    params(
        ("shop_id" = Uuid, Path, description = "Shop ID")
    ),
    request_body = CreditRequest,
    responses(
        (status = 200, description = "Updated wallet snapshot", body = WalletInfo),
        (status = 400, description = "Invalid credit request", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "wallets"
)]
pub async fn credit_wallet(
    State(state): State<AppState>,
    Path(shop_id): Path<Uuid>,
    Json(request): Json<CreditRequest>,
) -> Result<Json<WalletInfo>, ApiError> {
    if request.amount <= 0 {
        return Err(validation_error(
            "Invalid credit request",
            serde_json::json!({
                "amount": "Must be a positive number of tokens"
            }),
        ));
    }

    let ledger = TokenLedger::new(state.db.clone());
    ledger
        .credit(shop_id, request.amount, request.charge_ref, request.amount_paid)
        .await?;

    let wallet = ledger
        .get_wallet(shop_id)
        .await?
        .ok_or_else(|| ApiError::from(sea_orm::DbErr::RecordNotFound("token wallet".to_string())))?;

    Ok(Json(WalletInfo {
        shop_id: shop_id.to_string(),
        balance: wallet.balance,
        total_purchased: wallet.total_purchased,
        total_used: wallet.total_used,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{AppState, create_app};
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn setup_test_app() -> (AppState, DatabaseConnection, Uuid) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        Migrator::up(&db, None).await.expect("migrations");

        let now = Utc::now().fixed_offset();
        let shop_id = Uuid::new_v4();
        crate::models::shop::ActiveModel {
            id: Set(shop_id),
            domain: Set(format!("{}.example.com", shop_id)),
            name: Set(None),
            created_at: Set(now),
        }
        .insert(&db)
        .await
        .expect("insert shop");

        let state = AppState { db: db.clone() };
        (state, db, shop_id)
    }

    fn credit_request(shop_id: Uuid, amount: i64) -> Request<Body> {
        let body = serde_json::json!({
            "amount": amount,
            "charge_ref": "charge-123",
            "amount_paid": 9.99,
        });

        Request::builder()
            .method("POST")
            .uri(format!("/shops/{}/wallet/credit", shop_id))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_wallet_defaults_to_zero_balances() {
        let (state, _db, shop_id) = setup_test_app().await;
        let app = create_app(state);

        let request = Request::builder()
            .method("GET")
            .uri(format!("/shops/{}/wallet", shop_id))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let wallet: WalletInfo = serde_json::from_slice(&body).unwrap();

        assert_eq!(wallet.balance, 0);
        assert_eq!(wallet.total_purchased, 0);
        assert_eq!(wallet.total_used, 0);
    }

    #[tokio::test]
    async fn test_credit_creates_wallet_and_updates_balance() {
        let (state, _db, shop_id) = setup_test_app().await;
        let app = create_app(state);

        let response = app
            .clone()
            .oneshot(credit_request(shop_id, 500))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let wallet: WalletInfo = serde_json::from_slice(&body).unwrap();

        assert_eq!(wallet.balance, 500);
        assert_eq!(wallet.total_purchased, 500);
        assert_eq!(wallet.total_used, 0);

        // A second credit accumulates
        let response = app.oneshot(credit_request(shop_id, 250)).await.unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let wallet: WalletInfo = serde_json::from_slice(&body).unwrap();

        assert_eq!(wallet.balance, 750);
        assert_eq!(wallet.total_purchased, 750);
    }

    #[tokio::test]
    async fn test_credit_rejects_non_positive_amount() {
        let (state, _db, shop_id) = setup_test_app().await;
        let app = create_app(state);

        let response = app.oneshot(credit_request(shop_id, 0)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["code"], "VALIDATION_FAILED");
    }
}
