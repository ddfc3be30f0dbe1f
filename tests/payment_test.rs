use bigdecimal::BigDecimal;
use reqwest::StatusCode;

use fingerpays_core::client::ClientError;

mod common;

fn api_error(err: ClientError) -> (StatusCode, serde_json::Value) {
    match err {
        ClientError::Api { status, detail, .. } => (status, detail),
        other => panic!("expected API error, got {:?}", other),
    }
}

fn decimal_field(detail: &serde_json::Value, field: &str) -> BigDecimal {
    detail[field]
        .as_str()
        .unwrap_or_else(|| panic!("missing {} in error detail", field))
        .parse()
        .unwrap()
}

#[tokio::test]
async fn test_payment_debits_wallet_and_records_ledger_entry() {
    let mut app = common::spawn_app().await;
    let (_user_id, token) = app.register_user().await;
    let client = app.client(&token);

    client.wallet().await.unwrap();
    client
        .recharge(BigDecimal::from(2000), "upi", None)
        .await
        .unwrap();
    app.settle_now().await;

    let response = client
        .payment(
            BigDecimal::from(45),
            Some("Campus Cafeteria"),
            Some("Lunch payment"),
            None,
        )
        .await
        .unwrap();
    assert!(response.success);

    // The debit and the ledger row land together.
    let wallet = client.wallet().await.unwrap();
    assert_eq!(wallet.balance, BigDecimal::from(1955));
    assert_eq!(wallet.total_spent, BigDecimal::from(45));
    assert_eq!(wallet.monthly_spent, BigDecimal::from(45));

    let transactions = client.transactions(1, 20, Some("payment")).await.unwrap();
    assert_eq!(transactions.len(), 1);
    let tx = &transactions[0];
    assert_eq!(tx.id, response.transaction_id);
    assert_eq!(tx.amount, BigDecimal::from(45));
    assert_eq!(tx.status, "completed");
    assert_eq!(tx.merchant_name.as_deref(), Some("Campus Cafeteria"));
    assert_eq!(tx.description.as_deref(), Some("Lunch payment"));
    assert!(tx.reference_id.as_deref().unwrap().starts_with("PAY_"));
}

#[tokio::test]
async fn test_payment_rejected_on_insufficient_balance() {
    let mut app = common::spawn_app().await;
    let (user_id, token) = app.register_user().await;
    let client = app.client(&token);

    client.wallet().await.unwrap();

    let err = client
        .payment(BigDecimal::from(100), Some("Bookstore"), None, None)
        .await
        .unwrap_err();

    let (status, detail) = api_error(err);
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(decimal_field(&detail, "current_balance"), BigDecimal::from(0));
    assert_eq!(
        decimal_field(&detail, "required_amount"),
        BigDecimal::from(100)
    );

    assert_eq!(app.count_transactions(user_id).await, 0);
}

#[tokio::test]
async fn test_payment_rejected_when_daily_limit_would_be_exceeded() {
    let mut app = common::spawn_app().await;
    let (user_id, token) = app.register_user().await;
    let client = app.client(&token);

    client.wallet().await.unwrap();
    app.set_balance(user_id, 5000).await;

    client
        .payment(BigDecimal::from(1900), Some("Hostel Mess"), None, None)
        .await
        .unwrap();

    let err = client
        .payment(BigDecimal::from(200), Some("Bookstore"), None, None)
        .await
        .unwrap_err();

    let (status, detail) = api_error(err);
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(decimal_field(&detail, "today_spent"), BigDecimal::from(1900));
    assert_eq!(decimal_field(&detail, "daily_limit"), BigDecimal::from(2000));
    assert_eq!(
        decimal_field(&detail, "remaining_limit"),
        BigDecimal::from(100)
    );

    // Only the first payment went through.
    assert_eq!(app.count_transactions(user_id).await, 1);
    let wallet = client.wallet().await.unwrap();
    assert_eq!(wallet.balance, BigDecimal::from(3100));
}

#[tokio::test]
async fn test_payment_rejects_non_positive_amounts() {
    let mut app = common::spawn_app().await;
    let (user_id, token) = app.register_user().await;
    let client = app.client(&token);

    client.wallet().await.unwrap();

    for amount in [0, -5] {
        let err = client
            .payment(BigDecimal::from(amount), None, None, None)
            .await
            .unwrap_err();
        let (status, _) = api_error(err);
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    assert_eq!(app.count_transactions(user_id).await, 0);
}

#[tokio::test]
async fn test_payment_without_wallet_is_not_found() {
    let mut app = common::spawn_app().await;
    let (_user_id, token) = app.register_user().await;
    let client = app.client(&token);

    let err = client
        .payment(BigDecimal::from(50), None, None, None)
        .await
        .unwrap_err();

    let (status, _) = api_error(err);
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_payment_defaults_merchant_and_description() {
    let mut app = common::spawn_app().await;
    let (user_id, token) = app.register_user().await;
    let client = app.client(&token);

    client.wallet().await.unwrap();
    app.set_balance(user_id, 500).await;

    client
        .payment(BigDecimal::from(50), None, None, None)
        .await
        .unwrap();

    let transactions = client.transactions(1, 20, Some("payment")).await.unwrap();
    assert_eq!(transactions[0].merchant_name.as_deref(), Some("Unknown Merchant"));
    assert_eq!(
        transactions[0].description.as_deref(),
        Some("Payment transaction")
    );
}
