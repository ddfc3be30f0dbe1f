use reqwest::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn test_profile_lifecycle() {
    let mut app = common::spawn_app().await;
    let (_user_id, token) = app.register_user().await;
    let http = reqwest::Client::new();
    let bearer = format!("Bearer {}", token);

    // No profile yet.
    let response = http
        .get(format!("{}/profile", app.base_url))
        .header("Authorization", &bearer)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // First write creates the profile.
    let response = http
        .post(format!("{}/profile", app.base_url))
        .header("Authorization", &bearer)
        .json(&json!({
            "full_name": "Priya Sharma",
            "branch": "Computer Science",
            "year_of_study": 2
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["profile"]["full_name"], "Priya Sharma");
    assert_eq!(body["profile"]["year_of_study"], 2);
    assert_eq!(body["profile"]["is_verified"], false);

    // Partial update: untouched fields keep their values.
    let response = http
        .post(format!("{}/profile", app.base_url))
        .header("Authorization", &bearer)
        .json(&json!({ "phone": "9876543210" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["profile"]["full_name"], "Priya Sharma");
    assert_eq!(body["profile"]["phone"], "9876543210");
}

#[tokio::test]
async fn test_profile_rejects_out_of_range_year() {
    let mut app = common::spawn_app().await;
    let (_user_id, token) = app.register_user().await;

    let response = reqwest::Client::new()
        .post(format!("{}/profile", app.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "year_of_study": 9 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
