mod common;

use admin_service::domain::principal::models::SessionMode;
use auth::Claims;
use auth::Identity;
use chrono::Duration;
use chrono::Utc;
use common::clears_cookie;
use common::set_cookie;
use common::set_cookie_value;
use common::TestApp;
use common::ADMIN_EMAIL;
use common::ADMIN_PASSWORD;
use common::ADMIN_USERNAME;
use common::AUDIENCE;
use common::ISSUER;
use reqwest::header::LOCATION;
use reqwest::StatusCode;
use serde_json::json;

const ACCESS: &str = "X-Access-Token";
const REFRESH: &str = "X-Refresh-Token";

#[tokio::test]
async fn test_login_seeded_admin() {
    let app = TestApp::spawn().await;

    let response = app.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let access_cookie = set_cookie(response.headers(), ACCESS).expect("Access cookie missing");
    assert!(access_cookie.contains("HttpOnly"));
    assert!(access_cookie.contains("SameSite=Lax"));
    assert!(access_cookie.contains("Path=/"));
    assert!(set_cookie_value(response.headers(), REFRESH).is_some_and(|v| !v.is_empty()));

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert_eq!(body["statusCode"], 200);
    assert_eq!(body["user"]["username"], "admin");
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
    assert_eq!(body["user"]["fullName"], "System Administrator");
    assert_eq!(body["user"]["role"], "Admin");
    assert!(body["token"].is_string());
    assert!(body["refreshToken"].is_string());

    let claims = app
        .jwt_handler
        .decode(body["token"].as_str().unwrap())
        .expect("Token should validate");
    assert_eq!(claims.sub, app.admin_id.to_string());
    assert_eq!(claims.role, "Admin");
}

#[tokio::test]
async fn test_login_by_email_ignores_case() {
    let app = TestApp::spawn().await;

    let response = app.login("ADMIN@Bacha.Local", ADMIN_PASSWORD).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;

    let wrong_password = app.login(ADMIN_USERNAME, "wrong").await;
    let unknown_user = app.login("nobody", "wrong").await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(wrong_password.headers(), ACCESS).is_none());

    let wrong_password: serde_json::Value = wrong_password.json().await.unwrap();
    let unknown_user: serde_json::Value = unknown_user.json().await.unwrap();
    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password["success"], false);
    assert_eq!(wrong_password["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/login")
        .json(&json!({ "usernameOrEmail": "" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["errors"]["usernameOrEmail"].is_string());
    assert!(body["errors"]["password"].is_string());
}

#[tokio::test]
async fn test_protected_endpoint_rejects_ajax_without_credentials() {
    let app = TestApp::spawn().await;

    let response = app
        .get_ajax("/auth/validate-session")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(LOCATION).is_none());
    assert!(clears_cookie(response.headers(), ACCESS));
    assert!(clears_cookie(response.headers(), REFRESH));
}

#[tokio::test]
async fn test_protected_endpoint_redirects_navigation_to_login() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/auth/validate-session")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/auth/login");
    assert!(clears_cookie(response.headers(), ACCESS));
    assert!(clears_cookie(response.headers(), REFRESH));
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .get_ajax("/auth/validate-session")
        .bearer_auth("not-a-token")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_validate_session_with_bearer_header() {
    let app = TestApp::spawn().await;
    let login = app.login_admin().await;

    let response = app
        .get_authenticated("/auth/validate-session", login["token"].as_str().unwrap())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Session is valid");
    assert_eq!(body["user"]["id"], app.admin_id.to_string());
    assert_eq!(body["user"]["role"], "Admin");
}

#[tokio::test]
async fn test_validate_session_with_access_cookie() {
    let app = TestApp::spawn().await;
    let login = app.login_admin().await;

    let response = app
        .get("/auth/validate-session")
        .header(
            "Cookie",
            format!("{}={}", ACCESS, login["token"].as_str().unwrap()),
        )
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_expired_access_token_is_refreshed_in_flight() {
    let app = TestApp::spawn().await;
    let login = app.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let refresh = set_cookie_value(login.headers(), REFRESH).unwrap();

    let response = app
        .get("/auth/validate-session")
        .header(
            "Cookie",
            format!("{}={}; {}={}", ACCESS, app.expired_admin_token(), REFRESH, refresh),
        )
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let rotated_access = set_cookie_value(response.headers(), ACCESS).expect("Rotated access cookie");
    let rotated_refresh =
        set_cookie_value(response.headers(), REFRESH).expect("Rotated refresh cookie");
    assert_ne!(rotated_refresh, refresh);
    assert!(app.jwt_handler.decode(&rotated_access).is_ok());

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["id"], app.admin_id.to_string());

    // The replaced refresh token no longer works
    let replay = app
        .post("/auth/refresh-token")
        .header("Cookie", format!("{}={}", REFRESH, refresh))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
    assert!(clears_cookie(replay.headers(), REFRESH));
}

#[tokio::test]
async fn test_refresh_rejects_access_token_of_another_principal() {
    let app = TestApp::spawn().await;
    let login = app.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let refresh = set_cookie_value(login.headers(), REFRESH).unwrap();

    let stranger = Identity {
        subject: uuid::Uuid::new_v4().to_string(),
        name: "stranger".to_string(),
        email: "stranger@example.com".to_string(),
        role: "Admin".to_string(),
    };
    let expired = app
        .jwt_handler
        .encode(&Claims::for_identity(
            &stranger,
            ISSUER,
            AUDIENCE,
            Utc::now() - Duration::hours(2),
            Duration::hours(1),
        ))
        .unwrap();

    let response = app
        .get_ajax("/auth/validate-session")
        .header(
            "Cookie",
            format!("{}={}; {}={}", ACCESS, expired, REFRESH, refresh),
        )
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_endpoint_rotates_tokens() {
    let app = TestApp::spawn().await;
    let login = app.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let refresh = set_cookie_value(login.headers(), REFRESH).unwrap();

    let response = app
        .post("/auth/refresh-token")
        .header("Cookie", format!("{}={}", REFRESH, refresh))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let rotated = set_cookie_value(response.headers(), REFRESH).unwrap();
    assert_ne!(rotated, refresh);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Token refreshed");
    assert!(body["token"].is_string());

    let second = app
        .post("/auth/refresh-token")
        .header("Cookie", format!("{}={}", REFRESH, rotated))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(second.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_endpoint_without_cookie() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/refresh-token")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(clears_cookie(response.headers(), ACCESS));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let app = TestApp::spawn().await;
    let login = app.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let refresh = set_cookie_value(login.headers(), REFRESH).unwrap();
    let login: serde_json::Value = login.json().await.unwrap();

    let response = app
        .post_authenticated("/auth/logout", login["token"].as_str().unwrap())
        .header("X-Requested-With", "XMLHttpRequest")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(clears_cookie(response.headers(), ACCESS));
    assert!(clears_cookie(response.headers(), REFRESH));

    let refresh_after_logout = app
        .post("/auth/refresh-token")
        .header("Cookie", format!("{}={}", REFRESH, refresh))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(refresh_after_logout.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_redirects_navigation() {
    let app = TestApp::spawn().await;
    let login = app.login_admin().await;

    let response = app
        .post_authenticated("/auth/logout", login["token"].as_str().unwrap())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/auth/login");
    assert!(clears_cookie(response.headers(), ACCESS));
}

#[tokio::test]
async fn test_public_paths_skip_authentication() {
    let app = TestApp::spawn().await;

    let home = app.get("/").send().await.expect("Failed to execute request");
    assert_eq!(home.status(), StatusCode::OK);

    // Allow-listed prefix reaches routing even though nothing is served there
    let asset = app
        .get("/css/site.css")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(asset.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_area_requires_admin_role() {
    let app = TestApp::spawn().await;

    let admin = app.login_admin().await;
    let response = app
        .get_authenticated("/admin", admin["token"].as_str().unwrap())
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let registered = app.register("nicola", "nicola@example.com", "pass_word!").await;
    let registered: serde_json::Value = registered.json().await.unwrap();
    let response = app
        .get_authenticated("/admin", registered["token"].as_str().unwrap())
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_register_signs_in_new_user() {
    let app = TestApp::spawn().await;

    let response = app.register("nicola", "nicola@example.com", "pass_word!").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie_value(response.headers(), ACCESS).is_some());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Registration successful");
    assert_eq!(body["user"]["username"], "nicola");
    assert_eq!(body["user"]["role"], "User");

    let login = app.login("nicola@example.com", "pass_word!").await;
    assert_eq!(login.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_duplicate_username_ignores_case() {
    let app = TestApp::spawn().await;

    let response = app.register("ADMIN", "other@example.com", "pass_word!").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["errors"]["username"]
        .as_str()
        .unwrap()
        .contains("already exists"));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;

    let response = app.register("someone", ADMIN_EMAIL, "pass_word!").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["errors"]["email"].is_string());
}

#[tokio::test]
async fn test_register_reports_every_invalid_field() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/register")
        .json(&json!({
            "username": "x",
            "email": "not-an-email",
            "fullName": "",
            "password": "123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid data");
    for field in ["username", "email", "fullName", "password"] {
        assert!(body["errors"][field].is_string(), "missing error for {}", field);
    }
}

#[tokio::test]
async fn test_cookie_mode_issues_single_session_cookie() {
    let app = TestApp::spawn_with_mode(SessionMode::Cookie).await;

    let response = app.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let session = set_cookie_value(response.headers(), ACCESS).expect("Session cookie missing");
    assert!(clears_cookie(response.headers(), REFRESH));
    let access_cookie = set_cookie(response.headers(), ACCESS).unwrap();
    assert!(access_cookie.contains("Max-Age=604800"));

    let claims = app.jwt_handler.decode(&session).unwrap();
    assert!(claims.exp - claims.iat >= Duration::days(7).num_seconds() - 1);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body.get("token").is_none());
    assert!(body.get("refreshToken").is_none());

    let validate = app
        .get("/auth/validate-session")
        .header("Cookie", format!("{}={}", ACCESS, session))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(validate.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_body_gets_error_envelope() {
    let app = TestApp::spawn().await;

    let not_json = app
        .post("/auth/login")
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = not_json.json().await.expect("Body should be JSON");
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 400);
    assert!(body["message"].is_string());

    let wrong_content_type = app
        .post("/auth/register")
        .header("Content-Type", "text/plain")
        .body("username=nicola")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(wrong_content_type.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = wrong_content_type
        .json()
        .await
        .expect("Body should be JSON");
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 400);
}
