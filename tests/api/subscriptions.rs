use crate::utils::{new_browser, post_subscriptions_with, spawn_app, spawn_app_without_endpoint};
use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use rstest::*;
use std::time::Duration;
use wiremock::ResponseTemplate;

fn ok_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true }))
}

#[tokio::test]
async fn form_page_renders_the_entry_form() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.get_form().await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("set-cookie").is_some());
    let html = response.text().await.unwrap();
    assert!(html.contains(r#"type="email""#));
    assert!(html.contains("Subscribe to Newsletter"));
    assert!(html.contains("2,847 people already subscribed"));
    assert!(!html.contains("Thank you for subscribing!"));
}

#[tokio::test]
async fn subscribe_confirms_and_clears_the_email_on_success() {
    // Arrange
    let app = spawn_app().await;
    app.mock_newsletter_api(ok_response(), 1).await;

    // Act
    let response = app
        .post_subscriptions("email=user%40example.com".into())
        .await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Thank you for subscribing!"));
    assert!(html.contains("Subscribe Another Email"));

    let html = app.post_reset().await.text().await.unwrap();
    assert!(html.contains(r#"value="""#));
}

#[tokio::test]
async fn subscribe_posts_the_email_as_json_to_the_newsletter_api() {
    // Arrange
    let app = spawn_app().await;
    app.mock_newsletter_api(ok_response(), 1).await;

    // Act
    app.post_subscriptions("email=user%40example.com".into())
        .await;

    // Assert
    let requests = app.api_server().received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/subscribe");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["email"], "user@example.com");
    assert!(body["timestamp"].is_string());
}

#[rstest]
#[case(400)]
#[case(500)]
#[case(503)]
#[tokio::test]
async fn subscribe_shows_the_status_when_the_newsletter_api_fails(#[case] status: u16) {
    // Arrange
    let app = spawn_app().await;
    app.mock_newsletter_api(ResponseTemplate::new(status), 1)
        .await;

    // Act
    let html = app
        .post_subscriptions("email=bad%40example.com".into())
        .await
        .text()
        .await
        .unwrap();

    // Assert
    assert!(html.contains(&format!("HTTP error! status: {status}")));
    assert!(html.contains(r#"value="bad@example.com""#));
    assert!(html.contains("Subscribe to Newsletter"));
    assert!(!html.contains("Thank you for subscribing!"));
}

#[tokio::test]
async fn subscribe_without_endpoint_reports_a_configuration_error() {
    // Arrange
    let app = spawn_app_without_endpoint().await;

    // Act
    let html = app
        .post_subscriptions("email=user%40example.com".into())
        .await
        .text()
        .await
        .unwrap();

    // Assert
    assert!(html.contains("Newsletter API endpoint not configured"));
}

#[rstest]
#[case("", "missing email")]
#[case("email=", "empty email")]
#[tokio::test]
async fn subscribe_ignores_an_empty_email(#[case] body: String, #[case] description: String) {
    // Arrange
    let app = spawn_app().await;
    app.mock_newsletter_api(ok_response(), 0).await;

    // Act
    let response = app.post_subscriptions(body).await;

    // Assert
    assert_eq!(
        response.status(),
        StatusCode::OK,
        "The form did not render when the payload was {}.",
        description
    );
    let html = response.text().await.unwrap();
    assert!(html.contains("Subscribe to Newsletter"));
    assert!(!html.contains(r#"class="error""#));
}

#[tokio::test]
async fn subscribe_rejects_a_malformed_email_without_calling_the_api() {
    // Arrange
    let app = spawn_app().await;
    app.mock_newsletter_api(ok_response(), 0).await;

    // Act
    let html = app
        .post_subscriptions("email=definitely-not-an-email".into())
        .await
        .text()
        .await
        .unwrap();

    // Assert
    assert!(html.contains("is not a valid email address."));
}

#[tokio::test]
async fn reset_returns_to_the_entry_form_without_calling_the_api() {
    // Arrange
    let app = spawn_app().await;
    app.mock_newsletter_api(ok_response(), 1).await;
    app.post_subscriptions("email=user%40example.com".into())
        .await;

    // Act
    let response = app.post_reset().await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Subscribe to Newsletter"));
    assert!(!html.contains("Thank you for subscribing!"));
    assert!(!html.contains(r#"class="error""#));

    let html = app.get_form_html().await;
    assert!(!html.contains("Thank you for subscribing!"));
}

#[tokio::test]
async fn a_second_submit_while_loading_sends_no_extra_request() {
    // Arrange
    let app = spawn_app().await;
    app.mock_newsletter_api(ok_response().set_delay(Duration::from_millis(500)), 1)
        .await;
    // Start the session so both submissions share it.
    app.get_form().await;

    // Act
    let first = {
        let client = app.http_client().clone();
        let address = app.address().clone();
        tokio::spawn(async move {
            post_subscriptions_with(&client, &address, "email=user%40example.com".into())
                .await
                .text()
                .await
                .unwrap()
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    let second = app
        .post_subscriptions("email=user%40example.com".into())
        .await
        .text()
        .await
        .unwrap();
    let first = first.await.unwrap();

    // Assert
    assert!(second.contains("Subscribing..."));
    assert!(second.contains("disabled"));
    assert!(first.contains("Thank you for subscribing!"));
}

#[tokio::test]
async fn every_visitor_gets_their_own_form() {
    // Arrange
    let app = spawn_app().await;
    app.mock_newsletter_api(ok_response(), 1).await;
    app.post_subscriptions("email=user%40example.com".into())
        .await;

    // Act
    let other_visitor = new_browser();
    let html = other_visitor
        .get(format!("{}/", app.address()))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    // Assert
    assert!(html.contains("Subscribe to Newsletter"));
    assert!(!html.contains("Thank you for subscribing!"));
}

#[tokio::test]
async fn an_email_posted_while_confirmed_is_not_kept() {
    // Arrange
    let app = spawn_app().await;
    app.mock_newsletter_api(ok_response(), 1).await;
    app.post_subscriptions("email=user%40example.com".into())
        .await;

    // Act
    let html = app
        .post_subscriptions("email=other%40example.com".into())
        .await
        .text()
        .await
        .unwrap();
    let after_reset = app.post_reset().await.text().await.unwrap();

    // Assert
    assert!(html.contains("Thank you for subscribing!"));
    assert!(after_reset.contains(r#"value="""#));
    assert!(!after_reset.contains("other@example.com"));
}
