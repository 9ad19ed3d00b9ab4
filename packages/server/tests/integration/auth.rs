use serde_json::json;

use crate::common::{TestApp, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn registers_individual_by_default() {
        let app = TestApp::spawn().await;
        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "maria",
                    "email": "Maria@Example.com",
                    "password": "pass12345",
                }),
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["role"], "individual");
        // Emails are stored lowercase.
        assert_eq!(res.body["email"], "maria@example.com");
    }

    #[tokio::test]
    async fn registers_business_accounts() {
        let app = TestApp::spawn().await;
        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "acme",
                    "email": "ops@acme.com",
                    "password": "pass12345",
                    "role": "business",
                }),
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["role"], "business");
    }

    #[tokio::test]
    async fn rejects_admin_self_registration() {
        let app = TestApp::spawn().await;
        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "wannabe",
                    "email": "w@example.com",
                    "password": "pass12345",
                    "role": "admin",
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_unknown_roles() {
        let app = TestApp::spawn().await;
        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "maria",
                    "email": "m@example.com",
                    "password": "pass12345",
                    "role": "moderator",
                }),
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let app = TestApp::spawn().await;
        app.create_user("maria", "individual").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "maria",
                    "email": "other@example.com",
                    "password": "pass12345",
                }),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_case_insensitively() {
        let app = TestApp::spawn().await;
        app.create_user("maria", "individual").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "maria2",
                    "email": "MARIA@example.com",
                    "password": "pass12345",
                }),
            )
            .await;

        assert_eq!(res.status, 409);
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn login_returns_token_and_role() {
        let app = TestApp::spawn().await;
        app.create_user("acme", "business").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "acme", "password": "pass12345"}),
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["role"], "business");
        assert!(res.body["token"].as_str().is_some());
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = TestApp::spawn().await;
        app.create_user("maria", "individual").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "maria", "password": "wrong-password"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn me_reflects_the_token() {
        let app = TestApp::spawn().await;
        let token = app.create_user("maria", "individual").await;

        let res = app.get_with_token(routes::ME, &token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["username"], "maria");
        assert_eq!(res.body["role"], "individual");
    }

    #[tokio::test]
    async fn me_requires_a_token() {
        let app = TestApp::spawn().await;
        let res = app
            .client
            .get(format!("http://{}{}", app.addr, routes::ME))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 401);
    }
}
