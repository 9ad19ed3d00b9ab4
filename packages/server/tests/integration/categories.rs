use serde_json::json;

use crate::common::{TestApp, routes};

mod category_crud {
    use super::*;

    #[tokio::test]
    async fn admin_creates_and_lists_categories() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;

        app.create_category(&admin, "Photography").await;
        app.create_category(&admin, "Design").await;

        let res = app.get_with_token(routes::CATEGORIES, &admin).await;
        assert_eq!(res.status, 200);
        let names: Vec<&str> = res.body.as_array().unwrap().iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Design", "Photography"]);
    }

    #[tokio::test]
    async fn non_admin_cannot_create_categories() {
        let app = TestApp::spawn().await;
        let user = app.create_user("maria", "individual").await;

        let res = app
            .post_with_token(
                routes::CATEGORIES,
                &json!({"name": "Sneaky", "description": ""}),
                &user,
            )
            .await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn duplicate_name_conflicts_case_insensitively() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        app.create_category(&admin, "Photography").await;

        let res = app
            .post_with_token(
                routes::CATEGORIES,
                &json!({"name": "pHoToGrApHy", "description": ""}),
                &admin,
            )
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn referenced_category_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        let business = app.create_user("acme", "business").await;
        let category_id = app.create_category(&admin, "Photography").await;
        app.create_competition(&business, "Photo Contest", "standard", category_id)
            .await;

        let res = app
            .delete_with_token(&routes::category(category_id), &admin)
            .await;
        assert_eq!(res.status, 409);

        // An unreferenced category deletes fine.
        let other_id = app.create_category(&admin, "Design").await;
        let res = app.delete_with_token(&routes::category(other_id), &admin).await;
        assert_eq!(res.status, 204);
    }
}

mod suggestions {
    use super::*;

    async fn suggest(app: &TestApp, token: &str, name: &str) -> i64 {
        let res = app
            .post_with_token(
                routes::SUGGESTIONS,
                &json!({"category_name": name, "reason": "would be nice"}),
                token,
            )
            .await;
        assert_eq!(res.status, 201, "{:?}", res.body);
        assert_eq!(res.body["status"], "pending_review");
        res.body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn approval_materializes_a_category() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        let user = app.create_user("maria", "individual").await;

        let id = suggest(&app, &user, "Street Art").await;
        let res = app
            .post_with_token(&routes::suggestion_approve(id), &json!({}), &admin)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["suggestion"]["status"], "approved");
        assert_eq!(res.body["created_category"]["name"], "Street Art");

        let list = app.get_with_token(routes::CATEGORIES, &user).await;
        assert_eq!(list.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn approval_is_idempotent_against_existing_categories() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        let user = app.create_user("maria", "individual").await;
        app.create_category(&admin, "Street Art").await;

        let id = suggest(&app, &user, "street art").await;
        let res = app
            .post_with_token(&routes::suggestion_approve(id), &json!({}), &admin)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["suggestion"]["status"], "approved");
        // Case-insensitive match: no new category created.
        assert!(res.body["created_category"].is_null());

        let list = app.get_with_token(routes::CATEGORIES, &user).await;
        assert_eq!(list.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn review_is_terminal() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        let user = app.create_user("maria", "individual").await;

        let id = suggest(&app, &user, "Street Art").await;
        let first = app
            .post_with_token(&routes::suggestion_reject(id), &json!({}), &admin)
            .await;
        assert_eq!(first.status, 200);
        assert_eq!(first.body["suggestion"]["status"], "rejected");

        // No re-review path, in either direction.
        let again = app
            .post_with_token(&routes::suggestion_approve(id), &json!({}), &admin)
            .await;
        assert_eq!(again.status, 409);
        assert_eq!(again.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn listing_filters_by_status() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        let user = app.create_user("maria", "individual").await;

        let a = suggest(&app, &user, "Street Art").await;
        suggest(&app, &user, "Cooking").await;
        app.post_with_token(&routes::suggestion_reject(a), &json!({}), &admin)
            .await;

        let pending = app
            .get_with_token(
                &format!("{}?status=pending_review", routes::SUGGESTIONS),
                &admin,
            )
            .await;
        assert_eq!(pending.status, 200);
        assert_eq!(pending.body.as_array().unwrap().len(), 1);
        assert_eq!(pending.body[0]["category_name"], "Cooking");

        let bad = app
            .get_with_token(&format!("{}?status=bogus", routes::SUGGESTIONS), &admin)
            .await;
        assert_eq!(bad.status, 400);
    }
}
