use chrono::{Duration, Utc};
use serde_json::json;

use crate::common::{TestApp, routes};

mod creation {
    use super::*;

    #[tokio::test]
    async fn business_user_creates_a_competition() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        let business = app.create_user("acme", "business").await;
        let category_id = app.create_category(&admin, "Photography").await;

        let body = app
            .create_competition(&business, "Photo Contest", "standard", category_id)
            .await;

        assert_eq!(body["status"], "upcoming");
        assert_eq!(body["kind"], "standard");
        let short_id = body["short_id"].as_str().unwrap();
        assert!(short_id.len() >= 3);
    }

    #[tokio::test]
    async fn individual_cannot_create_competitions() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        let user = app.create_user("maria", "individual").await;
        let category_id = app.create_category(&admin, "Photography").await;

        let res = app
            .post_with_token(
                routes::COMPETITIONS,
                &json!({
                    "title": "Not Allowed",
                    "description": "nope",
                    "kind": "standard",
                    "category_id": category_id,
                    "end_date": Utc::now() + Duration::days(7),
                }),
                &user,
            )
            .await;

        assert_eq!(res.status, 403);
        assert!(
            res.body["message"]
                .as_str()
                .unwrap()
                .contains("business or admin")
        );
    }

    #[tokio::test]
    async fn titles_are_globally_unique() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        let business = app.create_user("acme", "business").await;
        let category_id = app.create_category(&admin, "Photography").await;

        app.create_competition(&business, "Photo Contest", "standard", category_id)
            .await;

        let res = app
            .post_with_token(
                routes::COMPETITIONS,
                &json!({
                    "title": "Photo Contest",
                    "description": "same title",
                    "kind": "standard",
                    "category_id": category_id,
                    "end_date": Utc::now() + Duration::days(7),
                }),
                &business,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn custom_short_ids_are_validated_and_unique() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        let business = app.create_user("acme", "business").await;
        let category_id = app.create_category(&admin, "Photography").await;

        let make = |title: &str, slug: &str| {
            json!({
                "title": title,
                "description": "d",
                "kind": "standard",
                "category_id": category_id,
                "end_date": Utc::now() + Duration::days(7),
                "short_id": slug,
            })
        };

        let ok = app
            .post_with_token(routes::COMPETITIONS, &make("First", "summer-2026"), &business)
            .await;
        assert_eq!(ok.status, 201);

        let taken = app
            .post_with_token(routes::COMPETITIONS, &make("Second", "summer-2026"), &business)
            .await;
        assert_eq!(taken.status, 409);

        // All-digit slugs would be ambiguous with numeric ids.
        let numeric = app
            .post_with_token(routes::COMPETITIONS, &make("Third", "12345"), &business)
            .await;
        assert_eq!(numeric.status, 400);

        let bad = app
            .post_with_token(routes::COMPETITIONS, &make("Fourth", "Has Spaces"), &business)
            .await;
        assert_eq!(bad.status, 400);
    }

    #[tokio::test]
    async fn past_end_date_is_rejected_at_creation() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        let business = app.create_user("acme", "business").await;
        let category_id = app.create_category(&admin, "Photography").await;

        let res = app
            .post_with_token(
                routes::COMPETITIONS,
                &json!({
                    "title": "Yesterday's Contest",
                    "description": "d",
                    "kind": "standard",
                    "category_id": category_id,
                    "end_date": Utc::now() - Duration::days(1),
                }),
                &business,
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn missing_category_is_not_found() {
        let app = TestApp::spawn().await;
        let business = app.create_user("acme", "business").await;

        let res = app
            .post_with_token(
                routes::COMPETITIONS,
                &json!({
                    "title": "No Category",
                    "description": "d",
                    "kind": "standard",
                    "category_id": 9999,
                    "end_date": Utc::now() + Duration::days(7),
                }),
                &business,
            )
            .await;

        assert_eq!(res.status, 404);
    }
}

mod lookup {
    use super::*;

    #[tokio::test]
    async fn competitions_resolve_by_id_and_short_id() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        let business = app.create_user("acme", "business").await;
        let category_id = app.create_category(&admin, "Photography").await;
        let body = app
            .create_competition(&business, "Photo Contest", "standard", category_id)
            .await;

        let id = body["id"].as_i64().unwrap();
        let short_id = body["short_id"].as_str().unwrap();

        let by_id = app
            .get_with_token(&routes::competition(&id.to_string()), &business)
            .await;
        assert_eq!(by_id.status, 200);

        let by_slug = app.get_with_token(&routes::competition(short_id), &business).await;
        assert_eq!(by_slug.status, 200);
        assert_eq!(by_id.body["id"], by_slug.body["id"]);

        let missing = app
            .get_with_token(&routes::competition("does-not-exist"), &business)
            .await;
        assert_eq!(missing.status, 404);
    }

    #[tokio::test]
    async fn listing_filters_by_status() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        let business = app.create_user("acme", "business").await;
        let category_id = app.create_category(&admin, "Photography").await;

        let first = app
            .create_competition(&business, "First", "standard", category_id)
            .await;
        app.create_competition(&business, "Second", "standard", category_id)
            .await;
        let short_id = first["short_id"].as_str().unwrap();
        app.set_status(&business, short_id, "open").await;

        let open = app
            .get_with_token(&format!("{}?status=open", routes::COMPETITIONS), &business)
            .await;
        assert_eq!(open.status, 200);
        assert_eq!(open.body["data"].as_array().unwrap().len(), 1);
        assert_eq!(open.body["data"][0]["title"], "First");
        assert_eq!(open.body["pagination"]["total"], 1);
    }
}

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn creator_walks_the_status_progression() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        let business = app.create_user("acme", "business").await;
        let category_id = app.create_category(&admin, "Photography").await;
        let body = app
            .create_competition(&business, "Photo Contest", "standard", category_id)
            .await;
        let short_id = body["short_id"].as_str().unwrap();

        for status in ["open", "voting", "closed"] {
            app.set_status(&business, short_id, status).await;
            let res = app.get_with_token(&routes::competition(short_id), &business).await;
            assert_eq!(res.body["status"], status);
        }
    }

    #[tokio::test]
    async fn unknown_status_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        let business = app.create_user("acme", "business").await;
        let category_id = app.create_category(&admin, "Photography").await;
        let body = app
            .create_competition(&business, "Photo Contest", "standard", category_id)
            .await;
        let short_id = body["short_id"].as_str().unwrap();

        let res = app
            .patch_with_token(
                &routes::competition(short_id),
                &json!({"status": "archived"}),
                &business,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn only_creator_or_admin_may_update() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        let business = app.create_user("acme", "business").await;
        let stranger = app.create_user("other_biz", "business").await;
        let category_id = app.create_category(&admin, "Photography").await;
        let body = app
            .create_competition(&business, "Photo Contest", "standard", category_id)
            .await;
        let short_id = body["short_id"].as_str().unwrap();

        let res = app
            .patch_with_token(
                &routes::competition(short_id),
                &json!({"status": "open"}),
                &stranger,
            )
            .await;
        assert_eq!(res.status, 403);

        // Admin override works.
        let res = app
            .patch_with_token(
                &routes::competition(short_id),
                &json!({"status": "open"}),
                &admin,
            )
            .await;
        assert_eq!(res.status, 200);
    }

    #[tokio::test]
    async fn past_end_date_allowed_only_toward_voting_or_closed() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        let business = app.create_user("acme", "business").await;
        let category_id = app.create_category(&admin, "Photography").await;
        let body = app
            .create_competition(&business, "Photo Contest", "standard", category_id)
            .await;
        let short_id = body["short_id"].as_str().unwrap();
        let yesterday = Utc::now() - Duration::days(1);

        // Still upcoming: past end date rejected.
        let res = app
            .patch_with_token(
                &routes::competition(short_id),
                &json!({"end_date": yesterday}),
                &business,
            )
            .await;
        assert_eq!(res.status, 400);

        // Moving to closed in the same update: allowed to reflect reality.
        let res = app
            .patch_with_token(
                &routes::competition(short_id),
                &json!({"end_date": yesterday, "status": "closed"}),
                &business,
            )
            .await;
        assert_eq!(res.status, 200, "{:?}", res.body);
        assert_eq!(res.body["status"], "closed");
    }

    #[tokio::test]
    async fn business_creator_cannot_change_kind_away_from_business() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        let business = app.create_user("acme", "business").await;
        let category_id = app.create_category(&admin, "Photography").await;
        let body = app
            .create_competition(&business, "B2B Contest", "business", category_id)
            .await;
        let short_id = body["short_id"].as_str().unwrap();

        let res = app
            .patch_with_token(
                &routes::competition(short_id),
                &json!({"kind": "standard"}),
                &business,
            )
            .await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");

        // Admin retains the override.
        let res = app
            .patch_with_token(
                &routes::competition(short_id),
                &json!({"kind": "standard"}),
                &admin,
            )
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["kind"], "standard");
    }
}
