use serde_json::json;

use crate::common::{TestApp, routes};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0, 1, 2, 3];

async fn user_id_of(app: &TestApp, username: &str) -> i64 {
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
    server::entity::user::Entity::find()
        .filter(server::entity::user::Column::Username.eq(username))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap()
        .id as i64
}

mod user_listing {
    use super::*;

    #[tokio::test]
    async fn admin_lists_users_with_role_filter() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        app.create_user("maria", "individual").await;
        app.create_user("acme", "business").await;

        let all = app.get_with_token(routes::USERS, &admin).await;
        assert_eq!(all.status, 200);
        assert_eq!(all.body["data"].as_array().unwrap().len(), 3);

        let businesses = app
            .get_with_token(&format!("{}?role=business", routes::USERS), &admin)
            .await;
        assert_eq!(businesses.body["data"].as_array().unwrap().len(), 1);
        assert_eq!(businesses.body["data"][0]["username"], "acme");
    }

    #[tokio::test]
    async fn non_admin_is_forbidden() {
        let app = TestApp::spawn().await;
        let user = app.create_user("maria", "individual").await;
        let res = app.get_with_token(routes::USERS, &user).await;
        assert_eq!(res.status, 403);
    }
}

mod role_changes {
    use super::*;

    #[tokio::test]
    async fn admin_changes_a_role() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        app.create_user("maria", "individual").await;
        let id = user_id_of(&app, "maria").await;

        let res = app
            .patch_with_token(&routes::admin_user(id), &json!({"role": "business"}), &admin)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["role"], "business");
    }

    #[tokio::test]
    async fn unknown_role_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        app.create_user("maria", "individual").await;
        let id = user_id_of(&app, "maria").await;

        let res = app
            .patch_with_token(&routes::admin_user(id), &json!({"role": "root"}), &admin)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn demoting_the_last_admin_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        let id = user_id_of(&app, "admin1").await;

        let res = app
            .patch_with_token(&routes::admin_user(id), &json!({"role": "individual"}), &admin)
            .await;
        assert_eq!(res.status, 409);

        // With a second admin around, demotion works.
        app.create_admin("admin2").await;
        let res = app
            .patch_with_token(&routes::admin_user(id), &json!({"role": "individual"}), &admin)
            .await;
        assert_eq!(res.status, 200);
    }
}

mod user_deletion {
    use super::*;

    #[tokio::test]
    async fn admin_cannot_delete_self() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin1").await;
        let id = user_id_of(&app, "admin1").await;

        let res = app.delete_with_token(&routes::admin_user(id), &admin).await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn one_of_several_admins_can_be_deleted() {
        let app = TestApp::spawn().await;
        let admin1 = app.create_admin("admin1").await;
        app.create_admin("admin2").await;
        let id2 = user_id_of(&app, "admin2").await;

        // Two admins: deleting one works.
        let res = app.delete_with_token(&routes::admin_user(id2), &admin1).await;
        assert_eq!(res.status, 200);

        // The remaining admin can only vanish through self-deletion, which is
        // banned, so the floor of one admin holds.
        let id1 = user_id_of(&app, "admin1").await;
        let res = app.delete_with_token(&routes::admin_user(id1), &admin1).await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn non_admin_cannot_delete_users() {
        let app = TestApp::spawn().await;
        app.create_admin("admin1").await;
        let user = app.create_user("maria", "individual").await;
        let id = user_id_of(&app, "admin1").await;

        let res = app.delete_with_token(&routes::admin_user(id), &user).await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn deleting_a_user_cascades_through_their_competitions() {
        let app = TestApp::spawn().await;
        let (admin, creator, competition) = app.open_competition("standard").await;
        let short_id = competition["short_id"].as_str().unwrap().to_string();

        // An entry by another user inside the doomed competition…
        let entrant = app.create_user("maria", "individual").await;
        let entry = app
            .submit_entry(&entrant, &short_id, "Entry", "a.png", PNG_BYTES.to_vec())
            .await;
        let doomed_submission = entry.body["id"].as_i64().unwrap();

        // …and an entry by the doomed user in someone else's competition.
        let other_creator = app.create_user("other_biz", "business").await;
        let other_category = app.create_category(&admin, "Other").await;
        let other = app
            .create_competition(&other_creator, "Other Contest", "business", other_category)
            .await;
        let other_short_id = other["short_id"].as_str().unwrap().to_string();
        app.set_status(&other_creator, &other_short_id, "open").await;
        let away_entry = app
            .submit_entry(&creator, &other_short_id, "Away", "b.png", PNG_BYTES.to_vec())
            .await;
        assert_eq!(away_entry.status, 201, "{:?}", away_entry.body);
        let away_submission = away_entry.body["id"].as_i64().unwrap();

        let creator_id = user_id_of(&app, "setup_biz").await;
        let res = app
            .delete_with_token(&routes::admin_user(creator_id), &admin)
            .await;
        assert_eq!(res.status, 200, "{:?}", res.body);
        assert_eq!(res.body["competitions_deleted"], 1);
        assert_eq!(res.body["submissions_deleted"], 2);
        assert_eq!(res.body["errors"].as_array().unwrap().len(), 0);

        // Their competition, its submissions, and their own away entry are
        // all unreachable afterwards.
        let competition_lookup = app
            .get_with_token(&routes::competition(&short_id), &admin)
            .await;
        assert_eq!(competition_lookup.status, 404);
        for id in [doomed_submission, away_submission] {
            let lookup = app.get_with_token(&routes::submission(id), &admin).await;
            assert_eq!(lookup.status, 404, "submission {id} survived");
        }

        // Login for the deleted account no longer works.
        let login = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "setup_biz", "password": "pass12345"}),
            )
            .await;
        assert_eq!(login.status, 401);
    }

    #[tokio::test]
    async fn deleting_a_voter_keeps_counters_consistent() {
        let app = TestApp::spawn().await;
        let (admin, creator, competition) = app.open_competition("standard").await;
        let short_id = competition["short_id"].as_str().unwrap().to_string();

        let entrant = app.create_user("maria", "individual").await;
        let entry = app
            .submit_entry(&entrant, &short_id, "Entry", "a.png", PNG_BYTES.to_vec())
            .await;
        let submission_id = entry.body["id"].as_i64().unwrap();
        app.set_status(&creator, &short_id, "voting").await;

        let voter = app.create_user("jonas", "individual").await;
        let keeper = app.create_user("petra", "individual").await;
        assert_eq!(app.vote(&voter, submission_id).await.status, 200);
        assert_eq!(app.vote(&keeper, submission_id).await.status, 200);

        let voter_id = user_id_of(&app, "jonas").await;
        let res = app
            .delete_with_token(&routes::admin_user(voter_id), &admin)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["votes_deleted"], 1);

        let lookup = app
            .get_with_token(&routes::submission(submission_id), &admin)
            .await;
        assert_eq!(lookup.body["vote_count"], 1);
    }
}
