use crate::common::{TestApp, routes};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0, 1, 2, 3];

/// Open a competition, add one submission by `maria`, and move it to voting.
/// Returns (creator token, submission id).
async fn competition_in_voting(app: &TestApp, kind: &str) -> (String, i64) {
    let (_, creator, competition) = app.open_competition(kind).await;
    let short_id = competition["short_id"].as_str().unwrap();

    // Business competitions reserve entry to businesses.
    let submitter = if kind == "business" {
        app.create_user("entrant_biz", "business").await
    } else {
        app.create_user("maria", "individual").await
    };
    let res = app
        .submit_entry(&submitter, short_id, "Entry", "entry.png", PNG_BYTES.to_vec())
        .await;
    assert_eq!(res.status, 201, "{:?}", res.body);
    let submission_id = res.body["id"].as_i64().unwrap();

    app.set_status(&creator, short_id, "voting").await;
    (creator, submission_id)
}

mod ledger {
    use super::*;

    #[tokio::test]
    async fn vote_increments_the_count() {
        let app = TestApp::spawn().await;
        let (_, submission_id) = competition_in_voting(&app, "standard").await;
        let voter = app.create_user("jonas", "individual").await;

        let res = app.vote(&voter, submission_id).await;
        assert_eq!(res.status, 200, "{:?}", res.body);
        assert_eq!(res.body["vote_count"], 1);

        let lookup = app
            .get_with_token(&routes::submission(submission_id), &voter)
            .await;
        assert_eq!(lookup.body["vote_count"], 1);
    }

    #[tokio::test]
    async fn second_vote_by_same_user_conflicts_and_count_is_unchanged() {
        let app = TestApp::spawn().await;
        let (_, submission_id) = competition_in_voting(&app, "standard").await;
        let voter = app.create_user("jonas", "individual").await;

        assert_eq!(app.vote(&voter, submission_id).await.status, 200);

        let repeat = app.vote(&voter, submission_id).await;
        assert_eq!(repeat.status, 409);
        assert!(
            repeat.body["message"]
                .as_str()
                .unwrap()
                .contains("already voted")
        );

        let lookup = app
            .get_with_token(&routes::submission(submission_id), &voter)
            .await;
        assert_eq!(lookup.body["vote_count"], 1);
    }

    #[tokio::test]
    async fn votes_rejected_unless_voting() {
        let app = TestApp::spawn().await;
        let (_, creator, competition) = app.open_competition("standard").await;
        let short_id = competition["short_id"].as_str().unwrap();
        let submitter = app.create_user("maria", "individual").await;
        let res = app
            .submit_entry(&submitter, short_id, "Entry", "entry.png", PNG_BYTES.to_vec())
            .await;
        let submission_id = res.body["id"].as_i64().unwrap();
        let voter = app.create_user("jonas", "individual").await;

        for status in ["upcoming", "open", "closed", "pending_review"] {
            app.set_status(&creator, short_id, status).await;
            let res = app.vote(&voter, submission_id).await;
            assert_eq!(res.status, 403, "status {status}");
            assert!(
                res.body["message"].as_str().unwrap().contains(status),
                "status {status}: {:?}",
                res.body
            );
        }
    }

    #[tokio::test]
    async fn concurrent_votes_from_distinct_users_both_count() {
        let app = TestApp::spawn().await;
        let (_, submission_id) = competition_in_voting(&app, "standard").await;
        let voter_a = app.create_user("jonas", "individual").await;
        let voter_b = app.create_user("petra", "individual").await;

        let (a, b) = tokio::join!(app.vote(&voter_a, submission_id), app.vote(&voter_b, submission_id));
        assert_eq!(a.status, 200, "{:?}", a.body);
        assert_eq!(b.status, 200, "{:?}", b.body);

        let lookup = app
            .get_with_token(&routes::submission(submission_id), &voter_a)
            .await;
        assert_eq!(lookup.body["vote_count"], 2);

        // The counter matches the recorded voter set exactly.
        use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
        let vote_rows = server::entity::vote::Entity::find()
            .filter(server::entity::vote::Column::SubmissionId.eq(submission_id as i32))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(vote_rows, 2);
    }

    #[tokio::test]
    async fn missing_submission_is_not_found() {
        let app = TestApp::spawn().await;
        let voter = app.create_user("jonas", "individual").await;
        let res = app.vote(&voter, 9999).await;
        assert_eq!(res.status, 404);
    }
}

mod asymmetry {
    use super::*;

    #[tokio::test]
    async fn individual_votes_in_business_competition() {
        let app = TestApp::spawn().await;
        let (_, submission_id) = competition_in_voting(&app, "business").await;

        // Individuals cannot enter business competitions but may vote there.
        let voter = app.create_user("maria", "individual").await;
        let res = app.vote(&voter, submission_id).await;
        assert_eq!(res.status, 200, "{:?}", res.body);
        assert_eq!(res.body["vote_count"], 1);
    }

    #[tokio::test]
    async fn business_cannot_vote_in_standard_competition() {
        let app = TestApp::spawn().await;
        let (_, submission_id) = competition_in_voting(&app, "standard").await;

        let voter = app.create_user("other_biz", "business").await;
        let res = app.vote(&voter, submission_id).await;
        assert_eq!(res.status, 403);
        let message = res.body["message"].as_str().unwrap();
        assert!(message.contains("Business accounts"));
        assert!(message.contains("vote"));
    }

    #[tokio::test]
    async fn business_votes_in_business_competition() {
        let app = TestApp::spawn().await;
        let (_, submission_id) = competition_in_voting(&app, "business").await;

        let voter = app.create_user("other_biz", "business").await;
        let res = app.vote(&voter, submission_id).await;
        assert_eq!(res.status, 200);
    }

    #[tokio::test]
    async fn admin_votes_anywhere() {
        let app = TestApp::spawn().await;
        let (_, submission_id) = competition_in_voting(&app, "standard").await;

        let admin = app.create_admin("vote_admin").await;
        let res = app.vote(&admin, submission_id).await;
        assert_eq!(res.status, 200);
    }
}
