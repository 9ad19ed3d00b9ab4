use common::storage::{FileKey, FileStore};
use sea_orm::prelude::Expr;
use sea_orm::*;
use serde::Serialize;
use tracing::warn;

use crate::entity::{category_suggestion, competition, submission, user, vote};
use crate::error::AppError;
use crate::models::submission::files_from_json;

/// Outcome of a cascade deletion.
///
/// File cleanup is best-effort: per-file failures are collected here and
/// surfaced in the response instead of aborting the cascade, since a
/// leftover file is a cleanup concern rather than a consistency concern.
#[derive(Debug, Default, Serialize, utoipa::ToSchema)]
pub struct CascadeReport {
    pub competitions_deleted: u64,
    pub submissions_deleted: u64,
    pub votes_deleted: u64,
    pub files_deleted: u64,
    pub file_failures: Vec<FileFailure>,
    /// Non-file errors collected while cascading (e.g. one competition in a
    /// user deletion failing); the rest of the cascade still runs.
    pub errors: Vec<String>,
}

/// A single file that could not be removed from storage.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FileFailure {
    pub key: String,
    pub detail: String,
}

impl CascadeReport {
    fn merge(&mut self, other: CascadeReport) {
        self.competitions_deleted += other.competitions_deleted;
        self.submissions_deleted += other.submissions_deleted;
        self.votes_deleted += other.votes_deleted;
        self.files_deleted += other.files_deleted;
        self.file_failures.extend(other.file_failures);
        self.errors.extend(other.errors);
    }
}

/// Delete a competition and everything under it.
///
/// Files are removed first (best-effort), then votes, submissions and the
/// competition record in one transaction: a crash mid-cascade leaves
/// detectable orphan submissions pointing at a still-existing competition,
/// never a deleted competition with unreferenced children.
///
/// Authorization (creator or admin) is the caller's responsibility.
pub async fn delete_competition(
    db: &DatabaseConnection,
    files: &dyn FileStore,
    competition_id: i32,
) -> Result<CascadeReport, AppError> {
    let submissions = submission::Entity::find()
        .filter(submission::Column::CompetitionId.eq(competition_id))
        .all(db)
        .await?;

    let mut report = CascadeReport::default();
    delete_entry_files(files, &submissions, &mut report).await;

    let submission_ids: Vec<i32> = submissions.iter().map(|s| s.id).collect();

    let txn = db.begin().await?;
    if !submission_ids.is_empty() {
        let res = vote::Entity::delete_many()
            .filter(vote::Column::SubmissionId.is_in(submission_ids))
            .exec(&txn)
            .await?;
        report.votes_deleted += res.rows_affected;

        let res = submission::Entity::delete_many()
            .filter(submission::Column::CompetitionId.eq(competition_id))
            .exec(&txn)
            .await?;
        report.submissions_deleted += res.rows_affected;
    }
    competition::Entity::delete_by_id(competition_id)
        .exec(&txn)
        .await?;
    txn.commit().await?;

    report.competitions_deleted += 1;
    Ok(report)
}

/// Delete a user and everything they own.
///
/// Runs the full competition cascade for each competition they created
/// (collecting, not aborting on, per-competition errors), then removes their
/// remaining submissions, the votes they cast (decrementing the affected
/// counters so `vote_count` stays equal to the vote rows), their category
/// suggestions, and finally the user record.
///
/// Authorization (admin, not self, last-admin floor) is the caller's
/// responsibility.
pub async fn delete_user(
    db: &DatabaseConnection,
    files: &dyn FileStore,
    user_id: i32,
) -> Result<CascadeReport, AppError> {
    let mut report = CascadeReport::default();

    let owned = competition::Entity::find()
        .filter(competition::Column::CreatedBy.eq(user_id))
        .all(db)
        .await?;

    for comp in owned {
        match delete_competition(db, files, comp.id).await {
            Ok(sub_report) => report.merge(sub_report),
            Err(e) => {
                warn!(competition_id = comp.id, error = ?e, "Cascade failed for competition");
                report
                    .errors
                    .push(format!("competition {}: cascade failed", comp.id));
            }
        }
    }

    // Submissions the user made to competitions owned by others.
    let remaining = submission::Entity::find()
        .filter(submission::Column::UserId.eq(user_id))
        .all(db)
        .await?;
    delete_entry_files(files, &remaining, &mut report).await;
    let remaining_ids: Vec<i32> = remaining.iter().map(|s| s.id).collect();

    let txn = db.begin().await?;
    if !remaining_ids.is_empty() {
        let res = vote::Entity::delete_many()
            .filter(vote::Column::SubmissionId.is_in(remaining_ids))
            .exec(&txn)
            .await?;
        report.votes_deleted += res.rows_affected;

        let res = submission::Entity::delete_many()
            .filter(submission::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        report.submissions_deleted += res.rows_affected;
    }

    // Votes the user cast on surviving submissions.
    let cast = vote::Entity::find()
        .filter(vote::Column::UserId.eq(user_id))
        .all(&txn)
        .await?;
    for v in &cast {
        submission::Entity::update_many()
            .filter(submission::Column::Id.eq(v.submission_id))
            .col_expr(
                submission::Column::VoteCount,
                Expr::col(submission::Column::VoteCount).sub(1),
            )
            .exec(&txn)
            .await?;
    }
    if !cast.is_empty() {
        let res = vote::Entity::delete_many()
            .filter(vote::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        report.votes_deleted += res.rows_affected;
    }

    category_suggestion::Entity::delete_many()
        .filter(category_suggestion::Column::SubmittedBy.eq(user_id))
        .exec(&txn)
        .await?;

    user::Entity::delete_by_id(user_id).exec(&txn).await?;
    txn.commit().await?;

    Ok(report)
}

/// Remove all stored files of the given submissions, best-effort.
async fn delete_entry_files(
    files: &dyn FileStore,
    submissions: &[submission::Model],
    report: &mut CascadeReport,
) {
    for sub in submissions {
        for file in files_from_json(&sub.files) {
            let key = match FileKey::parse(&file.key) {
                Ok(key) => key,
                Err(e) => {
                    warn!(submission_id = sub.id, key = %file.key, error = %e, "Unparseable stored file key");
                    report.file_failures.push(FileFailure {
                        key: file.key,
                        detail: e.to_string(),
                    });
                    continue;
                }
            };
            match files.delete(&key).await {
                Ok(true) => report.files_deleted += 1,
                // Already gone; nothing to clean up.
                Ok(false) => {}
                Err(e) => {
                    warn!(submission_id = sub.id, key = %file.key, error = %e, "Failed to delete entry file");
                    report.file_failures.push(FileFailure {
                        key: file.key,
                        detail: e.to_string(),
                    });
                }
            }
        }
    }
}
