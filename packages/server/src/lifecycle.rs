use std::fmt;

use chrono::{DateTime, Utc};

use crate::eligibility::{CompetitionKind, Role};
use crate::error::AppError;

/// Competition lifecycle status. Closed set.
///
/// The main progression is upcoming → open → voting → closed, driven by
/// explicit status updates (there is no scheduler). `pending_review` is an
/// alternate initial state reserved for moderated creation; nothing
/// transitions into or out of it specially.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompetitionStatus {
    Upcoming,
    Open,
    Voting,
    Closed,
    PendingReview,
}

impl CompetitionStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "upcoming" => Some(Self::Upcoming),
            "open" => Some(Self::Open),
            "voting" => Some(Self::Voting),
            "closed" => Some(Self::Closed),
            "pending_review" => Some(Self::PendingReview),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Open => "open",
            Self::Voting => "voting",
            Self::Closed => "closed",
            Self::PendingReview => "pending_review",
        }
    }
}

impl fmt::Display for CompetitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `open` is the only status in which new submissions are admitted.
pub fn require_open(status: CompetitionStatus) -> Result<(), AppError> {
    if status == CompetitionStatus::Open {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Submissions are not accepted while the competition is {status}"
        )))
    }
}

/// `voting` is the only status in which votes are admitted.
pub fn require_voting(status: CompetitionStatus) -> Result<(), AppError> {
    if status == CompetitionStatus::Voting {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Votes are not accepted while the competition is {status}"
        )))
    }
}

/// Past end dates are rejected except when the competition is (moving) past
/// active submission, where they simply reflect reality.
pub fn validate_end_date(
    end_date: DateTime<Utc>,
    target_status: CompetitionStatus,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if end_date <= now
        && !matches!(
            target_status,
            CompetitionStatus::Closed | CompetitionStatus::Voting
        )
    {
        return Err(AppError::Validation(
            "end_date cannot be in the past unless the competition is voting or closed".into(),
        ));
    }
    Ok(())
}

/// The kind is immutable after creation except by an admin. In particular a
/// business-role creator cannot move their competition out of the business
/// kind.
pub fn validate_kind_change(
    actor_role: Role,
    current: CompetitionKind,
    requested: CompetitionKind,
) -> Result<(), AppError> {
    if requested == current || actor_role.is_admin() {
        return Ok(());
    }
    if current == CompetitionKind::Business {
        return Err(AppError::Forbidden(
            "A business competition cannot be changed to another kind by its creator".into(),
        ));
    }
    Err(AppError::Forbidden(
        "Only an admin can change the competition kind".into(),
    ))
}
