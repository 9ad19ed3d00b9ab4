use std::fmt;

/// Account role. Closed set; unknown values are rejected at the write
/// boundary, never coerced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Individual,
    Business,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "individual" => Some(Self::Individual),
            "business" => Some(Self::Business),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Business => "business",
            Self::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audience classifier of a competition. Closed set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompetitionKind {
    Standard,
    Business,
}

impl CompetitionKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "standard" => Some(Self::Standard),
            "business" => Some(Self::Business),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Business => "business",
        }
    }
}

impl fmt::Display for CompetitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an eligibility check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Denied(String),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Whether `role` may submit an entry to a competition of `kind`.
///
/// The matches are exhaustive on purpose: adding a role or kind without
/// deciding its row here is a compile error.
pub fn can_submit(role: Role, kind: CompetitionKind) -> Verdict {
    match (role, kind) {
        (Role::Admin, _) => Verdict::Allowed,
        (Role::Individual, CompetitionKind::Standard) => Verdict::Allowed,
        (Role::Individual, CompetitionKind::Business) => Verdict::Denied(
            "Individual accounts cannot submit to business competitions".into(),
        ),
        (Role::Business, CompetitionKind::Business) => Verdict::Allowed,
        (Role::Business, CompetitionKind::Standard) => Verdict::Denied(
            "Business accounts can only submit to business competitions".into(),
        ),
    }
}

/// Whether `role` may vote in a competition of `kind`.
///
/// Deliberately more permissive than [`can_submit`] for individuals: a
/// business competition reserves entry to businesses but still accepts votes
/// from the public. Business accounts vote only in business competitions.
pub fn can_vote(role: Role, kind: CompetitionKind) -> Verdict {
    match (role, kind) {
        (Role::Admin, _) => Verdict::Allowed,
        (Role::Individual, _) => Verdict::Allowed,
        (Role::Business, CompetitionKind::Business) => Verdict::Allowed,
        (Role::Business, CompetitionKind::Standard) => Verdict::Denied(
            "Business accounts can only vote in business competitions".into(),
        ),
    }
}
