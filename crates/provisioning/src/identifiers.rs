//! Newtype domain identifiers.
//!
//! Every provisioning concept that has an identity is represented as a distinct
//! newtype wrapping a primitive. This prevents accidentally interchanging, for
//! example, a [`TeamSlug`] with a [`TeamName`] even though both are strings
//! under the hood, or a [`TeamId`] with a [`TeamNumber`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty
            /// or only whitespace. Surrounding whitespace is trimmed.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                let trimmed = v.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Self(trimmed.to_string()))
                }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: GitHub-integer-backed
// ---------------------------------------------------------------------------

/// Identifies a GitHub team by the numeric id GitHub assigned to it.
///
/// Invitations reference teams by this id; permission bindings use the
/// [`TeamSlug`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(u64);

impl TeamId {
    /// Creates a new identifier from a raw integer.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: roster-backed
// ---------------------------------------------------------------------------

/// The positive team number a roster row assigns a member to.
///
/// Team numbers drive every naming convention in the organization: the team
/// `Team<N>` and its repositories `Team<N>_BE` / `Team<N>_FE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamNumber(u32);

impl TeamNumber {
    /// Creates a team number, returning `None` for zero.
    pub fn new(value: u32) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Parses a roster field into a team number.
    ///
    /// Returns `None` for anything that is not a positive decimal integer.
    pub fn parse(field: &str) -> Option<Self> {
        field.trim().parse::<u32>().ok().and_then(Self::new)
    }

    /// Returns the underlying integer value.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Display name of the team that owns this number (`Team<N>`).
    pub fn team_name(self) -> TeamName {
        TeamName(format!("Team{}", self.0))
    }

    /// Name of one of the two repositories provisioned for this team.
    pub fn repository(self, flavor: crate::RepositoryFlavor) -> RepositoryName {
        RepositoryName(format!("Team{}{}", self.0, flavor.suffix()))
    }
}

impl std::fmt::Display for TeamNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// An invitee's email address as read from the roster.
///
/// Validation is shallow: one `@` with a non-empty local part and domain, no
/// embedded whitespace, and no quotes, angle brackets or list punctuation.
/// GitHub performs the real check when the invitation is created.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

/// Characters that never appear in a bare roster address.
const EMAIL_FORBIDDEN: [char; 9] = ['"', '<', '>', '(', ')', ',', ';', '[', ']'];

impl EmailAddress {
    /// Parses a roster field, returning `None` when it is not a plausible address.
    pub fn parse(field: &str) -> Option<Self> {
        let value = field.trim();
        if value
            .chars()
            .any(|c| c.is_whitespace() || EMAIL_FORBIDDEN.contains(&c))
        {
            return None;
        }
        let (local, domain) = value.split_once('@')?;
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return None;
        }
        Some(Self(value.to_string()))
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single provisioning or report run (one CLI invocation).
///
/// Recorded on the root tracing span so all activity from a run can be
/// correlated in exported traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (GitHub names)
// ---------------------------------------------------------------------------

string_id! {
    /// The login of the GitHub organization being provisioned.
    OrgName
}

string_id! {
    /// A team's display name (e.g. `"Team5"`, `"Admins"`).
    ///
    /// Names are matched exactly when looking up existing teams.
    TeamName
}

string_id! {
    /// The URL-safe identifier GitHub derives from a team name.
    TeamSlug
}

string_id! {
    /// A repository name within the organization, without the owner prefix.
    RepositoryName
}

impl TeamSlug {
    /// Derives the slug GitHub would assign to a team called `name`.
    ///
    /// Lowercases ASCII letters and collapses every run of other characters
    /// into a single `-`. Used when no real slug is available (dry runs).
    pub fn from_name(name: &TeamName) -> Self {
        let mut slug = String::with_capacity(name.as_str().len());
        let mut pending_dash = false;
        for c in name.as_str().chars() {
            if c.is_ascii_alphanumeric() || c == '_' {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
        }
        if slug.is_empty() {
            slug = name.as_str().to_lowercase();
        }
        Self(slug)
    }
}

impl RepositoryName {
    /// Returns the `owner/name` form used in logs and API paths.
    pub fn full_name(&self, org: &OrgName) -> String {
        format!("{}/{}", org, self.0)
    }
}
