//! User profile, session state and navigation gating

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role given to new accounts
pub const DEFAULT_ROLE: &str = "Servidor";

/// Role names (case-insensitive) that may manage other accounts
pub const ADMIN_ROLES: [&str; 2] = ["administrador", "admin"];

/// A user's profile; `id` matches the auth user id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub name: Option<String>,
    /// Free-text job title, e.g. "Almoxarife"
    pub role: String,
    pub status: ProfileStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        is_admin_role(&self.role)
    }

    /// Initials for avatars ("João Silva" -> "JS")
    pub fn initials(&self) -> String {
        self.name
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

pub fn is_admin_role(role: &str) -> bool {
    let role = role.trim().to_lowercase();
    ADMIN_ROLES.iter().any(|r| *r == role)
}

/// Approval status of an account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    /// Newly created, awaiting administrator approval
    #[default]
    Pending,
    Active,
    Inactive,
}

impl ProfileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileStatus::Pending => "pending",
            ProfileStatus::Active => "active",
            ProfileStatus::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProfileStatus {
    type Err = super::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ProfileStatus::Pending),
            "active" => Ok(ProfileStatus::Active),
            "inactive" => Ok(ProfileStatus::Inactive),
            other => Err(super::ParseEnumError::new("profile status", other)),
        }
    }
}

/// Application pages a session can navigate to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Dashboard,
    Products,
    Inventory,
    Reports,
    Users,
    Settings,
    Auth,
}

impl Page {
    pub const ALL: [Page; 7] = [
        Page::Dashboard,
        Page::Products,
        Page::Inventory,
        Page::Reports,
        Page::Users,
        Page::Settings,
        Page::Auth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Products => "products",
            Page::Inventory => "inventory",
            Page::Reports => "reports",
            Page::Users => "users",
            Page::Settings => "settings",
            Page::Auth => "auth",
        }
    }

    /// Pages reachable by accounts that have not been approved
    pub fn open_to_unapproved(&self) -> bool {
        matches!(self, Page::Dashboard | Page::Settings)
    }
}

impl std::str::FromStr for Page {
    type Err = super::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| super::ParseEnumError::new("page", s))
    }
}

/// Lifecycle of a client session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", content = "status", rename_all = "snake_case")]
pub enum AuthState {
    /// Session restore still in flight
    Loading,
    Unauthenticated,
    Authenticated(ProfileStatus),
}

impl AuthState {
    /// State once a session restore finished (or gave up)
    pub fn resolved(profile_status: Option<ProfileStatus>, has_session: bool) -> Self {
        match (has_session, profile_status) {
            (false, _) => AuthState::Unauthenticated,
            (true, Some(status)) => AuthState::Authenticated(status),
            // Signed in but the profile could not be read: treat as awaiting approval
            (true, None) => AuthState::Authenticated(ProfileStatus::Pending),
        }
    }
}

/// Outcome of a navigation request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", content = "page", rename_all = "snake_case")]
pub enum Navigation {
    Allow(Page),
    Redirect(Page),
    /// Keep waiting; nothing can be decided while loading
    Wait,
}

impl Navigation {
    /// Page that ends up being shown, if any
    pub fn page(&self) -> Option<Page> {
        match self {
            Navigation::Allow(p) | Navigation::Redirect(p) => Some(*p),
            Navigation::Wait => None,
        }
    }
}

/// Decide where a navigation to `requested` lands.
///
/// Unauthenticated sessions always land on the auth screen. Pending and
/// inactive accounts may only reach Dashboard and Settings and are sent to
/// Dashboard otherwise. User management also needs an admin role.
pub fn guard_navigation(state: AuthState, is_admin: bool, requested: Page) -> Navigation {
    match state {
        AuthState::Loading => Navigation::Wait,
        AuthState::Unauthenticated => {
            if requested == Page::Auth {
                Navigation::Allow(Page::Auth)
            } else {
                Navigation::Redirect(Page::Auth)
            }
        }
        AuthState::Authenticated(status) => {
            if requested == Page::Auth {
                return Navigation::Redirect(Page::Dashboard);
            }
            if status != ProfileStatus::Active && !requested.open_to_unapproved() {
                return Navigation::Redirect(Page::Dashboard);
            }
            if requested == Page::Users && !is_admin {
                return Navigation::Redirect(Page::Dashboard);
            }
            Navigation::Allow(requested)
        }
    }
}
