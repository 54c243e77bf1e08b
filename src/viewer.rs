// ABOUTME: Presentation state machine shared by the console and desktop front-ends
// ABOUTME: Login form handling, query controls and the dialogs they produce

use serde::{Deserialize, Serialize};

use crate::config::{default_port, ConnectionProfile};
use crate::db::{Connector, DataAccess, DbResult, NAME_COLUMNS};
use crate::models::{RowLimit, Table};
use crate::render::{render_table, DisplayBuffer};

/// Raw contents of the login form, exactly as typed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    pub host: String,
    #[serde(default)]
    pub port: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl LoginForm {
    /// Form prefilled from a profile
    pub fn from_profile(profile: &ConnectionProfile) -> Self {
        Self {
            host: profile.host.clone(),
            port: profile.port.to_string(),
            database: profile.database.clone(),
            username: profile.username.clone(),
            password: profile.password.clone(),
        }
    }

    /// Check the form and turn it into a profile. An empty port means 5432.
    pub fn to_profile(&self) -> Result<ConnectionProfile, Dialog> {
        let host = self.host.trim();
        let database = self.database.trim();
        let username = self.username.trim();
        let password = self.password.trim();

        if host.is_empty() || database.is_empty() || username.is_empty() || password.is_empty() {
            return Err(Dialog::error("Login error", "All fields are required."));
        }

        let port = match self.port.trim() {
            "" => default_port(),
            text => match text.parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => {
                    return Err(Dialog::error(
                        "Login error",
                        format!("Port must be a number between 1 and 65535, got '{}'.", text),
                    ))
                }
            },
        };

        Ok(ConnectionProfile {
            host: host.to_string(),
            port,
            database: database.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    Info,
    Error,
}

/// A titled message box
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    pub kind: DialogKind,
    pub title: String,
    pub message: String,
}

impl Dialog {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: DialogKind::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: DialogKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == DialogKind::Error
    }
}

/// What a front-end should show after an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Outcome {
    /// The display buffer was replaced with `text`
    Rendered { text: String },
    Dialog(Dialog),
}

impl Outcome {
    pub fn dialog(&self) -> Option<&Dialog> {
        match self {
            Outcome::Dialog(d) => Some(d),
            Outcome::Rendered { .. } => None,
        }
    }
}

/// The query controls offered once logged in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    CountIn450a,
    ShowIn450aRows,
    ShowIn450bNames,
    ShowIn450bRows,
    CountIn450b,
    ShowIn450cRows,
    CountIn450c,
}

enum Plan {
    Count(Table),
    Rows {
        table: Table,
        columns: &'static [&'static str],
        title: &'static str,
    },
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::CountIn450a,
        Action::ShowIn450aRows,
        Action::ShowIn450bNames,
        Action::ShowIn450bRows,
        Action::CountIn450b,
        Action::ShowIn450cRows,
        Action::CountIn450c,
    ];

    /// Button text
    pub fn label(self) -> &'static str {
        match self {
            Action::CountIn450a => "Count rows in IN450a",
            Action::ShowIn450aRows => "Show rows from IN450a",
            Action::ShowIn450bNames => "Show names from IN450b",
            Action::ShowIn450bRows => "Show full rows from IN450b",
            Action::CountIn450b => "Count rows in IN450b",
            Action::ShowIn450cRows => "Show full rows from IN450c",
            Action::CountIn450c => "Count rows in IN450c",
        }
    }

    /// Whether the action reads the row-limit field
    pub fn uses_limit(self) -> bool {
        matches!(self.plan(), Plan::Rows { .. })
    }

    fn plan(self) -> Plan {
        match self {
            Action::CountIn450a => Plan::Count(Table::In450a),
            Action::CountIn450b => Plan::Count(Table::In450b),
            Action::CountIn450c => Plan::Count(Table::In450c),
            Action::ShowIn450aRows => Plan::Rows {
                table: Table::In450a,
                columns: Table::In450a.columns(),
                title: "IN450a rows",
            },
            Action::ShowIn450bNames => Plan::Rows {
                table: Table::In450b,
                columns: NAME_COLUMNS,
                title: "IN450b first/last names",
            },
            Action::ShowIn450bRows => Plan::Rows {
                table: Table::In450b,
                columns: Table::In450b.columns(),
                title: "IN450b full rows",
            },
            Action::ShowIn450cRows => Plan::Rows {
                table: Table::In450c,
                columns: Table::In450c.columns(),
                title: "IN450c full rows",
            },
        }
    }
}

enum SessionState<S> {
    LoggedOut,
    LoggedIn {
        session: S,
        profile: ConnectionProfile,
    },
}

/// Login state, the open session and the display buffer.
///
/// The viewer starts logged out. A successful login is final until
/// [`Viewer::shutdown`]; failed actions never change the state.
pub struct Viewer<C: Connector> {
    connector: C,
    state: SessionState<C::Session>,
    display: DisplayBuffer,
}

impl<C: Connector> Viewer<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            state: SessionState::LoggedOut,
            display: DisplayBuffer::default(),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.state, SessionState::LoggedIn { .. })
    }

    /// Profile of the open session, if any
    pub fn profile(&self) -> Option<&ConnectionProfile> {
        match &self.state {
            SessionState::LoggedIn { profile, .. } => Some(profile),
            SessionState::LoggedOut => None,
        }
    }

    pub fn display(&self) -> &DisplayBuffer {
        &self.display
    }

    /// Submit the login form
    pub async fn login(&mut self, form: &LoginForm) -> Outcome {
        if let Some(profile) = self.profile() {
            return Outcome::Dialog(Dialog::info(
                "Connected",
                format!("Already connected as user '{}'", profile.username),
            ));
        }

        let profile = match form.to_profile() {
            Ok(p) => p,
            Err(dialog) => return Outcome::Dialog(dialog),
        };

        let mut session = self.connector.session(profile.clone());
        if let Err(e) = session.connect().await {
            log::warn!("Login failed for {}: {}", profile.display_target(), e);
            let message = if e.is_connection() {
                format!("Could not connect:\n{}", e)
            } else {
                format!("Unexpected error:\n{}", e)
            };
            return Outcome::Dialog(Dialog::error("Login failed", message));
        }

        log::info!("Logged in as {}", profile.display_target());
        let dialog = Dialog::info(
            "Connected",
            format!("Connected as user '{}'", profile.username),
        );
        self.state = SessionState::LoggedIn { session, profile };
        Outcome::Dialog(dialog)
    }

    /// Submit the login form and hand back the profile to remember, without its
    /// password. The profile is only returned when this call made the
    /// LoggedOut to LoggedIn transition.
    pub async fn submit_login(
        &mut self,
        form: &LoginForm,
    ) -> (Outcome, Option<ConnectionProfile>) {
        let was_logged_in = self.is_logged_in();
        let outcome = self.login(form).await;
        let fresh = match self.profile() {
            Some(profile) if !was_logged_in => {
                let mut profile = profile.clone();
                profile.password.clear();
                Some(profile)
            }
            _ => None,
        };
        (outcome, fresh)
    }

    /// Run one query control. `limit_input` is the raw row-limit field and is
    /// only read by row actions.
    pub async fn perform(&mut self, action: Action, limit_input: &str) -> Outcome {
        let SessionState::LoggedIn { session, .. } = &mut self.state else {
            return Outcome::Dialog(Dialog::error("Not connected", "Log in first."));
        };

        match action.plan() {
            Plan::Count(table) => match session.count(table).await {
                Ok(count) => Outcome::Dialog(Dialog::info(
                    format!("{} count", table.label()),
                    format!("Rows in {}: {}", table.label(), count),
                )),
                Err(e) => {
                    log::error!("{} failed: {}", action.label(), e);
                    Outcome::Dialog(Dialog::error("Error", format!("Database error:\n{}", e)))
                }
            },
            Plan::Rows {
                table,
                columns,
                title,
            } => {
                let limit = match RowLimit::parse(limit_input) {
                    Ok(limit) => limit,
                    Err(e) => {
                        return Outcome::Dialog(Dialog::error("Invalid row limit", e.to_string()))
                    }
                };

                match session.fetch_rows(table, limit, columns).await {
                    Ok(rows) => {
                        log::debug!("{}: {} rows", action.label(), rows.len());
                        let title = format!("{} (up to {})", title, limit);
                        let text = render_table(Some(&title), columns, &rows);
                        self.display.replace(text.clone());
                        Outcome::Rendered { text }
                    }
                    Err(e) => {
                        log::error!("{} failed: {}", action.label(), e);
                        Outcome::Dialog(Dialog::error("Error", format!("Database error:\n{}", e)))
                    }
                }
            }
        }
    }

    /// Release the session. The viewer is logged out afterwards even when
    /// closing reports an error.
    pub async fn shutdown(&mut self) -> DbResult<()> {
        let state = std::mem::replace(&mut self.state, SessionState::LoggedOut);
        self.display.clear();
        match state {
            SessionState::LoggedIn { mut session, .. } => session.close().await,
            SessionState::LoggedOut => Ok(()),
        }
    }
}
