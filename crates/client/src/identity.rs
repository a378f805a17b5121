//! Local identity, configured before a connection is established.

use crate::error::ClientError;

/// Name used for synthetic messages generated by the client itself.
pub const SYSTEM_SENDER: &str = "System";

pub const MAX_USERNAME_LEN: usize = 20;

/// Who we are and which room we join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    username: String,
    room_id: Option<String>,
}

impl Identity {
    /// Validate and build an identity.
    ///
    /// The username is trimmed and must be non-empty, at most
    /// [`MAX_USERNAME_LEN`] characters and not the reserved system name.
    /// A blank room id means "no room".
    pub fn new(username: &str, room_id: Option<&str>) -> Result<Self, ClientError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ClientError::InvalidUsername("must not be empty".to_string()));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(ClientError::InvalidUsername(format!(
                "'{}' is longer than {} characters",
                username, MAX_USERNAME_LEN
            )));
        }
        if username.eq_ignore_ascii_case(SYSTEM_SENDER) {
            return Err(ClientError::InvalidUsername(format!(
                "'{}' is reserved",
                username
            )));
        }
        if username.chars().any(char::is_control) {
            return Err(ClientError::InvalidUsername(
                "must not contain control characters".to_string(),
            ));
        }

        let room_id = room_id
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        Ok(Self {
            username: username.to_string(),
            room_id,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }
}
