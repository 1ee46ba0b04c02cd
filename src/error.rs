use std::fmt;
use std::io;

#[derive(Debug)]
pub enum SyncError {
    Config(String),
    Connectivity { attempts: u32 },
    Authorization(String),
    Request(String),
    LocalStore(String),
    Io(String),
}

impl SyncError {
    pub fn message(&self) -> String {
        match self {
            SyncError::Config(msg) => msg.clone(),
            SyncError::Connectivity { attempts } => format!(
                "Failed to connect to the internet after {attempts} attempt(s)."
            ),
            SyncError::Authorization(msg) => format!("Authorization failed: {msg}"),
            SyncError::Request(msg) => msg.clone(),
            SyncError::LocalStore(msg) => format!("Reminders: {msg}"),
            SyncError::Io(msg) => msg.clone(),
        }
    }

    /// Remote API failures degrade to "no tasks" / "not found" inside a pass;
    /// every other kind aborts the account.
    pub fn is_remote(&self) -> bool {
        matches!(self, SyncError::Request(_))
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for SyncError {}

impl From<io::Error> for SyncError {
    fn from(err: io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}
