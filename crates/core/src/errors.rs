use thiserror::Error;

/// Collaborator services a command handler may call out to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collaborator {
    TaskStore,
    Spreadsheet,
    ChatPlatform,
}

impl Collaborator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskStore => "task_store",
            Self::Spreadsheet => "spreadsheet",
            Self::ChatPlatform => "chat_platform",
        }
    }
}

impl std::fmt::Display for Collaborator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IntegrationError {
    #[error("{service} request failed: {message}")]
    Transport { service: Collaborator, message: String },
    #[error("{service} request timed out")]
    Timeout { service: Collaborator },
    #[error("{service} returned status {status}: {detail}")]
    Status { service: Collaborator, status: u16, detail: String },
    #[error("{service} is not configured: {reason}")]
    NotConfigured { service: Collaborator, reason: String },
}

impl IntegrationError {
    pub fn service(&self) -> Collaborator {
        match self {
            Self::Transport { service, .. }
            | Self::Timeout { service }
            | Self::Status { service, .. }
            | Self::NotConfigured { service, .. } => *service,
        }
    }

    /// Short machine-readable class used as a structured log field.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::Status { status, .. } if *status >= 500 => "upstream_unavailable",
            Self::Status { .. } => "upstream_rejected",
            Self::NotConfigured { .. } => "not_configured",
        }
    }
}
