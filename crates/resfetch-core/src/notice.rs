//! User-facing failure notices.
//!
//! The decorated fetch raises one notice per aborted fetch over a bounded
//! channel. Rendering is up to the host application.

use std::fmt;

use crate::retry::{FailureKind, StatusCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    InvalidLocation,
    InvalidCredential,
    ServerError,
    GenericError,
}

impl Notice {
    pub fn for_failure(kind: FailureKind) -> Self {
        match kind {
            FailureKind::InvalidCredential => Notice::InvalidCredential,
            FailureKind::UpstreamRejected(StatusCategory::NotFound) => Notice::InvalidLocation,
            FailureKind::UpstreamRejected(StatusCategory::ServerFailure) => Notice::ServerError,
            FailureKind::NetworkUnavailable | FailureKind::Unknown => Notice::GenericError,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Notice::InvalidLocation => "City name is invalid",
            Notice::InvalidCredential => "Key is invalid",
            Notice::ServerError => "Server error",
            Notice::GenericError => "An error occurred",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
