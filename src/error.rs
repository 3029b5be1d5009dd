//! Error types for hyodo
//!
//! Display strings of the user-facing variants are the messages shown to the
//! user as-is.

use thiserror::Error;

/// Result type alias for hyodo operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hyodo
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Email or password left empty
    #[error("이메일과 비밀번호를 입력해주세요.")]
    MissingCredentials,

    /// Password below the provider's minimum length
    #[error("비밀번호는 {min}자 이상이어야 합니다.")]
    PasswordTooShort { min: usize },

    /// Provider rejected the email/password pair
    #[error("이메일 또는 비밀번호가 잘못되었습니다.")]
    InvalidCredentials,

    /// No remote backend is configured
    #[error("Supabase 클라이언트 오류")]
    BackendUnavailable,

    /// Operation requires a signed-in user
    #[error("로그인이 필요합니다.")]
    NotAuthenticated,

    /// Nickname lookup found nothing
    #[error("해당 닉네임으로 등록된 계정이 없습니다.")]
    NicknameNotFound,

    /// Login could not reach the provider
    #[error("로그인 중 오류가 발생했습니다.")]
    LoginFailed,

    /// Signup could not reach the provider
    #[error("가입 중 오류가 발생했습니다.")]
    SignupFailed,

    /// Error message returned by the hosted backend
    #[error("{0}")]
    Backend(String),

    /// Local cache error
    #[error("Local storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed backend URL
    #[error("Invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Transport, encoding or URL failures, as opposed to a reply from the
    /// provider
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Json(_) | Self::Url(_))
    }
}
