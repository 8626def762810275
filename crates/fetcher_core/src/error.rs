/// Input problems caught before any network call is made.
///
/// The `Display` text is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a valid YouTube URL")]
    InvalidUrl,
    #[error("Cookies file is required for downloading")]
    MissingCredential,
}
