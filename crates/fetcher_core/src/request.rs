use std::fmt;

use crate::{NormalizedUrl, ValidationError};

/// Form field carrying the normalized source URL.
pub const URL_FIELD: &str = "url";
/// Form field carrying the session-cookie export.
pub const CREDENTIAL_FIELD: &str = "cookies_file";

/// Body encoding expected by the extraction backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestEncoding {
    /// `multipart/form-data` with `url` and, when present, `cookies_file`.
    #[default]
    Multipart,
    /// `application/x-www-form-urlencoded` with only `url`.
    UrlEncoded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialPolicy {
    #[default]
    Required,
    Optional,
}

/// Deployment variant of the submit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubmitConfig {
    pub encoding: RequestEncoding,
    pub credential: CredentialPolicy,
}

impl SubmitConfig {
    /// Whether a submission must carry a credential file.
    ///
    /// URL-encoded deployments cannot transport a file, so they never require one.
    pub fn requires_credential(&self) -> bool {
        self.encoding == RequestEncoding::Multipart
            && self.credential == CredentialPolicy::Required
    }
}

/// User-supplied cookie export, already read into memory.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialFile {
    pub file_name: String,
    pub contents: Vec<u8>,
}

impl CredentialFile {
    pub fn new(file_name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: contents.into(),
        }
    }
}

// Cookie contents are secrets; keep them out of debug output and logs.
impl fmt::Debug for CredentialFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialFile")
            .field("file_name", &self.file_name)
            .field("len", &self.contents.len())
            .finish()
    }
}

/// Outbound payload for a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    source_url: NormalizedUrl,
    credential: Option<CredentialFile>,
    encoding: RequestEncoding,
}

impl SubmissionRequest {
    pub fn source_url(&self) -> &NormalizedUrl {
        &self.source_url
    }

    pub fn credential(&self) -> Option<&CredentialFile> {
        self.credential.as_ref()
    }

    pub fn encoding(&self) -> RequestEncoding {
        self.encoding
    }
}

/// Assemble the request for `url`, enforcing the deployment's credential policy.
pub fn build(
    url: NormalizedUrl,
    credential: Option<CredentialFile>,
    config: &SubmitConfig,
) -> Result<SubmissionRequest, ValidationError> {
    if credential.is_none() && config.requires_credential() {
        return Err(ValidationError::MissingCredential);
    }
    let credential = match config.encoding {
        RequestEncoding::Multipart => credential,
        RequestEncoding::UrlEncoded => None,
    };
    Ok(SubmissionRequest {
        source_url: url,
        credential,
        encoding: config.encoding,
    })
}
