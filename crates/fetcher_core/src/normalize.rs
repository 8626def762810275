use std::fmt;

use url::Url;

use crate::ValidationError;

/// Host used for every canonical watch URL.
pub const PRIMARY_DOMAIN: &str = "www.youtube.com";

const VIDEO_ID_PARAM: &str = "v";
const PRIMARY_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "m.youtube.com"];
const SHORT_LINK_HOSTS: &[&str] = &["youtu.be", "www.youtu.be"];
const ID_PATH_PREFIXES: &[&str] = &["shorts", "live", "embed"];

/// A source link that passed host validation, canonicalized when an id was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a user-entered link and rewrite it to `https://www.youtube.com/watch?v=<id>`.
///
/// Links on an accepted host whose id cannot be located are passed through
/// unchanged (surrounding whitespace aside).
pub fn normalize(input: &str) -> Result<NormalizedUrl, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidUrl);
    }
    let parsed = Url::parse(trimmed).map_err(|_| ValidationError::InvalidUrl)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::InvalidUrl);
    }
    let host = parsed.host_str().ok_or(ValidationError::InvalidUrl)?;

    let id = if SHORT_LINK_HOSTS.contains(&host) {
        query_id(&parsed).or_else(|| first_segment(&parsed))
    } else if PRIMARY_HOSTS.contains(&host) {
        query_id(&parsed).or_else(|| prefixed_path_id(&parsed))
    } else {
        return Err(ValidationError::InvalidUrl);
    };

    Ok(match id {
        Some(id) => NormalizedUrl(canonical_watch_url(&id)),
        None => NormalizedUrl(trimmed.to_string()),
    })
}

fn query_id(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, value)| key == VIDEO_ID_PARAM && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

fn first_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .find(|segment| !segment.is_empty())
        .map(ToOwned::to_owned)
}

fn prefixed_path_id(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?.filter(|segment| !segment.is_empty());
    let prefix = segments.next()?;
    if !ID_PATH_PREFIXES.contains(&prefix) {
        return None;
    }
    segments.next().map(ToOwned::to_owned)
}

fn canonical_watch_url(id: &str) -> String {
    let mut url = String::with_capacity(PRIMARY_DOMAIN.len() + id.len() + 18);
    url.push_str("https://");
    url.push_str(PRIMARY_DOMAIN);
    url.push_str("/watch?");
    url.push_str(
        &url::form_urlencoded::Serializer::new(String::new())
            .append_pair(VIDEO_ID_PARAM, id)
            .finish(),
    );
    url
}
