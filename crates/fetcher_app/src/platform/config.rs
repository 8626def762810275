//! Settings resolution: defaults, then the RON config file, then CLI/env.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use fetcher_core::{CredentialPolicy, RequestEncoding, SubmitConfig};
use fetcher_engine::TransportSettings;
use serde::Deserialize;

use crate::cli::{Args, Encoding};

const DEFAULT_CONFIG_FILENAME: &str = "media-fetcher.ron";

/// Shape of `media-fetcher.ron`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub endpoint: Option<String>,
    pub encoding: Option<Encoding>,
    pub cookies_required: Option<bool>,
    pub cookies: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub max_response_mib: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub submit: SubmitConfig,
    pub transport: TransportSettings,
    pub cookies: Option<PathBuf>,
    pub output_dir: PathBuf,
}

/// Read the config file named on the command line, or the default one if it exists.
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILENAME), false),
    };
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(FileConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading config file {}", path.display()))
        }
    };
    parse_file_config(&content).with_context(|| format!("parsing config file {}", path.display()))
}

pub fn parse_file_config(content: &str) -> Result<FileConfig> {
    Ok(ron::from_str(content)?)
}

/// Merge the layers; command-line (and environment) values win over the file.
pub fn resolve(args: &Args, file: FileConfig) -> Settings {
    let defaults = TransportSettings::default();

    let encoding = match args.encoding.or(file.encoding) {
        Some(Encoding::UrlEncoded) => RequestEncoding::UrlEncoded,
        Some(Encoding::Multipart) | None => RequestEncoding::Multipart,
    };
    let cookies_required = !args.cookies_optional && file.cookies_required.unwrap_or(true);
    let credential = if cookies_required {
        CredentialPolicy::Required
    } else {
        CredentialPolicy::Optional
    };

    let transport = TransportSettings {
        endpoint: args
            .endpoint
            .clone()
            .or(file.endpoint)
            .unwrap_or(defaults.endpoint),
        connect_timeout: file
            .connect_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.connect_timeout),
        request_timeout: args
            .timeout
            .or(file.request_timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout),
        max_response_bytes: file
            .max_response_mib
            .map(|mib| mib.saturating_mul(1024 * 1024))
            .unwrap_or(defaults.max_response_bytes),
    };

    Settings {
        submit: SubmitConfig {
            encoding,
            credential,
        },
        transport,
        cookies: args.cookies.clone().or(file.cookies),
        output_dir: args
            .output_dir
            .clone()
            .or(file.output_dir)
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}
