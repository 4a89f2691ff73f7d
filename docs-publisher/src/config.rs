use std::path::PathBuf;

use serde::Deserialize;

use crate::error::AppError;
use crate::utils::cli::Args;

pub const DEFAULT_MAX_CONCURRENT_UPLOADS: usize = 16;

#[derive(Clone, Debug)]
pub struct Config {
    pub storage: StorageConfig,
    pub max_concurrent_uploads: usize,
}

#[derive(Clone, Debug)]
pub enum StorageConfig {
    S3(S3Config),
    Filesystem { root: PathBuf },
    Memory,
}

#[derive(Clone, Debug)]
pub struct S3Config {
    pub bucket: String,
    pub credentials: S3Credentials,
    pub region: String,
    pub endpoint: Option<String>,
    pub force_path_style: bool,
}

/// Credential payload as it appears in configuration, e.g.
/// `{"accessKeyId": "...", "secretAccessKey": "..."}`.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
}

impl std::fmt::Debug for S3Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

impl S3Credentials {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        serde_json::from_str(raw)
            .map_err(|e| AppError::Config(format!("credentials are not valid JSON: {e}")))
    }
}

impl Config {
    /// Validates the parsed arguments. Every problem found is reported in a
    /// single `AppError::Config`.
    pub fn from_args(args: &Args) -> Result<Config, AppError> {
        let mut validation_errors = Vec::new();

        if args.max_concurrent_uploads == 0 {
            validation_errors.push("DOCS_MAX_CONCURRENT_UPLOADS must be at least 1".to_string());
        }

        let storage = match args.storage.to_ascii_uppercase().as_str() {
            "S3" => {
                let bucket = non_empty(args.bucket.as_deref());
                if bucket.is_none() {
                    validation_errors.push("DOCS_S3_BUCKET is not set".to_string());
                }
                let credentials = match non_empty(args.credentials.as_deref()) {
                    Some(raw) => match S3Credentials::parse(raw) {
                        Ok(credentials) => Some(credentials),
                        Err(e) => {
                            validation_errors.push(format!("DOCS_S3_CREDENTIALS: {e}"));
                            None
                        }
                    },
                    None => {
                        validation_errors.push("DOCS_S3_CREDENTIALS is not set".to_string());
                        None
                    }
                };
                match (bucket, credentials) {
                    (Some(bucket), Some(credentials)) => Some(StorageConfig::S3(S3Config {
                        bucket: bucket.to_string(),
                        credentials,
                        region: args.region.clone(),
                        endpoint: non_empty(args.endpoint.as_deref()).map(str::to_string),
                        force_path_style: args.force_path_style,
                    })),
                    _ => None,
                }
            }
            "FILESYSTEM" => match non_empty(args.root.as_deref()) {
                Some(root) => Some(StorageConfig::Filesystem {
                    root: PathBuf::from(root),
                }),
                None => {
                    validation_errors
                        .push("DOCS_STORAGE_ROOT is required for FILESYSTEM storage".to_string());
                    None
                }
            },
            "MEMORY" => Some(StorageConfig::Memory),
            other => {
                validation_errors.push(format!(
                    "DOCS_STORAGE `{other}` is not one of S3, FILESYSTEM, MEMORY"
                ));
                None
            }
        };

        match storage {
            Some(storage) if validation_errors.is_empty() => Ok(Config {
                storage,
                max_concurrent_uploads: args.max_concurrent_uploads,
            }),
            _ => Err(AppError::Config(validation_errors.join("\n"))),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["docs-publisher"];
        argv.extend_from_slice(extra);
        argv.push("status");
        argv.extend_from_slice(&["--namespace", "default", "--kind", "Component", "--name", "foo"]);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn s3_config_is_built_from_bucket_and_credentials() {
        let args = parse(&[
            "--storage",
            "S3",
            "--bucket",
            "docs",
            "--credentials",
            r#"{"accessKeyId":"AKIA","secretAccessKey":"s3cr3t"}"#,
        ]);
        let config = Config::from_args(&args).unwrap();
        match config.storage {
            StorageConfig::S3(s3) => {
                assert_eq!(s3.bucket, "docs");
                assert_eq!(s3.credentials.access_key_id, "AKIA");
                assert_eq!(s3.credentials.secret_access_key, "s3cr3t");
                assert_eq!(s3.credentials.session_token, None);
            }
            other => panic!("unexpected storage config: {other:?}"),
        }
        assert_eq!(config.max_concurrent_uploads, DEFAULT_MAX_CONCURRENT_UPLOADS);
    }

    #[test]
    fn missing_bucket_and_credentials_are_both_reported() {
        let args = parse(&["--storage", "S3"]);
        let err = Config::from_args(&args).unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, AppError::Config(_)));
        assert!(msg.contains("DOCS_S3_BUCKET"));
        assert!(msg.contains("DOCS_S3_CREDENTIALS"));
    }

    #[test]
    fn malformed_credentials_are_a_config_error() {
        let args = parse(&["--storage", "S3", "--bucket", "docs", "--credentials", "not json"]);
        let err = Config::from_args(&args).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn credentials_without_secret_are_rejected() {
        assert!(S3Credentials::parse(r#"{"accessKeyId":"AKIA"}"#).is_err());
    }

    #[test]
    fn debug_output_hides_secret() {
        let creds =
            S3Credentials::parse(r#"{"accessKeyId":"AKIA","secretAccessKey":"s3cr3t"}"#).unwrap();
        assert!(!format!("{creds:?}").contains("s3cr3t"));
    }

    #[test]
    fn filesystem_storage_needs_root() {
        let err = Config::from_args(&parse(&["--storage", "FILESYSTEM"])).unwrap_err();
        assert!(err.to_string().contains("DOCS_STORAGE_ROOT"));

        let config =
            Config::from_args(&parse(&["--storage", "filesystem", "--root", "/tmp/docs"])).unwrap();
        assert!(matches!(config.storage, StorageConfig::Filesystem { .. }));
    }

    #[test]
    fn unknown_storage_type_is_rejected() {
        let err = Config::from_args(&parse(&["--storage", "GCS"])).unwrap_err();
        assert!(err.to_string().contains("GCS"));
    }
}
