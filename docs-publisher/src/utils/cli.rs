use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_MAX_CONCURRENT_UPLOADS;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Storage backend type (S3, FILESYSTEM or MEMORY)
    #[arg(short, long, global = true, env = "DOCS_STORAGE", default_value = "S3")]
    pub storage: String,

    /// Bucket holding the published sites
    #[arg(long, global = true, env = "DOCS_S3_BUCKET")]
    pub bucket: Option<String>,

    /// JSON credentials, e.g. {"accessKeyId": "...", "secretAccessKey": "..."}
    #[arg(long, global = true, env = "DOCS_S3_CREDENTIALS", hide_env_values = true)]
    pub credentials: Option<String>,

    /// Bucket region
    #[arg(long, global = true, env = "DOCS_S3_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Custom endpoint for S3-compatible stores (MinIO, Ceph, ...)
    #[arg(long, global = true, env = "DOCS_S3_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Address buckets as `<endpoint>/<bucket>` instead of virtual hosts
    #[arg(long, global = true, env = "DOCS_S3_FORCE_PATH_STYLE")]
    pub force_path_style: bool,

    /// Root directory of the FILESYSTEM backend
    #[arg(long, global = true, env = "DOCS_STORAGE_ROOT")]
    pub root: Option<String>,

    /// Upper bound on uploads running at the same time during a publish
    #[arg(
        long,
        global = true,
        env = "DOCS_MAX_CONCURRENT_UPLOADS",
        default_value_t = DEFAULT_MAX_CONCURRENT_UPLOADS
    )]
    pub max_concurrent_uploads: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Serve published documentation over HTTP")]
    Serve {
        /// Listening host
        #[arg(long, env = "DOCS_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Listening port
        #[arg(short, long, env = "DOCS_PORT", default_value_t = 7007)]
        port: u16,
    },

    #[command(about = "Upload a generated site directory for an entity")]
    Publish {
        #[command(flatten)]
        entity: EntityArgs,

        /// Directory containing the rendered site
        #[arg(short, long, value_name = "DIR")]
        directory: PathBuf,
    },

    #[command(about = "Report whether docs have been generated for an entity")]
    Status {
        #[command(flatten)]
        entity: EntityArgs,
    },
}

#[derive(clap::Args, Debug)]
pub struct EntityArgs {
    #[arg(long, default_value = "default")]
    pub namespace: String,

    #[arg(long)]
    pub kind: String,

    #[arg(long)]
    pub name: String,
}
