// ABOUTME: CLI command definitions using clap
// ABOUTME: Defines subcommands for admin operations

use clap::{Parser, Subcommand};

use crate::Overrides;

pub mod files;
pub mod session;
pub mod urls;

#[derive(Parser)]
#[command(name = "jpom-admin", about = "Admin CLI for the Jpom server API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Server address (e.g., http://127.0.0.1:2122)
    #[arg(long, global = true, env = "JPOM_BASE_URL")]
    pub base_url: Option<String>,

    /// Session token (overrides the stored session)
    #[arg(long, global = true, env = "JPOM_TOKEN")]
    pub token: Option<String>,

    /// Workspace id sent with every request
    #[arg(long, global = true, env = "JPOM_WORKSPACE_ID")]
    pub workspace: Option<String>,

    /// Obfuscate payloads with BASE64 (must match the server setting)
    #[arg(long, global = true)]
    pub base64: bool,

    /// Log every request
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            workspace: self.workspace.clone(),
            base64: self.base64,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage files in file storage
    #[command(subcommand)]
    Files(FilesCommand),

    /// Manage the stored session
    #[command(subcommand)]
    Session(SessionCommand),

    /// Print download and websocket URLs
    #[command(subcommand)]
    Url(UrlCommand),
}

#[derive(Subcommand)]
pub enum FilesCommand {
    /// List stored files
    List {
        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long, default_value = "10")]
        limit: u32,

        /// Filter by file name
        #[arg(long)]
        name: Option<String>,
    },

    /// Upload a local file in shards
    Upload {
        /// Path of the file to upload
        path: std::path::PathBuf,

        /// Shard size in bytes (default: 1 MiB)
        #[arg(long)]
        chunk_size: Option<usize>,

        #[command(flatten)]
        meta: MetaArgs,
    },

    /// Edit a stored file's metadata
    Edit {
        /// File id
        id: String,

        /// New file name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        meta: MetaArgs,
    },

    /// Have the server download a file from a URL
    RemoteDownload {
        /// URL to download
        url: String,

        #[command(flatten)]
        meta: MetaArgs,
    },

    /// Check whether a file with the given MD5 is stored
    Exists {
        /// Hex MD5 of the file
        md5: String,
    },

    /// Delete a stored file
    Delete {
        /// File id
        id: String,
    },

    /// Show the trigger URL of a stored file
    TriggerUrl {
        /// File id
        id: String,

        /// Issue a new trigger token
        #[arg(long)]
        rebuild: bool,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct MetaArgs {
    /// Description
    #[arg(long)]
    pub description: Option<String>,

    /// Alias code
    #[arg(long)]
    pub alias_code: Option<String>,

    /// Days to keep the file
    #[arg(long)]
    pub keep_day: Option<u32>,

    /// Share across workspaces
    #[arg(long)]
    pub global: Option<bool>,
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Show where the session is stored and whether a token is present
    Show,

    /// Store a token obtained from the web console
    Set {
        /// Session token
        token: String,
    },

    /// Renew the stored token
    Renew,

    /// Forget the stored token
    Clear,
}

#[derive(Subcommand)]
pub enum UrlCommand {
    /// Direct download URL for a path
    Download {
        /// API path (e.g., /file-storage/download)
        path: String,

        /// Query parameter as key=value (repeatable)
        #[arg(long = "param", short)]
        params: Vec<String>,
    },

    /// Websocket URL for a path
    Websocket {
        /// Socket path (e.g., /socket/console)
        path: String,

        /// Raw query string
        #[arg(long, default_value = "")]
        query: String,
    },
}
