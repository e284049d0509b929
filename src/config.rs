use clap::{Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "metafs", about = "In-memory filesystem metadata store over HTTP")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the metadata API
    Serve {
        /// Address to bind
        #[arg(long, env = "METAFS_BIND", default_value = "127.0.0.1")]
        bind: IpAddr,

        /// TCP port; 0 picks a free one
        #[arg(long, env = "METAFS_PORT", default_value_t = 3000)]
        port: u16,

        /// Also write logs to this file
        #[arg(long, env = "METAFS_LOG_FILE")]
        log_file: Option<PathBuf>,

        /// Start with only the root directory
        #[arg(long)]
        no_seed: bool,

        /// Owner uid for entries created without one
        #[arg(long, env = "METAFS_DEFAULT_UID", default_value_t = 1000)]
        default_uid: u32,

        /// Owner gid for entries created without one
        #[arg(long, env = "METAFS_DEFAULT_GID", default_value_t = 1000)]
        default_gid: u32,
    },
}

#[derive(Debug, Clone)]
pub struct MetafsConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub log_file: Option<PathBuf>,
    pub seed: bool,
    pub default_uid: u32,
    pub default_gid: u32,
}

impl MetafsConfig {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

impl Default for MetafsConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            log_file: None,
            seed: true,
            default_uid: 1000,
            default_gid: 1000,
        }
    }
}
