use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docreg")]
#[command(about = "Register IPFS-pinned documents in an on-chain registry", long_about = None)]
pub struct Cli {
    /// TOML configuration file; environment variables override its values
    #[arg(long, global = true, env = "DOCREG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Named local network (hardhat, anvil, ganache); overrides the configured chain
    #[arg(long, global = true, env = "DOCREG_NETWORK")]
    pub network: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Connect the wallet and print the active account
    Connect,

    /// Pin a file and register it in the registry
    Register {
        /// File to register
        file: PathBuf,

        #[arg(long)]
        category: String,

        /// Free-form author list
        #[arg(long, default_value = "")]
        authors: String,

        /// YYYY-MM-DD, RFC 3339 or unix seconds; omit for no deadline
        #[arg(long, default_value = "")]
        deadline: String,
    },

    /// List registered documents, newest first
    List {
        /// Case-insensitive category substring
        #[arg(long, default_value = "")]
        category: String,

        /// Owner address or address fragment
        #[arg(long, default_value = "")]
        owner: String,
    },

    /// Show one document with its gateway links
    Show {
        /// Document id
        id: u64,
    },
}
