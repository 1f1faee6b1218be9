use clap::{Parser, Subcommand};
use rtorrent_types::DownloadState;

/// Top-level CLI struct for the binary.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// The rTorrent XML-RPC endpoint.
    #[arg(
        short,
        long,
        env = "RTORRENT_RPC_URL",
        default_value = "http://127.0.0.1:8000/RPC2"
    )]
    pub url: String,

    /// Use the pre-0.9 method names (`get_down_rate`, `d.get_base_filename`, ...).
    #[arg(long, env = "RTORRENT_LEGACY", default_value_t = false)]
    pub legacy: bool,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

/// What to query.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Global transfer rates and totals.
    Global,
    /// Info-hashes of the downloads in a state.
    List {
        /// One of all, started, stopped, complete, incomplete, hashing, seeding, leeching, active.
        #[arg(default_value = "all")]
        state: DownloadState,
    },
    /// Name, tracker, rates and totals of one download.
    Info {
        /// Info-hash of the download.
        hash: String,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_list_state() {
        let cli = Cli::try_parse_from(["rtorrent-stats", "list", "seeding"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::List {
                state: DownloadState::Seeding
            }
        ));
    }

    #[test]
    fn parse_rejects_unknown_state() {
        assert!(Cli::try_parse_from(["rtorrent-stats", "list", "paused"]).is_err());
    }

    #[test]
    fn parse_info_with_options() {
        let cli = Cli::try_parse_from([
            "rtorrent-stats",
            "--url",
            "http://seedbox:80/RPC2",
            "--legacy",
            "--timeout-secs",
            "3",
            "info",
            "ABCDEF",
        ])
        .unwrap();
        assert_eq!(cli.url, "http://seedbox:80/RPC2");
        assert!(cli.legacy);
        assert_eq!(cli.timeout_secs, 3);
        assert!(matches!(cli.command, Command::Info { hash } if hash == "ABCDEF"));
    }
}
