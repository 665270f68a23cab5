//! keydir-admin - manage a gitolite-style admin repository.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use keydir_admin::cli::output;
use keydir_admin::cli::{execute, Cli, LogFormat};
use keydir_admin::error::{Error, KeyError, RepoError};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("KEYDIR_ADMIN_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("keydir_admin=debug")
        } else {
            EnvFilter::new("keydir_admin=warn")
        }
    });

    let layer = fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);
    match cli.log_format {
        LogFormat::Text => registry.with(layer).init(),
        LogFormat::Json => registry.with(layer.json()).init(),
    }

    if let Err(e) = execute(cli) {
        let error_msg = e.to_string();
        let suggestion = match &e {
            Error::Repo(RepoError::PushRejected(_)) => Some("run: keydir-admin update"),
            Error::Repo(RepoError::MergeConflict(_)) => {
                Some("resolve the conflict in a git client, then retry")
            }
            Error::Repo(RepoError::InvalidLayout { .. }) => {
                Some("expected conf/gitolite.conf and keydir/")
            }
            Error::Key(KeyError::InvalidFormat { .. }) => {
                Some("key files hold '<type> <base64> [<comment>]'")
            }
            _ => None,
        };

        output::error(&error_msg);
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
