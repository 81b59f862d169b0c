//! ycfn - Package and deploy Yandex Cloud Serverless Functions from CI.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ycfn::cli::output;
use ycfn::cli::{execute, Cli};
use ycfn::core::constants::LOG_ENV;
use ycfn::error::{ApiError, ConfigError, Error};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("ycfn=debug")
        } else {
            EnvFilter::new("ycfn=info")
        }
    });

    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    if let Err(e) = execute(cli.command) {
        let suggestion = match &e {
            Error::Config(ConfigError::NoCredentials) => {
                Some("set the yc-iam-token input or YC_IAM_TOKEN".to_string())
            }
            Error::SizeLimit { .. } => Some("set the bucket input to upload through Object Storage".to_string()),
            Error::Api(api) if api.is_not_found() => {
                Some("check folder-id and that the token can access it".to_string())
            }
            Error::Api(ApiError::Status {
                request_id: Some(id),
                ..
            }) => Some(format!("x-request-id: {}", id)),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(&hint);
        }
        std::process::exit(1);
    }
}
