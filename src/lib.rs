//! ycfn - Package and deploy Yandex Cloud Serverless Functions from CI.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/                # Command-line interface
//! │   ├── deploy          # Full deployment driver
//! │   ├── package         # Build the archive only
//! │   └── output          # Terminal and workflow-command output
//! └── core/               # Core library components
//!     ├── archive/        # Include/exclude selection and zip writing
//!     ├── cloud/          # Service traits and the REST client
//!     ├── secrets/        # Lockbox references and latest-version resolution
//!     ├── config          # Deployment settings (TOML + action inputs)
//!     ├── inputs          # Memory, log level, environment, mounts parsers
//!     ├── invocation      # Async invocation config
//!     ├── service_account # Service account by ID or name
//!     └── github          # Step outputs and job summary
//! ```
//!
//! # Features
//!
//! - Glob-based source selection into an in-memory zip
//! - Lockbox `latest` pinning by ID with a by-name fallback
//! - Inline or Object Storage packages
//! - Async invocation, mounts, log options and VPC connectivity

pub mod cli;
pub mod core;
pub mod error;
