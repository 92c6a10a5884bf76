//! `gce-client` — minimal blocking client for the Compute Engine v1 REST API.
//!
//! Covers exactly the surface the `vmlift` workspace needs: instances,
//! firewalls, disk snapshots, image lookup, and long-running operation
//! polling. Typed responses, `json!` request bodies.
//!
//! # Architecture
//!
//! ```text
//! TokenSource     ← env var | metadata server | gcloud CLI
//!     │
//!     ▼
//! Client          ← reqwest::blocking, bearer auth, base URL overridable
//!     │              for tests
//!     ▼
//! resource impls  ← instances / firewalls / snapshots / images
//!     │
//!     ▼
//! operations      ← poll zone/global operations until DONE or timeout
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use gce_client::{auth::TokenSource, Client};
//!
//! let client = Client::new("my-project", TokenSource::detect()?);
//! if client.instance_get("us-west1-b", "flask-vm")?.is_none() {
//!     // create it …
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod firewalls;
pub mod images;
pub mod instances;
pub mod operations;
pub mod snapshots;

pub use client::Client;
pub use error::{GceError, Result};
pub use instances::{BootDisk, Instance, MetadataItem, NewInstance, ServiceAccount};
pub use operations::Operation;
