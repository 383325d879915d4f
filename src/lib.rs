//! Example Databricks Apps.
//!
//! - `uc-service-creds`: mints temporary AWS credentials through a Unity Catalog
//!   service credential and lists the EC2 instances of a region.
//! - `large-file-startup` / `large-file-viewer`: downloads a file from a Unity
//!   Catalog volume, then previews it in a web page.

pub mod config;
pub mod credentials;
pub mod ec2;
pub mod file_viewer;
pub mod page;
pub mod preview;
pub mod startup;
pub mod uc_viewer;
pub mod util;
pub mod volume;
pub mod workspace;
