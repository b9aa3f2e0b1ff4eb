#![doc = "drive-publish-core: core logic library for drive-publish."]

//! This crate holds the protocol logic for publishing build artifacts to a
//! OneDrive folder through Microsoft Graph:
//!
//! - [`credential`]: client-credentials token exchange and expiry tracking
//! - [`session`]: resumable upload session creation
//! - [`transfer`]: chunk planning and the chunked transfer engine
//! - [`share`]: anonymous share links for items and folders
//! - [`publish`]: per-file orchestration and the run report
//!
//! All network I/O goes through the [`contract::DriveApi`] trait. The
//! production implementation is [`graph::GraphClient`].

pub mod config;
pub mod contract;
pub mod credential;
pub mod error;
pub mod graph;
pub mod publish;
pub mod remote_path;
pub mod session;
pub mod share;
pub mod transfer;
