#![doc = "jobs-uploader: batch-upload job postings into a Firestore jobs collection."]

//! This crate contains the full pipeline for publishing a local jobs file to a
//! cloud document store: locating and parsing the service account key,
//! constructing an authenticated Firestore client, and writing one document
//! per job entry.
//!
//! # Usage
//! The `jobs-uploader` binary wires the stages together; each module is also
//! usable (and testable) on its own. See [`cli::run`] for the orchestration.

pub mod cli;
pub mod credentials;
pub mod firestore;
pub mod store;
pub mod upload;
