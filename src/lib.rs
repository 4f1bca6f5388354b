//! Showtape - concert audio and video downloader
//!
//! This library crate exposes the download pipeline for the binary and for
//! integration testing.

pub mod catalog;
pub mod config;
pub mod crypto;
pub mod download;
pub mod http;
pub mod inputs;
pub mod manifest;
pub mod processor;
pub mod resolver;
