//! Access to the BrowserStack Automate REST API.

pub mod client;
pub mod types;

pub use client::{AutomateApi, BrowserStackClient, Credentials};

#[cfg(test)]
pub mod fake;
