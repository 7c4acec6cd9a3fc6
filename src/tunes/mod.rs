//! Tune scheduling and publishing: wire types plus the typed REST client.

pub mod client;
pub mod types;

pub use client::TunesClient;
pub use types::{
    License, MediaBlob, NewTune, PrivacyStatus, Tune, TuneFilters, TunePage, TuneValidationError,
};
