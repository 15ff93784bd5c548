#![cfg_attr(not(feature = "std"), no_std)]

//! Types shared between the contracts of the workspace.

pub mod errors;
pub mod utils;

pub use errors::Error;
