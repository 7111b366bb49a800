#![deny(clippy::all, clippy::pedantic, clippy::nursery, warnings)]
#![allow(clippy::missing_errors_doc)]

pub mod driver;
pub mod logging;
pub mod random;
pub mod service;
pub mod settings;
pub mod tracker;
