mod client;

pub use client::{CloudClient, DEFAULT_HOST};
pub use reqwest::Method;
