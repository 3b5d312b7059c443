pub mod config;
pub mod logging;

pub mod cache;
pub mod connectivity;
pub mod fetch;
pub mod http;
pub mod key;
pub mod notice;
pub mod retry;
pub mod signal;

#[cfg(test)]
pub(crate) mod test_support;
