/*-------------------------------------------------------------------------------------------------
  Core Modules
-------------------------------------------------------------------------------------------------*/

pub mod client;
pub mod config;
pub mod credential;
pub mod errors;
pub mod filter;
pub mod json;
pub mod locator;
pub mod management;
pub mod pipeline;
pub mod request;
pub mod restrictions;
pub mod service_tag;
pub mod subscriptions;
#[cfg(test)]
pub(crate) mod test_server;
pub mod updater;
