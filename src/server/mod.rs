pub(crate) mod auth;
mod server;

pub(crate) use server::{AppState, run};
#[cfg(test)]
pub(crate) use server::router;
