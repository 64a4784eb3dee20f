mod client;
pub mod error;
pub mod provider;
pub mod wechat;

pub use error::{Error, Result};
pub use provider::{Params, Provider, Session, Token, User};

#[cfg(test)]
mod tests {
    use ctor::ctor;

    #[ctor]
    fn init_tracing() {
        tracing_subscriber::fmt().with_env_filter("trace").init();
    }
}
