pub mod jwt;
pub mod oauth2;
pub mod pack;
pub mod session;
pub mod svg;
