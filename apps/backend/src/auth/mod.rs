pub mod jwt;
pub mod sessions;
