pub mod common;
pub mod dex;
pub mod router;
pub mod token;
