pub mod pixel;
pub mod search;
pub mod user;
