pub mod prelude;

pub mod pixel_data;
pub mod searches;
pub mod users;
