pub mod space;
pub mod token;
