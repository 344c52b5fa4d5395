pub mod generate;
pub mod space;
pub mod validate;
pub mod version;
