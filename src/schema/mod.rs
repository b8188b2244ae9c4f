pub mod path;
pub mod story;
