pub mod builder;
pub mod lifecycle;
