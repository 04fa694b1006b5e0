pub mod index;
pub mod nav;
