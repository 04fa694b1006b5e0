pub mod config;
pub mod determinism;
pub mod html;
pub mod links;
pub mod publish;
pub mod render;
pub mod report;
pub mod site;
pub mod validator;

pub mod error;
