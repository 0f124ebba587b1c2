pub mod notice;
pub mod policy;
pub mod route;
pub mod session;
pub mod shell;
pub mod views;
