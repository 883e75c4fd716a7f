pub mod session;
pub mod guard;
