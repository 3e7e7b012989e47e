pub mod catalog;
pub mod check;
pub mod license;
pub mod message;
pub mod rules;
