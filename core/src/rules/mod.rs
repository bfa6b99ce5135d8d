pub mod catalog;
pub mod definition;
pub mod promotion;
pub mod severity;
