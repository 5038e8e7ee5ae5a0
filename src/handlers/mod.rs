pub mod captions;
pub mod catalog;
