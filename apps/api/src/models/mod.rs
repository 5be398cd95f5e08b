pub mod contact;
pub mod document;
