pub mod document;
pub mod locale;
pub mod principal;
