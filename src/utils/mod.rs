pub mod reference;
pub mod sanitize;
