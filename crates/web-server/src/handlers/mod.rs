pub mod admin;
pub mod lookup;
