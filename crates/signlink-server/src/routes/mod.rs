pub mod health;
pub mod signatures;
