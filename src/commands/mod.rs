pub mod codes;
pub mod compile;
pub mod inventory;
mod selection;
