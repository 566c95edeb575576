pub mod export;
pub mod inventory;
pub mod smart;
