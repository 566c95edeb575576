pub mod export;
pub mod human;
pub mod report;
