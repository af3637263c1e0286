pub mod brands;
pub mod checklist;
pub mod engine;
pub mod listing;
pub mod research;
pub mod screening;
