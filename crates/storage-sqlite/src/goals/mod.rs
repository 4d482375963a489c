//! Goal persistence: one row per goal aggregate.

mod model;
mod repository;

pub use model::GoalDB;
pub use repository::GoalRepository;
