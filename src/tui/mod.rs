pub mod app;
pub mod input;
pub mod line_edit;
pub mod modal;
pub mod render;
pub mod table;
pub mod theme;

pub use app::{Screen, run};
