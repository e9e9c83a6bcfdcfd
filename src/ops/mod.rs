pub mod auth_ops;
pub mod project_ops;
