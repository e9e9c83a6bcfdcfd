pub mod accounts;
pub mod config_io;
pub mod logging;
pub mod recovery;
pub mod state;
pub mod storage;
pub mod workspace;
