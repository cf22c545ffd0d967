pub mod audio;
pub mod connection;
pub mod session;
pub mod snapshot;
pub mod track;
