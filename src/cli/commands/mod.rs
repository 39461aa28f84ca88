pub mod init;
pub mod log;
pub mod replay;
pub mod status;
pub mod storage;
