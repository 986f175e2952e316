pub mod capture_delegate;
pub mod media_backend;
pub mod storage_target;
