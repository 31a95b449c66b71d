pub mod init;
pub mod review;
pub mod stats;
pub mod take;
pub mod validate;
