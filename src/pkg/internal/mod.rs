pub mod adaptors;
pub mod storage;
pub mod validate;
