pub mod http;
pub mod navigator;
pub mod storage;
