//! Business operations, independent of HTTP.

pub mod storage_service;
