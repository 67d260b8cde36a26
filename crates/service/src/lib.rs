//! Service layer for the movie info catalog.
//! - `storage`: the non-blocking store contract and its document-store implementation.
//! - `movie_info`: CRUD orchestration that turns store outcomes into typed results.
//! - `demo`: producers behind the streaming demo endpoints.

pub mod errors;
pub mod storage;
pub mod movie_info;
pub mod demo;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
