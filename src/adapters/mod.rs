// Adapters layer: concrete implementations for external systems (http, storage, api).

pub mod api;
pub mod http;
pub mod storage;
