//! HTTP API бенчмарка.
//!
//! Единственный endpoint `GET /` запускает серию замеров и возвращает
//! текстовый отчёт.

mod server;

pub use server::{create_router, ApiServer, ApiServerHandle, ApiState};
