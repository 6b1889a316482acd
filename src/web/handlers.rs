//! HTTP handlers for API endpoints.
//!
//! Every handler answers 200; collector failures surface as empty fields.

use crate::metrics::data::*;
use crate::metrics::SystemCollector;
use axum::{extract::State, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared handler state.
pub type AppState = Arc<SystemCollector>;

/// Liveness marker.
pub async fn api_root() -> Json<Value> {
    Json(json!({ "api": "running" }))
}

pub async fn get_cpu(State(collector): State<AppState>) -> Json<CpuRecord> {
    Json(collector.cpu().await)
}

pub async fn get_ram(State(collector): State<AppState>) -> Json<MemoryRecord> {
    Json(collector.memory().await)
}

pub async fn get_disks(State(collector): State<AppState>) -> Json<Vec<StorageRecord>> {
    Json(collector.disks().await)
}

pub async fn get_network(State(collector): State<AppState>) -> Json<Vec<InterfaceRecord>> {
    Json(collector.network().await)
}

pub async fn get_gpus(State(collector): State<AppState>) -> Json<Vec<AcceleratorRecord>> {
    Json(collector.gpus().await)
}

pub async fn get_containers(State(collector): State<AppState>) -> Json<Vec<ContainerRecord>> {
    Json(collector.containers().await)
}

pub async fn get_ports(State(collector): State<AppState>) -> Json<Vec<PortRecord>> {
    Json(collector.ports().await)
}

pub async fn get_processes(State(collector): State<AppState>) -> Json<Vec<ProcessRecord>> {
    Json(collector.processes().await)
}

/// Full snapshot of all eight subsystems.
pub async fn get_snapshot(State(collector): State<AppState>) -> Json<SystemSnapshot> {
    Json(collector.snapshot().await)
}
