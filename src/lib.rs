//! Rivista: a small self-hosted blog server.
//!
//! The crate is split into the layers the binary wires together in
//! `main.rs`: `domain` (records and date helpers), `application` (repository
//! traits, pagination, grouping, view orchestration, syndication), `infra`
//! (Postgres adapters, HTTP surface, telemetry), `presentation` (askama
//! views), and `config`.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
