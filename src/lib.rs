//! Core library for the bitelog food diary.
//!
//! Holds the data model (food entries, day records), the persisted record
//! store, and the service layer that UI front ends drive. Everything here
//! is synchronous, single-threaded, and local: mutations go through the
//! [`store::RecordStore`], which writes the full history back to its
//! storage slot after every change, and callers re-read state to render.

pub mod config;
pub mod models;
pub mod service;
pub mod storage;
pub mod store;

pub use service::BitelogService;
