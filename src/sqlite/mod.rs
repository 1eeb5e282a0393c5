// SQLite module - everything that touches `rusqlite` directly.
//
// - params: conversion from facade values to engine values
// - query: row extraction and statement helpers, including stepping cursors
// - worker: the thread that owns the connection and serves commands

pub(crate) mod params;
pub(crate) mod query;
pub(crate) mod worker;

pub(crate) use worker::{SqliteWorker, StepReceiver, open_connection};
