//! Config operations for the store service

mod apply;
mod create;
mod query;
