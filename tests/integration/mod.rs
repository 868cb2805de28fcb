//! Integration Tests Module
//!
//! Cross-crate tests for the pplx-bridge extraction pipeline: whole-stream
//! answer resolution in both operating modes, JSON recovery acceptance
//! scenarios, and API key store persistence.

// Whole-stream aggregation tests (batch and streaming modes)
mod pipeline_test;

// JSON recovery scanner acceptance tests
mod recovery_test;

// API key store persistence tests
mod keys_test;
