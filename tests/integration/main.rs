//! Integration tests for Sumi-Mirror
//!
//! These tests run the crawl engine against wiremock archive servers.

mod crawl_tests;
