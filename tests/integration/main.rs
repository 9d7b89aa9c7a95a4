//! Integration tests for Convo-Archiver

mod crawl_tests;
