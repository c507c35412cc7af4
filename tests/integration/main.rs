//! Integration tests: full scoring pipeline against in-memory sources.

mod mock_source;
mod scenarios;
