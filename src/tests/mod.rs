//! End-to-end tests: router, orchestrator and REST clients against mocked
//! OCI and webhook endpoints.
