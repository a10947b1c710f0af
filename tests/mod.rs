mod http_conflict_source;

// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - conflict_source_mock: Conflict checking against an in-memory source
// - http_conflict_source: The HTTP source against a local endpoint
// - smoke_tests: Config, components and the full preview path
