//! Shared constants for end-to-end tests
//!
//! When test data changes (user credentials, timeouts, sample files),
//! update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// Username of the user seeded in every test database
pub const TEST_USER: &str = "testuser";

/// Email of the seeded user, used to log in
pub const TEST_EMAIL: &str = "testuser@example.com";

/// Password of the seeded user
pub const TEST_PASS: &str = "testpass123";

// ============================================================================
// Sample Uploads
// ============================================================================

/// Smallest byte sequence recognized as a PNG image
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89,
];

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the server to answer its first request
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Maximum time to wait for a detached statistics recompute to land
pub const RECOMPUTE_TIMEOUT_MS: u64 = 5000;

/// Interval between polls of the stored statistics
pub const RECOMPUTE_POLL_INTERVAL_MS: u64 = 10;

/// Timeout applied to every request of the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
