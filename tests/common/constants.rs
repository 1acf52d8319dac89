//! Shared constants for end-to-end tests
//!
//! The ISBNs below are the ones the mock Open Library service knows about.

#![allow(dead_code)]

// ============================================================================
// Mock Open Library records
// ============================================================================

/// Edition record with an author key that resolves to "George Orwell".
pub const ORWELL_ISBN: &str = "9780452284234";
pub const ORWELL_ISBN_HYPHENATED: &str = "978-0-452-28423-4";
pub const ORWELL_TITLE: &str = "1984";
pub const ORWELL_AUTHOR: &str = "George Orwell";
pub const ORWELL_AUTHOR_KEY: &str = "OL118077A";

/// Edition record listing its authors as plain strings.
pub const DUNE_ISBN: &str = "9780441172719";
pub const DUNE_TITLE: &str = "Dune";
pub const DUNE_AUTHOR: &str = "Frank Herbert";

/// No edition record, only found through the search endpoint.
pub const SEARCH_ONLY_ISBN: &str = "9780000000017";
pub const SEARCH_ONLY_TITLE: &str = "Good Omens";
pub const SEARCH_ONLY_AUTHORS: &str = "Terry Pratchett, Neil Gaiman";

/// Edition record with no title and an author key the service does not know.
pub const SPARSE_ISBN: &str = "9780000000024";

/// Edition record whose title and author are present but blank.
pub const BLANK_FIELDS_ISBN: &str = "9780000000048";

/// Edition endpoint answers 200 with a body that is not JSON.
pub const GARBLED_ISBN: &str = "9780000000055";

/// Edition endpoint answers 500, the search endpoint still has a document.
pub const EDITION_ERROR_ISBN: &str = "9780000000062";
pub const EDITION_ERROR_TITLE: &str = "Small Gods";
pub const EDITION_ERROR_AUTHOR: &str = "Terry Pratchett";

/// Unknown to both endpoints.
pub const UNKNOWN_ISBN: &str = "9780000000031";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for a spawned server to answer /health
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for every request the test client sends
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Delay between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Lookup timeout handed to the server under test
pub const LOOKUP_TIMEOUT_SECS: u64 = 2;
