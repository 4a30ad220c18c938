/// Exact conversion between decimal text and integer minor units.
pub mod money;

/// Balance ledger interface, plus the per-account-locked in-memory store.
pub mod ledger;

/// Caller-side request validation: raw amount text becomes a [`command::Command`]
/// carrying minor units, or is rejected before the ledger sees it.
pub mod command;

/// Maps validated commands onto ledger calls and ledger outcomes onto replies
/// and transport status codes.
pub mod teller;

/// Startup seed mapping (defaults or `PRELOAD_ACCOUNTS`).
pub mod seed;

/// CSV batch front-end used by the binary and the integration test.
pub mod bin_utils;
