//! Searching Keccak-f for two-round trail cores from the command line.

pub mod search;
