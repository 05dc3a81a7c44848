//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When the fixture site changes (artists, tracks, asset paths),
//! update only this file.

// ============================================================================
// Fixture Artists
// ============================================================================

/// Catalog id of "Al Noor Ensemble"
pub const ARTIST_1_SOURCE_ID: i64 = 101;

pub const ARTIST_1_NAME: &str = "Al Noor Ensemble";

/// Relative image path as written in the listing page
pub const ARTIST_1_IMAGE: &str = "uploads/singers/al-noor.jpg";

/// Catalog id of "Harmony Voices"
pub const ARTIST_2_SOURCE_ID: i64 = 102;

pub const ARTIST_2_NAME: &str = "Harmony Voices";

pub const ARTIST_2_IMAGE: &str = "uploads/singers/harmony.png";

// ============================================================================
// Fixture Tracks
// ============================================================================

/// "Al Noor" by Al Noor Ensemble
pub const TRACK_1_SOURCE_ID: i64 = 1001;

pub const TRACK_1_NAME: &str = "Al Noor";

/// "Tala Al Badru" by Al Noor Ensemble
pub const TRACK_2_SOURCE_ID: i64 = 1002;

pub const TRACK_2_NAME: &str = "Tala Al Badru";

/// "Ya Nabi" by Al Noor Ensemble
pub const TRACK_3_SOURCE_ID: i64 = 1003;

pub const TRACK_3_NAME: &str = "Ya Nabi";

/// "Morning Light" by Harmony Voices
pub const TRACK_4_SOURCE_ID: i64 = 2001;

pub const TRACK_4_NAME: &str = "Morning Light";

/// "Evening Breeze" by Harmony Voices
pub const TRACK_5_SOURCE_ID: i64 = 2002;

pub const TRACK_5_NAME: &str = "Evening Breeze";

// ============================================================================
// Payloads
// ============================================================================

/// Body served for every artist image
pub const TEST_IMAGE_BYTES: &[u8] = b"\xFF\xD8\xFF\xE0 fixture image";

/// Body served for every track download
pub const TEST_AUDIO_BYTES: &[u8] = b"ID3\x04\x00 fixture audio";

/// Salt used for stream references in every test
pub const TEST_SALT: &str = "fixture-salt";
