//! Shared constants used across sectormap crates.

/// Sector size in bytes (64KB).
/// This is the largest page size SQLite supports, so a database page
/// never spans more than two sectors.
pub const SECTOR_SIZE: u64 = 64 * 1024;

/// Custom base-32 alphabet for encoded file names.
///
/// Object names and label values only tolerate lowercase alphanumerics,
/// so the standard (uppercase) base-32 alphabet cannot be used.
pub const NAME_ALPHABET: &str = "abcdefghijklmnopqrstuv0123456789";

/// Padding character for encoded file names.
/// Not a member of [`NAME_ALPHABET`].
pub const NAME_PADDING: char = 'x';

/// Label key identifying what an object stores.
pub const LABEL_DATA: &str = "data";

/// Label value for sector objects.
pub const LABEL_DATA_SECTOR: &str = "sector";

/// Label value for lock objects.
pub const LABEL_DATA_LOCKFILE: &str = "lockfile";

/// Label key carrying the encoded name of the owning file.
pub const LABEL_RELEVANT_FILE: &str = "relevant-file";

/// Name suffix of the per-file lock object (`"{encoded-name}-lockfile"`).
pub const LOCKFILE_SUFFIX: &str = "lockfile";

/// Binary-data field holding a sector's raw bytes.
pub const FIELD_SECTOR: &str = "sector";

/// String-data field holding the raw (unencoded) filename, kept on every
/// object for diagnostics.
pub const FIELD_FILENAME: &str = "filename";

/// String-data field holding the persisted lock level on lock objects.
pub const FIELD_LOCK: &str = "lock";
