//! # Shared Utility Functions
//!
//! Display helpers used by the manager's logs and the maintenance CLI.
//!
//! ## Chain ID Formatting
//!
//! Chain ids are 64 hex characters, too long for table output:
//! - [`format_chain_id`] - Keep the first N and last M characters
//! - [`truncate_chain_id`] - `format_chain_id` with 8/4 defaults
//!
//! ## Usage
//!
//! ```rust
//! use shared::utils::truncate_chain_id;
//!
//! let chain_id = "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906";
//! assert_eq!(truncate_chain_id(chain_id), "aca376f2...e906");
//! ```

/// Shorten a chain id to its first `prefix_len` and last `suffix_len` characters.
///
/// Ids too short to shorten meaningfully are returned as-is.
///
/// # Examples
///
/// ```rust
/// use shared::utils::format_chain_id;
///
/// let id = "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906";
/// assert_eq!(format_chain_id(id, 4, 4), "aca3...e906");
/// assert_eq!(format_chain_id("c1", 4, 4), "c1");
/// ```
pub fn format_chain_id(chain_id: &str, prefix_len: usize, suffix_len: usize) -> String {
    let len = chain_id.len();

    // Ids are hex, but user-supplied directories might not be; never slice
    // through a multi-byte character.
    if len <= prefix_len + suffix_len
        || !chain_id.is_char_boundary(prefix_len)
        || !chain_id.is_char_boundary(len - suffix_len)
    {
        return chain_id.to_string();
    }

    format!(
        "{}...{}",
        &chain_id[..prefix_len],
        &chain_id[len - suffix_len..]
    )
}

/// Shorten a chain id with the default 8-character prefix and 4-character suffix.
pub fn truncate_chain_id(chain_id: &str) -> String {
    format_chain_id(chain_id, 8, 4)
}
