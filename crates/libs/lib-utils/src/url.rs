//! # Query String Utilities
//!
//! Read and rewrite parameters of a location's search string (`?a=1&b=2`).
//! The selected chain is carried in the `chainId` parameter so a reload or a
//! shared link lands on the same chain.

/// Get a query parameter from a search string.
///
/// Accepts the string with or without its leading `?`. A parameter present
/// without a value (`?flag`) yields an empty string.
pub fn get_query_param(search: &str, key: &str) -> Option<String> {
    let query_string = search.strip_prefix('?').unwrap_or(search);
    if query_string.is_empty() {
        return None;
    }

    for pair in query_string.split('&') {
        if let Some(equal_pos) = pair.find('=') {
            let param_key = &pair[..equal_pos];
            let param_value = &pair[equal_pos + 1..];
            if param_key == key {
                return Some(decode(param_value));
            }
        } else if pair == key {
            return Some(String::new());
        }
    }

    None
}

/// Return `search` with `key` set to `value`, keeping every other parameter
/// and its position. A missing key is appended.
///
/// The result always starts with `?`, ready for a history replace.
pub fn set_query_param(search: &str, key: &str, value: &str) -> String {
    let query_string = search.strip_prefix('?').unwrap_or(search);
    let encoded = format!("{}={}", key, urlencoding::encode(value));

    let mut replaced = false;
    let mut pairs: Vec<String> = query_string
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let param_key = pair.split('=').next().unwrap_or(pair);
            if param_key == key && !replaced {
                replaced = true;
                encoded.clone()
            } else {
                pair.to_string()
            }
        })
        .collect();

    if !replaced {
        pairs.push(encoded);
    }

    format!("?{}", pairs.join("&"))
}

fn decode(value: &str) -> String {
    // Form encoding uses '+' for spaces; urlencoding only handles %XX.
    let value = value.replace('+', " ");
    urlencoding::decode(&value)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(value)
}
