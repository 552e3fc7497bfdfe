//! Identifier and version checks.
//!
//! All functions are pure: no I/O, no processes. Name rules follow the npm
//! registry's requirements for newly published packages.

use std::path::Path;

const MAX_NAME_LENGTH: usize = 214;
const MAX_VERSION_LENGTH: usize = 256;
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Names the registry refuses outright.
const RESERVED_NAMES: &[&str] = &["node_modules", "favicon.ico"];

/// Node.js core modules; a package may not shadow them.
const CORE_MODULES: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// True if `name` may be published to the registry as a new package.
pub fn is_valid_remote_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_NAME_LENGTH {
        return false;
    }
    if name.trim() != name {
        return false;
    }
    if name.starts_with('.') || name.starts_with('_') {
        return false;
    }
    if RESERVED_NAMES.contains(&name) || CORE_MODULES.contains(&name.to_lowercase().as_str()) {
        return false;
    }
    if name.chars().any(|c| c.is_uppercase()) {
        return false;
    }

    let bare = match name.strip_prefix('@') {
        Some(scoped) => {
            let Some((scope, bare)) = scoped.split_once('/') else {
                return false;
            };
            if scope.is_empty() || !scope.chars().all(is_url_safe) {
                return false;
            }
            bare
        }
        None => name,
    };

    if bare.is_empty() || !bare.chars().all(is_url_safe) {
        return false;
    }

    // Allowed by URL encoding, but rejected for new packages.
    !bare.contains(&['~', '\'', '!', '(', ')', '*'][..])
}

/// Characters left untouched by URI-component encoding.
fn is_url_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '!' | '~' | '*' | '\'' | '(' | ')')
}

/// True if `version` is empty or a semantic version.
///
/// Surrounding whitespace and a leading `v` are allowed. Major, minor and
/// patch must fit in a double without losing precision, since the registry
/// tooling stores them that way.
pub fn is_valid_version(version: &str) -> bool {
    if version.is_empty() {
        return true;
    }
    if version.len() > MAX_VERSION_LENGTH {
        return false;
    }
    let trimmed = version.trim();
    let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
    match semver::Version::parse(bare) {
        Ok(parsed) => [parsed.major, parsed.minor, parsed.patch]
            .iter()
            .all(|&part| part <= MAX_SAFE_INTEGER),
        Err(_) => false,
    }
}

/// True if the identifier is an absolute filesystem path starting with `/`.
pub fn is_local_identifier(identifier: &str) -> bool {
    identifier.starts_with('/') && Path::new(identifier).is_absolute()
}
