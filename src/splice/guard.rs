//! Platform fingerprint guard
//!
//! Generated artifacts bake in sizes, alignments and offsets that only hold
//! for the platform the headers were parsed for. The generator records that
//! platform as an `os-arch` fingerprint (see the `fingerprint` module), and
//! the artifact checks it against the running platform before anything else
//! in it is used:
//!
//! ```rust,ignore
//! pub const PLATFORM: &str = "linux-x64";
//!
//! pub fn ensure_platform() {
//!     declsplice::splice::guard::enforce(PLATFORM);
//! }
//! ```
//!
//! Equality is the only check. There is no notion of a compatible platform.

use crate::splice::error::QueryError;
use std::fmt;
use thiserror::Error;
use tracing::error;

/// The running platform does not match the one an artifact was built for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("platform mismatch: artifact generated for '{expected}', running on '{actual}'")]
pub struct PlatformMismatchError {
    pub expected: String,
    pub actual: String,
}

/// An `os-arch` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub os: String,
    pub arch: String,
}

impl Fingerprint {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Fingerprint of the platform this process runs on.
    pub fn current() -> Self {
        Self::new(
            normalize_os(std::env::consts::OS).unwrap_or(std::env::consts::OS),
            normalize_arch(std::env::consts::ARCH),
        )
    }

    /// Derive the fingerprint of a target triple such as
    /// `x86_64-pc-linux-gnu` or `aarch64-apple-darwin23.1.0`.
    pub fn from_triple(triple: &str) -> Result<Self, QueryError> {
        let unknown = || QueryError::Property {
            property: "platform fingerprint".to_string(),
            name: triple.to_string(),
        };

        let mut parts = triple.split('-');
        let arch = parts.next().filter(|a| !a.is_empty()).ok_or_else(unknown)?;
        let rest: Vec<&str> = parts.collect();

        let os = if rest.iter().any(|p| p.starts_with("android")) {
            "android"
        } else {
            rest.iter()
                .find_map(|part| normalize_os(part))
                .ok_or_else(unknown)?
        };

        Ok(Self::new(os, normalize_arch(arch)))
    }

    /// Parse the `os-arch` form written into artifacts.
    pub fn parse(text: &str) -> Option<Self> {
        let (os, arch) = text.split_once('-')?;
        if os.is_empty() || arch.is_empty() {
            return None;
        }
        Some(Self::new(os, arch))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

fn normalize_os(component: &str) -> Option<&'static str> {
    let base = component.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
    match base {
        "linux" => Some("linux"),
        "darwin" | "macos" | "macosx" => Some("macos"),
        "ios" => Some("ios"),
        "windows" | "win32" | "mingw" => Some("windows"),
        "android" => Some("android"),
        "freebsd" => Some("freebsd"),
        "netbsd" => Some("netbsd"),
        "openbsd" => Some("openbsd"),
        "dragonfly" => Some("dragonfly"),
        "solaris" => Some("solaris"),
        "illumos" => Some("illumos"),
        _ => None,
    }
}

fn normalize_arch(arch: &str) -> String {
    match arch {
        "x86_64" | "amd64" => "x64".to_string(),
        "i386" | "i486" | "i586" | "i686" | "x86" => "x86".to_string(),
        "aarch64" | "arm64" => "arm64".to_string(),
        a if a.starts_with("arm") || a.starts_with("thumb") => "arm".to_string(),
        "powerpc64le" | "ppc64le" => "ppc64le".to_string(),
        "powerpc64" | "ppc64" => "ppc64".to_string(),
        "powerpc" | "ppc" => "ppc".to_string(),
        other => other.to_string(),
    }
}

/// Compare a baked fingerprint with an explicit running platform. A baked
/// value that is not an `os-arch` pair never matches.
pub fn check_against(expected: &str, running: &Fingerprint) -> Result<(), PlatformMismatchError> {
    if Fingerprint::parse(expected).as_ref() == Some(running) {
        Ok(())
    } else {
        Err(PlatformMismatchError {
            expected: expected.to_string(),
            actual: running.to_string(),
        })
    }
}

/// Compare a baked fingerprint with the running platform.
pub fn check(expected: &str) -> Result<(), PlatformMismatchError> {
    check_against(expected, &Fingerprint::current())
}

/// Abort the process unless the running platform matches `expected`.
pub fn enforce(expected: &str) {
    if let Err(mismatch) = check(expected) {
        error!(expected = %mismatch.expected, actual = %mismatch.actual, "refusing to use generated bindings");
        eprintln!("{mismatch}");
        std::process::abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_from_triples() {
        let cases = [
            ("x86_64-pc-linux-gnu", "linux-x64"),
            ("x86_64-linux-gnu", "linux-x64"),
            ("aarch64-unknown-linux-musl", "linux-arm64"),
            ("aarch64-linux-android", "android-arm64"),
            ("arm64-apple-darwin23.1.0", "macos-arm64"),
            ("armv7l-unknown-linux-gnueabihf", "linux-arm"),
            ("i686-w64-windows-gnu", "windows-x86"),
            ("x86_64-unknown-freebsd13.2", "freebsd-x64"),
        ];
        for (triple, expected) in cases {
            assert_eq!(
                Fingerprint::from_triple(triple).unwrap().to_string(),
                expected,
                "triple: {triple}"
            );
        }
    }

    #[test]
    fn test_unknown_triple_is_query_error() {
        assert!(Fingerprint::from_triple("wasm32-unknown-unknown").is_err());
        assert!(Fingerprint::from_triple("").is_err());
    }

    #[test]
    fn test_matching_fingerprint_passes() {
        let running = Fingerprint::new("linux", "x64");
        assert!(check_against("linux-x64", &running).is_ok());
    }

    #[test]
    fn test_mismatch_names_both_fingerprints() {
        let running = Fingerprint::new("linux", "arm64");
        let err = check_against("linux-x64", &running).unwrap_err();
        assert_eq!(err.expected, "linux-x64");
        assert_eq!(err.actual, "linux-arm64");
        let message = format!("{err}");
        assert!(message.contains("linux-x64") && message.contains("linux-arm64"));
    }

    #[test]
    fn test_malformed_baked_fingerprint_never_matches() {
        let running = Fingerprint::new("linux", "x64");
        let err = check_against("linux", &running).unwrap_err();
        assert_eq!(err.actual, "linux-x64");
        assert!(check_against("", &running).is_err());
    }

    #[test]
    fn test_current_platform_checks_against_itself() {
        let current = Fingerprint::current().to_string();
        assert!(check(&current).is_ok());
        assert_eq!(Fingerprint::parse(&current), Some(Fingerprint::current()));
    }

    #[test]
    fn test_parse_rejects_partial_fingerprints() {
        assert_eq!(Fingerprint::parse("linux"), None);
        assert_eq!(Fingerprint::parse("-x64"), None);
        assert_eq!(
            Fingerprint::parse("linux-x64"),
            Some(Fingerprint::new("linux", "x64"))
        );
    }
}
