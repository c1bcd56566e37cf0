//! Archive path scalar
//!
//! Paths inside an OFD container are POSIX-style and independent of the host
//! filesystem, so this is string handling rather than `std::path`.

use std::fmt;

/// A POSIX-style location inside the archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Loc(String);

impl Loc {
    pub fn new(path: impl Into<String>) -> Self {
        Loc(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_absolute(&self) -> bool {
        self.0.starts_with('/')
    }

    /// Join path elements onto this location.
    pub fn join(&self, elem: &str) -> Loc {
        if self.0.is_empty() {
            return Loc::new(elem).clean();
        }
        if elem.is_empty() {
            return self.clean();
        }
        Loc(format!("{}/{}", self.0, elem)).clean()
    }

    /// Resolve this location against a base directory.
    ///
    /// Absolute locations are only normalised; relative ones are joined onto
    /// `base` first. After resolving against an absolute base the result is
    /// absolute and free of `.`/`..` segments.
    pub fn resolve(&self, base: &Loc) -> Loc {
        if self.is_absolute() {
            return self.clean();
        }
        base.join(&self.0)
    }

    /// Normalise the path: collapse `//`, resolve `.` and `..`, strip any
    /// leading `./`.
    pub fn clean(&self) -> Loc {
        if self.0.is_empty() {
            return self.clone();
        }
        let absolute = self.is_absolute();
        let mut parts: Vec<&str> = Vec::new();
        for seg in self.0.split('/') {
            match seg {
                "" | "." => {}
                ".." => {
                    match parts.last() {
                        Some(&"..") | None => {
                            // Above the root of a relative path.
                            if !absolute {
                                parts.push("..");
                            }
                        }
                        _ => {
                            parts.pop();
                        }
                    }
                }
                _ => parts.push(seg),
            }
        }
        let joined = parts.join("/");
        if absolute {
            Loc(format!("/{joined}"))
        } else if joined.is_empty() {
            Loc(".".to_string())
        } else {
            Loc(joined)
        }
    }

    /// The directory part of the path.
    pub fn dir(&self) -> Loc {
        let cleaned = self.clean();
        match cleaned.0.rfind('/') {
            Some(0) => Loc("/".to_string()),
            Some(idx) => Loc(cleaned.0[..idx].to_string()),
            None => Loc(".".to_string()),
        }
    }

    /// The file name part of the path.
    pub fn base(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// The extension including the dot, or an empty string.
    pub fn ext(&self) -> &str {
        let base = self.base();
        match base.rfind('.') {
            Some(idx) if idx > 0 => &base[idx..],
            _ => "",
        }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Loc {
    fn from(s: &str) -> Self {
        Loc(s.to_string())
    }
}

impl From<String> for Loc {
    fn from(s: String) -> Self {
        Loc(s)
    }
}
