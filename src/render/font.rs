//! Per-document font loading
//!
//! Fonts resolve in this order: the embedded `FontFile` from the archive,
//! a system face matching the declared name, a directory scan for the
//! well-known SimSun/SimHei files, and finally a once-initialised global
//! fallback family. Failures land on the fallback and are cached, so a
//! missing font is reported once per document.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, warn};
use once_cell::sync::Lazy;

use crate::archive::ArchiveCache;
use crate::model::res::FontRes;
use crate::model::scalar::RefId;
use crate::parse::Document;
use crate::util;

/// Raw font data plus the face index inside it.
pub struct LoadedFont {
    pub data: Arc<Vec<u8>>,
    pub index: u32,
}

impl LoadedFont {
    pub fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, self.index).ok()
    }

    fn from_bytes(data: Vec<u8>, index: u32) -> Option<Arc<LoadedFont>> {
        ttf_parser::Face::parse(&data, index).ok()?;
        Some(Arc::new(LoadedFont { data: Arc::new(data), index }))
    }
}

/// System font database, loaded once per process.
static FONT_DB: Lazy<fontdb::Database> = Lazy::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    db
});

/// Global fallback family: the first of these present on the system, else
/// any sans-serif face.
static FALLBACK: Lazy<Option<Arc<LoadedFont>>> = Lazy::new(|| {
    for name in ["仿宋", "楷体", "黑体", "Cantarell", "Noto Sans"] {
        if let Some(font) = query_system(name, false, false) {
            return Some(font);
        }
    }
    let query = fontdb::Query {
        families: &[fontdb::Family::SansSerif],
        ..fontdb::Query::default()
    };
    FONT_DB.query(&query).and_then(load_face)
});

type CacheKey = (RefId, bool, bool);

/// Font cache of one document's render.
pub struct FontLoader {
    cache: HashMap<CacheKey, Option<Arc<LoadedFont>>>,
}

impl FontLoader {
    pub fn new() -> FontLoader {
        FontLoader { cache: HashMap::new() }
    }

    /// Load the font for a resource reference with the requested style.
    /// Returns the global fallback for unknown references; `None` only when
    /// even the fallback could not be built.
    pub fn load(
        &mut self,
        doc: &Document,
        archive: &ArchiveCache,
        id: RefId,
        bold: bool,
        italic: bool,
    ) -> Option<Arc<LoadedFont>> {
        let key = (id, bold, italic);
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }
        let loaded = match doc.fonts.get(&id) {
            Some(res) => {
                let bold = bold || res.bold;
                let italic = italic || res.italic;
                match resolve(archive, res, bold, italic) {
                    Some(font) => Some(font),
                    None => {
                        warn!("font {} ({}) not available, using fallback", id, res.font_name);
                        FALLBACK.clone()
                    }
                }
            }
            None => {
                warn!("font {id} not present in document resources");
                FALLBACK.clone()
            }
        };
        self.cache.insert(key, loaded.clone());
        loaded
    }
}

impl Default for FontLoader {
    fn default() -> Self {
        FontLoader::new()
    }
}

fn resolve(
    archive: &ArchiveCache,
    res: &FontRes,
    bold: bool,
    italic: bool,
) -> Option<Arc<LoadedFont>> {
    if let Some(file) = &res.font_file {
        match archive.read_bytes(file.clean().as_str()) {
            Ok(bytes) => {
                if let Some(font) = LoadedFont::from_bytes(bytes, 0) {
                    return Some(font);
                }
                debug!("embedded font {file} is not parseable");
            }
            Err(e) => debug!("embedded font {file} unavailable: {e}"),
        }
    }

    if let Some(font) = query_system(&res.font_name, bold, italic) {
        return Some(font);
    }
    if let Some(family) = &res.family_name {
        if let Some(font) = query_system(family, bold, italic) {
            return Some(font);
        }
    }

    let name = res.font_name.as_str();
    if name == "宋体" || name.eq_ignore_ascii_case("simsun") {
        if let Some(font) = load_from_font_dirs("simsun.ttc") {
            return Some(font);
        }
    }
    if name == "黑体" || name.eq_ignore_ascii_case("simhei") {
        if let Some(font) = load_from_font_dirs("simhei.ttf") {
            return Some(font);
        }
    }
    None
}

fn query_system(name: &str, bold: bool, italic: bool) -> Option<Arc<LoadedFont>> {
    let query = fontdb::Query {
        families: &[fontdb::Family::Name(name)],
        weight: if bold { fontdb::Weight::BOLD } else { fontdb::Weight::NORMAL },
        style: if italic { fontdb::Style::Italic } else { fontdb::Style::Normal },
        ..fontdb::Query::default()
    };
    FONT_DB.query(&query).and_then(load_face)
}

fn load_face(id: fontdb::ID) -> Option<Arc<LoadedFont>> {
    let face = FONT_DB.face(id)?;
    let index = face.index;
    match &face.source {
        fontdb::Source::File(path) => {
            LoadedFont::from_bytes(std::fs::read(path).ok()?, index)
        }
        fontdb::Source::Binary(data) => {
            LoadedFont::from_bytes(data.as_ref().as_ref().to_vec(), index)
        }
        fontdb::Source::SharedFile(path, _) => {
            LoadedFont::from_bytes(std::fs::read(path).ok()?, index)
        }
    }
}

fn load_from_font_dirs(target: &str) -> Option<Arc<LoadedFont>> {
    let path = util::find_first_file_in_dirs(&default_font_dirs(), target).ok()?;
    LoadedFont::from_bytes(std::fs::read(path).ok()?, 0)
}

/// Platform font directories searched for SimSun/SimHei files.
pub(crate) fn default_font_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = if cfg!(target_os = "windows") {
        vec![PathBuf::from("C:\\Windows\\Fonts")]
    } else if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/System/Library/Fonts"),
            PathBuf::from("/Library/Fonts"),
        ]
    } else {
        vec![
            PathBuf::from("/usr/share/fonts"),
            PathBuf::from("/usr/local/share/fonts"),
        ]
    };
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        if cfg!(target_os = "macos") {
            dirs.push(home.join("Library/Fonts"));
        } else {
            dirs.push(home.join(".fonts"));
            dirs.push(home.join(".local/share/fonts"));
        }
    }
    dirs
}
