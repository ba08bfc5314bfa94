//! Object descriptors: the `.ini` files a level section refers to.
//!
//! A descriptor holds one `[object]` section naming the mesh to display
//! (`Filename`), the gameplay type (`ObjectType`) and, for trackparts, whether
//! the part is attached by its other end (`Invert`).

use std::collections::HashMap;
use std::path::PathBuf;

use madtracks_ini::{IniFile, Section, Value};
use serde::{Deserialize, Serialize};

use crate::error::{LevelError, Result};
use crate::settings::ImportSettings;

/// Gameplay types that make an object part of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackpartKind {
    /// Plain track segment.
    Trackpart,
    /// Race start.
    Start,
    /// Combined start and finish line.
    StartFinish,
    /// Checkpoint gate.
    Checkpoint,
    /// Finish line.
    Finish,
    /// Looping segment.
    Looping,
}

impl TrackpartKind {
    /// Parse the `ObjectType` string used in descriptors.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "trackpart" => Some(Self::Trackpart),
            "start" => Some(Self::Start),
            "startfinish" => Some(Self::StartFinish),
            "checkpoint" => Some(Self::Checkpoint),
            "finish" => Some(Self::Finish),
            "looping" => Some(Self::Looping),
            _ => None,
        }
    }
}

/// The `ObjectType` of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObjectType {
    /// No `ObjectType` key.
    #[default]
    None,
    /// One of the trackpart family.
    Trackpart(TrackpartKind),
    /// Any other type (lights, pickups, zones...).
    Other(String),
}

impl ObjectType {
    /// Classify an `ObjectType` value.
    pub fn parse(s: &str) -> Self {
        match TrackpartKind::parse(s) {
            Some(kind) => Self::Trackpart(kind),
            None => Self::Other(s.to_string()),
        }
    }

    /// Whether objects of this type are chained into trackpart sequences.
    pub fn is_trackpart(&self) -> bool {
        matches!(self, Self::Trackpart(_))
    }
}

/// A resolved object descriptor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Descriptor {
    /// Gameplay type.
    pub object_type: ObjectType,
    /// Mesh file name with the leading `geometry/` removed, if any.
    pub mesh: Option<String>,
    /// Attach the part by its other end.
    pub invert: bool,
}

impl Descriptor {
    /// Read a descriptor from its parsed `.ini` content.
    pub fn from_ini(filename: &str, ini: &IniFile) -> Result<Self> {
        let object = ini
            .section("object")
            .ok_or_else(|| LevelError::invalid_descriptor(filename, "no [object] section"))?;
        Ok(Self::from_section(object))
    }

    /// Read a descriptor from its `[object]` section.
    pub fn from_section(object: &Section) -> Self {
        let object_type = match object.get("ObjectType") {
            None => ObjectType::None,
            Some(Value::String(s)) => ObjectType::parse(s),
            Some(other) => ObjectType::Other(other.to_string()),
        };

        let mesh = object
            .get("Filename")
            .and_then(Value::as_str)
            .map(|f| strip_geometry_prefix(f).to_string());

        let invert = match object.get("Invert") {
            None => false,
            Some(Value::Number(n)) => *n != 0.0,
            Some(Value::String(s)) => !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")),
            Some(Value::Tuple(_)) => true,
        };

        Self {
            object_type,
            mesh,
            invert,
        }
    }

    /// Whether this descriptor is chained into trackpart sequences.
    pub fn is_trackpart(&self) -> bool {
        self.object_type.is_trackpart()
    }

    /// Mesh file to display, or `fallback` if the descriptor has none.
    pub fn mesh_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.mesh.as_deref().unwrap_or(fallback)
    }
}

/// Strip the `geometry/` directory that mesh references start with.
pub fn strip_geometry_prefix(filename: &str) -> &str {
    match filename.split_once(['/', '\\']) {
        Some((_, rest)) => rest,
        None => filename,
    }
}

/// Looks up descriptors by the filename a level section references.
pub trait DescriptorResolver {
    /// Resolve `filename` into a descriptor.
    fn resolve(&self, filename: &str) -> Result<Descriptor>;
}

impl DescriptorResolver for HashMap<String, Descriptor> {
    fn resolve(&self, filename: &str) -> Result<Descriptor> {
        self.get(filename)
            .cloned()
            .ok_or_else(|| LevelError::unresolved(filename, "not found"))
    }
}

/// Reads descriptors from the game's descriptor directory.
#[derive(Debug, Clone)]
pub struct FsDescriptorResolver {
    dir: PathBuf,
}

impl FsDescriptorResolver {
    /// Resolve descriptors below `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve descriptors from the directory configured in `settings`.
    pub fn from_settings(settings: &ImportSettings) -> Self {
        Self::new(settings.descriptor_root())
    }
}

impl DescriptorResolver for FsDescriptorResolver {
    fn resolve(&self, filename: &str) -> Result<Descriptor> {
        let path = self.dir.join(filename);
        let ini = IniFile::read(&path)
            .map_err(|e| LevelError::unresolved(filename, format!("{}: {e}", path.display())))?;
        Descriptor::from_ini(filename, &ini)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Descriptor {
        Descriptor::from_ini("test.ini", &IniFile::parse(text).unwrap()).unwrap()
    }

    #[test]
    fn test_trackpart_descriptor() {
        let d = parse(
            "[object]\nFilename = \"geometry/M_gris_amorce_15.ldo\"\nObjectType = \"trackpart\"\nInvert = 1\n",
        );
        assert_eq!(d.object_type, ObjectType::Trackpart(TrackpartKind::Trackpart));
        assert!(d.is_trackpart());
        assert_eq!(d.mesh.as_deref(), Some("M_gris_amorce_15.ldo"));
        assert!(d.invert);
    }

    #[test]
    fn test_trackpart_family() {
        for (name, kind) in [
            ("start", TrackpartKind::Start),
            ("startfinish", TrackpartKind::StartFinish),
            ("checkpoint", TrackpartKind::Checkpoint),
            ("finish", TrackpartKind::Finish),
            ("looping", TrackpartKind::Looping),
        ] {
            assert_eq!(ObjectType::parse(name), ObjectType::Trackpart(kind));
        }
        assert!(!ObjectType::parse("light").is_trackpart());
        assert!(!ObjectType::parse("Trackpart").is_trackpart());
        assert!(!ObjectType::None.is_trackpart());
    }

    #[test]
    fn test_plain_object_without_mesh() {
        let d = parse("[object]\nObjectType = \"bonus\"\n");
        assert_eq!(d.object_type, ObjectType::Other("bonus".into()));
        assert!(!d.invert);
        assert_eq!(d.mesh_or("node.ldo"), "node.ldo");

        let d = parse("[object]\nFilename = \"geometry/tree.ldo\"\n");
        assert_eq!(d.object_type, ObjectType::None);
        assert_eq!(d.mesh_or("node.ldo"), "tree.ldo");
    }

    #[test]
    fn test_invert_values() {
        assert!(!parse("[object]\nInvert = 0\n").invert);
        assert!(parse("[object]\nInvert = \"true\"\n").invert);
        assert!(!parse("[object]\nInvert = \"false\"\n").invert);
    }

    #[test]
    fn test_missing_object_section() {
        let ini = IniFile::parse("[other]\nX = 1\n").unwrap();
        let result = Descriptor::from_ini("bad.ini", &ini);
        assert!(matches!(result, Err(LevelError::InvalidDescriptor { .. })));
    }

    #[test]
    fn test_map_resolver_miss() {
        let map: HashMap<String, Descriptor> = HashMap::new();
        let result = map.resolve("nothing.ini");
        assert!(matches!(
            result,
            Err(LevelError::UnresolvedDescriptor { ref filename, .. }) if filename == "nothing.ini"
        ));
    }

    #[test]
    fn test_fs_resolver() {
        let dir = std::env::temp_dir().join(format!("madtracks_descriptor_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("M_none_start.ini"),
            "[object]\nFilename = \"geometry/M_none_start.ldo\"\nObjectType = \"start\"\n",
        )
        .unwrap();

        let resolver = FsDescriptorResolver::new(&dir);
        let d = resolver.resolve("M_none_start.ini").unwrap();
        assert_eq!(d.object_type, ObjectType::Trackpart(TrackpartKind::Start));

        let missing = resolver.resolve("missing.ini");
        assert!(matches!(missing, Err(LevelError::UnresolvedDescriptor { .. })));

        let settings = ImportSettings {
            game_dir: dir.clone(),
            descriptor_dir: PathBuf::from("."),
            ..ImportSettings::default()
        };
        let d = FsDescriptorResolver::from_settings(&settings)
            .resolve("M_none_start.ini")
            .unwrap();
        assert_eq!(d.mesh.as_deref(), Some("M_none_start.ldo"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
