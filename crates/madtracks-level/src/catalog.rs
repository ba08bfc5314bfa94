//! Anchor offsets of every known trackpart.
//!
//! Trackparts after the first of a sequence carry no coordinates in the level
//! file. Their placement is derived from where the previous parts end, which
//! only the game knows; this table records, per descriptor, the translation
//! (game units, game axes) and rotation (degrees, Euler XYZ, game axes) from a
//! part's anchor to the next one. Parts that can be attached by their other
//! end also carry the extra offset applied when the descriptor is inverted.

use std::collections::HashMap;

use madtracks_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{LevelError, Result};

/// Offsets of one trackpart descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackpartOffset {
    /// Descriptor filename, case preserved (e.g. `M_gris_rail_50.ini`).
    pub descriptor: String,
    /// Translation to the next anchor.
    pub position: Vec3,
    /// Rotation to the next anchor, degrees.
    pub rotation: Vec3,
    /// Extra translation when the part is inverted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_inverted: Option<Vec3>,
    /// Extra rotation when the part is inverted, degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_inverted: Option<Vec3>,
}

impl TrackpartOffset {
    /// Inverted offsets, if both are known.
    pub fn inverted(&self) -> Option<(Vec3, Vec3)> {
        Some((self.position_inverted?, self.rotation_inverted?))
    }
}

/// Trackpart size family, from the descriptor name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackpartCategory {
    /// `S_` descriptors.
    Small,
    /// `M_` descriptors.
    Medium,
    /// `G_` descriptors.
    Golf,
}

impl TrackpartCategory {
    /// Category of a descriptor filename.
    pub fn of(descriptor: &str) -> Option<Self> {
        match descriptor.split_once('_')?.0 {
            "S" => Some(Self::Small),
            "M" => Some(Self::Medium),
            "G" => Some(Self::Golf),
            _ => None,
        }
    }
}

type BuiltinEntry = (&'static str, [f64; 3], [f64; 3], Option<([f64; 3], [f64; 3])>);

const BUILTIN: &[BuiltinEntry] = &[
    ("M_gris_amorce_05_in.ini", [0.0, 0.0, 5.0], [0.0, 0.0, 0.0], None),
    ("M_gris_amorce_15_in.ini", [0.0, 0.0, 15.0], [0.0, 0.0, 0.0], None),
    ("M_gris_amorce_30_in.ini", [0.0, 0.0, 30.0], [0.0, 0.0, 0.0], None),
    ("M_gris_amorce_15_out.ini", [0.0, 0.0, 15.0], [0.0, 0.0, 0.0], Some(([0.0, 0.0, 15.0], [0.0, 180.0, 0.0]))),
    ("M_gris_amorce_30_out.ini", [0.0, 0.0, 30.0], [0.0, 0.0, 0.0], Some(([0.0, 0.0, 30.0], [0.0, 180.0, 0.0]))),
    ("M_gris_rail_15.ini", [0.0, 0.0, 15.0], [0.0, 0.0, 0.0], None),
    ("M_gris_rail_50.ini", [0.0, 0.0, 50.0], [0.0, 0.0, 0.0], None),
    ("M_neon_rail_50.ini", [0.0, 0.0, 50.0], [0.0, 0.0, 0.0], None),
    ("M_gris_virage_45_left.ini", [17.5848, 0.0, 42.4152], [0.0, 45.0, 0.0], None),
    ("M_gris_virage_45_right.ini", [-17.5848, 0.0, 42.4152], [0.0, -45.0, 0.0], None),
    ("M_gris_rampe_30_up.ini", [0.0, 10.9245, 40.3482], [-30.0, 0.0, 0.0], None),
    ("M_gris_rampe_30_down.ini", [0.0, -10.7132, 40.4182], [30.0, 0.0, 0.0], None),
    ("M_none_start.ini", [0.0, 0.0, 0.0], [0.0, 0.0, 0.0], None),
    ("M_none_checkpoint.ini", [0.0, 0.0, 0.0], [0.0, 0.0, 0.0], None),
    ("M_none_finish_50.ini", [0.0, 0.0, 0.0], [0.0, 0.0, 0.0], None),
    ("M_gris_to_S_50.ini", [0.0, 0.0, 50.0], [0.0, 0.0, 0.0], Some(([0.0, 0.0, 50.0], [0.0, 180.0, 0.0]))),
    ("S_bleu_amorce_15_in.ini", [0.0, 0.0, 15.0], [0.0, 0.0, 0.0], None),
    ("S_bleu_amorce_15_out.ini", [0.0, 0.0, 15.0], [0.0, 0.0, 0.0], Some(([0.0, 0.0, 15.0], [0.0, 180.0, 0.0]))),
    ("S_neon_rail_50.ini", [0.0, 0.0, 50.0], [0.0, 0.0, 0.0], None),
    ("S_neon_virage_45_left.ini", [8.7924, 0.0, 21.2076], [0.0, 45.0, 0.0], None),
    ("S_neon_virage_45_right.ini", [-8.7924, 0.0, 21.2076], [0.0, -45.0, 0.0], Some(([-8.7924, 0.0, 21.2076], [0.0, 135.0, 0.0]))),
    ("S_raye_rampe_30_up.ini", [0.0, 10.1114, 37.3328], [-30.0, 0.0, 0.0], None),
    ("S_raye_rampe_30_down.ini", [0.0, -10.342, 37.2943], [30.0, 0.0, 0.0], None),
    ("S_gris_to_M_50.ini", [0.0, 0.0, 50.0], [0.0, 0.0, 0.0], None),
    ("S_raye_looping.ini", [29.6271, 0.229707, 4.7106], [0.0, 0.0, 0.0], None),
    ("G_none_checkpoint.ini", [0.0, 0.0, 0.0], [0.0, 0.0, 0.0], None),
    ("G_none_finish.ini", [0.0, 0.0, 0.0], [0.0, 0.0, 0.0], None),
];

/// TOML layout of a catalog file: a list of `[[trackpart]]` tables.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    trackpart: Vec<TrackpartOffset>,
}

/// Read-only map from descriptor filename to its offsets.
///
/// Built once and shared by reference; lookups never mutate it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackpartCatalog {
    entries: HashMap<String, TrackpartOffset>,
}

impl TrackpartCatalog {
    /// An empty catalog: every lookup misses.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The catalog of the stock game trackparts.
    pub fn builtin() -> Self {
        Self::from_offsets(BUILTIN.iter().map(|&(name, pos, rot, inv)| TrackpartOffset {
            descriptor: name.to_string(),
            position: Vec3::from(pos),
            rotation: Vec3::from(rot),
            position_inverted: inv.map(|(p, _)| Vec3::from(p)),
            rotation_inverted: inv.map(|(_, r)| Vec3::from(r)),
        }))
    }

    /// Build a catalog from offsets. Later entries replace earlier ones.
    pub fn from_offsets(offsets: impl IntoIterator<Item = TrackpartOffset>) -> Self {
        Self {
            entries: offsets
                .into_iter()
                .map(|o| (o.descriptor.clone(), o))
                .collect(),
        }
    }

    /// Parse a catalog from TOML `[[trackpart]]` tables.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(text).map_err(|e| LevelError::Catalog(e.to_string()))?;
        Ok(Self::from_offsets(file.trackpart))
    }

    /// Load a catalog file.
    ///
    /// Read and parse failures are reported as [`LevelError::Catalog`] naming
    /// the file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| LevelError::Catalog(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text).map_err(|e| match e {
            LevelError::Catalog(message) => LevelError::Catalog(format!("{}: {message}", path.display())),
            other => other,
        })
    }

    /// This catalog with `other`'s entries added, replacing same-named ones.
    pub fn merged(mut self, other: TrackpartCatalog) -> Self {
        self.entries.extend(other.entries);
        self
    }

    /// Offsets of `descriptor`, matched exactly (case-sensitive).
    pub fn get(&self, descriptor: &str) -> Option<&TrackpartOffset> {
        self.entries.get(descriptor)
    }

    /// Whether `descriptor` is known.
    pub fn contains(&self, descriptor: &str) -> bool {
        self.entries.contains_key(descriptor)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, sorted by descriptor name.
    pub fn sorted(&self) -> Vec<&TrackpartOffset> {
        let mut all: Vec<_> = self.entries.values().collect();
        all.sort_by(|a, b| a.descriptor.cmp(&b.descriptor));
        all
    }

    /// Entries of one category, sorted by descriptor name.
    pub fn in_category(&self, category: TrackpartCategory) -> Vec<&TrackpartOffset> {
        self.sorted()
            .into_iter()
            .filter(|o| TrackpartCategory::of(&o.descriptor) == Some(category))
            .collect()
    }
}

impl Default for TrackpartCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let catalog = TrackpartCatalog::builtin();
        assert_eq!(catalog.len(), BUILTIN.len());

        let rail = catalog.get("M_gris_rail_50.ini").unwrap();
        assert_eq!(rail.position, Vec3::new(0.0, 0.0, 50.0));
        assert!(rail.inverted().is_none());

        let out = catalog.get("M_gris_amorce_15_out.ini").unwrap();
        let (pos, rot) = out.inverted().unwrap();
        assert_eq!(pos, Vec3::new(0.0, 0.0, 15.0));
        assert_eq!(rot, Vec3::new(0.0, 180.0, 0.0));
    }

    #[test]
    fn test_lookup_is_exact() {
        let catalog = TrackpartCatalog::builtin();
        assert!(catalog.contains("M_gris_rail_50.ini"));
        assert!(!catalog.contains("m_gris_rail_50.ini"));
        assert!(catalog.get("unknown.ini").is_none());
    }

    #[test]
    fn test_categories() {
        assert_eq!(TrackpartCategory::of("S_neon_rail_50.ini"), Some(TrackpartCategory::Small));
        assert_eq!(TrackpartCategory::of("M_none_start.ini"), Some(TrackpartCategory::Medium));
        assert_eq!(TrackpartCategory::of("G_none_finish.ini"), Some(TrackpartCategory::Golf));
        assert_eq!(TrackpartCategory::of("tree.ini"), None);

        let catalog = TrackpartCatalog::builtin();
        let golf = catalog.in_category(TrackpartCategory::Golf);
        let names: Vec<_> = golf.iter().map(|o| o.descriptor.as_str()).collect();
        assert_eq!(names, ["G_none_checkpoint.ini", "G_none_finish.ini"]);
    }

    #[test]
    fn test_toml_override() {
        let extra = TrackpartCatalog::from_toml_str(
            r#"
[[trackpart]]
descriptor = "M_gris_rail_50.ini"
position = [0.0, 0.0, 49.5]
rotation = [0.0, 0.0, 0.0]

[[trackpart]]
descriptor = "W_bois_rail_20.ini"
position = [0.0, 0.0, 20.0]
rotation = [0.0, 0.0, 0.0]
position_inverted = [0.0, 0.0, 20.0]
rotation_inverted = [0.0, 180.0, 0.0]
"#,
        )
        .unwrap();
        assert_eq!(extra.len(), 2);

        let catalog = TrackpartCatalog::builtin().merged(extra);
        assert_eq!(catalog.len(), BUILTIN.len() + 1);
        assert_eq!(catalog.get("M_gris_rail_50.ini").unwrap().position.z, 49.5);
        assert!(catalog.get("W_bois_rail_20.ini").unwrap().inverted().is_some());
    }

    #[test]
    fn test_invalid_toml() {
        let result = TrackpartCatalog::from_toml_str("[[trackpart]]\ndescriptor = 3\n");
        assert!(matches!(result, Err(LevelError::Catalog(_))));
    }

    #[test]
    fn test_load_names_file() {
        let path = std::env::temp_dir().join(format!("madtracks_catalog_{}.toml", std::process::id()));
        std::fs::write(&path, "[[trackpart]]\ndescriptor = 3\n").unwrap();
        let err = TrackpartCatalog::load(&path).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, LevelError::Catalog(_)));
        assert!(message.starts_with(&format!("invalid trackpart catalog: {}: ", path.display())));
        assert_eq!(message.matches("invalid trackpart catalog").count(), 1);
        let _ = std::fs::remove_file(&path);

        let err = TrackpartCatalog::load(&path).unwrap_err();
        assert!(matches!(err, LevelError::Catalog(ref m) if m.starts_with(&path.display().to_string())));
    }
}
