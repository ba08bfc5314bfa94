//! Explicitly placed entities and the trackpart anchor.

use std::path::{Path, PathBuf};

use madtracks_ini::{Section, Value};
use madtracks_math::{
    degrees_to_radians, euler_from_rotation_matrix, rotate_euler_xyz, rotation_matrix_from_directions,
    rotation_to_host, to_host_axis, to_host_coord, Vec3,
};
use serde::{Deserialize, Serialize};

use crate::catalog::TrackpartOffset;
use crate::error::{LevelError, Result};

/// How a level section is dispatched, from its `Filename` extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionKind {
    /// `.ldo`: a raw mesh placed as-is.
    Geometry,
    /// `.ini`: an object descriptor.
    Descriptor,
    /// Anything else.
    Unknown(String),
}

impl SectionKind {
    /// Classify a `Filename` value. The extension is matched case-insensitively.
    pub fn of(filename: &str) -> Self {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "ldo" => Self::Geometry,
            "ini" => Self::Descriptor,
            _ => Self::Unknown(ext),
        }
    }
}

/// `Filename` of a level section, if it has a string one.
pub fn section_filename(section: &Section) -> Option<&str> {
    section.get("Filename").and_then(Value::as_str)
}

/// An object placed by a level section carrying its own coordinates.
///
/// Positions and directions are in game space, exactly as read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedEntity {
    /// Section name.
    pub name: String,
    /// Level file the section was read from.
    pub source_file: PathBuf,
    /// Index of the section in that file.
    pub section_index: usize,
    /// Referenced geometry or descriptor file.
    pub filename: String,
    /// Mesh to display, relative to the geometry directory.
    pub mesh: String,
    /// Position, game space.
    pub position: Vec3,
    /// Forward direction, game space.
    pub direction_at: Vec3,
    /// Up direction, game space.
    pub direction_up: Vec3,
}

impl PlacedEntity {
    /// Read the placement parameters of a section.
    ///
    /// `mesh` is the mesh the section resolves to. Fails with
    /// [`LevelError::MissingParameter`] if `Position`, `DirectionAT`,
    /// `DirectionUp` or `Filename` is absent or not of the expected shape.
    pub fn from_section(
        section: &Section,
        source_file: &Path,
        section_index: usize,
        mesh: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            name: section.name.clone(),
            source_file: source_file.to_path_buf(),
            section_index,
            filename: section_filename(section)
                .ok_or_else(|| LevelError::MissingParameter("Filename".into()))?
                .to_string(),
            mesh: mesh.into(),
            position: triple(section, "Position")?,
            direction_at: triple(section, "DirectionAT")?,
            direction_up: triple(section, "DirectionUp")?,
        })
    }
}

fn triple(section: &Section, name: &str) -> Result<Vec3> {
    section
        .get(name)
        .and_then(Value::as_triple)
        .map(Vec3::from)
        .ok_or_else(|| LevelError::MissingParameter(name.into()))
}

/// Running placement of a trackpart sequence, in host space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Position, host units.
    pub position: Vec3,
    /// Euler XYZ rotation, radians.
    pub rotation: Vec3,
}

impl Anchor {
    /// Anchor at the first part of a sequence.
    pub fn from_entity(entity: &PlacedEntity, scale: f64) -> Self {
        let matrix = rotation_matrix_from_directions(&entity.direction_at, &entity.direction_up);
        Self {
            position: to_host_coord(&entity.position, scale),
            rotation: euler_from_rotation_matrix(&rotation_to_host(&matrix)),
        }
    }

    /// Move the anchor by one catalog step.
    ///
    /// The translation is rotated by the current rotation before being added;
    /// the rotation offset is added component-wise.
    pub fn step(self, position: &Vec3, rotation: &Vec3, scale: f64) -> Self {
        Self {
            position: self.position + rotate_euler_xyz(&to_host_coord(position, scale), &self.rotation),
            rotation: self.rotation + degrees_to_radians(&to_host_axis(rotation)),
        }
    }

    /// Anchor of the part that attaches after a part placed here.
    pub fn advance(self, offset: &TrackpartOffset, scale: f64) -> Self {
        self.step(&offset.position, &offset.rotation, scale)
    }

    /// Placement of an inverted part attached at this anchor.
    ///
    /// `None` when the catalog has no inverted offsets for the part. The
    /// result only places that part; the next anchor still follows from
    /// [`advance`](Self::advance) on `self`.
    pub fn inverted(self, offset: &TrackpartOffset, scale: f64) -> Option<Self> {
        let (position, rotation) = offset.inverted()?;
        Some(self.step(&position, &rotation, scale))
    }
}
