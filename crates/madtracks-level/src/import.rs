//! Level import into a host scene.
//!
//! The host is reached through two collaborators: a [`MeshImporter`] that
//! turns a geometry file into a host mesh, and an [`ObjectPlacer`] that
//! creates an object for each placement.

use std::path::{Path, PathBuf};

use madtracks_ini::IniFile;
use madtracks_math::{axis_angle_from_rotation_matrix, rotation_matrix_from_directions, to_host_axis, to_host_coord, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::TrackpartCatalog;
use crate::descriptor::{DescriptorResolver, FsDescriptorResolver};
use crate::error::{LevelError, Result};
use crate::placement::PlacedEntity;
use crate::settings::ImportSettings;
use crate::walker::{LevelScene, Walker};

/// Loads geometry files into host meshes.
pub trait MeshImporter {
    /// Host mesh handle.
    type Mesh;

    /// Import the geometry file at `path`.
    fn import_mesh(&mut self, path: &Path) -> Result<Self::Mesh>;
}

/// Creates host objects.
pub trait ObjectPlacer<M> {
    /// Create one object.
    fn place_object(&mut self, placement: HostPlacement<M>) -> Result<()>;
}

/// Host rotation of a placed object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Orientation {
    /// Rotation of `angle` radians about `axis`.
    AxisAngle {
        /// Unit rotation axis.
        axis: Vec3,
        /// Angle in radians.
        angle: f64,
    },
    /// Euler XYZ angles, radians.
    EulerXyz(Vec3),
}

/// What a placement comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementKind {
    /// Raw geometry.
    Geometry,
    /// Descriptor instance outside any sequence.
    Object,
    /// Part of a trackpart sequence.
    Trackpart {
        /// Sequence index.
        sequence_index: usize,
        /// Position in the sequence.
        position_in_sequence: usize,
    },
}

/// An object to create in the host scene.
#[derive(Debug, Clone, PartialEq)]
pub struct HostPlacement<M> {
    /// Object name.
    pub name: String,
    /// Imported mesh.
    pub mesh: M,
    /// Descriptor filename, for descriptor instances.
    pub descriptor: Option<String>,
    /// Origin of the placement.
    pub kind: PlacementKind,
    /// Location, host units.
    pub location: Vec3,
    /// Rotation.
    pub orientation: Orientation,
    /// Whether the trackpart is inverted.
    pub invert: bool,
}

/// Counts of what an import placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Geometry instances.
    pub geometry: usize,
    /// Descriptor instances.
    pub objects: usize,
    /// Trackpart sequences read.
    pub sequences: usize,
    /// Trackparts handed to the host.
    pub trackparts: usize,
}

/// Reads level files and hands their content to a host.
#[derive(Debug, Clone)]
pub struct LevelImporter {
    settings: ImportSettings,
    catalog: TrackpartCatalog,
}

impl LevelImporter {
    /// Create an importer with an explicit catalog.
    pub fn new(settings: ImportSettings, catalog: TrackpartCatalog) -> Self {
        Self { settings, catalog }
    }

    /// Create an importer with the built-in catalog, extended by
    /// `settings.catalog_file` if set.
    pub fn from_settings(settings: ImportSettings) -> Result<Self> {
        settings.validate()?;
        let catalog = match &settings.catalog_file {
            Some(path) => {
                let extra = TrackpartCatalog::load(path)?;
                debug!(path = %path.display(), entries = extra.len(), "loaded catalog overrides");
                TrackpartCatalog::builtin().merged(extra)
            }
            None => TrackpartCatalog::builtin(),
        };
        Ok(Self::new(settings, catalog))
    }

    /// Settings in use.
    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Catalog in use.
    pub fn catalog(&self) -> &TrackpartCatalog {
        &self.catalog
    }

    /// Path of a level given by name: used as-is if it exists, otherwise
    /// looked up in the level directory.
    pub fn level_path(&self, level: &Path) -> PathBuf {
        if level.exists() || level.is_absolute() {
            level.to_path_buf()
        } else {
            self.settings.level_path(level)
        }
    }

    /// Read and parse a level file.
    pub fn read_level(&self, path: &Path) -> Result<IniFile> {
        IniFile::read(path).map_err(|e| LevelError::ini(path, e))
    }

    /// Read a level and walk it with `resolver`.
    pub fn scene_with<R: DescriptorResolver + ?Sized>(&self, path: &Path, resolver: &R) -> Result<LevelScene> {
        let ini = self.read_level(path)?;
        Walker::new(&self.catalog, resolver, &self.settings).walk(&ini.sections, path)
    }

    /// Read a level and walk it, resolving descriptors from the game directory.
    pub fn scene(&self, path: &Path) -> Result<LevelScene> {
        self.scene_with(path, &FsDescriptorResolver::from_settings(&self.settings))
    }

    /// Import a level into the host.
    pub fn import<M, P>(&self, path: &Path, meshes: &mut M, placer: &mut P) -> Result<ImportSummary>
    where
        M: MeshImporter,
        P: ObjectPlacer<M::Mesh>,
    {
        let scene = self.scene(path)?;
        let summary = self.place_scene(&scene, meshes, placer)?;
        info!(
            level = %path.display(),
            geometry = summary.geometry,
            objects = summary.objects,
            sequences = summary.sequences,
            trackparts = summary.trackparts,
            "imported level"
        );
        Ok(summary)
    }

    /// Hand an already walked scene to the host.
    ///
    /// Trackpart sequences are skipped when `load_trackparts` is off.
    pub fn place_scene<M, P>(&self, scene: &LevelScene, meshes: &mut M, placer: &mut P) -> Result<ImportSummary>
    where
        M: MeshImporter,
        P: ObjectPlacer<M::Mesh>,
    {
        let mut summary = ImportSummary {
            sequences: scene.sequences.len(),
            ..ImportSummary::default()
        };

        for entity in &scene.geometry {
            let mesh = meshes.import_mesh(&self.settings.geometry_path(&entity.mesh))?;
            placer.place_object(self.explicit(entity, mesh, None, PlacementKind::Geometry, false))?;
            summary.geometry += 1;
        }

        for object in &scene.objects {
            let entity = &object.entity;
            let mesh = meshes.import_mesh(&self.settings.geometry_path(&entity.mesh))?;
            let descriptor = Some(entity.filename.clone());
            placer.place_object(self.explicit(entity, mesh, descriptor, PlacementKind::Object, false))?;
            summary.objects += 1;
        }

        if !self.settings.load_trackparts {
            return Ok(summary);
        }

        for part in scene.sequences.iter().flat_map(|s| &s.parts) {
            let entity = &part.entity;
            let mesh = meshes.import_mesh(&self.settings.geometry_path(&entity.mesh))?;
            let kind = PlacementKind::Trackpart {
                sequence_index: part.sequence_index,
                position_in_sequence: part.position_in_sequence,
            };
            let descriptor = Some(entity.filename.clone());
            let placement = if part.position_in_sequence == 0 {
                self.explicit(entity, mesh, descriptor, kind, part.inverted)
            } else {
                HostPlacement {
                    name: entity.name.clone(),
                    mesh,
                    descriptor,
                    kind,
                    location: part.anchor.position,
                    orientation: Orientation::EulerXyz(part.anchor.rotation),
                    invert: part.inverted,
                }
            };
            placer.place_object(placement)?;
            summary.trackparts += 1;
        }

        Ok(summary)
    }

    fn explicit<T>(
        &self,
        entity: &PlacedEntity,
        mesh: T,
        descriptor: Option<String>,
        kind: PlacementKind,
        invert: bool,
    ) -> HostPlacement<T> {
        let rotation = axis_angle_from_rotation_matrix(&rotation_matrix_from_directions(
            &entity.direction_at,
            &entity.direction_up,
        ));
        HostPlacement {
            name: entity.name.clone(),
            mesh,
            descriptor,
            kind,
            location: to_host_coord(&entity.position, self.settings.scale),
            orientation: Orientation::AxisAngle {
                axis: to_host_axis(&rotation.axis),
                angle: rotation.angle,
            },
            invert,
        }
    }
}
