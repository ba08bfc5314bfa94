//! Level section walker.
//!
//! Dispatches each section of a level file on the extension of its
//! `Filename`: `.ldo` sections are raw geometry, `.ini` sections are object
//! descriptors. A descriptor whose type is in the trackpart family starts a
//! sequence, which the assembler extends over the following single-parameter
//! sections; the walk resumes after the last of them.

use std::path::{Path, PathBuf};

use madtracks_ini::Section;
use madtracks_math::{euler_from_rotation_matrix, rotation_matrix_from_directions, rotation_to_host, to_host_coord};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::assemble::{Assembler, SequencedPart, TrackpartSequence};
use crate::catalog::TrackpartCatalog;
use crate::descriptor::{strip_geometry_prefix, Descriptor, DescriptorResolver};
use crate::error::{LevelError, Result};
use crate::export::{ExportObject, SequenceSlot};
use crate::placement::{section_filename, PlacedEntity, SectionKind};
use crate::settings::ImportSettings;

/// A placed descriptor instance that is not a trackpart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedObject {
    /// Placement, as read.
    pub entity: PlacedEntity,
    /// Resolved descriptor.
    pub descriptor: Descriptor,
}

/// Everything a level file places.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelScene {
    /// Level file.
    pub source: PathBuf,
    /// Raw geometry instances, in file order.
    pub geometry: Vec<PlacedEntity>,
    /// Descriptor instances outside sequences, in file order.
    pub objects: Vec<PlacedObject>,
    /// Trackpart sequences, in file order.
    pub sequences: Vec<TrackpartSequence>,
}

impl LevelScene {
    /// Number of trackparts over all sequences.
    pub fn trackpart_count(&self) -> usize {
        self.sequences.iter().map(TrackpartSequence::len).sum()
    }

    /// All trackparts ordered by sequence, then position in the sequence.
    pub fn trackparts_sorted(&self) -> Vec<&SequencedPart> {
        let mut parts: Vec<_> = self.sequences.iter().flat_map(|s| s.parts.iter()).collect();
        parts.sort_by_key(|p| (p.sequence_index, p.position_in_sequence));
        parts
    }

    /// The scene as host objects, ready for [`export_level`](crate::export_level).
    pub fn to_export_objects(&self, scale: f64) -> Vec<ExportObject> {
        let placed = |entity: &PlacedEntity, descriptor: Option<String>| {
            let matrix = rotation_matrix_from_directions(&entity.direction_at, &entity.direction_up);
            ExportObject {
                name: entity.mesh.clone(),
                descriptor,
                trackpart: None,
                location: to_host_coord(&entity.position, scale),
                rotation_euler: euler_from_rotation_matrix(&rotation_to_host(&matrix)),
            }
        };

        let geometry = self.geometry.iter().map(|e| placed(e, None));
        let objects = self
            .objects
            .iter()
            .map(|o| placed(&o.entity, Some(o.entity.filename.clone())));
        let trackparts = self.trackparts_sorted().into_iter().map(|p| ExportObject {
            name: p.entity.mesh.clone(),
            descriptor: Some(p.entity.filename.clone()),
            trackpart: Some(SequenceSlot {
                sequence_index: p.sequence_index,
                position_in_sequence: p.position_in_sequence,
            }),
            location: p.anchor.position,
            rotation_euler: p.anchor.rotation,
        });

        geometry.chain(objects).chain(trackparts).collect()
    }
}

/// Walks the sections of a level file.
pub struct Walker<'a, R: ?Sized> {
    catalog: &'a TrackpartCatalog,
    resolver: &'a R,
    settings: &'a ImportSettings,
}

impl<'a, R: DescriptorResolver + ?Sized> Walker<'a, R> {
    /// Create a walker.
    pub fn new(catalog: &'a TrackpartCatalog, resolver: &'a R, settings: &'a ImportSettings) -> Self {
        Self {
            catalog,
            resolver,
            settings,
        }
    }

    /// Classify and place every section of `sections`, read from `source`.
    ///
    /// Fails on the first section that cannot be placed; the error names the
    /// section, its index and, inside a sequence, the sequence index.
    pub fn walk(&self, sections: &[Section], source: &Path) -> Result<LevelScene> {
        let assembler = Assembler {
            catalog: self.catalog,
            resolver: self.resolver,
            scale: self.settings.scale,
            fallback_mesh: &self.settings.fallback_mesh,
        };
        let mut scene = LevelScene {
            source: source.to_path_buf(),
            ..LevelScene::default()
        };

        let mut si = 0;
        while si < sections.len() {
            let section = &sections[si];
            let at_section = |e: LevelError| e.at_section(source, si, &section.name);

            let filename = section_filename(section)
                .ok_or_else(|| at_section(LevelError::MissingParameter("Filename".into())))?;

            match SectionKind::of(filename) {
                SectionKind::Geometry => {
                    let entity = PlacedEntity::from_section(section, source, si, strip_geometry_prefix(filename))
                        .map_err(at_section)?;
                    scene.geometry.push(entity);
                }
                SectionKind::Descriptor => {
                    let descriptor = self.resolver.resolve(filename).map_err(at_section)?;
                    if descriptor.is_trackpart() {
                        let (sequence, last) =
                            assembler.assemble(sections, si, descriptor, scene.sequences.len(), source)?;
                        scene.sequences.push(sequence);
                        si = last;
                    } else {
                        let mesh = descriptor.mesh_or(&self.settings.fallback_mesh).to_string();
                        let entity = PlacedEntity::from_section(section, source, si, mesh).map_err(at_section)?;
                        scene.objects.push(PlacedObject { entity, descriptor });
                    }
                }
                SectionKind::Unknown(ext) => {
                    warn!(section = si, filename, extension = %ext, "unknown section type, skipped");
                }
            }
            si += 1;
        }

        debug!(
            geometry = scene.geometry.len(),
            objects = scene.objects.len(),
            sequences = scene.sequences.len(),
            "walked level"
        );
        Ok(scene)
    }
}
