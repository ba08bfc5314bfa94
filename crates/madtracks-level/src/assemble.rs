//! Trackpart sequence assembly.
//!
//! The first section of a sequence carries a full placement. Each following
//! section carries only a `Filename`: it is placed where the previous part
//! ends, that is at the first part's anchor moved through the catalog offsets
//! of every part before it. An inverted part is additionally moved by its own
//! inverted offsets, which do not carry over to the parts after it.
//! A sequence continues while sections have exactly one parameter.

use std::path::Path;

use madtracks_ini::Section;
use madtracks_math::{euler_to_direction_vectors, to_game_axis, to_game_coord};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::TrackpartCatalog;
use crate::descriptor::{Descriptor, DescriptorResolver};
use crate::error::{LevelError, Result};
use crate::placement::{section_filename, Anchor, PlacedEntity, SectionKind};

/// One trackpart of a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencedPart {
    /// Placement in game space. Computed from the anchor for chained parts.
    pub entity: PlacedEntity,
    /// Placement in host space.
    pub anchor: Anchor,
    /// Resolved descriptor.
    pub descriptor: Descriptor,
    /// Sequence this part belongs to.
    pub sequence_index: usize,
    /// Position of the part in its sequence, from 0.
    pub position_in_sequence: usize,
    /// Whether the part is attached by its other end.
    pub inverted: bool,
}

/// An ordered chain of trackparts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackpartSequence {
    /// Index of the sequence in its level, from 0.
    pub sequence_index: usize,
    /// Parts in chain order.
    pub parts: Vec<SequencedPart>,
}

impl TrackpartSequence {
    /// Number of parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether the sequence has no parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The part carrying the explicit placement.
    pub fn first(&self) -> Option<&SequencedPart> {
        self.parts.first()
    }

    /// Parts ordered by position in the sequence.
    pub fn parts_sorted(&self) -> Vec<&SequencedPart> {
        let mut parts: Vec<_> = self.parts.iter().collect();
        parts.sort_by_key(|p| p.position_in_sequence);
        parts
    }
}

/// Places the trackparts of one sequence.
pub struct Assembler<'a, R: ?Sized> {
    /// Offsets of the known trackparts.
    pub catalog: &'a TrackpartCatalog,
    /// Descriptor lookup for chained sections.
    pub resolver: &'a R,
    /// Game to host scale.
    pub scale: f64,
    /// Mesh used for descriptors without one.
    pub fallback_mesh: &'a str,
}

impl<'a, R: DescriptorResolver + ?Sized> Assembler<'a, R> {
    /// Assemble the sequence starting at `sections[start]`.
    ///
    /// `first` is the already resolved descriptor of that section. Returns the
    /// sequence and the index of the last section it consumed. Errors name the
    /// failing section and `sequence_index`; a `start` past the last section
    /// fails with [`LevelError::SequenceStart`].
    pub fn assemble(
        &self,
        sections: &[Section],
        start: usize,
        first: Descriptor,
        sequence_index: usize,
        source: &Path,
    ) -> Result<(TrackpartSequence, usize)> {
        let head_section = sections.get(start).ok_or_else(|| {
            LevelError::SequenceStart {
                start,
                len: sections.len(),
            }
            .in_sequence(sequence_index)
        })?;
        let end = sections
            .iter()
            .skip(start + 1)
            .position(|s| s.param_count() != 1)
            .map_or(sections.len(), |n| start + 1 + n);

        let head = self
            .head(head_section, start, first, sequence_index, source)
            .map_err(|e| e.at_section(source, start, &head_section.name).in_sequence(sequence_index))?;
        let next = self.next_anchor(head.anchor, &head.entity.filename, start);

        let (parts, _) = (start + 1..end).try_fold((vec![head], next), |(mut parts, anchor), idx| {
            let section = &sections[idx];
            let (part, next) = self
                .chained(section, idx, anchor, parts.len(), sequence_index, source)
                .map_err(|e| e.at_section(source, idx, &section.name).in_sequence(sequence_index))?;
            parts.push(part);
            Ok::<_, LevelError>((parts, next))
        })?;

        debug!(sequence_index, parts = parts.len(), "assembled trackpart sequence");
        Ok((
            TrackpartSequence {
                sequence_index,
                parts,
            },
            end - 1,
        ))
    }

    fn head(
        &self,
        section: &Section,
        index: usize,
        descriptor: Descriptor,
        sequence_index: usize,
        source: &Path,
    ) -> Result<SequencedPart> {
        let entity = PlacedEntity::from_section(section, source, index, descriptor.mesh_or(self.fallback_mesh))?;
        Ok(SequencedPart {
            anchor: Anchor::from_entity(&entity, self.scale),
            entity,
            inverted: descriptor.invert,
            descriptor,
            sequence_index,
            position_in_sequence: 0,
        })
    }

    /// Anchor where the part after `filename` attaches, given where
    /// `filename` itself attached.
    fn next_anchor(&self, anchor: Anchor, filename: &str, index: usize) -> Anchor {
        match self.catalog.get(filename) {
            Some(offset) => anchor.advance(offset, self.scale),
            None => {
                warn!(descriptor = filename, section = index, "no catalog entry, anchor not advanced");
                anchor
            }
        }
    }

    /// Place one chained section at `anchor`. Returns the part and the anchor
    /// for the section after it.
    fn chained(
        &self,
        section: &Section,
        index: usize,
        anchor: Anchor,
        position_in_sequence: usize,
        sequence_index: usize,
        source: &Path,
    ) -> Result<(SequencedPart, Anchor)> {
        let filename = section_filename(section).ok_or_else(|| LevelError::MissingParameter("Filename".into()))?;

        let descriptor = match SectionKind::of(filename) {
            SectionKind::Descriptor => self.resolver.resolve(filename)?,
            _ => Descriptor::default(),
        };
        if !descriptor.is_trackpart() {
            warn!(
                section = index,
                filename,
                "single-parameter section continues a trackpart sequence but is not a trackpart"
            );
        }

        let placed = match self.catalog.get(filename) {
            Some(offset) if descriptor.invert => anchor.inverted(offset, self.scale).unwrap_or_else(|| {
                warn!(descriptor = filename, "inverted trackpart has no inverted offsets");
                anchor
            }),
            _ => anchor,
        };

        let (at, up) = euler_to_direction_vectors(&placed.rotation);
        let entity = PlacedEntity {
            name: section.name.clone(),
            source_file: source.to_path_buf(),
            section_index: index,
            filename: filename.to_string(),
            mesh: descriptor.mesh_or(self.fallback_mesh).to_string(),
            position: to_game_coord(&placed.position, self.scale),
            direction_at: to_game_axis(&at),
            direction_up: to_game_axis(&up),
        };

        let part = SequencedPart {
            entity,
            anchor: placed,
            inverted: descriptor.invert,
            descriptor,
            sequence_index,
            position_in_sequence,
        };
        Ok((part, self.next_anchor(anchor, filename, index)))
    }
}
