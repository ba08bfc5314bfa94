//! Level export.
//!
//! Objects that are not trackparts are written first, each with a full
//! placement. Trackparts follow, ordered by sequence then position; only the
//! first part of each sequence carries a placement, the game chains the rest.

use madtracks_ini::{IniFile, Section, Value};
use madtracks_math::{euler_to_direction_vectors, to_game_axis, to_game_coord, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Position of a trackpart in its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SequenceSlot {
    /// Sequence index.
    pub sequence_index: usize,
    /// Position in the sequence, from 0.
    pub position_in_sequence: usize,
}

/// A host scene object to write to a level file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportObject {
    /// Object name. For raw geometry, the mesh file name.
    pub name: String,
    /// Descriptor filename, if the object is a descriptor instance.
    #[serde(default)]
    pub descriptor: Option<String>,
    /// Sequence slot, if the object is a trackpart.
    #[serde(default)]
    pub trackpart: Option<SequenceSlot>,
    /// Location, host space.
    pub location: Vec3,
    /// Euler XYZ rotation, radians, host space.
    pub rotation_euler: Vec3,
}

impl ExportObject {
    /// Section name and `Filename` value of this object.
    pub fn section_name(&self) -> String {
        match &self.descriptor {
            Some(descriptor) => descriptor.clone(),
            None => {
                let stem = self.name.split(".ldo").next().unwrap_or(&self.name);
                format!("geometry/{stem}.ldo")
            }
        }
    }

    fn carries_placement(&self) -> bool {
        self.trackpart.map_or(true, |slot| slot.position_in_sequence == 0)
    }

    fn to_section(&self, scale: f64) -> Section {
        let name = self.section_name();
        let mut section = Section::new(name.clone());
        if self.carries_placement() {
            let (at, up) = euler_to_direction_vectors(&self.rotation_euler);
            section = section
                .with("Position", tuple(to_game_coord(&self.location, scale)))
                .with("DirectionAT", tuple(to_game_axis(&at)))
                .with("DirectionUp", tuple(to_game_axis(&up)));
        }
        section.with("Filename", Value::String(name))
    }
}

fn tuple(v: Vec3) -> Value {
    Value::Tuple(v.iter().copied().collect())
}

/// Build the level file for `objects`. Host positions are divided by `scale`.
pub fn export_level(objects: &[ExportObject], scale: f64) -> IniFile {
    let mut trackparts: Vec<(SequenceSlot, &ExportObject)> = objects
        .iter()
        .filter_map(|o| o.trackpart.map(|slot| (slot, o)))
        .collect();
    trackparts.sort_by_key(|(slot, _)| *slot);

    let sections: Vec<Section> = objects
        .iter()
        .filter(|o| o.trackpart.is_none())
        .chain(trackparts.into_iter().map(|(_, o)| o))
        .map(|o| o.to_section(scale))
        .collect();

    debug!(sections = sections.len(), "exported level");
    IniFile { sections }
}
