#![warn(missing_docs)]

//! Mad Tracks level import and export.
//!
//! A level file is a list of sections, one per placed thing. Raw geometry and
//! plain objects carry their own placement; trackparts come in sequences
//! where only the first part is placed explicitly and the rest are chained
//! through the per-part offsets of the [`TrackpartCatalog`].
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use std::path::Path;
//!
//! use madtracks_ini::IniFile;
//! use madtracks_level::{Descriptor, ImportSettings, ObjectType, TrackpartCatalog, TrackpartKind, Walker};
//!
//! let resolver = HashMap::from([(
//!     "M_none_start.ini".to_string(),
//!     Descriptor {
//!         object_type: ObjectType::Trackpart(TrackpartKind::Start),
//!         mesh: Some("M_none_start.ldo".into()),
//!         invert: false,
//!     },
//! )]);
//! let ini = IniFile::parse(
//!     "[M_none_start.ini]\nPosition = 0,0,0\nDirectionAT = 0,0,1\nDirectionUp = 0,1,0\nFilename = \"M_none_start.ini\"\n",
//! )
//! .unwrap();
//!
//! let catalog = TrackpartCatalog::builtin();
//! let settings = ImportSettings::default();
//! let scene = Walker::new(&catalog, &resolver, &settings)
//!     .walk(&ini.sections, Path::new("level.ini"))
//!     .unwrap();
//! assert_eq!(scene.sequences.len(), 1);
//! ```

mod assemble;
mod catalog;
mod descriptor;
mod error;
mod export;
mod import;
mod placement;
mod settings;
mod walker;

pub use assemble::{Assembler, SequencedPart, TrackpartSequence};
pub use catalog::{TrackpartCatalog, TrackpartCategory, TrackpartOffset};
pub use descriptor::{
    strip_geometry_prefix, Descriptor, DescriptorResolver, FsDescriptorResolver, ObjectType, TrackpartKind,
};
pub use error::{LevelError, Result};
pub use export::{export_level, ExportObject, SequenceSlot};
pub use import::{
    HostPlacement, ImportSummary, LevelImporter, MeshImporter, ObjectPlacer, Orientation, PlacementKind,
};
pub use placement::{section_filename, Anchor, PlacedEntity, SectionKind};
pub use settings::ImportSettings;
pub use walker::{LevelScene, PlacedObject, Walker};
