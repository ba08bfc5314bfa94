#![warn(missing_docs)]

//! Reader and writer for the Mad Tracks .ini dialect.
//!
//! Level layouts and object descriptors share one text format: bracketed
//! section names followed by `Name = value` lines. Level files repeat section
//! names and rely on their order, so sections are kept as an ordered list
//! rather than a map.
//!
//! # Example
//!
//! ```
//! use madtracks_ini::{IniFile, Value};
//!
//! let ini = IniFile::parse("[foo.ini]\nPosition = 1,2,3\n").unwrap();
//! let position = ini.sections[0].get("Position").and_then(Value::as_triple);
//! assert_eq!(position, Some([1.0, 2.0, 3.0]));
//! ```

mod error;
mod parser;
mod writer;

pub use error::{IniError, Result};
pub use parser::{IniFile, Parameter, Parser, Section, Value};
pub use writer::float_format;
