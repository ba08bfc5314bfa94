//! Line-based parser for the Mad Tracks .ini dialect.
//!
//! Unlike a regular INI reader, sections are kept in file order and may repeat:
//! level files list one section per placed object, and the order of those
//! sections is what chains trackparts together.
//!
//! Each line is handled independently:
//! - everything from `//` on is a comment;
//! - spaces and tabs are removed (string values cannot contain whitespace);
//! - `[name]` opens a section, its name folded to lowercase;
//! - `Name=value` appends a parameter to the last opened section.

use std::path::Path;

use tracing::debug;

use crate::error::{IniError, Result};

/// A parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A single number.
    Number(f64),
    /// Comma-separated numbers (e.g. `Position = 1,2,3`).
    Tuple(Vec<f64>),
    /// Quoted string, quotes removed.
    String(String),
}

impl Value {
    /// Try to get as a single number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as a number tuple.
    pub fn as_tuple(&self) -> Option<&[f64]> {
        match self {
            Value::Tuple(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as a 3-component tuple.
    pub fn as_triple(&self) -> Option<[f64; 3]> {
        match self.as_tuple()? {
            [x, y, z] => Some([*x, *y, *z]),
            _ => None,
        }
    }

    /// Try to get as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// A `Name = value` line.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name, case preserved.
    pub name: String,
    /// Parsed value.
    pub value: Value,
}

impl Parameter {
    /// Create a parameter.
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A `[section]` and its parameters, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    /// Section name without brackets.
    pub name: String,
    /// Parameters in file order; names may repeat.
    pub params: Vec<Parameter>,
}

impl Section {
    /// Create an empty section.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Append a parameter (builder style).
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.params.push(Parameter::new(name, value));
        self
    }

    /// Value of the parameter `name`. The last occurrence wins.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params
            .iter()
            .rev()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// Check whether a parameter named `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }

    /// Number of parameter lines in the section.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

/// The complete parsed content of a .ini file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IniFile {
    /// Sections in file order, duplicates kept.
    pub sections: Vec<Section>,
}

impl IniFile {
    /// Parse .ini text.
    pub fn parse(text: &str) -> Result<Self> {
        Parser::parse(text)
    }

    /// Read and parse a .ini file. Non-UTF-8 bytes are replaced.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::parse(&String::from_utf8_lossy(&data))
    }

    /// First section named `name` (names are stored lowercase).
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// All sections named `name`, in file order.
    pub fn sections_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Section> + 'a {
        self.sections.iter().filter(move |s| s.name == name)
    }
}

/// Parser for the .ini dialect.
pub struct Parser {
    sections: Vec<Section>,
}

impl Parser {
    /// Parse .ini text into its sections.
    pub fn parse(text: &str) -> Result<IniFile> {
        let mut parser = Parser {
            sections: Vec::new(),
        };
        for (idx, line) in text.lines().enumerate() {
            parser.parse_line(idx + 1, line)?;
        }
        Ok(IniFile {
            sections: parser.sections,
        })
    }

    fn parse_line(&mut self, line_no: usize, raw: &str) -> Result<()> {
        let uncommented = match raw.find("//") {
            Some(idx) => &raw[..idx],
            None => raw,
        };
        let line: String = uncommented
            .chars()
            .filter(|&c| c != ' ' && c != '\t')
            .collect();

        if line.is_empty() {
            return Ok(());
        }

        if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
            let name = line[1..line.len() - 1].to_lowercase();
            self.sections.push(Section::new(name));
            return Ok(());
        }

        let param = parse_parameter(line_no, &line);
        match self.sections.last_mut() {
            Some(section) => {
                section.params.push(param);
                Ok(())
            }
            None => Err(IniError::malformed_section(line_no, line)),
        }
    }
}

/// Split `Name=value` on the first `=` and type the value.
///
/// Never fails: a line without `=` becomes a parameter with an empty string
/// value, and numbers that do not parse are kept as raw strings.
fn parse_parameter(line_no: usize, line: &str) -> Parameter {
    let Some((name, raw)) = line.split_once('=') else {
        debug!(line = line_no, text = line, "parameter line without '='");
        return Parameter::new(line, Value::String(String::new()));
    };

    let value = parse_value(raw).unwrap_or_else(|| {
        debug!(line = line_no, value = raw, "unparsable number kept as string");
        Value::String(raw.to_string())
    });
    Parameter::new(name, value)
}

fn parse_value(raw: &str) -> Option<Value> {
    if let Some(rest) = raw.strip_prefix('"') {
        let s = rest.strip_suffix('"').unwrap_or(rest);
        return Some(Value::String(s.to_string()));
    }
    if raw.contains(',') {
        let values = raw
            .split(',')
            .map(parse_number)
            .collect::<Option<Vec<_>>>()?;
        return Some(Value::Tuple(values));
    }
    parse_number(raw).map(Value::Number)
}

/// Parse a number, reading a literal `f` as the digit `0`.
///
/// Some game files were written with `f` in place of zeros (`12f5` is 1205).
fn parse_number(s: &str) -> Option<f64> {
    s.replace('f', "0").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let file = IniFile::parse("[foo.ini]\nPosition = 1,2,3\nDirectionAT = 0,0,1\n").unwrap();
        assert_eq!(file.sections.len(), 1);

        let s = &file.sections[0];
        assert_eq!(s.name, "foo.ini");
        assert_eq!(
            s.params,
            vec![
                Parameter::new("Position", Value::Tuple(vec![1.0, 2.0, 3.0])),
                Parameter::new("DirectionAT", Value::Tuple(vec![0.0, 0.0, 1.0])),
            ]
        );
    }

    #[test]
    fn test_section_order_and_duplicates() {
        let input = "[track.ini]\nFilename=\"a.ini\"\n[other.ldo]\nX=1\n[track.ini]\nFilename=\"b.ini\"\n";
        let file = IniFile::parse(input).unwrap();
        let names: Vec<_> = file.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["track.ini", "other.ldo", "track.ini"]);

        let tracks: Vec<_> = file.sections_named("track.ini").collect();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].get("Filename").and_then(Value::as_str), Some("a.ini"));
        assert_eq!(tracks[1].get("Filename").and_then(Value::as_str), Some("b.ini"));
    }

    #[test]
    fn test_numeral_quirk() {
        let file = IniFile::parse("[a]\nValue = 12f5\nPos = 1f,2,f.5\n").unwrap();
        let s = &file.sections[0];
        assert_eq!(s.get("Value").and_then(Value::as_number), Some(1205.0));
        assert_eq!(s.get("Pos").and_then(Value::as_triple), Some([10.0, 2.0, 0.5]));
    }

    #[test]
    fn test_only_section_names_are_folded() {
        let file = IniFile::parse("[Geometry/Foo.LDO]\nFilename = \"Geometry/Foo.LDO\"\n").unwrap();
        let s = &file.sections[0];
        assert_eq!(s.name, "geometry/foo.ldo");
        assert_eq!(s.params[0].name, "Filename");
        assert_eq!(s.get("Filename").and_then(Value::as_str), Some("Geometry/Foo.LDO"));
    }

    #[test]
    fn test_comments_and_whitespace() {
        let input = "// header comment\n[object] // trailing\n\tObjectType = \"trackpart\" // type\n\n   \nInvert = 1\n";
        let file = IniFile::parse(input).unwrap();
        assert_eq!(file.sections.len(), 1);
        let s = file.section("object").unwrap();
        assert_eq!(s.param_count(), 2);
        assert_eq!(s.get("ObjectType").and_then(Value::as_str), Some("trackpart"));
        assert_eq!(s.get("Invert").and_then(Value::as_number), Some(1.0));
    }

    #[test]
    fn test_crlf_and_missing_trailing_newline() {
        let file = IniFile::parse("[a]\r\nX = 1\r\n[b]\r\nY = 2").unwrap();
        assert_eq!(file.sections.len(), 2);
        assert_eq!(file.sections[1].get("Y").and_then(Value::as_number), Some(2.0));
    }

    #[test]
    fn test_parameter_before_section_is_fatal() {
        let result = IniFile::parse("\nPosition = 1,2,3\n[a]\n");
        assert!(matches!(
            result,
            Err(IniError::MalformedSection { line: 2, .. })
        ));
    }

    #[test]
    fn test_malformed_lines_are_kept() {
        let file = IniFile::parse("[a]\nnoequals\nBad = 1,x,3\nEmpty =\n").unwrap();
        let s = &file.sections[0];
        assert_eq!(s.param_count(), 3);
        assert_eq!(s.params[0], Parameter::new("noequals", Value::String(String::new())));
        assert_eq!(s.get("Bad"), Some(&Value::String("1,x,3".into())));
        assert_eq!(s.get("Empty"), Some(&Value::String(String::new())));
    }

    #[test]
    fn test_last_parameter_wins_on_lookup() {
        let file = IniFile::parse("[a]\nX = 1\nX = 2\n").unwrap();
        let s = &file.sections[0];
        assert_eq!(s.param_count(), 2);
        assert_eq!(s.get("X").and_then(Value::as_number), Some(2.0));
        assert!(s.contains("X"));
        assert!(!s.contains("x"));
    }
}
