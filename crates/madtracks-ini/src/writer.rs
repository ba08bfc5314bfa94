//! Serializes sections back to the .ini dialect.
//!
//! Output layout matches what the game writes: `Name = value` lines, numbers
//! in fixed-point notation with six decimals, and a blank line after each
//! section.

use std::fmt;
use std::path::Path;

use crate::error::Result;
use crate::parser::{IniFile, Parameter, Section, Value};

/// Format a number the way level files store it: fixed-point, 6 decimals.
pub fn float_format(value: f64) -> String {
    format!("{value:.6}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => f.write_str(&float_format(*v)),
            Value::Tuple(values) => {
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    f.write_str(&float_format(*v))?;
                }
                Ok(())
            }
            Value::String(s) => write!(f, "\"{s}\""),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}]", self.name)?;
        for param in &self.params {
            writeln!(f, "{param}")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for IniFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            write!(f, "{section}")?;
        }
        Ok(())
    }
}

impl IniFile {
    /// Write the file to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_format() {
        assert_eq!(float_format(1.0), "1.000000");
        assert_eq!(float_format(-0.035014), "-0.035014");
        assert_eq!(float_format(1e-7), "0.000000");
        assert_eq!(float_format(123456789.0), "123456789.000000");
    }

    #[test]
    fn test_section_layout() {
        let section = Section::new("M_gris_rail_50.ini")
            .with("Position", Value::Tuple(vec![1.0, 2.5, -3.0]))
            .with("DirectionAT", Value::Tuple(vec![0.0, 0.0, 1.0]))
            .with("DirectionUp", Value::Tuple(vec![0.0, 1.0, 0.0]))
            .with("Filename", Value::String("M_gris_rail_50.ini".into()));
        let file = IniFile {
            sections: vec![section, Section::new("b.ini").with("Filename", Value::String("b.ini".into()))],
        };

        let expected = "[M_gris_rail_50.ini]\n\
            Position = 1.000000,2.500000,-3.000000\n\
            DirectionAT = 0.000000,0.000000,1.000000\n\
            DirectionUp = 0.000000,1.000000,0.000000\n\
            Filename = \"M_gris_rail_50.ini\"\n\
            \n\
            [b.ini]\n\
            Filename = \"b.ini\"\n\
            \n";
        assert_eq!(file.to_string(), expected);
    }

    #[test]
    fn test_written_file_parses_back_in_order() {
        let file = IniFile {
            sections: vec![
                Section::new("z.ini").with("Filename", Value::String("z.ini".into())),
                Section::new("a.ldo").with("Scale", Value::Number(2.0)),
                Section::new("z.ini").with("Filename", Value::String("z2.ini".into())),
            ],
        };
        let parsed = IniFile::parse(&file.to_string()).unwrap();
        assert_eq!(parsed, file);
    }
}
