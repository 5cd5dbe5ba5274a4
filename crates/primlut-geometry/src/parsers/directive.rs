//! Classification of single PRIM lines.
//!
//! Recognised directives:
//! - `#/PVName a.b.name.id` — object name; the last two dot-separated tokens
//!   are the human name and the instance id, a bare `name` has an empty id
//! - `/Origin x y z` — placement origin
//! - `/BaseVector x1 y1 z1 x2 y2 z2` — rotated base axes
//! - `/Box x y z` — bounding box size
//! - `#--------------------` — end of segment
//!
//! Vector components may be separated by whitespace, commas or both and must
//! be finite. Every other line, `/Ndiv` included, is ignored.

use super::ParseError;

const PV_NAME: &str = "#/PVName";
const ORIGIN: &str = "/Origin";
const BASE_VECTOR: &str = "/BaseVector";
const BOX: &str = "/Box";
const TERMINATOR: &str = "#--------------------";

/// Name of a placed volume, split off its instance id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectName {
    pub name: String,
    pub id: String,
}

impl ObjectName {
    /// Resolve a dotted volume path. `None` when no name is left.
    pub fn resolve(path: &str) -> Option<Self> {
        let path = path.trim();
        let (name, id) = match path.rsplit_once('.') {
            Some((head, id)) => (head.rsplit('.').next().unwrap_or(head), id),
            None => (path, ""),
        };
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            id: id.trim().to_string(),
        })
    }
}

/// One typed PRIM line.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// `#/PVName`; `None` if the path could not be resolved.
    Name(Option<ObjectName>),
    Origin(Vec<f32>),
    BaseVector(Vec<f32>),
    Box(Vec<f32>),
    Terminator,
    Ignored,
}

/// Classify `line` (1-based `line_no` is used for error reporting).
pub fn read_directive(line: &str, line_no: usize) -> Result<Directive, ParseError> {
    let line = line.trim();

    if line.starts_with(TERMINATOR) {
        return Ok(Directive::Terminator);
    }
    if let Some(rest) = line.strip_prefix(PV_NAME) {
        return Ok(Directive::Name(ObjectName::resolve(rest)));
    }
    if let Some(rest) = line.strip_prefix(BASE_VECTOR) {
        return parse_vector(rest, line_no, BASE_VECTOR).map(Directive::BaseVector);
    }
    if let Some(rest) = line.strip_prefix(ORIGIN) {
        return parse_vector(rest, line_no, ORIGIN).map(Directive::Origin);
    }
    if let Some(rest) = line.strip_prefix(BOX) {
        return parse_vector(rest, line_no, BOX).map(Directive::Box);
    }
    Ok(Directive::Ignored)
}

fn parse_vector(fields: &str, line_no: usize, directive: &str) -> Result<Vec<f32>, ParseError> {
    fields
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| match token.parse::<f32>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ParseError::FormatError {
                line: line_no,
                message: format!("Invalid {} component: '{}'", directive, token),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pvname() {
        let d = read_directive("#/PVName crystal.12\n", 1).unwrap();
        assert_eq!(
            d,
            Directive::Name(Some(ObjectName {
                name: "crystal".into(),
                id: "12".into()
            }))
        );
    }

    #[test]
    fn test_pvname_uses_last_two_tokens() {
        let d = read_directive("#/PVName world.scanner.module.3", 1).unwrap();
        match d {
            Directive::Name(Some(n)) => {
                assert_eq!(n.name, "module");
                assert_eq!(n.id, "3");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bare_pvname_has_empty_id() {
        assert_eq!(
            read_directive("#/PVName crystal_1", 1).unwrap(),
            Directive::Name(Some(ObjectName {
                name: "crystal_1".into(),
                id: String::new()
            }))
        );
    }

    #[test]
    fn test_unresolvable_pvname() {
        assert_eq!(read_directive("#/PVName", 1).unwrap(), Directive::Name(None));
        assert_eq!(read_directive("#/PVName   ", 1).unwrap(), Directive::Name(None));
        assert_eq!(read_directive("#/PVName .3", 1).unwrap(), Directive::Name(None));
    }

    #[test]
    fn test_vectors() {
        assert_eq!(
            read_directive("/Origin 10 0 5", 1).unwrap(),
            Directive::Origin(vec![10.0, 0.0, 5.0])
        );
        assert_eq!(
            read_directive("/BaseVector   0 1 0   -1  0 0", 1).unwrap(),
            Directive::BaseVector(vec![0.0, 1.0, 0.0, -1.0, 0.0, 0.0])
        );
        assert_eq!(
            read_directive("/Box 2,2, 6", 1).unwrap(),
            Directive::Box(vec![2.0, 2.0, 6.0])
        );
        assert_eq!(
            read_directive("/Origin -1.5e1\t0.25 3", 1).unwrap(),
            Directive::Origin(vec![-15.0, 0.25, 3.0])
        );
    }

    #[test]
    fn test_terminator() {
        assert_eq!(read_directive("#--------------------", 1).unwrap(), Directive::Terminator);
        assert_eq!(
            read_directive("#------------------------------------", 1).unwrap(),
            Directive::Terminator
        );
    }

    #[test]
    fn test_ignored_lines() {
        for line in ["", "# comment", "#-----", "/Material LYSO", "/Visible 1", "/Ndiv 24", "/Ndiv 2.0"] {
            assert_eq!(read_directive(line, 1).unwrap(), Directive::Ignored, "{}", line);
        }
    }

    #[test]
    fn test_bad_component_is_format_error() {
        match read_directive("/Origin 1.0 abc 3.0", 7) {
            Err(ParseError::FormatError { line, message }) => {
                assert_eq!(line, 7);
                assert!(message.contains("abc"));
            }
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_component_is_format_error() {
        for line in ["/Origin NaN 0 0", "/Origin 0 inf 0", "/Box 1 1 -infinity", "/BaseVector 1 0 0 0 1e39 0"] {
            match read_directive(line, 4) {
                Err(ParseError::FormatError { line: at, .. }) => assert_eq!(at, 4, "{}", line),
                other => panic!("expected format error for {}, got {:?}", line, other),
            }
        }
    }
}
