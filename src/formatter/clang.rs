//! `clang-format --output-replacements-xml`.

use std::path::Path;
use std::process::Command;

use quick_xml::Reader;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesStart, Event};

use super::{Formatter, FormatterError};
use crate::replace::Edit;

/// Runs `clang-format` and reads its replacement list.
#[derive(Clone, Debug)]
pub struct ClangFormat {
    program: String,
    style: String,
}

impl ClangFormat {
    #[must_use]
    pub fn new(program: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            style: style.into(),
        }
    }

    /// First line of `clang-format --version`.
    ///
    /// # Errors
    /// Fails if the program cannot be run.
    pub fn version(&self) -> Result<String, FormatterError> {
        let output = Command::new(&self.program)
            .arg("--version")
            .output()
            .map_err(|source| self.spawn_error(source))?;
        if !output.status.success() {
            return Err(self.failed(&output));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().trim().to_owned())
    }

    fn spawn_error(&self, source: std::io::Error) -> FormatterError {
        FormatterError::Spawn {
            program: self.program.clone(),
            source,
        }
    }

    fn failed(&self, output: &std::process::Output) -> FormatterError {
        FormatterError::Failed {
            program: self.program.clone(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        }
    }
}

impl Formatter for ClangFormat {
    fn name(&self) -> &str {
        &self.program
    }

    fn replacements(&self, path: &Path) -> Result<Vec<Edit>, FormatterError> {
        let output = Command::new(&self.program)
            .arg("--output-replacements-xml")
            .arg(format!("--style={}", self.style))
            .arg(path)
            .output()
            .map_err(|source| self.spawn_error(source))?;
        if !output.status.success() {
            return Err(self.failed(&output));
        }
        let xml = String::from_utf8_lossy(&output.stdout);
        let edits = parse_replacements(&xml)?;
        tracing::trace!(path = %path.display(), count = edits.len(), "clang-format replacements");
        Ok(edits)
    }
}

/// Parse a `<replacements>` document into edits.
///
/// ```text
/// <replacements xml:space='preserve' incomplete_format='false'>
/// <replacement offset='11' length='0'>&#10;  </replacement>
/// </replacements>
/// ```
///
/// # Errors
/// Returns [`FormatterError::Output`] for malformed XML, missing or
/// non-numeric attributes, or an unterminated replacement.
pub fn parse_replacements(xml: &str) -> Result<Vec<Edit>, FormatterError> {
    let mut reader = Reader::from_str(xml);
    let mut edits = Vec::new();
    let mut open: Option<Edit> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| FormatterError::Output(e.to_string()))?;
        match event {
            Event::Start(ref e) if e.name().as_ref() == b"replacement" => {
                open = Some(replacement_start(&reader, e)?);
            }
            Event::Empty(ref e) if e.name().as_ref() == b"replacement" => {
                edits.push(replacement_start(&reader, e)?);
            }
            Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == b"replacements" => {
                if attribute(&reader, e, "incomplete_format")?.as_deref() == Some("true") {
                    tracing::debug!("formatter reported incomplete format");
                }
            }
            Event::Text(e) => {
                if let Some(edit) = open.as_mut() {
                    let text = e.decode().map_err(|e| FormatterError::Output(e.to_string()))?;
                    edit.content.extend_from_slice(text.as_bytes());
                }
            }
            Event::GeneralRef(e) => {
                if let Some(edit) = open.as_mut() {
                    let raw = e.decode().map_err(|e| FormatterError::Output(e.to_string()))?;
                    edit.content.extend_from_slice(resolve_entity(&raw)?.as_bytes());
                }
            }
            Event::End(ref e) if e.name().as_ref() == b"replacement" => {
                let edit = open
                    .take()
                    .ok_or_else(|| FormatterError::Output("unbalanced </replacement>".to_owned()))?;
                edits.push(edit);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if open.is_some() {
        return Err(FormatterError::Output("unterminated <replacement>".to_owned()));
    }
    Ok(edits)
}

fn replacement_start(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> Result<Edit, FormatterError> {
    let offset = numeric_attribute(reader, e, "offset")?;
    let length = numeric_attribute(reader, e, "length")?;
    if offset.checked_add(length).is_none() {
        return Err(FormatterError::Output(format!(
            "replacement range {offset}+{length} overflows"
        )));
    }
    Ok(Edit::new(offset, length, Vec::new()))
}

fn numeric_attribute(
    reader: &Reader<&[u8]>,
    e: &BytesStart<'_>,
    name: &str,
) -> Result<usize, FormatterError> {
    let value = attribute(reader, e, name)?
        .ok_or_else(|| FormatterError::Output(format!("replacement without `{name}`")))?;
    value.parse().map_err(|_| {
        FormatterError::Output(format!("replacement `{name}` is not a number: {value:?}"))
    })
}

fn attribute(
    reader: &Reader<&[u8]>,
    e: &BytesStart<'_>,
    name: &str,
) -> Result<Option<String>, FormatterError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| FormatterError::Output(e.to_string()))?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = attr
                .decode_and_unescape_value(reader.decoder())
                .map_err(|e| FormatterError::Output(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Named (`lt`, `amp`, ...) or numeric (`#10`, `#x9`) entity to text.
fn resolve_entity(raw: &str) -> Result<String, FormatterError> {
    if let Some(resolved) = resolve_xml_entity(raw) {
        return Ok(resolved.to_owned());
    }
    let Some(rest) = raw.strip_prefix('#') else {
        return Err(FormatterError::Output(format!("unknown entity &{raw};")));
    };
    let code = match rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => rest.parse(),
    }
    .map_err(|_| FormatterError::Output(format!("bad character reference &{raw};")))?;
    char::from_u32(code)
        .map(String::from)
        .ok_or_else(|| FormatterError::Output(format!("invalid code point in &{raw};")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typical_output() {
        let xml = "<?xml version='1.0'?>\n\
                   <replacements xml:space='preserve' incomplete_format='false'>\n\
                   <replacement offset='11' length='0'>&#10;  </replacement>\n\
                   <replacement offset='20' length='0'>&#10;</replacement>\n\
                   </replacements>\n";
        let edits = parse_replacements(xml).unwrap();
        assert_eq!(edits, vec![Edit::new(11, 0, "\n  "), Edit::new(20, 0, "\n")]);
    }

    #[test]
    fn empty_replacement_is_a_deletion() {
        let xml = "<replacements xml:space='preserve'>\
                   <replacement offset='3' length='2'></replacement>\
                   <replacement offset='9' length='1'/>\
                   </replacements>";
        let edits = parse_replacements(xml).unwrap();
        assert_eq!(edits, vec![Edit::new(3, 2, ""), Edit::new(9, 1, "")]);
    }

    #[test]
    fn entities_are_resolved_and_whitespace_kept() {
        let xml = "<replacements xml:space='preserve'>\
                   <replacement offset='0' length='4'>\
                   a &lt; b &amp;&amp; c&#x9;&#13;&#10;\
                   </replacement>\
                   </replacements>";
        let edits = parse_replacements(xml).unwrap();
        assert_eq!(edits[0].content, b"a < b && c\t\r\n");
    }

    #[test]
    fn no_replacements() {
        let xml = "<?xml version='1.0'?>\n\
                   <replacements xml:space='preserve' incomplete_format='false'>\n\
                   </replacements>\n";
        assert!(parse_replacements(xml).unwrap().is_empty());
    }

    #[test]
    fn missing_attribute_is_an_error() {
        let xml = "<replacements><replacement offset='1'>x</replacement></replacements>";
        let err = parse_replacements(xml).unwrap_err();
        assert!(err.to_string().contains("length"), "{err}");
    }

    #[test]
    fn non_numeric_offset_is_an_error() {
        let xml =
            "<replacements><replacement offset='-1' length='0'>x</replacement></replacements>";
        assert!(parse_replacements(xml).is_err());
    }

    #[test]
    fn overflowing_range_is_an_error() {
        let xml = format!(
            "<replacements><replacement offset='{}' length='5'>x</replacement></replacements>",
            usize::MAX - 1
        );
        let err = parse_replacements(&xml).unwrap_err();
        assert!(matches!(err, FormatterError::Output(_)), "{err}");
        assert!(err.to_string().contains("overflows"), "{err}");
    }

    #[test]
    fn unterminated_replacement_is_an_error() {
        let xml = "<replacements><replacement offset='1' length='0'>x";
        assert!(parse_replacements(xml).is_err());
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let fmt = ClangFormat::new("blamefmt-no-such-formatter", "file");
        assert_eq!(fmt.name(), "blamefmt-no-such-formatter");
        let err = fmt.replacements(Path::new("x.c")).unwrap_err();
        assert!(matches!(err, FormatterError::Spawn { .. }), "{err}");
        assert!(matches!(fmt.version(), Err(FormatterError::Spawn { .. })));
    }
}
