//! Reading and writing mapping files.

use std::collections::BTreeMap;

use crate::error::{AppError, MappingParseError, Result};

use super::{Column, Delimiter, Mapping, MappingOption, MappingRow, SourceIdentifier};

type ParseResult<T> = std::result::Result<T, MappingParseError>;

const DESCRIPTION_HEADER: &str = "## Description ##";
const OPTIONS_HEADER: &str = "## Options ##";
const MAPPING_HEADER: &str = "## Mapping ##";

const PADDING: [char; 2] = [',', ';'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    Preamble,
    Description,
    Options,
    Mapping,
}

impl Section {
    fn header(&self) -> &'static str {
        match self {
            Section::Preamble => "",
            Section::Description => DESCRIPTION_HEADER,
            Section::Options => OPTIONS_HEADER,
            Section::Mapping => MAPPING_HEADER,
        }
    }

    fn next(&self) -> Option<Section> {
        match self {
            Section::Preamble => Some(Section::Description),
            Section::Description => Some(Section::Options),
            Section::Options => Some(Section::Mapping),
            Section::Mapping => None,
        }
    }

    fn from_line(line: &str) -> Option<Section> {
        let line = strip_padding(line, &PADDING).trim();
        [Section::Description, Section::Options, Section::Mapping]
            .into_iter()
            .find(|s| s.header().eq_ignore_ascii_case(line))
    }
}

/// Only whitespace and delimiters, as spreadsheets write for empty rows.
fn is_blank(line: &str) -> bool {
    line.chars().all(|c| c.is_whitespace() || PADDING.contains(&c))
}

fn strip_padding<'a>(line: &'a str, padding: &[char]) -> &'a str {
    line.trim_end()
        .trim_end_matches(|c: char| c.is_whitespace() || padding.contains(&c))
}

/// Delimiter characters found outside double quotes.
fn unquoted_delimiters(line: &str) -> Vec<char> {
    let mut in_quotes = false;
    let mut found = Vec::new();
    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' | ';' if !in_quotes => found.push(c),
            _ => {}
        }
    }
    found
}

fn detect_delimiter(
    header: (usize, &str),
    first_option: Option<(usize, &str)>,
) -> ParseResult<Delimiter> {
    let (line_no, line) = header;
    let found = unquoted_delimiters(strip_padding(line, &PADDING));
    let comma = found.contains(&',');
    let semicolon = found.contains(&';');
    match (comma, semicolon) {
        (true, true) => Err(MappingParseError::new(
            line_no,
            format!("could not determine delimiter: found both ',' and ';' in '{line}'"),
        )),
        (true, false) => Ok(Delimiter::Comma),
        (false, true) => Ok(Delimiter::Semicolon),
        (false, false) => {
            let from_option = first_option.and_then(|(_, option)| {
                unquoted_delimiters(strip_padding(option, &PADDING))
                    .first()
                    .copied()
            });
            Ok(match from_option {
                Some(';') => Delimiter::Semicolon,
                _ => Delimiter::Comma,
            })
        }
    }
}

/// Split one line into trimmed fields using CSV quoting rules.
fn split_fields(line_no: usize, line: &str, delimiter: Delimiter) -> ParseResult<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter.as_byte())
        .from_reader(line.as_bytes());
    let mut record = csv::StringRecord::new();
    let found = reader
        .read_record(&mut record)
        .map_err(|e| MappingParseError::new(line_no, format!("could not read fields: {e}")))?;
    if !found {
        return Ok(Vec::new());
    }
    Ok(record.iter().map(|f| f.trim().to_string()).collect())
}

fn parse_option(
    line_no: usize,
    line: &str,
    delimiter: Delimiter,
) -> ParseResult<(MappingOption, String)> {
    let line = strip_padding(line, &[delimiter.as_char()]);
    let mut fields = split_fields(line_no, line, delimiter)?.into_iter();
    let name = fields.next().unwrap_or_default();
    let option = MappingOption::from_name(&name).ok_or_else(|| {
        MappingParseError::new(
            line_no,
            format!(
                "unknown option '{name}'. Known options: {}",
                MappingOption::names().join(", ")
            ),
        )
    })?;
    let value = fields.next().unwrap_or_default();
    let extra: Vec<String> = fields.collect();
    if !extra.is_empty() {
        return Err(MappingParseError::new(
            line_no,
            format!(
                "expected '{option}{}<value>' but found {} values. Quote values containing '{}'",
                delimiter.as_char(),
                extra.len() + 1,
                delimiter.as_char()
            ),
        ));
    }
    Ok((option, value))
}

fn parse_columns(line_no: usize, line: &str, delimiter: Delimiter) -> ParseResult<Vec<Column>> {
    let line = strip_padding(line, &PADDING);
    let mut columns = Vec::new();
    for name in split_fields(line_no, line, delimiter)? {
        let column = Column::from_name(&name).ok_or_else(|| {
            MappingParseError::new(
                line_no,
                format!(
                    "unknown column '{name}'. Known columns: {}",
                    Column::names().join(", ")
                ),
            )
        })?;
        if columns.contains(&column) {
            return Err(MappingParseError::new(
                line_no,
                format!("column '{column}' appears more than once"),
            ));
        }
        columns.push(column);
    }
    if !columns.contains(&Column::Source) {
        return Err(MappingParseError::new(
            line_no,
            format!(
                "column header must contain '{}', found '{line}'",
                Column::Source
            ),
        ));
    }
    Ok(columns)
}

fn parse_row(
    line_no: usize,
    line: &str,
    columns: &[Column],
    delimiter: Delimiter,
) -> ParseResult<MappingRow> {
    let fields = split_fields(line_no, line, delimiter)?;
    if fields.len() < columns.len() || fields[columns.len()..].iter().any(|f| !f.is_empty()) {
        return Err(MappingParseError::new(
            line_no,
            format!(
                "expected {} columns ({}) but found {} values",
                columns.len(),
                columns
                    .iter()
                    .map(Column::name)
                    .collect::<Vec<_>>()
                    .join(", "),
                fields.len()
            ),
        ));
    }

    let mut source = None;
    let (mut patient_id, mut patient_name, mut description) =
        (String::new(), String::new(), String::new());
    let mut pims_key = None;
    for (column, value) in columns.iter().zip(fields) {
        match column {
            Column::Source => {
                source = Some(
                    value
                        .parse::<SourceIdentifier>()
                        .map_err(|e| MappingParseError::new(line_no, e))?,
                );
            }
            Column::PatientId => patient_id = value,
            Column::PatientName => patient_name = value,
            Column::Description => description = value,
            Column::PimsKey => pims_key = Some(value).filter(|v| !v.is_empty()),
        }
    }
    let source =
        source.ok_or_else(|| MappingParseError::new(line_no, "row has no source column"))?;

    Ok(MappingRow {
        source,
        patient_id,
        patient_name,
        description,
        pims_key,
    })
}

/// Parse the content of a mapping file.
pub fn parse(text: &str) -> ParseResult<Mapping> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut section = Section::Preamble;
    let mut description = Vec::new();
    let mut option_lines = Vec::new();
    let mut mapping_lines = Vec::new();
    let mut last_line = 1;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        last_line = line_no;

        if let Some(header) = Section::from_line(line) {
            if section.next() != Some(header) {
                let expected = section
                    .next()
                    .map(|s| format!("expected '{}'", s.header()))
                    .unwrap_or_else(|| "no more sections expected".to_string());
                return Err(MappingParseError::new(
                    line_no,
                    format!("unexpected '{}', {expected}", header.header()),
                ));
            }
            section = header;
            continue;
        }
        if is_blank(line) {
            continue;
        }
        match section {
            Section::Preamble => {
                return Err(MappingParseError::new(
                    line_no,
                    format!("expected '{DESCRIPTION_HEADER}' before any content, found '{line}'"),
                ));
            }
            Section::Description => description.push(strip_padding(line, &PADDING).to_string()),
            Section::Options => option_lines.push((line_no, line)),
            Section::Mapping => mapping_lines.push((line_no, line)),
        }
    }

    if section != Section::Mapping {
        let missing = section.next().map(|s| s.header()).unwrap_or_default();
        return Err(MappingParseError::new(
            last_line,
            format!("could not find section '{missing}'"),
        ));
    }

    let mut mapping_lines = mapping_lines.into_iter();
    let Some(header) = mapping_lines.next() else {
        return Err(MappingParseError::new(
            last_line,
            format!(
                "'{MAPPING_HEADER}' has no column header row. Expected something like '{}'",
                Column::STANDARD.map(|c| c.name()).join(",")
            ),
        ));
    };

    let delimiter = detect_delimiter(header, option_lines.first().copied())?;
    let columns = parse_columns(header.0, header.1, delimiter)?;

    let mut options = BTreeMap::new();
    for (line_no, line) in option_lines {
        let (option, value) = parse_option(line_no, line, delimiter)?;
        if options.insert(option, value).is_some() {
            return Err(MappingParseError::new(
                line_no,
                format!("option '{option}' is given more than once"),
            ));
        }
    }

    let rows = mapping_lines
        .map(|(line_no, line)| parse_row(line_no, line, &columns, delimiter))
        .collect::<ParseResult<Vec<_>>>()?;

    Ok(Mapping {
        description: description.join("\n"),
        options,
        rows,
        delimiter,
    })
}

fn write_records(records: &[Vec<String>], delimiter: Delimiter) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter.as_byte())
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for record in records {
        writer.write_record(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| AppError::validation(format!("mapping is not UTF-8: {e}")))
}

/// Write a mapping as file content, using the mapping's own delimiter.
pub fn serialize(mapping: &Mapping) -> Result<String> {
    let mut out = String::new();

    out.push_str(DESCRIPTION_HEADER);
    out.push('\n');
    for line in mapping.description.lines().filter(|l| !is_blank(l)) {
        out.push_str(line);
        out.push('\n');
    }

    out.push_str(OPTIONS_HEADER);
    out.push('\n');
    let options: Vec<Vec<String>> = mapping
        .options
        .iter()
        .map(|(option, value)| vec![option.name().to_string(), value.clone()])
        .collect();
    out.push_str(&write_records(&options, mapping.delimiter)?);

    out.push_str(MAPPING_HEADER);
    out.push('\n');
    let mut columns = Column::STANDARD.to_vec();
    if mapping.rows.iter().any(|r| r.pims_key.is_some()) {
        columns.push(Column::PimsKey);
    }
    let mut records = vec![columns.iter().map(|c| c.name().to_string()).collect()];
    for row in &mapping.rows {
        records.push(
            columns
                .iter()
                .map(|column| match column {
                    Column::Source => row.source.to_string(),
                    Column::PatientId => row.patient_id.clone(),
                    Column::PatientName => row.patient_name.clone(),
                    Column::Description => row.description.clone(),
                    Column::PimsKey => row.pims_key.clone().unwrap_or_default(),
                })
                .collect(),
        );
    }
    out.push_str(&write_records(&records, mapping.delimiter)?);

    Ok(out)
}
