//! Mappings: one file describing many anonymization jobs.
//!
//! A mapping file has three sections:
//!
//! ```text
//! ## Description ##
//! Free text
//! ## Options ##
//! project,Wetenschap-Algemeen
//! destination_path,\\server\share\output
//! ## Mapping ##
//! source,patient_id,patient_name,description
//! folder:\\server\share\study1,001,Patient1,first study
//! ```
//!
//! Spreadsheets often save with `;` instead of `,`; both are accepted and the
//! delimiter found is kept for writing the file back.

mod fields;
mod params;
mod parser;
mod source;

use std::collections::BTreeMap;
use std::str::FromStr;

use comfy_table::Table;

use crate::error::{MappingParseError, Result};
use crate::models::JobDefaults;
use crate::utils::{generate_pseudonym, generated_description, table};

pub use fields::{Column, MappingOption};
pub use params::JobParameters;
pub use parser::{parse, serialize};
pub use source::SourceIdentifier;

/// File name of a mapping inside its folder.
pub const DEFAULT_MAPPING_NAME: &str = "anon_mapping.csv";

/// Field separator of a mapping file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
}

impl Delimiter {
    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
        }
    }

    pub fn as_byte(&self) -> u8 {
        self.as_char() as u8
    }
}

/// One job specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRow {
    pub source: SourceIdentifier,
    pub patient_id: String,
    pub patient_name: String,
    pub description: String,
    /// Overrides the mapping-wide `pims_key` option for this row
    pub pims_key: Option<String>,
}

impl MappingRow {
    pub fn new(
        source: SourceIdentifier,
        patient_id: impl Into<String>,
        patient_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            source,
            patient_id: patient_id.into(),
            patient_name: patient_name.into(),
            description: description.into(),
            pims_key: None,
        }
    }

    /// Row with generated pseudonyms and description.
    pub fn generated(source: SourceIdentifier) -> Self {
        Self::new(
            source,
            generate_pseudonym(),
            generate_pseudonym(),
            generated_description(),
        )
    }
}

/// Everything needed to create a set of anonymization jobs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mapping {
    /// Human readable description, may span several lines
    pub description: String,

    /// Settings for every row in this mapping
    pub options: BTreeMap<MappingOption, String>,

    /// One row per job
    pub rows: Vec<MappingRow>,

    /// Separator used when writing the file
    pub delimiter: Delimiter,
}

impl Mapping {
    /// Parse mapping file content.
    pub fn parse(text: &str) -> std::result::Result<Self, MappingParseError> {
        parse(text)
    }

    /// Mapping file content.
    pub fn to_csv_string(&self) -> Result<String> {
        serialize(self)
    }

    /// An example mapping showing every kind of source.
    pub fn example(defaults: &JobDefaults, user_name: &str) -> Self {
        let mut options = BTreeMap::new();
        options.insert(MappingOption::RootSourcePath, String::new());
        options.insert(
            MappingOption::Project,
            defaults.project_name.clone().unwrap_or_default(),
        );
        options.insert(
            MappingOption::DestinationPath,
            defaults.destination_path.clone().unwrap_or_default(),
        );

        let rows = vec![
            MappingRow::new(
                SourceIdentifier::Folder(r"example\folder1".to_string()),
                "001",
                "Patient1",
                "All files from folder1",
            ),
            MappingRow::new(
                SourceIdentifier::StudyInstanceUid("123.12121212.12345678".to_string()),
                "002",
                "Patient2",
                "A study which should be retrieved from PACS, identified by StudyInstanceUID",
            ),
            MappingRow::new(
                SourceIdentifier::AccessionNumber("12345678.1234567".to_string()),
                "003",
                "Patient3",
                "A study which should be retrieved from PACS, identified by AccessionNumber",
            ),
            MappingRow::new(
                SourceIdentifier::FileSelection(r"folder2\fileselection.txt".to_string()),
                "004",
                "Patient4",
                "A selection of files in folder2",
            ),
        ];

        Self {
            description: format!(
                "Mapping created {} by {user_name}",
                chrono::Local::now().format("%B %d %Y")
            ),
            options,
            rows,
            delimiter: Delimiter::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn add_row(&mut self, row: MappingRow) {
        self.rows.push(row);
    }

    /// Value of an option, treating blank values as unset.
    pub fn option(&self, option: MappingOption) -> Option<&str> {
        self.options
            .get(&option)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn set_option(&mut self, option: MappingOption, value: impl Into<String>) {
        self.options.insert(option, value.into());
    }

    /// Resolve every row into job parameters.
    ///
    /// Precedence: settings defaults, then mapping options, then row values.
    pub fn job_parameters(&self, defaults: &JobDefaults) -> Vec<JobParameters> {
        let non_blank = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        self.rows
            .iter()
            .map(|row| JobParameters {
                source: row.source.clone(),
                patient_id: row.patient_id.clone(),
                patient_name: row.patient_name.clone(),
                description: row.description.clone(),
                project: self
                    .option(MappingOption::Project)
                    .map(str::to_string)
                    .or_else(|| non_blank(&defaults.project_name)),
                destination_path: self
                    .option(MappingOption::DestinationPath)
                    .map(str::to_string)
                    .or_else(|| non_blank(&defaults.destination_path)),
                root_source_path: self
                    .option(MappingOption::RootSourcePath)
                    .map(str::to_string),
                pims_key: non_blank(&row.pims_key)
                    .or_else(|| self.option(MappingOption::PimsKey).map(str::to_string)),
            })
            .collect()
    }

    /// Source and pseudonym overview, at most `max_rows` rows.
    pub fn summary_table(&self, max_rows: Option<usize>) -> Table {
        let mut table = table::create_table(&["source", "patient_name"]);
        let shown = max_rows.unwrap_or(self.rows.len());
        for row in self.rows.iter().take(shown) {
            table.add_row(vec![row.source.to_string(), row.patient_name.clone()]);
        }
        table
    }
}

impl FromStr for Mapping {
    type Err = MappingParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_round_trips() {
        let example = Mapping::example(&JobDefaults::default(), "kees");
        let text = example.to_csv_string().unwrap();
        let parsed = Mapping::parse(&text).unwrap();
        assert_eq!(parsed, example);
        assert_eq!(parsed.len(), 4);
    }

    #[test]
    fn test_job_parameters_precedence() {
        let mut mapping = Mapping::default();
        mapping.set_option(MappingOption::Project, "FromMapping");
        mapping.set_option(MappingOption::PimsKey, "555");
        mapping.add_row(MappingRow::new(
            SourceIdentifier::AccessionNumber("1".to_string()),
            "001",
            "Patient1",
            "desc",
        ));
        let mut row = MappingRow::new(
            SourceIdentifier::AccessionNumber("2".to_string()),
            "002",
            "Patient2",
            "desc",
        );
        row.pims_key = Some("777".to_string());
        mapping.add_row(row);

        let defaults = JobDefaults {
            project_name: Some("FromSettings".to_string()),
            destination_path: Some(r"\\server\share\out".to_string()),
        };
        let params = mapping.job_parameters(&defaults);

        assert_eq!(params[0].project.as_deref(), Some("FromMapping"));
        assert_eq!(params[0].destination_path.as_deref(), Some(r"\\server\share\out"));
        assert_eq!(params[0].pims_key.as_deref(), Some("555"));
        assert_eq!(params[1].pims_key.as_deref(), Some("777"));
    }

    #[test]
    fn test_blank_option_falls_back_to_default() {
        let mut mapping = Mapping::default();
        mapping.set_option(MappingOption::Project, "  ");
        mapping.add_row(MappingRow::generated(SourceIdentifier::Folder("a".to_string())));

        let defaults = JobDefaults {
            project_name: Some("FromSettings".to_string()),
            destination_path: None,
        };
        let params = mapping.job_parameters(&defaults);
        assert_eq!(params[0].project.as_deref(), Some("FromSettings"));
        assert!(params[0].destination_path.is_none());
    }

    #[test]
    fn test_summary_table_limits_rows() {
        let example = Mapping::example(&JobDefaults::default(), "kees");
        let rendered = example.summary_table(Some(2)).to_string();
        assert!(rendered.contains("Patient2"));
        assert!(!rendered.contains("Patient3"));
    }
}
