//! Recognized option and column names of a mapping file.

use std::fmt;

/// Mapping-wide options, written in the `## Options ##` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MappingOption {
    /// Relative sources are resolved against this UNC path
    RootSourcePath,
    /// Anonymize according to this project
    Project,
    /// Write anonymized data to this UNC path
    DestinationPath,
    /// Pseudonymize with this PIMS key file
    PimsKey,
}

impl MappingOption {
    pub const ALL: [MappingOption; 4] = [
        MappingOption::RootSourcePath,
        MappingOption::Project,
        MappingOption::DestinationPath,
        MappingOption::PimsKey,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MappingOption::RootSourcePath => "root_source_path",
            MappingOption::Project => "project",
            MappingOption::DestinationPath => "destination_path",
            MappingOption::PimsKey => "pims_key",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|o| o.name() == name)
    }

    /// Values of path options must end up as UNC paths.
    pub fn is_path(&self) -> bool {
        matches!(
            self,
            MappingOption::RootSourcePath | MappingOption::DestinationPath
        )
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|o| o.name()).collect()
    }
}

impl fmt::Display for MappingOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Columns of the `## Mapping ##` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Source,
    PatientId,
    PatientName,
    Description,
    PimsKey,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Source,
        Column::PatientId,
        Column::PatientName,
        Column::Description,
        Column::PimsKey,
    ];

    /// Columns always written, in this order.
    pub const STANDARD: [Column; 4] = [
        Column::Source,
        Column::PatientId,
        Column::PatientName,
        Column::Description,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Source => "source",
            Column::PatientId => "patient_id",
            Column::PatientName => "patient_name",
            Column::Description => "description",
            Column::PimsKey => "pims_key",
        }
    }

    /// Older files call the pseudonym columns `pseudo_id` and `pseudo_name`.
    fn legacy_name(&self) -> Option<&'static str> {
        match self {
            Column::PatientId => Some("pseudo_id"),
            Column::PatientName => Some("pseudo_name"),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name() == name || c.legacy_name() == Some(name.as_str()))
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.name()).collect()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
