//! Typed source identifiers such as `folder:\\server\share\data`.

use std::fmt;
use std::str::FromStr;

/// Where the data for one job comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceIdentifier {
    /// A complete folder on a share
    Folder(String),
    /// A file selection file listing the files to use
    FileSelection(String),
    /// A DICOM StudyInstanceUID, fetched from PACS
    StudyInstanceUid(String),
    /// A DICOM AccessionNumber, fetched from PACS
    AccessionNumber(String),
}

impl SourceIdentifier {
    pub const KEYS: [&'static str; 4] = [
        "folder",
        "fileselection",
        "study_instance_uid",
        "accession_number",
    ];

    /// Type key as written in mapping files.
    pub fn key(&self) -> &'static str {
        match self {
            SourceIdentifier::Folder(_) => "folder",
            SourceIdentifier::FileSelection(_) => "fileselection",
            SourceIdentifier::StudyInstanceUid(_) => "study_instance_uid",
            SourceIdentifier::AccessionNumber(_) => "accession_number",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            SourceIdentifier::Folder(v)
            | SourceIdentifier::FileSelection(v)
            | SourceIdentifier::StudyInstanceUid(v)
            | SourceIdentifier::AccessionNumber(v) => v,
        }
    }

    /// Data lives on a share or disk.
    pub fn is_path(&self) -> bool {
        matches!(
            self,
            SourceIdentifier::Folder(_) | SourceIdentifier::FileSelection(_)
        )
    }

    /// Value the server expects as `source_instance_id`.
    ///
    /// StudyInstanceUIDs are sent bare, accession numbers keep their key.
    pub fn instance_id(&self) -> String {
        match self {
            SourceIdentifier::StudyInstanceUid(uid) => uid.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for SourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key(), self.value())
    }
}

impl FromStr for SourceIdentifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("source is empty. Where should the data come from?".to_string());
        }
        let (key, value) = s.split_once(':').ok_or_else(|| {
            format!("'{s}' is not a valid source. Expected '<type>:<value>', e.g. 'folder:\\\\server\\share\\data'")
        })?;
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("source '{s}' has no value after '{key}:'"));
        }
        match key.trim().to_lowercase().as_str() {
            "folder" => Ok(SourceIdentifier::Folder(value.to_string())),
            "fileselection" => Ok(SourceIdentifier::FileSelection(value.to_string())),
            "study_instance_uid" => Ok(SourceIdentifier::StudyInstanceUid(value.to_string())),
            "accession_number" => Ok(SourceIdentifier::AccessionNumber(value.to_string())),
            other => Err(format!(
                "unknown source type '{other}' in '{s}'. Known types: {:?}",
                Self::KEYS
            )),
        }
    }
}
