use std::path::PathBuf;

pub type SettingsResult<T> = std::result::Result<T, SettingsError>;

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },

    #[error("no section: '{0}'")]
    MissingSection(String),

    #[error("no option '{key}' in section: '{section}'")]
    MissingKey { section: String, key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    MissingSectionHeader,
    UnterminatedHeader,
    EmptySectionName,
    DuplicateSection(String),
    DuplicateKey { section: String, key: String },
    MissingDelimiter,
    EmptyKey,
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorKind::MissingSectionHeader => write!(f, "option found before any section header"),
            ParseErrorKind::UnterminatedHeader => write!(f, "section header is missing ']'"),
            ParseErrorKind::EmptySectionName => write!(f, "section name is empty"),
            ParseErrorKind::DuplicateSection(name) => write!(f, "section '{name}' already exists"),
            ParseErrorKind::DuplicateKey { section, key } => {
                write!(f, "option '{key}' in section '{section}' already exists")
            }
            ParseErrorKind::MissingDelimiter => write!(f, "expected 'key = value' or 'key: value'"),
            ParseErrorKind::EmptyKey => write!(f, "option name is empty"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum InjectError {
    #[error("settings file {0} not found")]
    SettingsNotFound(PathBuf),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}
