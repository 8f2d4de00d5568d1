//! Section based `key = value` documents.
//!
//! Section names are case-sensitive, option names are not: they are stored
//! lowercased and every lookup lowercases the requested key. Values are kept
//! raw, there is no `%(name)s` interpolation.

use std::path::Path;
use std::str::FromStr;

use log::*;

use crate::error::{ParseErrorKind, SettingsError, SettingsResult};

pub const DEFAULT_SECTION: &'static str = "DEFAULT";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Section {
    entries: Vec<(String, String)>,
}

impl Section {
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Settings {
    defaults: Section,
    sections: Vec<(String, Section)>,
}

/// Where options read from the current line end up.
enum Cursor {
    None,
    Defaults,
    Section(usize),
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref();

        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let settings: Settings = text.parse()?;

        info!(
            "loaded {} with sections {:?}",
            path.display(),
            settings.sections().collect::<Vec<_>>()
        );

        Ok(settings)
    }

    /// Section names in file order, `DEFAULT` excluded.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(name, _)| name.as_str())
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|(n, _)| n == name)
    }

    pub fn section(&self, name: &str) -> SettingsResult<&Section> {
        if name == DEFAULT_SECTION {
            return Ok(&self.defaults);
        }

        self.sections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, section)| section)
            .ok_or_else(|| SettingsError::MissingSection(name.to_string()))
    }

    /// Looks `key` up in `section`, falling back to `[DEFAULT]`.
    pub fn get(&self, section: &str, key: &str) -> SettingsResult<&str> {
        let found = self.section(section)?;

        found
            .get(key)
            .or_else(|| self.defaults.get(key))
            .ok_or_else(|| SettingsError::MissingKey {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    fn current(&mut self, cursor: &Cursor) -> Option<&mut Section> {
        match cursor {
            Cursor::None => None,
            Cursor::Defaults => Some(&mut self.defaults),
            Cursor::Section(index) => self.sections.get_mut(*index).map(|(_, s)| s),
        }
    }

    fn current_name(&self, cursor: &Cursor) -> &str {
        match cursor {
            Cursor::Section(index) => self.sections[*index].0.as_str(),
            _ => DEFAULT_SECTION,
        }
    }
}

impl FromStr for Settings {
    type Err = SettingsError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut settings = Settings::default();
        let mut cursor = Cursor::None;
        // (indent of the option line, index of the entry) while a value may still continue
        let mut open: Option<(usize, usize)> = None;
        let mut pending_blanks = 0usize;

        for (index, line) in text.lines().enumerate() {
            let number = index + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() {
                if open.is_some() {
                    pending_blanks += 1;
                }
                continue;
            }

            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let indent = line.len() - line.trim_start().len();

            if let Some((option_indent, entry)) = open {
                if indent > option_indent {
                    if let Some(section) = settings.current(&cursor) {
                        let value = &mut section.entries[entry].1;
                        for _ in 0..pending_blanks {
                            value.push('\n');
                        }
                        value.push('\n');
                        value.push_str(trimmed);
                    }
                    pending_blanks = 0;
                    continue;
                }
            }

            open = None;
            pending_blanks = 0;

            if let Some(rest) = trimmed.strip_prefix('[') {
                let name = match rest.rfind(']') {
                    Some(end) => &rest[..end],
                    None => {
                        return Err(SettingsError::Parse {
                            line: number,
                            kind: ParseErrorKind::UnterminatedHeader,
                        })
                    }
                };

                if name.is_empty() {
                    return Err(SettingsError::Parse {
                        line: number,
                        kind: ParseErrorKind::EmptySectionName,
                    });
                }

                if name == DEFAULT_SECTION {
                    cursor = Cursor::Defaults;
                } else if settings.has_section(name) {
                    return Err(SettingsError::Parse {
                        line: number,
                        kind: ParseErrorKind::DuplicateSection(name.to_string()),
                    });
                } else {
                    settings
                        .sections
                        .push((name.to_string(), Section::default()));
                    cursor = Cursor::Section(settings.sections.len() - 1);
                }
                continue;
            }

            if let Cursor::None = cursor {
                return Err(SettingsError::Parse {
                    line: number,
                    kind: ParseErrorKind::MissingSectionHeader,
                });
            }

            let split = trimmed.find(|c: char| c == '=' || c == ':').ok_or(SettingsError::Parse {
                line: number,
                kind: ParseErrorKind::MissingDelimiter,
            })?;

            let key = trimmed[..split].trim().to_lowercase();
            let value = trimmed[split + 1..].trim().to_string();

            if key.is_empty() {
                return Err(SettingsError::Parse {
                    line: number,
                    kind: ParseErrorKind::EmptyKey,
                });
            }

            let section_name = settings.current_name(&cursor).to_string();

            if let Some(section) = settings.current(&cursor) {
                if section.entries.iter().any(|(k, _)| *k == key) {
                    return Err(SettingsError::Parse {
                        line: number,
                        kind: ParseErrorKind::DuplicateKey {
                            section: section_name,
                            key,
                        },
                    });
                }

                section.entries.push((key, value));
                open = Some((indent, section.entries.len() - 1));
            }
        }

        Ok(settings)
    }
}
