use std::path::Path;

use sc_core::config::CorpusConfig;
use sc_core::error::CoreError;
use sc_core::frame::LabelId;

/// Reads the class label encoded in a corpus file name.
///
/// UrbanSound8K names slices `[fsID]-[classID]-[occurrenceID]-[sliceID].wav`:
/// the label is field `field` of the file stem split on `separator`.
///
/// # Example
/// ```
/// use std::path::Path;
/// use sc_core::config::CorpusConfig;
/// use sc_core::frame::LabelId;
/// use sc_corpus::label::LabelContract;
///
/// let contract = LabelContract::from_config(&CorpusConfig::default());
/// let label = contract.parse(Path::new("fold1/7061-6-0-0.wav")).unwrap();
/// assert_eq!(label, LabelId(6));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LabelContract {
    pub field: usize,
    pub separator: char,
    /// Labels must be strictly below this bound when set.
    pub count: Option<u32>,
}

impl LabelContract {
    #[must_use]
    pub fn from_config(config: &CorpusConfig) -> Self {
        Self {
            field: config.label_field,
            separator: config.label_separator,
            count: config.label_count,
        }
    }

    /// # Errors
    /// `LabelParse` if the stem has too few fields or the field is not an
    /// unsigned integer; `LabelOutOfRange` if it exceeds `count`.
    pub fn parse(&self, path: &Path) -> Result<LabelId, CoreError> {
        let parse_err = |reason: String| CoreError::LabelParse {
            path: path.display().to_string(),
            reason,
        };

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| parse_err("nom de fichier non UTF-8".into()))?;
        let field = stem.split(self.separator).nth(self.field).ok_or_else(|| {
            parse_err(format!(
                "champ {} absent de « {stem} » (séparateur '{}')",
                self.field, self.separator
            ))
        })?;
        let label: u32 = field
            .parse()
            .map_err(|e| parse_err(format!("« {field} » : {e}")))?;

        match self.count {
            Some(count) if label >= count => Err(CoreError::LabelOutOfRange { label, count }),
            _ => Ok(LabelId(label)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(count: Option<u32>) -> LabelContract {
        LabelContract {
            field: 1,
            separator: '-',
            count,
        }
    }

    #[test]
    fn reads_second_field_of_stem() {
        let label = contract(None)
            .parse(Path::new("/data/fold3/101415-3-0-2.wav"))
            .unwrap();
        assert_eq!(label, LabelId(3));
    }

    #[test]
    fn directory_dashes_are_ignored() {
        let label = contract(None)
            .parse(Path::new("/my-data-set/fold1/9-8-0-0.wav"))
            .unwrap();
        assert_eq!(label, LabelId(8));
    }

    #[test]
    fn short_name_is_a_parse_error() {
        let err = contract(None).parse(Path::new("fold1/noise.wav"));
        assert!(matches!(err, Err(CoreError::LabelParse { .. })));
    }

    #[test]
    fn non_numeric_field_is_a_parse_error() {
        let err = contract(None).parse(Path::new("fold1/12-dog-0-0.wav"));
        assert!(matches!(err, Err(CoreError::LabelParse { .. })));
    }

    #[test]
    fn label_count_bounds_labels() {
        let c = contract(Some(10));
        assert_eq!(c.parse(Path::new("1-9-0-0.wav")).unwrap(), LabelId(9));
        assert!(matches!(
            c.parse(Path::new("1-10-0-0.wav")),
            Err(CoreError::LabelOutOfRange { label: 10, count: 10 })
        ));
    }
}
