//! Word bank loading from CSV

use csv::{ReaderBuilder, StringRecord};
use phonix_core::errors::{CoreError, CoreResult};
use phonix_core::types::WordCandidate;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

const TEXT_COLUMNS: [&str; 2] = ["text", "word"];
const IMAGE_COLUMNS: [&str; 2] = ["has_image", "image"];

/// Load a word bank from a CSV file with a header row
pub fn load_word_bank(path: &Path, delimiter: char) -> CoreResult<Vec<WordCandidate>> {
    info!("Loading word bank from: {}", path.display());

    let file = File::open(path).map_err(|e| {
        CoreError::WordBank(format!("Failed to open file {}: {}", path.display(), e))
    })?;

    read_word_bank(file, delimiter)
}

/// Read word bank rows from any CSV source
pub fn read_word_bank<R: Read>(source: R, delimiter: char) -> CoreResult<Vec<WordCandidate>> {
    if !delimiter.is_ascii() {
        return Err(CoreError::WordBank(format!(
            "Delimiter '{}' must be a single ASCII character",
            delimiter
        )));
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| CoreError::WordBank(format!("Failed to read headers: {}", e)))?
        .clone();
    debug!("Word bank headers: {:?}", headers);

    let text_col = find_column(&headers, &TEXT_COLUMNS).ok_or_else(|| {
        CoreError::WordBank("Word bank needs a 'text' column".to_string())
    })?;
    let image_col = find_column(&headers, &IMAGE_COLUMNS);

    let mut words = Vec::new();
    let mut skipped = 0;

    for (row, result) in reader.records().enumerate() {
        // header is line 1
        let line = row + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping line {}: {}", line, e);
                skipped += 1;
                continue;
            }
        };

        match parse_row(&record, text_col, image_col) {
            Ok(word) => words.push(word),
            Err(reason) => {
                warn!("Skipping line {}: {}", line, reason);
                skipped += 1;
            }
        }
    }

    info!("Loaded {} words ({} skipped)", words.len(), skipped);
    Ok(words)
}

fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|name| h.eq_ignore_ascii_case(name)))
}

fn parse_row(
    record: &StringRecord,
    text_col: usize,
    image_col: Option<usize>,
) -> Result<WordCandidate, String> {
    let text = record.get(text_col).unwrap_or("").trim();
    if text.is_empty() {
        return Err("word text is blank".to_string());
    }

    let has_image = match image_col.and_then(|col| record.get(col)) {
        Some(value) if !value.trim().is_empty() => parse_bool(value)
            .ok_or_else(|| format!("'{}' is not a valid has_image value", value))?,
        _ => false,
    };

    Ok(WordCandidate::new(text, has_image))
}

/// Parse the boolean spellings accepted in the `has_image` column
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_basic_word_bank() {
        let csv = "text,has_image\ncat,true\ndog,no\nship,\n";
        let words = read_word_bank(csv.as_bytes(), ',').unwrap();
        assert_eq!(
            words,
            vec![
                WordCandidate::new("cat", true),
                WordCandidate::new("dog", false),
                WordCandidate::new("ship", false),
            ]
        );
    }

    #[test]
    fn test_image_column_is_optional() {
        let words = read_word_bank("word\nfish\nchip\n".as_bytes(), ',').unwrap();
        assert_eq!(words.len(), 2);
        assert!(words.iter().all(|w| !w.has_image));
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let csv = "text,has_image\ncat,1\n  ,true\nfrog,maybe\nsun,0\n";
        let words = read_word_bank(csv.as_bytes(), ',').unwrap();
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["cat", "sun"]);
    }

    #[test]
    fn test_missing_text_column_is_an_error() {
        let result = read_word_bank("name,has_image\ncat,true\n".as_bytes(), ',');
        assert!(matches!(result, Err(CoreError::WordBank(_))));
    }

    #[test]
    fn test_custom_delimiter_and_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Text;Has_Image").unwrap();
        writeln!(file, "shell;yes").unwrap();
        writeln!(file, "thin;no").unwrap();

        let words = load_word_bank(file.path(), ';').unwrap();
        assert_eq!(words, vec![WordCandidate::new("shell", true), WordCandidate::new("thin", false)]);
    }

    #[test]
    fn test_missing_file() {
        let result = load_word_bank(Path::new("/no/such/words.csv"), ',');
        assert!(matches!(result, Err(CoreError::WordBank(_))));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool(" YES "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("sometimes"), None);
    }
}
