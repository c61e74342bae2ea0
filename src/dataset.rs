use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::point::{Point, CENSUS_FEATURES};

const ID_COLUMN: &str = "postCode";

/// Postcode census records loaded from a delimited text file
#[derive(Debug, Clone)]
pub struct DataSet {
    points: Vec<Point>,
    pub headers: Option<Vec<String>>,
}

impl DataSet {
    /// Read a census file; `.csv` files are comma separated, anything else tab separated
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;

        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
            _ => b'\t',
        };

        Self::from_reader(file, delimiter).with_context(|| format!("Failed to read {:?}", path))
    }

    /// Read records with a header row from any reader
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(reader);

        let header_record = rdr.headers()?.clone();
        let columns = Columns::locate(&header_record)?;
        let headers = Some(header_record.iter().map(|s| s.to_string()).collect());

        let mut points = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| anyhow!("Error reading record {}: {}", i, e))?;
            points.push(columns.point(&record).with_context(|| format!("Record {}", i))?);
        }

        if points.is_empty() {
            return Err(anyhow!("No data lines found"));
        }

        Ok(Self { points, headers })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Column positions of the identifier and the three census features
#[derive(Debug)]
struct Columns {
    id: usize,
    features: [usize; 3],
}

impl Columns {
    /// Match by header name, falling back to the first four columns
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let named = (
            find(ID_COLUMN),
            find(CENSUS_FEATURES[0]),
            find(CENSUS_FEATURES[1]),
            find(CENSUS_FEATURES[2]),
        );
        if let (Some(id), Some(a), Some(b), Some(c)) = named {
            return Ok(Self { id, features: [a, b, c] });
        }

        if headers.len() < 4 {
            return Err(anyhow!(
                "Expected at least 4 columns ({}, {}), found {}",
                ID_COLUMN,
                CENSUS_FEATURES.join(", "),
                headers.len()
            ));
        }
        Ok(Self { id: 0, features: [1, 2, 3] })
    }

    fn point(&self, record: &StringRecord) -> Result<Point> {
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let id_text = clean_number(field(self.id));
        let id = id_text
            .parse::<i64>()
            .map_err(|e| anyhow!("Invalid {} {:?}: {}", ID_COLUMN, field(self.id), e))?;

        let mut values = [0.0; 3];
        for (slot, (&idx, name)) in values
            .iter_mut()
            .zip(self.features.iter().zip(CENSUS_FEATURES))
        {
            *slot = parse_number(field(idx)).with_context(|| format!("Column {}", name))?;
        }

        Ok(Point::from_census(id, values[0], values[1], values[2]))
    }
}

/// Strip whitespace thousands separators and turn the first comma into a
/// decimal point
fn clean_number(s: &str) -> String {
    let stripped: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    stripped.replacen(',', ".", 1)
}

/// Parse a number written in French style; an empty cell counts as 0
fn parse_number(s: &str) -> Result<f64> {
    let cleaned = clean_number(s);
    if cleaned.is_empty() {
        return Ok(0.0);
    }
    cleaned
        .parse::<f64>()
        .map_err(|e| anyhow!("Invalid number {:?}: {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_columns_any_order() {
        let text = "femaleInhabitants\tpostCode\tinhabitants\tmaleInhabitants\n\
                    52\t75001\t100\t48\n\
                    10\t1000\t21\t11\n";
        let ds = DataSet::from_reader(text.as_bytes(), b'\t').unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.points()[0], Point::from_census(75001, 100.0, 48.0, 52.0));
        assert_eq!(ds.points()[1].id(), 1000);
        assert_eq!(ds.headers.as_ref().map(|h| h.len()), Some(4));
    }

    #[test]
    fn test_positional_fallback_and_french_numbers() {
        let text = "code,total,hommes,femmes\n\
                    13001,\"40 123\",\"19 500,5\",\"20 622,5\"\n";
        let ds = DataSet::from_reader(text.as_bytes(), b',').unwrap();
        assert_eq!(ds.points()[0].id(), 13001);
        assert_eq!(ds.points()[0].features(), &[40123.0, 19500.5, 20622.5]);
    }

    #[test]
    fn test_only_first_comma_is_decimal() {
        assert_eq!(clean_number("19 500,5"), "19500.5");
        assert_eq!(clean_number("1,234,567"), "1.234,567");
        assert_eq!(parse_number("2,5").unwrap(), 2.5);
        assert!(parse_number("1,234,567").is_err());
    }

    #[test]
    fn test_empty_cell_is_zero() {
        let text = "postCode\tinhabitants\tmaleInhabitants\tfemaleInhabitants\n\
                    1000\t\t0\t0\n";
        let ds = DataSet::from_reader(text.as_bytes(), b'\t').unwrap();
        assert_eq!(ds.points()[0].features(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_bad_number_is_error() {
        let text = "postCode\tinhabitants\tmaleInhabitants\tfemaleInhabitants\n\
                    1000\tmany\t1\t1\n";
        assert!(DataSet::from_reader(text.as_bytes(), b'\t').is_err());
    }

    #[test]
    fn test_no_rows_is_error() {
        let text = "postCode\tinhabitants\tmaleInhabitants\tfemaleInhabitants\n";
        assert!(DataSet::from_reader(text.as_bytes(), b'\t').is_err());
    }

    #[test]
    fn test_too_few_columns() {
        let text = "a\tb\n1\t2\n";
        assert!(DataSet::from_reader(text.as_bytes(), b'\t').is_err());
    }
}
