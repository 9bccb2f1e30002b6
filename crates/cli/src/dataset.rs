//! Training data loading
//!
//! Reads a fixture CSV with the exact header
//! `home_form,market_margin,home_implied,outcome`, where `outcome` is one of
//! `home`, `draw`, `away` (or the class ids `2`, `1`, `0`).

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use matchcast_lib::Outcome;

const EXPECTED_HEADER: [&str; 4] = ["home_form", "market_margin", "home_implied", "outcome"];

/// A parsed training table: feature rows and outcome labels
#[derive(Debug)]
pub struct Dataset {
    pub rows: Vec<Vec<f64>>,
    pub labels: Vec<Outcome>,
}

/// Load and parse a fixture CSV
pub fn load(path: &Path) -> Result<Dataset> {
    let file = File::open(path)
        .with_context(|| format!("failed to read training data {}", path.display()))?;
    parse(BufReader::new(file))
        .with_context(|| format!("invalid training data in {}", path.display()))
}

/// Parse fixture CSV content
pub fn parse(input: impl Read) -> Result<Dataset> {
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let columns: Vec<&str> = reader.headers().context("missing header row")?.iter().collect();
    if columns != EXPECTED_HEADER {
        bail!(
            "unexpected header {:?}, expected {:?}",
            columns,
            EXPECTED_HEADER
        );
    }

    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for result in reader.records() {
        let record = result.context("malformed record")?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let mut row = Vec::with_capacity(EXPECTED_HEADER.len() - 1);
        for field in record.iter().take(EXPECTED_HEADER.len() - 1) {
            let value: f64 = field
                .parse()
                .with_context(|| format!("line {}: invalid number {:?}", line, field))?;
            row.push(value);
        }
        rows.push(row);
        labels.push(parse_outcome(&record[3]).with_context(|| format!("line {}", line))?);
    }

    if rows.is_empty() {
        bail!("no data rows");
    }
    Ok(Dataset { rows, labels })
}

fn parse_outcome(field: &str) -> Result<Outcome> {
    match field.to_ascii_lowercase().as_str() {
        "home" | "2" => Ok(Outcome::Home),
        "draw" | "1" => Ok(Outcome::Draw),
        "away" | "0" => Ok(Outcome::Away),
        other => bail!("unknown outcome {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
home_form,market_margin,home_implied,outcome
0.8,0.05,0.70,home
0.2,0.06,0.30,away
0.5,0.05,0.45,draw
";

    #[test]
    fn test_parse_sample() {
        let dataset = parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dataset.rows.len(), 3);
        assert_eq!(dataset.rows[0], vec![0.8, 0.05, 0.70]);
        assert_eq!(
            dataset.labels,
            vec![Outcome::Home, Outcome::Away, Outcome::Draw]
        );
    }

    #[test]
    fn test_parse_numeric_labels() {
        let text = "home_form,market_margin,home_implied,outcome\n0.5,0.05,0.5,2\n0.4,0.05,0.4,0\n";
        let dataset = parse(text.as_bytes()).unwrap();
        assert_eq!(dataset.labels, vec![Outcome::Home, Outcome::Away]);
    }

    #[test]
    fn test_parse_quoted_fields() {
        let text = "home_form,market_margin,home_implied,outcome\n\"0.5\",0.05,0.45,\"draw\"\n";
        let dataset = parse(text.as_bytes()).unwrap();
        assert_eq!(dataset.rows[0], vec![0.5, 0.05, 0.45]);
        assert_eq!(dataset.labels, vec![Outcome::Draw]);
    }

    #[test]
    fn test_rejects_quoted_comma_as_number() {
        // A quoted field with an embedded comma is one field, not two,
        // and must fail numeric parsing rather than shift the columns
        let text = "home_form,market_margin,home_implied,outcome\n\"0,5\",0.05,0.45,draw\n";
        let err = parse(text.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid number"));
    }

    #[test]
    fn test_rejects_bad_header() {
        let text = "a,b,c,d\n1,2,3,home\n";
        assert!(parse(text.as_bytes()).is_err());
    }

    #[test]
    fn test_rejects_unknown_outcome() {
        let text = "home_form,market_margin,home_implied,outcome\n0.5,0.05,0.5,tie\n";
        assert!(parse(text.as_bytes()).is_err());
    }

    #[test]
    fn test_rejects_wrong_field_count() {
        let text = "home_form,market_margin,home_implied,outcome\n0.5,0.05,0.5\n";
        assert!(parse(text.as_bytes()).is_err());
    }

    #[test]
    fn test_rejects_empty_file() {
        assert!(parse("".as_bytes()).is_err());
        assert!(parse("home_form,market_margin,home_implied,outcome\n".as_bytes()).is_err());
    }

    #[test]
    fn test_skips_blank_lines() {
        let text = "home_form,market_margin,home_implied,outcome\n0.5,0.05,0.5,home\n\n0.4,0.06,0.4,away\n";
        let dataset = parse(text.as_bytes()).unwrap();
        assert_eq!(dataset.rows.len(), 2);
    }
}
