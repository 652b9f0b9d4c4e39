//! District-to-district distance lookup.
//!
//! Lookups never fail: a pair the matrix does not track resolves to
//! [`UNREACHABLE_DISTANCE`], except a district's distance to itself, which is
//! zero unless the matrix says otherwise.

use std::collections::HashMap;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    model::{DistrictId, UNREACHABLE_DISTANCE},
};

pub trait DistanceProvider {
    fn distance(&self, from: DistrictId, to: DistrictId) -> f64;
}

/// How the district axes of a CSV distance table are keyed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistrictLabels {
    /// Header cells and row labels are the integer district ids.
    #[default]
    Header,
    /// Labels are ignored; districts are numbered 0.. in table order.
    Positional,
}

/// Dense distance table. Missing cells are stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    districts: Vec<DistrictId>,
    index: HashMap<DistrictId, usize>,
    values: DMatrix<f64>,
}

impl DistanceMatrix {
    pub fn new(districts: Vec<DistrictId>, values: DMatrix<f64>) -> Result<Self> {
        let (rows, cols) = values.shape();
        if rows != cols {
            return Err(Error::NonSquareDistanceMatrix { rows, cols });
        }
        if rows != districts.len() {
            return Err(Error::LabelCountMismatch {
                labels: districts.len(),
                size: rows,
            });
        }

        let mut index = HashMap::with_capacity(districts.len());
        for (i, &d) in districts.iter().enumerate() {
            if index.insert(d, i).is_some() {
                return Err(Error::DuplicateDistrict(d));
            }
        }

        for row in 0..rows {
            for col in 0..cols {
                let v = values[(row, col)];
                if !v.is_nan() && !(v.is_finite() && v >= 0.) {
                    return Err(Error::BadDistance {
                        row,
                        col,
                        value: v.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            districts,
            index,
            values,
        })
    }

    /// Builds a matrix from row-major rows; `f64::NAN` marks a missing cell.
    pub fn from_rows(districts: &[i64], rows: &[&[f64]]) -> Result<Self> {
        let n = districts.len();
        if rows.len() != n {
            return Err(Error::NonSquareDistanceMatrix {
                rows: rows.len(),
                cols: n,
            });
        }
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != n {
                return Err(Error::RaggedDistanceRow {
                    row,
                    expected: n,
                    found: cells.len(),
                });
            }
        }
        let values = DMatrix::from_fn(n, n, |r, c| rows[r][c]);
        Self::new(districts.iter().copied().map(DistrictId::new).collect(), values)
    }

    /// Parses a table whose header row lists district labels after an empty
    /// corner cell, and whose rows start with their own label. Empty cells are
    /// treated as missing entries.
    ///
    /// Fields may be double-quoted, so a label can contain commas. A quoted
    /// field cannot span lines.
    pub fn from_csv_str(text: &str, labels: DistrictLabels) -> Result<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
            .filter(|(_, l)| !l.trim().is_empty());

        let header: Vec<String> = match lines.next() {
            Some((line, h)) => split_record(h, line)?.into_iter().skip(1).collect(),
            None => return Err(Error::EmptyDistanceMatrix),
        };
        let n = header.len();
        if n == 0 {
            return Err(Error::EmptyDistanceMatrix);
        }

        let districts = match labels {
            DistrictLabels::Header => header
                .iter()
                .map(String::as_str)
                .map(parse_label)
                .collect::<Result<Vec<_>>>()?,
            DistrictLabels::Positional => (0..n as i64).map(DistrictId::new).collect(),
        };

        let mut cells = Vec::with_capacity(n * n);
        let mut rows = 0;
        for (row, (line, record)) in lines.enumerate() {
            let fields = split_record(record, line)?;
            if fields.len() != n + 1 {
                return Err(Error::RaggedDistanceRow {
                    row,
                    expected: n + 1,
                    found: fields.len(),
                });
            }
            if labels == DistrictLabels::Header && districts.get(row) != Some(&parse_label(&fields[0])?) {
                return Err(Error::BadDistrictLabel(fields[0].clone()));
            }
            for (col, raw) in fields[1..].iter().enumerate() {
                cells.push(parse_distance(raw, row, col)?);
            }
            rows += 1;
        }
        if rows != n {
            return Err(Error::NonSquareDistanceMatrix { rows, cols: n });
        }

        Self::new(districts, DMatrix::from_row_slice(n, n, &cells))
    }

    pub fn len(&self) -> usize {
        self.districts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }

    pub fn districts(&self) -> &[DistrictId] {
        &self.districts
    }

    /// Raw table entry, `None` when either district is untracked or the cell
    /// is missing.
    pub fn get(&self, from: DistrictId, to: DistrictId) -> Option<f64> {
        let r = *self.index.get(&from)?;
        let c = *self.index.get(&to)?;
        let v = self.values[(r, c)];
        (!v.is_nan()).then_some(v)
    }
}

impl DistanceProvider for DistanceMatrix {
    fn distance(&self, from: DistrictId, to: DistrictId) -> f64 {
        match self.get(from, to) {
            Some(d) => d,
            None if from == to => 0.,
            None => UNREACHABLE_DISTANCE,
        }
    }
}

/// Splits one CSV record into fields. A quoted field keeps commas and
/// surrounding spaces, and `""` inside it is a literal quote. Unquoted
/// fields are trimmed.
fn split_record(record: &str, line: usize) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut chars = record.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let mut field = String::new();
        if chars.next_if_eq(&'"').is_some() {
            loop {
                match chars.next() {
                    Some('"') if chars.next_if_eq(&'"').is_some() => field.push('"'),
                    Some('"') => break,
                    Some(c) => field.push(c),
                    None => return Err(Error::MalformedCsv { line }),
                }
            }
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            if chars.peek().is_some_and(|&c| c != ',') {
                return Err(Error::MalformedCsv { line });
            }
        } else {
            while let Some(c) = chars.next_if(|&c| c != ',') {
                field.push(c);
            }
            field.truncate(field.trim_end().len());
        }
        fields.push(field);
        // either the separator or the end of the record
        if chars.next().is_none() {
            return Ok(fields);
        }
    }
}

fn parse_label(label: &str) -> Result<DistrictId> {
    label
        .parse::<i64>()
        .map(DistrictId::new)
        .map_err(|_| Error::BadDistrictLabel(label.to_owned()))
}

fn parse_distance(raw: &str, row: usize, col: usize) -> Result<f64> {
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0. => Ok(v),
        _ => Err(Error::BadDistance {
            row,
            col,
            value: raw.to_owned(),
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn d(id: i64) -> DistrictId {
        DistrictId::new(id)
    }

    #[test]
    fn lookup_and_sentinels() {
        let m = DistanceMatrix::from_rows(&[0, 1], &[&[0., 100.], &[100., 0.]]).unwrap();
        assert_eq!(m.distance(d(0), d(1)), 100.);
        assert_eq!(m.distance(d(1), d(1)), 0.);
        assert_eq!(m.distance(d(0), d(7)), UNREACHABLE_DISTANCE);
        assert_eq!(m.distance(d(7), d(7)), 0.);
        assert_eq!(m.distance(d(7), d(1)), UNREACHABLE_DISTANCE);
    }

    #[test]
    fn missing_cell_is_unreachable() {
        let m = DistanceMatrix::from_rows(&[0, 1], &[&[0., f64::NAN], &[3., 0.]]).unwrap();
        assert_eq!(m.get(d(0), d(1)), None);
        assert_eq!(m.distance(d(0), d(1)), UNREACHABLE_DISTANCE);
        assert_eq!(m.distance(d(1), d(0)), 3.);
    }

    #[test]
    fn asymmetric_entries_are_kept() {
        let m = DistanceMatrix::from_rows(&[4, 9], &[&[0., 5.], &[8., 0.]]).unwrap();
        assert_eq!(m.distance(d(4), d(9)), 5.);
        assert_eq!(m.distance(d(9), d(4)), 8.);
    }

    #[test]
    fn rejects_negative_distance() {
        let err = DistanceMatrix::from_rows(&[0, 1], &[&[0., -1.], &[1., 0.]]).unwrap_err();
        assert!(matches!(err, Error::BadDistance { row: 0, col: 1, .. }));
    }

    #[test]
    fn label_count_must_match_size() {
        let err = DistanceMatrix::new(vec![d(0)], DMatrix::zeros(2, 2)).unwrap_err();
        assert!(matches!(err, Error::LabelCountMismatch { labels: 1, size: 2 }));
    }

    #[test]
    fn rejects_duplicate_district() {
        let err = DistanceMatrix::from_rows(&[2, 2], &[&[0., 1.], &[1., 0.]]).unwrap_err();
        assert!(matches!(err, Error::DuplicateDistrict(id) if id == d(2)));
    }

    #[test]
    fn parses_csv_with_header_labels() {
        let csv = ",3,5\n3,0,12.5\n5,12.5,0\n";
        let m = DistanceMatrix::from_csv_str(csv, DistrictLabels::Header).unwrap();
        assert_eq!(m.districts(), &[d(3), d(5)]);
        assert_eq!(m.distance(d(3), d(5)), 12.5);
    }

    #[test]
    fn parses_csv_positionally() {
        let csv = "\"\",north,south\r\nnorth,0,7\r\nsouth,7,\r\n";
        let m = DistanceMatrix::from_csv_str(csv, DistrictLabels::Positional).unwrap();
        assert_eq!(m.distance(d(0), d(1)), 7.);
        // empty cell on the diagonal falls back to zero self-distance
        assert_eq!(m.distance(d(1), d(1)), 0.);
    }

    #[test]
    fn quoted_labels_may_contain_commas() {
        let csv = "\"\",\"Lisboa, Norte\",\"Porto\"\n\"Lisboa, Norte\",0,5\n\"Porto\",5,0\n";
        let m = DistanceMatrix::from_csv_str(csv, DistrictLabels::Positional).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m.distance(d(0), d(1)), 5.);
        assert_eq!(m.distance(d(1), d(0)), 5.);

        let csv = ",\"3\",\"5\"\n\"3\",0,\"1.5\"\n5,1.5,0\n";
        let m = DistanceMatrix::from_csv_str(csv, DistrictLabels::Header).unwrap();
        assert_eq!(m.distance(d(3), d(5)), 1.5);
    }

    #[test]
    fn splits_quoted_fields() {
        assert_eq!(
            split_record(r#"a, "b,c" ,"say ""hi""""#, 1).unwrap(),
            ["a", "b,c", "say \"hi\""]
        );
        assert_eq!(split_record(",,", 1).unwrap(), ["", "", ""]);
        assert!(matches!(split_record(r#""open,1"#, 4), Err(Error::MalformedCsv { line: 4 })));
        assert!(matches!(split_record(r#""a"b,1"#, 2), Err(Error::MalformedCsv { line: 2 })));
    }

    #[test]
    fn csv_errors() {
        assert!(matches!(
            DistanceMatrix::from_csv_str("", DistrictLabels::Header),
            Err(Error::EmptyDistanceMatrix)
        ));
        assert!(matches!(
            DistanceMatrix::from_csv_str(",0,1\n0,0,1\n", DistrictLabels::Header),
            Err(Error::NonSquareDistanceMatrix { rows: 1, cols: 2 })
        ));
        assert!(matches!(
            DistanceMatrix::from_csv_str(",0,1\n0,0\n1,1,0\n", DistrictLabels::Header),
            Err(Error::RaggedDistanceRow { row: 0, .. })
        ));
        assert!(matches!(
            DistanceMatrix::from_csv_str(",0,x\n0,0,1\nx,1,0\n", DistrictLabels::Header),
            Err(Error::BadDistrictLabel(_))
        ));
        assert!(matches!(
            DistanceMatrix::from_csv_str(",0,1\n0,0,far\n1,1,0\n", DistrictLabels::Header),
            Err(Error::BadDistance { row: 0, col: 1, .. })
        ));
    }
}
