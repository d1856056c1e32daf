//! Parser for comma-separated sample tables.
//!
//! The first non-comment line is the header. Each header field is a column
//! label, `name` or `name [unit]`. Every following line holds one sample
//! with exactly one number per column.

use std::path::Path;

use log::debug;
use tabula_core::{ColumnInfo, SampledDerivedSeries, SampledSeries};

use crate::ParseError;

/// A table with derivative columns, parsed into a Hermite-interpolated series.
#[derive(Debug, Clone)]
pub struct DerivedTable {
    pub series: SampledDerivedSeries,
    pub independent: ColumnInfo,
    /// Value columns, in header order. Derivative columns are implied.
    pub channels: Vec<ColumnInfo>,
}

/// Header and numeric rows before they are split into series columns.
struct RawTable {
    header_line: usize,
    columns: Vec<ColumnInfo>,
    rows: Vec<Vec<f64>>,
}

fn is_skipped(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('#')
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

/// Split a header label `name [unit]` into its parts.
pub fn parse_label(label: &str) -> ColumnInfo {
    let label = label.trim();
    if let Some((name, unit)) = label
        .strip_suffix(']')
        .and_then(|inner| inner.rsplit_once('['))
    {
        return ColumnInfo {
            name: name.trim().to_string(),
            unit: Some(unit.trim().to_string()),
        };
    }
    ColumnInfo::named(label)
}

impl RawTable {
    fn parse(content: &str) -> Result<Self, ParseError> {
        let mut lines = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !is_skipped(line));

        let (header_idx, header) = lines.next().ok_or_else(|| ParseError::FormatError {
            line: 1,
            message: "Table has no header row".into(),
        })?;
        let header_line = header_idx + 1;

        let columns: Vec<ColumnInfo> = split_fields(header).into_iter().map(parse_label).collect();
        if columns.len() < 2 {
            return Err(ParseError::FormatError {
                line: header_line,
                message: "Table must have an independent column and at least one channel".into(),
            });
        }
        for (c, column) in columns.iter().enumerate() {
            if column.name.is_empty() {
                return Err(ParseError::FormatError {
                    line: header_line,
                    message: format!("Column {} has an empty name", c + 1),
                });
            }
            if columns[..c].iter().any(|other| other.name == column.name) {
                return Err(ParseError::FormatError {
                    line: header_line,
                    message: format!("Duplicate column name '{}'", column.name),
                });
            }
        }

        let mut rows = Vec::new();
        for (idx, line) in lines {
            let fields = split_fields(line);
            if fields.len() != columns.len() {
                return Err(ParseError::FormatError {
                    line: idx + 1,
                    message: format!("Expected {} columns, got {}", columns.len(), fields.len()),
                });
            }
            let row = fields
                .iter()
                .zip(&columns)
                .map(|(field, column)| {
                    field.parse::<f64>().map_err(|_| ParseError::FormatError {
                        line: idx + 1,
                        message: format!("Invalid value for '{}': {}", column.name, field),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }

        Ok(Self {
            header_line,
            columns,
            rows,
        })
    }

    fn independent_column(&self, name: Option<&str>) -> Result<usize, ParseError> {
        let Some(name) = name else {
            return Ok(0);
        };
        self.columns
            .iter()
            .position(|column| column.name == name)
            .ok_or_else(|| ParseError::FormatError {
                line: self.header_line,
                message: format!("No column named '{}'", name),
            })
    }
}

/// Parse a table into a [`SampledSeries`].
///
/// The independent variable is the column called `independent`, or the first
/// column when `None`. Every other column becomes a channel, named and
/// unit-tagged from its header label.
pub fn parse_table(content: &str, independent: Option<&str>) -> Result<SampledSeries, ParseError> {
    let raw = RawTable::parse(content)?;
    let x_col = raw.independent_column(independent)?;
    let channels: Vec<usize> = (0..raw.columns.len()).filter(|&c| c != x_col).collect();

    let mut series = SampledSeries::new(channels.len())?;
    series.set_independent_info(raw.columns[x_col].clone());
    series.set_channel_info(channels.iter().map(|&c| raw.columns[c].clone()).collect())?;

    let mut y = vec![0.0; channels.len()];
    for row in &raw.rows {
        for (slot, &c) in y.iter_mut().zip(&channels) {
            *slot = row[c];
        }
        series.append(row[x_col], &y)?;
    }

    debug!(
        "Parsed {} samples of {} channels (independent '{}')",
        series.len(),
        series.num_channels(),
        series.independent_info().name
    );
    Ok(series)
}

/// Parse a table whose channels carry derivative columns.
///
/// Each channel column `a` must be accompanied by a column `da` holding
/// its derivative with respect to the independent variable, e.g.
/// `t, x, v, dx, dv`.
pub fn parse_derived_table(
    content: &str,
    independent: Option<&str>,
) -> Result<DerivedTable, ParseError> {
    let raw = RawTable::parse(content)?;
    let x_col = raw.independent_column(independent)?;

    let mut pairs: Vec<(usize, usize)> = Vec::new();
    let mut claimed = vec![false; raw.columns.len()];
    claimed[x_col] = true;
    for (c, column) in raw.columns.iter().enumerate() {
        if c == x_col {
            continue;
        }
        let derivative = format!("d{}", column.name);
        if let Some(d) = raw
            .columns
            .iter()
            .enumerate()
            .position(|(d, other)| d != x_col && other.name == derivative)
        {
            pairs.push((c, d));
            claimed[c] = true;
            claimed[d] = true;
        }
    }
    if let Some(orphan) = claimed.iter().position(|&used| !used) {
        let name = &raw.columns[orphan].name;
        return Err(ParseError::FormatError {
            line: raw.header_line,
            message: format!(
                "Column '{}' has no derivative column 'd{}' and is not a derivative itself",
                name, name
            ),
        });
    }

    let mut series = SampledDerivedSeries::new(pairs.len())?;
    let mut y = vec![0.0; pairs.len()];
    let mut dy = vec![0.0; pairs.len()];
    for row in &raw.rows {
        for (k, &(c, d)) in pairs.iter().enumerate() {
            y[k] = row[c];
            dy[k] = row[d];
        }
        series.append(row[x_col], &y, &dy)?;
    }

    debug!(
        "Parsed {} samples of {} channels with derivatives",
        series.len(),
        pairs.len()
    );
    Ok(DerivedTable {
        series,
        independent: raw.columns[x_col].clone(),
        channels: pairs.iter().map(|&(c, _)| raw.columns[c].clone()).collect(),
    })
}

/// Read and parse a table file.
pub fn read_table(path: &Path, independent: Option<&str>) -> Result<SampledSeries, ParseError> {
    let content = std::fs::read_to_string(path)?;
    let series = parse_table(&content, independent)?;
    debug!("Loaded {}", path.display());
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const OSCILLATOR: &str = "\
# damped oscillator, dt = 0.5
time [s], position [m], velocity [m/s]
0.0, 1.0, 0.0

1.0, 0.5, -0.8
# mid-run comment
2.0, -0.2, -0.6
3.0, -0.4, 0.1
";

    #[test]
    fn test_parse_header_units_and_rows() {
        let series = parse_table(OSCILLATOR, None).unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series.num_channels(), 2);
        assert_eq!(series.independent_info().label(), "time [s]");
        assert_eq!(series.channel_info()[1].name, "velocity");
        assert_eq!(series.channel_info()[1].unit.as_deref(), Some("m/s"));
        assert_eq!(series.retrieve_by_index(2).unwrap(), (2.0, vec![-0.2, -0.6]));
    }

    #[test]
    fn test_named_independent_column() {
        let content = "a, t, b\n10, 0, 20\n11, 1, 21\n12, 2, 22\n";
        let mut series = parse_table(content, Some("t")).unwrap();
        assert_eq!(series.x_values(), &[0.0, 1.0, 2.0]);
        assert_eq!(series.channel_info()[0].name, "a");
        assert_eq!(series.channel_info()[1].name, "b");
        let y = series.retrieve(1.5).unwrap();
        assert_abs_diff_eq!(y[0], 11.5, epsilon = 1e-12);
        assert_abs_diff_eq!(y[1], 21.5, epsilon = 1e-12);

        let err = parse_table(content, Some("time")).unwrap_err();
        assert!(err.to_string().contains("No column named 'time'"));
    }

    #[test]
    fn test_bad_value_reports_line() {
        let content = "# header follows\nt, y\n0, 1\n1, abc\n";
        let err = parse_table(content, None).unwrap_err();
        assert!(matches!(err, ParseError::FormatError { line: 4, .. }));
        assert!(err.to_string().contains("Invalid value for 'y'"));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let err = parse_table("t, y\n0, 1\n1, 2, 3\n", None).unwrap_err();
        assert!(matches!(err, ParseError::FormatError { line: 3, .. }));
        assert!(err.to_string().contains("Expected 2 columns, got 3"));
    }

    #[test]
    fn test_header_problems() {
        assert!(matches!(
            parse_table("# only comments\n\n", None),
            Err(ParseError::FormatError { line: 1, .. })
        ));
        assert!(parse_table("t\n0\n", None).is_err());
        assert!(parse_table("t, y, y\n0, 1, 2\n", None)
            .unwrap_err()
            .to_string()
            .contains("Duplicate column name 'y'"));
        assert!(parse_table("t, , y\n", None).is_err());
    }

    #[test]
    fn test_header_only_table_is_empty() {
        let series = parse_table("t, y\n", None).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.num_channels(), 1);
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label(" time "), ColumnInfo::named("time"));
        let info = parse_label("energy [J]");
        assert_eq!(info.name, "energy");
        assert_eq!(info.unit.as_deref(), Some("J"));
        assert_eq!(parse_label("a[b"), ColumnInfo::named("a[b"));
    }

    #[test]
    fn test_parse_derived_table() {
        let mut content = String::from("t, x, v, dx, dv\n");
        for i in 0..=10 {
            let t = 0.2 * i as f64;
            content.push_str(&format!(
                "{}, {}, {}, {}, {}\n",
                t,
                t.cos(),
                -t.sin(),
                -t.sin(),
                -t.cos()
            ));
        }
        let mut table = parse_derived_table(&content, None).unwrap();
        assert_eq!(table.independent.name, "t");
        let names: Vec<&str> = table.channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["x", "v"]);
        let y = table.series.retrieve(0.9).unwrap();
        assert_abs_diff_eq!(y[0], 0.9_f64.cos(), epsilon = 1e-5);
        assert_abs_diff_eq!(y[1], -(0.9_f64.sin()), epsilon = 1e-5);
    }

    #[test]
    fn test_derived_table_requires_pairs() {
        let err = parse_derived_table("t, x, v, dx\n0, 1, 0, 0\n", None).unwrap_err();
        assert!(err.to_string().contains("Column 'v'"));
        let err = parse_derived_table("t, x, dx, dq\n0, 1, 0, 0\n", None).unwrap_err();
        assert!(err.to_string().contains("Column 'dq'"));
    }
}
