// SPDX-License-Identifier: MPL-2.0
//! An independence oracle backed by a pre-tabulated truth table in CSV form.

use std::{error::Error, fmt, io, path::Path};

use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::independence::{CiTestError, IndependenceTest};

/// The exact header the truth-table CSV must carry.
const EXPECTED_COLUMNS: [&str; 4] = [
    "X",
    "Y",
    "Conditioning Set",
    "(Conditional) Independence Holds",
];

/// Reads (conditional) independence verdicts from a `;`-separated CSV table:
///
/// ```text
/// X;Y;Conditioning Set;(Conditional) Independence Holds
/// x0;x2;[];False
/// x0;x2;[x1];True
/// ```
///
/// Rows are keyed by variable *names*; the oracle is constructed with the
/// label of each column of the data, in vertex order, and translates the
/// vertex indices of each query. Keys are canonicalised on both sides: the
/// pair is stored with `X < Y` lexicographically and the conditioning set
/// sorted ascending, so `(x, y, Z)` and `(y, x, Z)` resolve to the same row.
///
/// A query with no matching row fails with a [`CiTestError`]; the algorithm
/// propagates that failure and discards the partial graph.
pub struct TableOracle {
    labels: Vec<String>,
    verdicts: FxHashMap<(String, String, Vec<String>), bool>,
}

/// Error that can occur when loading a truth table.
#[derive(Debug)]
pub enum OracleLoadError {
    /// The file could not be read or parsed as `;`-separated CSV.
    Csv(csv::Error),
    /// The header row differs from the expected four columns.
    InvalidHeader(Vec<String>),
    /// A conditioning set was not of the form `[]` or `[a, b, ...]`.
    MalformedConditioningSet(String),
    /// A verdict was neither `True` nor `False`.
    InvalidVerdict(String),
    /// A row referenced a variable name outside the supplied labels.
    UnknownVariable(String),
}

impl Error for OracleLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            OracleLoadError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for OracleLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleLoadError::Csv(err) => write!(f, "truth table is not readable CSV: {err}"),
            OracleLoadError::InvalidHeader(found) => write!(
                f,
                "truth table header {found:?} does not match {EXPECTED_COLUMNS:?}"
            ),
            OracleLoadError::MalformedConditioningSet(raw) => {
                write!(f, "conditioning set '{raw}' is not of the form [a, b, ...]")
            }
            OracleLoadError::InvalidVerdict(raw) => {
                write!(f, "verdict '{raw}' is neither 'True' nor 'False'")
            }
            OracleLoadError::UnknownVariable(name) => {
                write!(f, "variable '{name}' does not appear in the supplied labels")
            }
        }
    }
}

impl From<csv::Error> for OracleLoadError {
    fn from(err: csv::Error) -> OracleLoadError {
        OracleLoadError::Csv(err)
    }
}

impl TableOracle {
    /// Loads a truth table from a file. `labels` names the variables in
    /// vertex order.
    pub fn from_path<P, S>(path: P, labels: &[S]) -> Result<TableOracle, OracleLoadError>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_path(path)?;
        TableOracle::from_csv_reader(reader, labels)
    }

    /// Loads a truth table from any reader, e.g. an in-memory string.
    pub fn from_reader<R, S>(reader: R, labels: &[S]) -> Result<TableOracle, OracleLoadError>
    where
        R: io::Read,
        S: AsRef<str>,
    {
        let reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_reader(reader);
        TableOracle::from_csv_reader(reader, labels)
    }

    fn from_csv_reader<R, S>(
        mut reader: csv::Reader<R>,
        labels: &[S],
    ) -> Result<TableOracle, OracleLoadError>
    where
        R: io::Read,
        S: AsRef<str>,
    {
        let labels: Vec<String> = labels.iter().map(|s| s.as_ref().to_owned()).collect();
        let known: FxHashSet<&str> = labels.iter().map(String::as_str).collect();

        let header = reader.headers()?;
        if header.iter().ne(EXPECTED_COLUMNS) {
            return Err(OracleLoadError::InvalidHeader(
                header.iter().map(str::to_owned).collect(),
            ));
        }

        let mut verdicts = FxHashMap::default();
        for record in reader.records() {
            let record = record?;
            let x = record.get(0).unwrap_or_default().trim();
            let y = record.get(1).unwrap_or_default().trim();
            let conditioning_set = parse_conditioning_set(record.get(2).unwrap_or_default())?;
            let verdict = match record.get(3).unwrap_or_default().trim() {
                "True" => true,
                "False" => false,
                other => return Err(OracleLoadError::InvalidVerdict(other.to_owned())),
            };

            for name in [x, y].into_iter().chain(conditioning_set.iter().map(String::as_str)) {
                if !known.contains(name) {
                    return Err(OracleLoadError::UnknownVariable(name.to_owned()));
                }
            }

            verdicts.insert(canonical_key(x, y, conditioning_set), verdict);
        }

        Ok(TableOracle { labels, verdicts })
    }

    /// Materialises a complete truth table by querying `test` for every
    /// pair of variables and every conditioning subset of the remaining
    /// variables, the empty set included.
    ///
    /// The number of queries grows exponentially in the number of labels;
    /// this is meant for tabulating small example systems, not for
    /// production-sized variable sets.
    pub fn tabulate<T, S>(test: &T, labels: &[S], level: f64) -> Result<TableOracle, CiTestError>
    where
        T: IndependenceTest + ?Sized,
        S: AsRef<str>,
    {
        let labels: Vec<String> = labels.iter().map(|s| s.as_ref().to_owned()).collect();
        let n = labels.len();

        let mut verdicts = FxHashMap::default();
        for x in 0..n {
            for y in x + 1..n {
                let others: Vec<usize> = (0..n).filter(|&v| v != x && v != y).collect();
                for size in 0..=others.len() {
                    for z in others.iter().copied().combinations(size) {
                        let verdict = if z.is_empty() {
                            test.indep(x, y, level)?
                        } else {
                            test.cind(x, y, &z, level)?
                        };
                        let conditioning_set =
                            z.iter().map(|&v| labels[v].clone()).collect();
                        verdicts.insert(
                            canonical_key(&labels[x], &labels[y], conditioning_set),
                            verdict,
                        );
                    }
                }
            }
        }

        Ok(TableOracle { labels, verdicts })
    }

    /// Renders the table in the `;`-separated CSV format read by
    /// [`TableOracle::from_reader`], rows sorted by pair and conditioning
    /// set for a stable output.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
        writer.write_record(EXPECTED_COLUMNS)?;

        let mut rows: Vec<_> = self.verdicts.iter().collect();
        rows.sort_unstable_by_key(|&(key, _)| key.clone());

        for ((x, y, conditioning_set), verdict) in rows {
            let rendered_set = format!("[{}]", conditioning_set.join(", "));
            let rendered_verdict = if *verdict { "True" } else { "False" };
            writer.write_record([x.as_str(), y.as_str(), rendered_set.as_str(), rendered_verdict])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// The variable labels, in vertex order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    fn lookup(&self, x: usize, y: usize, z: &[usize]) -> Result<bool, CiTestError> {
        let name = |v: usize| -> Result<&str, CiTestError> {
            self.labels
                .get(v)
                .map(String::as_str)
                .ok_or_else(|| CiTestError::new(format!("vertex {v} has no label in the oracle")))
        };

        let conditioning_set = z
            .iter()
            .map(|&v| name(v).map(str::to_owned))
            .collect::<Result<Vec<_>, _>>()?;
        let key = canonical_key(name(x)?, name(y)?, conditioning_set);

        self.verdicts.get(&key).copied().ok_or_else(|| {
            CiTestError::new(format!(
                "no oracle entry for {} _||_ {} | {:?}",
                key.0, key.1, key.2
            ))
        })
    }
}

impl IndependenceTest for TableOracle {
    fn indep(&self, x: usize, y: usize, _level: f64) -> Result<bool, CiTestError> {
        self.lookup(x, y, &[])
    }

    fn cind(&self, x: usize, y: usize, z: &[usize], _level: f64) -> Result<bool, CiTestError> {
        self.lookup(x, y, z)
    }
}

/// Parses `[]` or `[a, b, ...]` into the list of names.
fn parse_conditioning_set(raw: &str) -> Result<Vec<String>, OracleLoadError> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| OracleLoadError::MalformedConditioningSet(raw.to_owned()))?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(inner.split(',').map(|name| name.trim().to_owned()).collect())
}

/// Orders the pair lexicographically and sorts the conditioning set, so that
/// storage and lookup agree regardless of query orientation.
fn canonical_key(x: &str, y: &str, mut conditioning_set: Vec<String>) -> (String, String, Vec<String>) {
    conditioning_set.sort_unstable();
    if x <= y {
        (x.to_owned(), y.to_owned(), conditioning_set)
    } else {
        (y.to_owned(), x.to_owned(), conditioning_set)
    }
}
