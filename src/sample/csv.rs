use ::csv;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::fmt::{self, Display};
use nalgebra::DMatrix;
use tracing::info;
use crate::Label;
use crate::error::ClassifyError;
use super::Dataset;

/// Layouts of the headerless comma-separated files the toolkit reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {

    /// Four measurements followed by the species name (Iris-setosa, Iris-versicolor, Iris-virginica).
    Iris,

    /// Thirteen measurements followed by the cultivar (1 to 3).
    Wine,

    /// Thirteen measurements followed by the diagnosis coded from zero. Diagnoses
    /// 0 to 3 map to classes 1 to 4; a file holding any other diagnosis (such as 4)
    /// is rejected as a whole with ClassifyError::LabelRange.
    HeartDisease,

    /// Animal name, sixteen attributes and the animal type (1 to 7).
    Zoo,

    /// Any number of measurements followed by a 1-based integer label. The
    /// number of classes is the largest label in the file.
    Generic

}

impl DatasetFormat {

    fn n_fields(&self) -> Option<usize> {
        match self {
            DatasetFormat::Iris => Some(4),
            DatasetFormat::Wine | DatasetFormat::HeartDisease => Some(13),
            DatasetFormat::Zoo => Some(16),
            DatasetFormat::Generic => None
        }
    }

    fn n_classes(&self) -> Option<usize> {
        match self {
            DatasetFormat::Iris | DatasetFormat::Wine => Some(3),
            DatasetFormat::HeartDisease => Some(4),
            DatasetFormat::Zoo => Some(7),
            DatasetFormat::Generic => None
        }
    }

    fn has_name(&self) -> bool {
        *self == DatasetFormat::Zoo
    }

    fn parse_label(&self, field : &str, line : usize) -> Result<Label, ClassifyError> {
        let parse_err = || ClassifyError::Parse { line, value : field.to_string() };
        match self {
            DatasetFormat::Iris => {
                if field.starts_with("Iris-setosa") {
                    Ok(1)
                } else if field.starts_with("Iris-versicolor") {
                    Ok(2)
                } else {
                    Ok(3)
                }
            },
            DatasetFormat::HeartDisease => field.parse::<Label>().map(|t| t + 1 ).map_err(|_| parse_err() ),
            _ => field.parse::<Label>().map_err(|_| parse_err() )
        }
    }

}

impl Display for DatasetFormat {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetFormat::Iris => write!(f, "iris"),
            DatasetFormat::Wine => write!(f, "wine"),
            DatasetFormat::HeartDisease => write!(f, "heart"),
            DatasetFormat::Zoo => write!(f, "zoo"),
            DatasetFormat::Generic => write!(f, "generic")
        }
    }

}

impl FromStr for DatasetFormat {

    type Err = String;

    fn from_str(s : &str) -> Result<Self, Self::Err> {
        match &s.to_lowercase()[..] {
            "iris" => Ok(DatasetFormat::Iris),
            "wine" => Ok(DatasetFormat::Wine),
            "heart" | "heart-disease" => Ok(DatasetFormat::HeartDisease),
            "zoo" => Ok(DatasetFormat::Zoo),
            "generic" => Ok(DatasetFormat::Generic),
            other => Err(format!("Unknown dataset format: {}", other))
        }
    }

}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All);
    builder
}

/// Reads a dataset from a file in the informed layout.
pub fn load_path<P>(path : P, format : DatasetFormat) -> Result<Dataset, ClassifyError>
where
    P : AsRef<Path>
{
    let reader = reader_builder().from_path(path.as_ref())?;
    let data = parse_records(reader, format)?;
    info!(path = %path.as_ref().display(), %format, rows = data.len(), fields = data.n_fields(), "dataset loaded");
    Ok(data)
}

/// Reads a dataset in the informed layout from any reader.
pub fn load_reader<R>(reader : R, format : DatasetFormat) -> Result<Dataset, ClassifyError>
where
    R : Read
{
    parse_records(reader_builder().from_reader(reader), format)
}

fn parse_records<R : Read>(mut reader : csv::Reader<R>, format : DatasetFormat) -> Result<Dataset, ClassifyError> {
    let skip = if format.has_name() { 1 } else { 0 };
    let mut n_fields = format.n_fields();
    let mut values : Vec<f64> = Vec::new();
    let mut labels : Vec<Label> = Vec::new();
    for (ix, record) in reader.records().enumerate() {
        let record = record?;
        let line = record.position().map(|p| p.line() as usize ).unwrap_or(ix + 1);
        let n = match n_fields {
            Some(n) => n,
            None => {
                let n = record.len().saturating_sub(1);
                n_fields = Some(n);
                n
            }
        };
        let expected = skip + n + 1;
        if record.len() != expected || n == 0 {
            return Err(ClassifyError::FieldCount { line, expected, found : record.len() });
        }
        for field in record.iter().skip(skip).take(n) {
            let v = field.parse::<f64>()
                .map_err(|_| ClassifyError::Parse { line, value : field.to_string() })?;
            values.push(v);
        }
        labels.push(format.parse_label(&record[expected - 1], line)?);
    }
    if labels.is_empty() {
        return Err(ClassifyError::EmptyDataset);
    }
    let n_classes = format.n_classes()
        .unwrap_or_else(|| labels.iter().copied().max().unwrap_or(0) );
    let features = DMatrix::from_row_slice(labels.len(), n_fields.unwrap_or(0), &values[..]);
    Dataset::new(features, labels, n_classes)
}
