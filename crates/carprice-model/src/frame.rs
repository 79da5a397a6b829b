//! Column-oriented tables passed to and returned from the model

use carprice_core::{Error, FeatureVector, Result};

/// A named column of values
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// NaN marks a missing value
    Numeric(Vec<f64>),
    /// Level strings; `None` marks a missing value
    Categorical(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(values) => values.len(),
            Self::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, Self::Categorical(_))
    }
}

/// A small in-memory table with uniquely named, equally long columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-row frame holding every feature as a numeric column, named after
    /// the training schema
    pub fn from_features(vector: &FeatureVector) -> Self {
        let mut frame = Self::new();
        for (feature, value) in vector.iter() {
            frame.names.push(feature.column().to_string());
            frame.columns.push(Column::Numeric(vec![value.as_f64()]));
        }
        frame
    }

    /// Append a column.
    ///
    /// Fails if the name is taken or the length differs from existing columns.
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(Error::prediction(format!("duplicate column '{}'", name)));
        }
        if let Some(first) = self.columns.first() {
            if first.len() != column.len() {
                return Err(Error::prediction(format!(
                    "column '{}' has {} rows, expected {}",
                    name,
                    column.len(),
                    first.len()
                )));
            }
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Builder-style variant of [`Frame::push_column`]
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self> {
        self.push_column(name, column)?;
        Ok(self)
    }

    /// Convert a numeric column to categorical in place.
    ///
    /// Integral values become their integer text (`2.0` becomes `"2"`), other
    /// finite values keep their decimal form and NaN becomes missing.
    /// Converting a column that is already categorical is a no-op.
    pub fn as_factor(&mut self, name: &str) -> Result<()> {
        let index = self
            .index_of(name)
            .ok_or_else(|| Error::prediction(format!("no column named '{}'", name)))?;

        if let Column::Numeric(values) = &self.columns[index] {
            let levels = values.iter().map(|v| level_string(*v)).collect();
            self.columns[index] = Column::Categorical(levels);
        }
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index_of(name).map(|i| &self.columns[i])
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn nrows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// Numeric value at `(row, col)`, if that cell is numeric
    pub fn numeric_at(&self, row: usize, col: usize) -> Option<f64> {
        match self.columns.get(col)? {
            Column::Numeric(values) => values.get(row).copied(),
            Column::Categorical(_) => None,
        }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

/// Level text for a numeric category code
pub(crate) fn level_string(value: f64) -> Option<String> {
    if value.is_nan() {
        None
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        Some(format!("{}", value as i64))
    } else {
        Some(format!("{}", value))
    }
}
