//! One parsed sample of the HAProxy CSV stats page.

use crate::error::FieldError;
use derive_more::Deref;

/// Role marker (`svname` column) of the per-backend summary rows.
pub const AGGREGATE_ROLE: &str = "BACKEND";

/// Separator of the statsd namespace; not allowed inside an entity name.
pub const NAME_SEPARATOR: char = '.';
pub const NAME_PLACEHOLDER: char = '_';

const NAME_POSITION: usize = 0;
const ROLE_POSITION: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord {
    fields: Vec<String>,
}

impl EntityRecord {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn name(&self) -> &str {
        self.field(NAME_POSITION).unwrap_or_default()
    }

    pub fn role(&self) -> &str {
        self.field(ROLE_POSITION).unwrap_or_default()
    }

    pub fn is_aggregate(&self) -> bool {
        self.role() == AGGREGATE_ROLE
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn field(&self, position: usize) -> Option<&str> {
        self.fields.get(position).map(String::as_str)
    }

    /// Integer value of a column. HAProxy leaves columns that do not apply empty,
    /// those read as 0.
    pub fn value(&self, position: usize) -> Result<i64, FieldError> {
        let raw = self.field(position).ok_or(FieldError::Missing { position })?.trim();
        if raw.is_empty() {
            return Ok(0);
        }
        raw.parse().map_err(|_| FieldError::NotNumeric {
            position,
            value: raw.to_string(),
        })
    }

    fn with_normalized_name(mut self) -> Self {
        if let Some(name) = self.fields.get_mut(NAME_POSITION) {
            *name = normalize_name(name);
        }
        self
    }
}

/// Replaces namespace separators so the name stays a single metric segment.
pub fn normalize_name(name: &str) -> String {
    name.replace(NAME_SEPARATOR, &NAME_PLACEHOLDER.to_string())
}

pub fn normalize_records(records: Vec<EntityRecord>) -> Vec<EntityRecord> {
    records.into_iter().map(EntityRecord::with_normalized_name).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct Snapshot {
    records: Vec<EntityRecord>,
}

impl Snapshot {
    pub fn from_records(records: Vec<EntityRecord>) -> Self {
        Self {
            records: normalize_records(records),
        }
    }

    /// Parses a CSV body whose first line is the header row.
    ///
    /// Rows with a different number of columns than the header fail the whole body.
    pub fn parse(body: &str) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(body.as_bytes());

        let records = reader
            .records()
            .map(|row| row.map(|row| EntityRecord::new(row.iter().map(str::to_owned).collect())))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_records(records))
    }

    pub fn aggregates(&self) -> impl Iterator<Item = &EntityRecord> {
        self.records.iter().filter(|record| record.is_aggregate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        csv_body,
        row,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_rows_and_skips_header() {
        let body = csv_body(&[
            row("web", "FRONTEND", &[("scur", 3)]),
            row("api", "srv1", &[("scur", 1)]),
            row("api", "BACKEND", &[("scur", 2), ("hrsp_2xx", 100)]),
        ]);
        let snapshot = Snapshot::parse(&body).unwrap();

        assert_eq!(snapshot.len(), 3);
        let names: Vec<_> = snapshot.aggregates().map(EntityRecord::name).collect();
        assert_eq!(names, ["api"]);

        let api = snapshot.aggregates().next().unwrap();
        assert_eq!(api.value(4), Ok(2));
        assert_eq!(api.value(40), Ok(100));
    }

    #[test]
    fn empty_columns_read_as_zero() {
        let record = EntityRecord::new(vec!["api".into(), "BACKEND".into(), "".into(), " 7 ".into()]);
        assert_eq!(record.value(2), Ok(0));
        assert_eq!(record.value(3), Ok(7));
        assert_eq!(record.value(9), Err(FieldError::Missing { position: 9 }));

        let record = EntityRecord::new(vec!["api".into(), "BACKEND".into(), "UP".into()]);
        assert_eq!(
            record.value(2),
            Err(FieldError::NotNumeric {
                position: 2,
                value: "UP".to_string()
            })
        );
    }

    #[test]
    fn uneven_rows_are_rejected() {
        let body = "# pxname,svname,scur,\napi,BACKEND,1,\nweb,BACKEND\n";
        assert!(Snapshot::parse(body).is_err());
    }

    #[test]
    fn separator_in_name_is_replaced() {
        assert_eq!(normalize_name("api.v2.internal"), "api_v2_internal");
        assert_eq!(normalize_name("plain-name"), "plain-name");

        let body = csv_body(&[row("api.v2", "BACKEND", &[("scur", 1)])]);
        let snapshot = Snapshot::parse(&body).unwrap();
        let record = &snapshot[0];
        assert_eq!(record.name(), "api_v2");
        assert_eq!(record.role(), "BACKEND");
    }

    #[test]
    fn normalization_leaves_other_columns_alone() {
        let records = normalize_records(vec![EntityRecord::new(vec![
            "a.b".into(),
            "BACKEND".into(),
            "1.5".into(),
        ])]);
        assert_eq!(records[0].fields(), ["a_b", "BACKEND", "1.5"]);
    }
}
