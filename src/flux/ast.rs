//! Flux AST
//!
//! The subset of the Flux abstract syntax tree needed to pass query
//! parameters to the server: a `File` whose body is a list of
//! `option <name> = <literal>` statements.
//!
//! Nodes serialize to the JSON shape accepted in the `extern` member of a
//! query request, e.g.
//!
//! ```json
//! {"type":"OptionStatement","assignment":{"type":"VariableAssignment",
//!  "id":{"type":"Identifier","name":"p1"},
//!  "init":{"type":"StringLiteral","value":"my-bucket"}}}
//! ```

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// A Flux source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct File {
    pub package: Option<String>,
    pub imports: Option<Vec<String>>,
    pub body: Vec<Statement>,
}

impl File {
    /// Create a file from a statement list
    pub fn new(body: Vec<Statement>) -> Self {
        Self {
            package: None,
            imports: None,
            body,
        }
    }

    /// Find the literal bound to an option name
    pub fn option(&self, name: &str) -> Option<&Expression> {
        self.body.iter().find_map(|statement| match statement {
            Statement::OptionStatement { assignment } if assignment.id.name == name => {
                Some(&assignment.init)
            }
            _ => None,
        })
    }

    /// Literal bound by the statement at `index`
    pub fn literal_at(&self, index: usize) -> Option<&Expression> {
        match self.body.get(index)? {
            Statement::OptionStatement { assignment } => Some(&assignment.init),
        }
    }
}

impl std::fmt::Display for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, statement) in self.body.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

/// A top-level statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Statement {
    OptionStatement { assignment: VariableAssignment },
}

impl Statement {
    /// Build `option <name> = <init>`
    pub fn option(name: impl Into<String>, init: Expression) -> Self {
        Self::OptionStatement {
            assignment: VariableAssignment {
                id: Identifier { name: name.into() },
                init,
            },
        }
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OptionStatement { assignment } => {
                write!(f, "option {} = {}", assignment.id.name, assignment.init)
            }
        }
    }
}

/// `<id> = <init>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct VariableAssignment {
    pub id: Identifier,
    pub init: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct Identifier {
    pub name: String,
}

/// Literal expression nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    StringLiteral { value: String },
    /// Integers travel as decimal strings
    IntegerLiteral { value: String },
    FloatLiteral { value: f64 },
    BooleanLiteral { value: bool },
    DurationLiteral { values: Vec<Duration> },
    /// RFC 3339 timestamp
    DateTimeLiteral { value: String },
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StringLiteral { value } => write!(f, "{:?}", value),
            Self::IntegerLiteral { value } => write!(f, "{}", value),
            Self::FloatLiteral { value } => write!(f, "{:?}", value),
            Self::BooleanLiteral { value } => write!(f, "{}", value),
            Self::DurationLiteral { values } => write!(f, "{}", join_parts(values)),
            Self::DateTimeLiteral { value } => write!(f, "{}", value),
        }
    }
}

/// One `<magnitude><unit>` component of a duration literal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duration {
    pub magnitude: i64,
    pub unit: String,
}

const SECONDS_PER_UNIT: [(i64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];
const NANOS_PER_UNIT: [(i64, &str); 3] = [(1_000_000, "ms"), (1_000, "us"), (1, "ns")];

/// Split a duration into Flux duration components, largest unit first
///
/// A zero duration becomes `0s`. Negative durations carry the sign on every
/// component.
pub fn duration_parts(delta: TimeDelta) -> Vec<Duration> {
    let sign = if delta < TimeDelta::zero() { -1 } else { 1 };
    let delta = delta.abs();

    let mut seconds = delta.num_seconds();
    let mut nanos = i64::from(delta.subsec_nanos());
    let mut parts = Vec::new();

    for (size, unit) in SECONDS_PER_UNIT {
        if seconds >= size {
            parts.push(Duration {
                magnitude: sign * (seconds / size),
                unit: unit.to_string(),
            });
            seconds %= size;
        }
    }
    for (size, unit) in NANOS_PER_UNIT {
        if nanos >= size {
            parts.push(Duration {
                magnitude: sign * (nanos / size),
                unit: unit.to_string(),
            });
            nanos %= size;
        }
    }

    if parts.is_empty() {
        parts.push(Duration {
            magnitude: 0,
            unit: "s".to_string(),
        });
    }
    parts
}

/// Flux duration text, e.g. `1h30m`
pub fn format_duration(delta: TimeDelta) -> String {
    join_parts(&duration_parts(delta))
}

fn join_parts(parts: &[Duration]) -> String {
    let negative = parts.iter().any(|p| p.magnitude < 0);
    let body: String = parts
        .iter()
        .map(|p| format!("{}{}", p.magnitude.abs(), p.unit))
        .collect();

    if negative {
        format!("-{}", body)
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_statement_json_shape() {
        let statement = Statement::option(
            "p1",
            Expression::StringLiteral {
                value: "my-bucket".to_string(),
            },
        );

        let json = serde_json::to_value(&statement).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "OptionStatement",
                "assignment": {
                    "type": "VariableAssignment",
                    "id": { "type": "Identifier", "name": "p1" },
                    "init": { "type": "StringLiteral", "value": "my-bucket" }
                }
            })
        );
    }

    #[test]
    fn test_file_json_shape() {
        let file = File::new(vec![Statement::option(
            "p2",
            Expression::IntegerLiteral {
                value: "0".to_string(),
            },
        )]);

        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["type"], "File");
        assert!(json["package"].is_null());
        assert_eq!(json["body"][0]["assignment"]["init"]["type"], "IntegerLiteral");
        assert_eq!(json["body"][0]["assignment"]["init"]["value"], "0");
    }

    #[test]
    fn test_file_display() {
        let file = File::new(vec![
            Statement::option(
                "p1",
                Expression::StringLiteral {
                    value: "my-bucket".to_string(),
                },
            ),
            Statement::option(
                "p2",
                Expression::IntegerLiteral {
                    value: "0".to_string(),
                },
            ),
            Statement::option("p3", Expression::BooleanLiteral { value: true }),
        ]);

        assert_eq!(
            file.to_string(),
            "option p1 = \"my-bucket\"\noption p2 = 0\noption p3 = true"
        );
    }

    #[test]
    fn test_lookup_by_name_and_index() {
        let file = File::new(vec![Statement::option(
            "p1",
            Expression::BooleanLiteral { value: false },
        )]);

        assert_eq!(
            file.option("p1"),
            Some(&Expression::BooleanLiteral { value: false })
        );
        assert!(file.option("p2").is_none());
        assert!(file.literal_at(0).is_some());
        assert!(file.literal_at(1).is_none());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(TimeDelta::minutes(90)), "1h30m");
        assert_eq!(format_duration(TimeDelta::days(7)), "7d");
        assert_eq!(format_duration(TimeDelta::milliseconds(1500)), "1s500ms");
        assert_eq!(format_duration(TimeDelta::zero()), "0s");
        assert_eq!(format_duration(TimeDelta::hours(-2)), "-2h");
    }

    #[test]
    fn test_duration_parts() {
        let parts = duration_parts(TimeDelta::seconds(3_661));
        let units: Vec<_> = parts.iter().map(|p| (p.magnitude, p.unit.as_str())).collect();
        assert_eq!(units, vec![(1, "h"), (1, "m"), (1, "s")]);
    }
}
