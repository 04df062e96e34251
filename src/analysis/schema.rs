//! The structured-output contract sent to the generator.
//!
//! [`ANALYSIS_SCHEMA`] is serialized in Gemini's `responseSchema` dialect
//! for every request, and the same value checks the parsed output on the
//! way back.

use crate::models::AnalysisRecord;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// One required string property of an analysis record.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// Array of objects, each with the same required string fields.
#[derive(Debug)]
pub struct AnalysisSchema {
    pub description: &'static str,
    /// Required fields, in preferred output order.
    pub fields: &'static [FieldSpec],
}

pub static ANALYSIS_SCHEMA: AnalysisSchema = AnalysisSchema {
    description: "Liste d'analyses, une pour chaque penseur.",
    fields: &[
        FieldSpec {
            name: "thinker",
            description: "Nom du penseur (e.g., Socrate).",
        },
        FieldSpec {
            name: "generalApproach",
            description: "Résumé de l'approche générale du penseur sur le grand thème lié au sujet (en français).",
        },
        FieldSpec {
            name: "specificAnalysis",
            description: "Analyse spécifique et directe de comment les idées du penseur s'appliquent au sujet précis (en français).",
        },
    ],
};

impl AnalysisSchema {
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Check a parsed generator output against the schema.
    ///
    /// Returns the records on success, or a human-readable reason naming the
    /// first offending entry. Fields outside the schema are dropped.
    pub fn validate(&self, value: &Value) -> Result<Vec<AnalysisRecord>, String> {
        let items = value
            .as_array()
            .ok_or_else(|| format!("expected an array, found {}", json_kind(value)))?;

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let obj = item.as_object().ok_or_else(|| {
                format!("entry {} is {}, expected an object", index, json_kind(item))
            })?;

            for field in self.fields {
                match obj.get(field.name) {
                    Some(Value::String(_)) => {}
                    Some(other) => {
                        return Err(format!(
                            "entry {}: field '{}' is {}, expected a string",
                            index,
                            field.name,
                            json_kind(other)
                        ))
                    }
                    None => {
                        return Err(format!(
                            "entry {}: missing required field '{}'",
                            index, field.name
                        ))
                    }
                }
            }

            let record: AnalysisRecord = serde_json::from_value(item.clone())
                .map_err(|e| format!("entry {}: {}", index, e))?;
            records.push(record);
        }

        Ok(records)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl Serialize for AnalysisSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("type", "ARRAY")?;
        map.serialize_entry("description", self.description)?;
        map.serialize_entry("items", &ItemSchema(self))?;
        map.end()
    }
}

struct ItemSchema<'a>(&'a AnalysisSchema);

impl Serialize for ItemSchema<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names = self.0.field_names();
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("type", "OBJECT")?;
        map.serialize_entry("properties", &Properties(self.0.fields))?;
        map.serialize_entry("required", &names)?;
        map.serialize_entry("propertyOrdering", &names)?;
        map.end()
    }
}

struct Properties(&'static [FieldSpec]);

#[derive(Serialize)]
struct StringProperty {
    #[serde(rename = "type")]
    kind: &'static str,
    description: &'static str,
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in self.0 {
            map.serialize_entry(
                field.name,
                &StringProperty {
                    kind: "STRING",
                    description: field.description,
                },
            )?;
        }
        map.end()
    }
}
