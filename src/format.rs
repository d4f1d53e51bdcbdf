use serde::Deserialize;
use serde_json::{Value, json};

use crate::record::ProductionRecord;

/// Translates a [`ProductionRecord`] into the external submodel-element
/// document shape. Two variants exist in the wild; both are exposed and
/// the active one is chosen by configuration.
pub trait RecordFormatter: Send + Sync {
    fn format(&self, record: &ProductionRecord) -> Value;
}

/// Which document variant to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatterKind {
    /// Four numbered `Factor1..Factor4` leaf slots.
    Fixed,
    /// A nested `Factors` sub-collection with named fields.
    Nested,
}

impl FormatterKind {
    pub fn build(self) -> Box<dyn RecordFormatter> {
        match self {
            FormatterKind::Fixed => Box::new(FixedFactorsFormatter),
            FormatterKind::Nested => Box::new(NestedFactorsFormatter),
        }
    }
}

/// Variant with fixed numbered factor slots. The telemetry average lands
/// in `Factor1`; the remaining slots stay null.
pub struct FixedFactorsFormatter;

/// Variant with a nested `Factors` collection carrying named fields.
pub struct NestedFactorsFormatter;

fn property(id_short: &str, value: Value, value_type: &str) -> Value {
    json!({
        "modelType": "Property",
        "idShort": id_short,
        "value": value,
        "valueType": value_type,
    })
}

/// The header fields common to both variants.
fn header_properties(record: &ProductionRecord) -> Vec<Value> {
    vec![
        property(
            "StartDate",
            json!(record.start_time.to_rfc3339()),
            "xs:dateTime",
        ),
        property("OperationNumber", json!(record.job_id), "xs:int"),
        property("SetupTime", json!(record.setup_seconds), "xs:float"),
        property(
            "ProductionTime",
            json!(record.production_seconds),
            "xs:float",
        ),
        property("DelayTime", json!(record.delay_seconds), "xs:float"),
        property(
            "ProducedQuantity",
            json!(record.produced_quantity),
            "xs:float",
        ),
        property("GoodQuantity", json!(record.good_quantity), "xs:float"),
    ]
}

impl RecordFormatter for FixedFactorsFormatter {
    fn format(&self, record: &ProductionRecord) -> Value {
        let mut value = header_properties(record);
        value.push(property(
            "Factor1",
            json!(record.telemetry_average),
            "xs:float",
        ));
        value.push(property("Factor2", Value::Null, "xs:float"));
        value.push(property("Factor3", Value::Null, "xs:float"));
        value.push(property("Factor4", Value::Null, "xs:float"));

        json!({
            "modelType": "SubmodelElementCollection",
            "idShort": record.id,
            "value": value,
        })
    }
}

impl RecordFormatter for NestedFactorsFormatter {
    fn format(&self, record: &ProductionRecord) -> Value {
        let mut value = header_properties(record);
        value.push(json!({
            "modelType": "SubmodelElementCollection",
            "idShort": "Factors",
            "value": [property(
                "FilterzustandAvg",
                json!(record.telemetry_average),
                "xs:float",
            )],
        }));

        json!({
            "modelType": "SubmodelElementCollection",
            "idShort": record.id,
            "value": value,
        })
    }
}
