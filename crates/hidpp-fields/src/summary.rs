//! Human-readable record summaries for logs and test reports.

use std::fmt;

use crate::descriptor::FieldDescriptor;
use crate::record::Record;
use crate::value::Value;

const INDENT: &str = "  ";

impl Record {
    /// Multi-line `name : value` rendering.
    ///
    /// Values with an interpreter show their label, and zero values of
    /// fields marked `elide_zero` are left out.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        self.render(&mut out, 0, "");
        out
    }

    /// One-line rendering: `Name(field=value, ...)`.
    pub fn compact(&self) -> String {
        let fields: Vec<String> = self
            .fields()
            .iter()
            .zip(self.values())
            .filter_map(|(field, value)| {
                let value = value.as_ref()?;
                if field.elide_zero && value.is_zero() {
                    return None;
                }
                Some(format!("{}={}", field.name, render_value(field, value)))
            })
            .collect();
        format!("{}({})", self.name(), fields.join(", "))
    }

    fn render(&self, out: &mut String, depth: usize, label: &str) {
        let pad = INDENT.repeat(depth);
        out.push_str(&format!("{pad}{label}{}\n", self.name()));
        for (field, value) in self.fields().iter().zip(self.values()) {
            let Some(value) = value else { continue };
            if field.elide_zero && value.is_zero() {
                continue;
            }
            match value {
                Value::Record(nested) => {
                    out.push_str(&format!("{pad}{INDENT}{} :\n", field.name));
                    nested.render(out, depth + 2, "");
                }
                Value::List(records) => {
                    out.push_str(&format!("{pad}{INDENT}{} : {} records\n", field.name, records.len()));
                    for (index, record) in records.iter().enumerate() {
                        record.render(out, depth + 2, &format!("[{index}] "));
                    }
                }
                _ => out.push_str(&format!(
                    "{pad}{INDENT}{} : {}\n",
                    field.name,
                    render_value(field, value)
                )),
            }
        }
        for (key, value) in self.properties() {
            out.push_str(&format!("{pad}{INDENT}[{key}] {value}\n"));
        }
    }
}

fn render_value(field: &FieldDescriptor, value: &Value) -> String {
    let label = field.interpreter.and_then(|table| {
        let raw = value.as_u64()?;
        table
            .iter()
            .find(|(candidate, _)| *candidate == raw)
            .map(|(_, label)| *label)
    });
    match label {
        Some(label) => format!("{value} ({label})"),
        None => value.to_string(),
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compact())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record_list, schema};

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    const POWER_STATES: &[(u64, &str)] = &[(0, "off"), (1, "on")];

    schema! {
        static SWITCH = "Switch";
        FieldDescriptor::unsigned("state", 8).with_interpreter(POWER_STATES),
        FieldDescriptor::unsigned("reserved", 8).with_elide_zero(),
    }

    #[test]
    fn test_interpreter_and_elision() -> TestResult {
        let record = Record::with_values(&SWITCH, [("state", 1u8), ("reserved", 0)])?;
        insta::assert_snapshot!(record.summary(), @r"
        Switch
          state : 0x01 (on)
        ");
        assert_eq!(record.to_string(), "Switch(state=0x01 (on))");
        Ok(())
    }

    schema! {
        static SLOT = "Slot";
        FieldDescriptor::unsigned("id", 8),
    }

    record_list! { static SLOTS = "Slots"; SLOT }

    schema! {
        static BANK = "Bank";
        FieldDescriptor::unsigned("count", 8),
        FieldDescriptor::list("slots", &SLOTS, 0),
    }

    #[test]
    fn test_list_elements_show_their_index() -> TestResult {
        let slots = vec![
            Record::with_values(&SLOT, [("id", 4u8)])?,
            Record::with_values(&SLOT, [("id", 9u8)])?,
        ];
        let mut bank = Record::with_values(&BANK, [("count", 2u8)])?;
        bank.set("slots", slots)?;
        insta::assert_snapshot!(bank.summary(), @r"
        Bank
          count : 0x02
          slots : 2 records
            [0] Slot
              id : 0x04
            [1] Slot
              id : 0x09
        ");
        Ok(())
    }

    #[test]
    fn test_properties_are_listed() -> TestResult {
        let mut record = Record::with_values(&SWITCH, [("state", 0u8), ("reserved", 3)])?;
        record.set_property("source", "receiver");
        let summary = record.summary();
        assert!(summary.contains("state : 0x00 (off)"));
        assert!(summary.contains("reserved : 0x03"));
        assert!(summary.contains("[source] receiver"));
        Ok(())
    }
}
