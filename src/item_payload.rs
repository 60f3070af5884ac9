use crate::{anime_form::EnrichedRecord, config::Config};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value, json};
use std::collections::HashMap;

pub const GREGORIAN_CALENDAR: &str = "http://www.wikidata.org/entity/Q1985727";
pub const UNITLESS: &str = "1";
const PRECISION_YEAR: u8 = 9;
const PRECISION_MONTH: u8 = 10;
const PRECISION_DAY: u8 = 11;

lazy_static! {
    static ref RE_COMPACT_DATE: Regex = Regex::new(r"^(\d{4})(\d{2})(\d{2})$").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementValue {
    String(String),
    Item(String),
    Quantity { amount: i64, unit: String },
    Time { time: String, precision: u8 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValue {
    pub property: String,
    pub value: StatementValue,
}

impl PropertyValue {
    pub fn new(property: &str, value: StatementValue) -> Self {
        Self {
            property: property.to_string(),
            value,
        }
    }

    fn as_snak(&self) -> Value {
        json!({"snaktype":"value","property":self.property,"datavalue":self.as_datavalue()})
    }

    fn as_datavalue(&self) -> Value {
        match &self.value {
            StatementValue::String(s) => json!({"value":s,"type":"string"}),
            StatementValue::Item(q) => {
                let mut value = json!({"entity-type":"item","id":q});
                if let Some(numeric_id) = q.strip_prefix('Q').and_then(|n| n.parse::<u64>().ok()) {
                    value["numeric-id"] = json!(numeric_id);
                }
                json!({"value":value,"type":"wikibase-entityid"})
            }
            StatementValue::Quantity { amount, unit } => {
                json!({"value":{"amount":format!("{amount:+}"),"unit":unit},"type":"quantity"})
            }
            StatementValue::Time { time, precision } => {
                json!({"value":{"time":time,"timezone":0,"before":0,"after":0,"precision":precision,"calendarmodel":GREGORIAN_CALENDAR},"type":"time"})
            }
        }
    }
}

/// A new statement; rank is always "normal".
#[derive(Debug, Clone, PartialEq)]
pub struct ItemStatement {
    pub main: PropertyValue,
    pub references: Vec<Vec<PropertyValue>>,
}

impl ItemStatement {
    pub fn new(property: &str, value: StatementValue) -> Self {
        Self {
            main: PropertyValue::new(property, value),
            references: vec![],
        }
    }

    pub fn with_reference(mut self, reference_group: Vec<PropertyValue>) -> Self {
        self.references.push(reference_group);
        self
    }

    pub fn property(&self) -> &str {
        &self.main.property
    }

    fn as_claim(&self) -> Value {
        let mut claim = json!({
            "mainsnak":self.main.as_snak(),
            "type":"statement",
            "rank":"normal"
        });
        let reference_groups: Vec<Value> = self
            .references
            .iter()
            .filter(|group| !group.is_empty())
            .map(|group| {
                let mut snaks: HashMap<&str, Vec<Value>> = HashMap::new();
                let mut order: Vec<&str> = vec![];
                for reference in group {
                    let prop = reference.property.as_str();
                    if !snaks.contains_key(prop) {
                        order.push(prop);
                    }
                    snaks.entry(prop).or_default().push(reference.as_snak());
                }
                json!({"snaks":snaks,"snaks-order":order})
            })
            .collect();
        if !reference_groups.is_empty() {
            claim["references"] = json!(reference_groups);
        }
        claim
    }
}

/// The `data` of a `wbeditentity` call that creates a new anime item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemPayload {
    pub language: String,
    pub label: String,
    pub statements: Vec<ItemStatement>,
}

impl ItemPayload {
    pub fn from_record(record: &EnrichedRecord, config: &Config) -> Self {
        let form = &record.form;
        let props = &config.properties;
        let items = &config.items;
        let mut statements = vec![
            ItemStatement::new(&props.instance_of, StatementValue::Item(items.anime.to_owned())),
            ItemStatement::new(
                &props.episodes_seen,
                StatementValue::Quantity {
                    amount: form.seen,
                    unit: UNITLESS.to_string(),
                },
            ),
            ItemStatement::new(
                &props.episodes_all,
                StatementValue::Quantity {
                    amount: form.episodes,
                    unit: UNITLESS.to_string(),
                },
            ),
            ItemStatement::new(&props.status, StatementValue::Item(form.status.to_owned())),
            ItemStatement::new(
                &props.length,
                StatementValue::Quantity {
                    amount: form.length,
                    unit: items.minute_unit.to_owned(),
                },
            ),
        ];

        let strings = [
            (&props.zhwp_title, &form.zhwp_title),
            (&props.gamer_link, &form.gamer_link),
            (&props.gamer_video, &form.gamer_video),
            (&props.anime1_video, &form.anime1_video),
        ];
        for (property, value) in strings {
            if !value.is_empty() {
                statements.push(ItemStatement::new(
                    property,
                    StatementValue::String(value.to_owned()),
                ));
            }
        }

        if let Some((time, precision)) = Self::date2time(&form.run_date) {
            statements.push(ItemStatement::new(
                &props.run_date,
                StatementValue::Time { time, precision },
            ));
        }

        if !form.age_rating.is_empty() {
            let mut statement = ItemStatement::new(
                &props.age_rating,
                StatementValue::Item(form.age_rating.to_owned()),
            );
            if let Some(source) = &record.rating_source {
                statement = statement.with_reference(vec![PropertyValue::new(
                    &props.gamer_link,
                    StatementValue::String(source.to_owned()),
                )]);
            }
            statements.push(statement);
        }

        Self {
            language: config.language.to_owned(),
            label: form.name.to_owned(),
            statements,
        }
    }

    pub fn to_json(&self) -> Value {
        let claims: Vec<Value> = self.statements.iter().map(|s| s.as_claim()).collect();
        let mut labels = Map::new();
        labels.insert(
            self.language.to_owned(),
            json!({"language":self.language,"value":self.label}),
        );
        json!({
            "labels": labels,
            "descriptions": {},
            "aliases": {},
            "claims": claims
        })
    }

    pub fn summary(&self) -> String {
        format!("Created new anime item: {}", self.label)
    }

    /// Accepts YYYY, YYYY-MM, YYYY-MM-DD, and the compact YYYYMMDD.
    pub fn date2time(date: &str) -> Option<(String, u8)> {
        let date = date.trim();
        if date.is_empty() {
            return None;
        }
        if let Some(caps) = RE_COMPACT_DATE.captures(date) {
            let expanded = format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]);
            return Self::date2time(&expanded);
        }
        const ALLOWED_CHARS: &str = "0123456789-";
        if !date.chars().all(|c| ALLOWED_CHARS.contains(c)) {
            return None;
        }
        let parts = date.split('-').collect::<Vec<&str>>();
        if parts.iter().any(|part| part.is_empty()) {
            return None;
        }
        match parts.as_slice() {
            [year] => Some((format!("+{year}-00-00T00:00:00Z"), PRECISION_YEAR)),
            [year, month] => Some((format!("+{year}-{month}-00T00:00:00Z"), PRECISION_MONTH)),
            [year, month, day] => Some((
                format!("+{year}-{month}-{day}T00:00:00Z"),
                PRECISION_DAY,
            )),
            _ => None,
        }
    }
}
