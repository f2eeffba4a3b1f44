//! # Demo Predicates
//!
//! Sample predicates registered by `otfc serve` when `demo_predicates` is on.

use chrono::{Datelike, NaiveDate, Utc};
use serde_json::{Number, Value};

use super::errors::{PredicateError, PredicateResult};
use super::predicate::{Predicate, Row};
use super::registry::PredicateRegistry;

pub const BOND_ACTOR_AGE_IRI: &str = "http://flandersmake.be/otfc/bondActorAgeREST";
pub const TRIAL_SUM_IRI: &str = "http://www.flandersmake.be/ontology/trial/p1";
pub const TRIAL_PRODUCT_IRI: &str = "http://www.flandersmake.be/ontology/trial/p2";

const BOND_ACTOR_AGE_QUERY: &str = r#"
PREFIX dbo: <http://dbpedia.org/ontology/>
PREFIX dbr: <http://dbpedia.org/resource/>
PREFIX dbc: <http://dbpedia.org/resource/Category:>
SELECT ?film ?dob
FROM <https://dbpedia.org/sparql>
WHERE {
    ?film dbo:wikiPageWikiLink dbc:James_Bond_films.
    ?film dbo:starring ?actor.
    dbr:Portrayal_of_James_Bond_in_film dbo:portrayer ?actor.
    ?actor dbo:birthDate ?dob.
}
"#;

/// Register all demo predicates
pub fn register_demo_predicates(registry: &PredicateRegistry) -> PredicateResult<()> {
    registry.register(
        Predicate::compute(BOND_ACTOR_AGE_IRI, BOND_ACTOR_AGE_QUERY, "film", |row| {
            let today = Utc::now().date_naive();
            Ok(key_value(field(row, "film")?.clone(), Value::from(age_in_years(row, today)?)))
        })
        .with_meta(serde_json::json!({"unit": "years"})),
    )?;

    registry.register_compute(TRIAL_SUM_IRI, "select ?subject ?x ?y where { }", "subject", |row| {
        let value = combine(field(row, "x")?, field(row, "y")?, i64::checked_add, |a, b| a + b)?;
        Ok(key_value(field(row, "subject")?.clone(), value))
    })?;

    registry.register_compute(TRIAL_PRODUCT_IRI, "select ?a ?x ?y where { }", "a", |row| {
        let value = combine(field(row, "x")?, field(row, "y")?, i64::checked_mul, |a, b| a * b)?;
        Ok(key_value(field(row, "a")?.clone(), value))
    })?;

    Ok(())
}

fn key_value(key: Value, value: Value) -> Row {
    let mut out = Row::new();
    out.insert("key".into(), key);
    out.insert("value".into(), value);
    out
}

fn field<'a>(row: &'a Row, name: &str) -> PredicateResult<&'a Value> {
    row.get(name)
        .ok_or_else(|| PredicateError::callback(format!("missing field '{}'", name)))
}

/// Full years between the row's `dob` (YYYY-MM-DD) and `today`
fn age_in_years(row: &Row, today: NaiveDate) -> PredicateResult<i64> {
    let dob = field(row, "dob")?
        .as_str()
        .ok_or_else(|| PredicateError::callback("field 'dob' is not a string"))?;
    // Literals may carry a time or datatype suffix; only the date part counts
    let date_part = dob.get(..10).unwrap_or(dob);
    let born = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| PredicateError::callback(format!("invalid dob '{}': {}", dob, e)))?;

    let mut years = i64::from(today.year() - born.year());
    if (today.month(), today.day()) < (born.month(), born.day()) {
        years -= 1;
    }
    Ok(years)
}

/// Apply an arithmetic operator, staying integral when both sides are
fn combine(
    x: &Value,
    y: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> PredicateResult<Value> {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        if let Some(v) = int_op(a, b) {
            return Ok(Value::from(v));
        }
    }
    let (a, b) = match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(PredicateError::callback(format!("non-numeric operands {} and {}", x, y))),
    };
    Number::from_f64(float_op(a, b))
        .map(Value::Number)
        .ok_or_else(|| PredicateError::callback("result is not a finite number"))
}
