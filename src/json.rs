use anyhow::{Context, Result, anyhow};
use fraction::Fraction;
use num_traits::ToPrimitive;
use serde_json::Value;

pub fn read_field_number(json: &Value, field: &str) -> Result<usize> {
    read_number(&json[field]).with_context(|| format!("reading field `{}`", field))
}

pub fn read_field_list<'a>(json: &'a Value, field: &str) -> Result<&'a Vec<Value>> {
    read_list(&json[field]).with_context(|| format!("reading field `{}`", field))
}

pub fn read_field_string(json: &Value, field: &str) -> Result<String> {
    match &json[field] {
        Value::Null => return Err(anyhow!("field `{}` not found", field)),
        Value::Bool(_) => return Err(anyhow!("field `{}` is a boolean, where literal expected", field)),
        Value::Number(n) => return Ok(n.to_string()),
        Value::String(s) => return Ok(s.to_string()),
        Value::Array(_) => return Err(anyhow!("field `{}` is a list, where literal expected", field)),
        Value::Object(_) => return Err(anyhow!("field `{}` is an object, where literal expected", field)),
    }
}

pub fn has_field(json: &Value, field: &str) -> bool {
    !json[field].is_null()
}

pub fn read_number(json: &Value) -> Result<usize> {
    match &json {
        Value::Null => return Err(anyhow!("field not found")),
        Value::Bool(_) => return Err(anyhow!("field is a boolean, where number expected")),
        Value::Number(n) => {
            let n = n.as_u64().ok_or_else(|| anyhow!("number {} is not a non-negative integer", n))?;
            return Ok(usize::try_from(n)?);
        }
        Value::String(_) => return Err(anyhow!("field is a literal, where number expected")),
        Value::Array(_) => return Err(anyhow!("field is a list, where number expected")),
        Value::Object(_) => return Err(anyhow!("field is an object, where number expected")),
    }
}

pub fn read_list(json: &Value) -> Result<&Vec<Value>> {
    match &json {
        Value::Null => return Err(anyhow!("field not found")),
        Value::Bool(_) => return Err(anyhow!("field is a boolean, where list expected")),
        Value::Number(_) => return Err(anyhow!("field is a number, where list expected")),
        Value::String(_) => return Err(anyhow!("field is a literal, where list expected")),
        Value::Array(s) => return Ok(s),
        Value::Object(_) => return Err(anyhow!("field is an object, where list expected")),
    }
}

/// Reads a real number, given either as a JSON number or as a literal holding a decimal or a fraction such as "1/3".
pub fn read_real(json: &Value) -> Result<f64> {
    match &json {
        Value::Null => return Err(anyhow!("field not found")),
        Value::Bool(_) => return Err(anyhow!("field is a boolean, where number expected")),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| anyhow!("number {} cannot be represented as a real", n)),
        Value::String(s) => parse_real(s),
        Value::Array(_) => return Err(anyhow!("field is a list, where number expected")),
        Value::Object(_) => return Err(anyhow!("field is an object, where number expected")),
    }
}

pub fn parse_real(s: &str) -> Result<f64> {
    let s = s.trim();
    if let Ok(value) = s.parse::<f64>() {
        return Ok(value);
    }
    let fraction = s
        .parse::<Fraction>()
        .map_err(|err| anyhow!("could not parse `{}` as a fraction: {:?}", s, err))?;
    fraction
        .to_f64()
        .ok_or_else(|| anyhow!("fraction `{}` cannot be represented as a real", s))
}
