use crate::graph::expression::{COMPOSITE_KINDS, NODE_VARIABLE};
use crate::graph::{CompositeExpression, Expression, Literal, NodeVariableRef, Property};
use serde_json::{Map, Value};

/// Fields whose value is always read as an expression, whatever its shape.
const EXPRESSION_KEYS: [&str; 4] = ["leftExpress", "rightExpress", "conditionExpr", "valueExpr"];

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    if !matches!(map.get(key), Some(Value::String(_))) {
        return None;
    }
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

fn is_literal_kind(kind: &str) -> bool {
    kind.ends_with("Const")
}

fn is_expression_object(map: &Map<String, Value>) -> bool {
    match map.get("kind").and_then(Value::as_str) {
        Some(kind) => kind == NODE_VARIABLE || COMPOSITE_KINDS.contains(&kind) || is_literal_kind(kind),
        None => false,
    }
}

/// Reads an expression from its JSON form. Unknown shapes are kept verbatim.
pub fn expression_from_json(value: Value) -> Expression {
    let mut map = match value {
        Value::Object(map) => map,
        other => return Expression::Unrecognized(other),
    };
    let Some(kind) = map.get("kind").and_then(Value::as_str).map(str::to_owned) else {
        return Expression::Unrecognized(Value::Object(map));
    };

    if kind == NODE_VARIABLE {
        map.remove("kind");
        return Expression::NodeVariableRef(NodeVariableRef {
            node_code: take_string(&mut map, "nodeCode"),
            variable: take_string(&mut map, "variable"),
            variable_id: take_string(&mut map, "variableId"),
            extra: map,
        });
    }

    if COMPOSITE_KINDS.contains(&kind.as_str()) {
        map.remove("kind");
        let mut composite = CompositeExpression::new(kind);
        composite.operator = take_string(&mut map, "operator");
        // An empty operand list stays in `extra` so it is written back as given.
        if matches!(map.get("expresses"), Some(Value::Array(items)) if !items.is_empty()) {
            if let Some(Value::Array(items)) = map.remove("expresses") {
                composite.operands = items.into_iter().map(expression_from_json).collect();
            }
        }
        composite.left = map
            .remove("leftExpress")
            .map(|v| Box::new(expression_from_json(v)));
        composite.right = map
            .remove("rightExpress")
            .map(|v| Box::new(expression_from_json(v)));
        composite.extra = map;
        return Expression::Composite(composite);
    }

    if is_literal_kind(&kind) {
        map.remove("kind");
        let value = map.remove("value").unwrap_or(Value::Null);
        return Expression::Literal(Literal {
            kind,
            value,
            extra: map,
        });
    }

    Expression::Unrecognized(Value::Object(map))
}

pub fn expression_to_json(expr: &Expression) -> Value {
    match expr {
        Expression::Literal(lit) => {
            let mut map = lit.extra.clone();
            map.insert("kind".to_string(), Value::String(lit.kind.clone()));
            map.insert("value".to_string(), lit.value.clone());
            Value::Object(map)
        }
        Expression::NodeVariableRef(reference) => {
            let mut map = reference.extra.clone();
            map.insert("kind".to_string(), Value::String(NODE_VARIABLE.to_string()));
            let fields = [
                ("nodeCode", &reference.node_code),
                ("variable", &reference.variable),
                ("variableId", &reference.variable_id),
            ];
            for (key, value) in fields {
                if let Some(value) = value {
                    map.insert(key.to_string(), Value::String(value.clone()));
                }
            }
            Value::Object(map)
        }
        Expression::Composite(composite) => {
            let mut map = composite.extra.clone();
            map.insert("kind".to_string(), Value::String(composite.kind.clone()));
            if let Some(operator) = &composite.operator {
                map.insert("operator".to_string(), Value::String(operator.clone()));
            }
            if !composite.operands.is_empty() {
                map.insert(
                    "expresses".to_string(),
                    Value::Array(composite.operands.iter().map(expression_to_json).collect()),
                );
            }
            if let Some(left) = &composite.left {
                map.insert("leftExpress".to_string(), expression_to_json(left));
            }
            if let Some(right) = &composite.right {
                map.insert("rightExpress".to_string(), expression_to_json(right));
            }
            Value::Object(map)
        }
        Expression::Unrecognized(value) => value.clone(),
    }
}

/// Reads a property-bag value. `key` is the field name the value sat under, if any.
pub fn property_from_json(key: Option<&str>, value: Value) -> Property {
    if key.is_some_and(|k| EXPRESSION_KEYS.contains(&k)) && !value.is_null() {
        return Property::Expression(expression_from_json(value));
    }
    match value {
        Value::Object(map) if is_expression_object(&map) => {
            Property::Expression(expression_from_json(Value::Object(map)))
        }
        Value::Object(map) => Property::Record(
            map.into_iter()
                .map(|(k, v)| {
                    let property = property_from_json(Some(&k), v);
                    (k, property)
                })
                .collect(),
        ),
        Value::Array(items) => Property::List(
            items
                .into_iter()
                .map(|v| property_from_json(None, v))
                .collect(),
        ),
        other => Property::Opaque(other),
    }
}

pub fn property_to_json(property: &Property) -> Value {
    match property {
        Property::Expression(expr) => expression_to_json(expr),
        Property::List(items) => Value::Array(items.iter().map(property_to_json).collect()),
        Property::Record(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), property_to_json(v)))
                .collect(),
        ),
        Property::Opaque(value) => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_nested_compare_inside_logic() {
        let expr = expression_from_json(json!({
            "kind": "logic",
            "operator": "and",
            "expresses": [{
                "kind": "compare",
                "operator": "equal",
                "leftExpress": { "kind": "nodeVariable", "nodeCode": "variableDef_v", "variable": "x", "variableId": "v_x" },
                "rightExpress": { "kind": "stringConst", "value": "ok" }
            }]
        }));

        let Expression::Composite(logic) = &expr else {
            panic!("expected composite, got {:?}", expr);
        };
        assert_eq!(logic.operator.as_deref(), Some("and"));
        assert_eq!(expr.reference_count(), 1);
    }

    #[test]
    fn empty_operand_list_is_written_back() {
        let raw = json!({ "kind": "logic", "operator": "and", "expresses": [] });
        let expr = expression_from_json(raw.clone());
        assert_eq!(expr.reference_count(), 0);
        assert_eq!(expression_to_json(&expr), raw);
    }

    #[test]
    fn unknown_kind_is_preserved() {
        let raw = json!({ "kind": "methodCall", "target": "lamp" });
        let expr = expression_from_json(raw.clone());
        assert_eq!(expr, Expression::Unrecognized(raw.clone()));
        assert_eq!(expression_to_json(&expr), raw);
    }

    #[test]
    fn assignment_objects_become_records() {
        let property = property_from_json(
            Some("expresses"),
            json!([{ "kind": "assignValue", "leftExpress": { "kind": "nodeVariable", "variableId": "a" } }]),
        );
        let first = &property.as_list().unwrap()[0];
        assert!(matches!(first, Property::Record(_)));
        assert!(first.get("leftExpress").and_then(Property::as_expression).is_some());
    }
}
