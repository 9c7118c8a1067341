//! The built-in tool set: `memory_set`, `memory_get`, `memory_delete`,
//! `arithmetic`, `current_timestamp`. These exist so the system is
//! exercisable without any external tool plugin, and so the
//! descriptor-assembly step in the model adapter has concrete schemas to
//! attach even to schema-less registrations.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use ai_agent_memory::SharedMemory;

use crate::ToolExecutor;

fn arg_str(arguments: &Value, key: &str) -> anyhow::Result<String> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("missing or non-string argument '{key}'"))
}

pub struct MemorySet;

#[async_trait]
impl ToolExecutor for MemorySet {
    fn name(&self) -> &str {
        "memory_set"
    }

    fn description(&self) -> String {
        "Write a key/value pair into shared memory.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "key": { "type": "string" },
                "value": { "type": "string" },
            },
            "required": ["key", "value"],
        })
    }

    fn required_args(&self) -> Vec<String> {
        vec!["key".to_string(), "value".to_string()]
    }

    async fn call(&self, arguments: Value, memory: &SharedMemory) -> anyhow::Result<String> {
        let key = arg_str(&arguments, "key")?;
        let value = arg_str(&arguments, "value")?;
        memory.set(&key, json!(value));
        Ok(format!("stored '{key}'"))
    }
}

pub struct MemoryGet;

#[async_trait]
impl ToolExecutor for MemoryGet {
    fn name(&self) -> &str {
        "memory_get"
    }

    fn description(&self) -> String {
        "Read a value from shared memory by key.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "key": { "type": "string" } },
            "required": ["key"],
        })
    }

    fn required_args(&self) -> Vec<String> {
        vec!["key".to_string()]
    }

    async fn call(&self, arguments: Value, memory: &SharedMemory) -> anyhow::Result<String> {
        let key = arg_str(&arguments, "key")?;
        Ok(match memory.get(&key) {
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => "null".to_string(),
        })
    }
}

pub struct MemoryDelete;

#[async_trait]
impl ToolExecutor for MemoryDelete {
    fn name(&self) -> &str {
        "memory_delete"
    }

    fn description(&self) -> String {
        "Delete a key from shared memory, idempotently.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "key": { "type": "string" } },
            "required": ["key"],
        })
    }

    fn required_args(&self) -> Vec<String> {
        vec!["key".to_string()]
    }

    async fn call(&self, arguments: Value, memory: &SharedMemory) -> anyhow::Result<String> {
        let key = arg_str(&arguments, "key")?;
        memory.delete(&key);
        Ok(format!("deleted '{key}'"))
    }
}

pub struct Arithmetic;

#[async_trait]
impl ToolExecutor for Arithmetic {
    fn name(&self) -> &str {
        "arithmetic"
    }

    fn description(&self) -> String {
        "Evaluate a binary arithmetic operation: add, sub, mul, or div.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "op": { "type": "string", "enum": ["add", "sub", "mul", "div"] },
                "a": { "type": "number" },
                "b": { "type": "number" },
            },
            "required": ["op", "a", "b"],
        })
    }

    fn required_args(&self) -> Vec<String> {
        vec!["op".to_string(), "a".to_string(), "b".to_string()]
    }

    async fn call(&self, arguments: Value, _memory: &SharedMemory) -> anyhow::Result<String> {
        let op = arg_str(&arguments, "op")?;
        let a = arguments
            .get("a")
            .and_then(Value::as_f64)
            .ok_or_else(|| anyhow::anyhow!("missing or non-numeric argument 'a'"))?;
        let b = arguments
            .get("b")
            .and_then(Value::as_f64)
            .ok_or_else(|| anyhow::anyhow!("missing or non-numeric argument 'b'"))?;

        let result = match op.as_str() {
            "add" => a + b,
            "sub" => a - b,
            "mul" => a * b,
            "div" => {
                if b == 0.0 {
                    return Err(anyhow::anyhow!("division by zero"));
                }
                a / b
            }
            other => return Err(anyhow::anyhow!("unknown operator '{other}'")),
        };
        Ok(result.to_string())
    }
}

pub struct CurrentTimestamp;

#[async_trait]
impl ToolExecutor for CurrentTimestamp {
    fn name(&self) -> &str {
        "current_timestamp"
    }

    fn description(&self) -> String {
        "Return the current UTC timestamp in RFC 3339 format.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn call(&self, _arguments: Value, _memory: &SharedMemory) -> anyhow::Result<String> {
        Ok(Utc::now().to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> SharedMemory {
        SharedMemory::new()
    }

    #[tokio::test]
    async fn memory_set_then_get_round_trips() {
        let mem = memory();
        MemorySet
            .call(json!({"key": "a", "value": "1"}), &mem)
            .await
            .unwrap();
        let got = MemoryGet.call(json!({"key": "a"}), &mem).await.unwrap();
        assert_eq!(got, "1");
    }

    #[tokio::test]
    async fn memory_get_on_missing_key_is_literal_null() {
        let mem = memory();
        let got = MemoryGet.call(json!({"key": "missing"}), &mem).await.unwrap();
        assert_eq!(got, "null");
    }

    #[tokio::test]
    async fn memory_delete_is_idempotent() {
        let mem = memory();
        MemorySet.call(json!({"key": "a", "value": "1"}), &mem).await.unwrap();
        MemoryDelete.call(json!({"key": "a"}), &mem).await.unwrap();
        MemoryDelete.call(json!({"key": "a"}), &mem).await.unwrap();
        let got = MemoryGet.call(json!({"key": "a"}), &mem).await.unwrap();
        assert_eq!(got, "null");
    }

    #[tokio::test]
    async fn arithmetic_add_sub_mul() {
        let mem = memory();
        assert_eq!(
            Arithmetic.call(json!({"op": "add", "a": 2, "b": 3}), &mem).await.unwrap(),
            "5"
        );
        assert_eq!(
            Arithmetic.call(json!({"op": "sub", "a": 5, "b": 3}), &mem).await.unwrap(),
            "2"
        );
        assert_eq!(
            Arithmetic.call(json!({"op": "mul", "a": 4, "b": 3}), &mem).await.unwrap(),
            "12"
        );
    }

    #[tokio::test]
    async fn arithmetic_div_by_zero_is_an_error() {
        let mem = memory();
        let err = Arithmetic.call(json!({"op": "div", "a": 1, "b": 0}), &mem).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn current_timestamp_ignores_arguments() {
        let mem = memory();
        let ts = CurrentTimestamp.call(json!({"whatever": 1}), &mem).await.unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
