//! Command executor for dispatching CLI commands
//!
//! Each command runs against an already connected [`CacheClient`] and yields
//! a JSON value that the binary prints on stdout.

use serde_json::{Map, Value, json};

use super::parser::{Commands, TagAction, TimeoutArg, WriteArgs};
use crate::cache::{CacheClient, CacheError, CacheValue, Fetched, Timeout};

/// Execute `command` against `client`.
///
/// Writes and deletes report `true` once they went through; reads report the
/// values found, with `null` for missing names.
pub async fn execute_command(command: &Commands, client: &mut CacheClient) -> Result<Value, CacheError> {
    match command {
        Commands::Get { names } => {
            let fetched = client.get_many(names.as_slice()).await?;
            Ok(fetched_to_json(fetched))
        }
        Commands::Set(args) => write(client, args, false).await,
        Commands::Add(args) => write(client, args, true).await,
        Commands::Have { names } => Ok(Value::Bool(client.have_many(names.as_slice()).await?)),
        Commands::Delete { names, checked } => {
            if *checked {
                Ok(Value::Bool(client.delete_many_checked(names.as_slice()).await?))
            } else {
                client.delete_many(names.as_slice()).await?;
                Ok(Value::Bool(true))
            }
        }
        Commands::Inc(args) => {
            client
                .inc_many(args.names.as_slice(), args.step.by, timeout(&args.step.timeout))
                .await?;
            Ok(Value::Bool(true))
        }
        Commands::Dec(args) => {
            client
                .dec_many(args.names.as_slice(), args.step.by, timeout(&args.step.timeout))
                .await?;
            Ok(Value::Bool(true))
        }
        Commands::Mult(args) => {
            client
                .mult_many(args.names.as_slice(), args.factor.by, timeout(&args.factor.timeout))
                .await?;
            Ok(Value::Bool(true))
        }
        Commands::Div(args) => {
            client
                .div_many(args.names.as_slice(), args.factor.by, timeout(&args.factor.timeout))
                .await?;
            Ok(Value::Bool(true))
        }
        Commands::Flush => {
            client.flush().await?;
            Ok(Value::Bool(true))
        }
        Commands::Tag { tags, action } => {
            client.tag(tags.clone());
            let result = execute_tag_action(action, client).await;
            client.untag();
            result
        }
    }
}

async fn execute_tag_action(action: &TagAction, client: &mut CacheClient) -> Result<Value, CacheError> {
    match action {
        TagAction::Members => Ok(json!(client.tag_members().await?)),
        TagAction::Get => Ok(fetched_to_json(client.get_by_tag().await?)),
        TagAction::Set(args) => {
            client
                .set_by_tag(parse_value(&args.value), timeout(&args.timeout))
                .await?;
            Ok(Value::Bool(true))
        }
        TagAction::Add(args) => {
            client
                .add_by_tag(parse_value(&args.value), timeout(&args.timeout))
                .await?;
            Ok(Value::Bool(true))
        }
        TagAction::Delete => {
            client.delete_by_tag().await?;
            Ok(Value::Bool(true))
        }
        TagAction::Inc(args) => {
            client.inc_by_tag(args.by, timeout(&args.timeout)).await?;
            Ok(Value::Bool(true))
        }
        TagAction::Dec(args) => {
            client.dec_by_tag(args.by, timeout(&args.timeout)).await?;
            Ok(Value::Bool(true))
        }
        TagAction::Mult(args) => {
            client.mult_by_tag(args.by, timeout(&args.timeout)).await?;
            Ok(Value::Bool(true))
        }
        TagAction::Div(args) => {
            client.div_by_tag(args.by, timeout(&args.timeout)).await?;
            Ok(Value::Bool(true))
        }
    }
}

async fn write(client: &mut CacheClient, args: &WriteArgs, add: bool) -> Result<Value, CacheError> {
    if !args.tags.is_empty() {
        client.tag(args.tags.clone());
    }

    let value = parse_value(&args.value);
    let timeout = timeout(&args.timeout);
    let result = if add {
        client.add(&args.name, value, timeout).await.map(|_| ())
    } else {
        client.set(&args.name, value, timeout).await.map(|_| ())
    };

    client.untag();
    result.map(|()| Value::Bool(true))
}

/// Parse a command-line value as JSON, falling back to the raw string.
pub fn parse_value(raw: &str) -> CacheValue {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => CacheValue::from_json(value),
        Err(_) => CacheValue::Str(raw.to_string()),
    }
}

fn timeout(arg: &TimeoutArg) -> Timeout {
    arg.timeout.map(Timeout::Seconds).unwrap_or_default()
}

fn fetched_to_json(fetched: Fetched) -> Value {
    let map: Map<String, Value> = fetched
        .into_iter()
        .map(|(name, value)| (name, value.map(|v| v.to_json()).unwrap_or(Value::Null)))
        .collect();
    Value::Object(map)
}
