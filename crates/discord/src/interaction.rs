use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub const INTERACTION_TYPE_PING: u64 = 1;
pub const INTERACTION_TYPE_APPLICATION_COMMAND: u64 = 2;

/// Option type the platform uses for a user mention argument.
const OPTION_TYPE_USER: u64 = 6;

#[derive(Clone, Debug, PartialEq)]
pub struct InteractionEnvelope {
    pub kind: InteractionKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InteractionKind {
    LivenessCheck,
    CommandInvocation(CommandInvocation),
    Other { interaction_type: u64 },
}

impl InteractionKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::LivenessCheck => "liveness_check",
            Self::CommandInvocation(_) => "command_invocation",
            Self::Other { .. } => "other",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CommandInvocation {
    pub name: String,
    pub args: CommandArgs,
    pub context: InvocationContext,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InvocationContext {
    pub interaction_id: Option<String>,
    pub application_id: Option<String>,
    pub guild_id: Option<String>,
    pub channel_id: Option<String>,
    pub user_id: Option<String>,
    pub username: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User(String),
}

impl OptionValue {
    /// Text form of string and user-reference values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) | Self::User(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) | Self::User(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Boolean(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

/// Option name to value, built once per interaction from the options list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandArgs {
    values: BTreeMap<String, OptionValue>,
}

impl CommandArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Text value of an option as sent, treating blank text as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        let value = self.values.get(name)?.to_string();
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("malformed interaction envelope: {0}")]
    Malformed(String),
}

/// Only `type` is required up front. A liveness check is classified before any
/// other field is looked at; for a command, `data.name` and `data.options` are
/// decoded strictly and the invocation context is read best-effort.
pub fn parse_interaction(body: &[u8]) -> Result<InteractionEnvelope, EnvelopeError> {
    let raw: Value = serde_json::from_slice(body)
        .map_err(|error| EnvelopeError::Malformed(format!("body is not JSON: {error}")))?;
    if !raw.is_object() {
        return Err(EnvelopeError::Malformed("body is not a JSON object".to_owned()));
    }

    let interaction_type = raw
        .get("type")
        .and_then(Value::as_u64)
        .ok_or_else(|| EnvelopeError::Malformed("missing `type`".to_owned()))?;

    let kind = match interaction_type {
        INTERACTION_TYPE_PING => InteractionKind::LivenessCheck,
        INTERACTION_TYPE_APPLICATION_COMMAND => {
            InteractionKind::CommandInvocation(parse_command(&raw)?)
        }
        other => InteractionKind::Other { interaction_type: other },
    };

    Ok(InteractionEnvelope { kind })
}

fn parse_command(raw: &Value) -> Result<CommandInvocation, EnvelopeError> {
    let data = raw
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| EnvelopeError::Malformed("missing `data`".to_owned()))?;
    let name = data
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| EnvelopeError::Malformed("missing `data.name`".to_owned()))?
        .to_owned();
    let options = match data.get("options") {
        None | Some(Value::Null) => Vec::new(),
        Some(options) => Vec::<RawOption>::deserialize(options).map_err(|error| {
            EnvelopeError::Malformed(format!("invalid `data.options`: {error}"))
        })?,
    };
    let args = normalize_options(options)?;

    // Guild interactions carry the invoker under `member.user`, direct messages under `user`.
    let user = raw
        .get("member")
        .and_then(|member| member.get("user"))
        .filter(|user| user.is_object())
        .or_else(|| raw.get("user").filter(|user| user.is_object()));
    let context = InvocationContext {
        interaction_id: text_field(raw, "id"),
        application_id: text_field(raw, "application_id"),
        guild_id: text_field(raw, "guild_id"),
        channel_id: text_field(raw, "channel_id"),
        user_id: user.and_then(|user| text_field(user, "id")),
        username: user.and_then(|user| text_field(user, "username")),
    };

    Ok(CommandInvocation { name, args, context })
}

/// Context metadata never fails the request; an unexpected shape reads as absent.
fn text_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn normalize_options(options: Vec<RawOption>) -> Result<CommandArgs, EnvelopeError> {
    let mut args = CommandArgs::new();

    for option in options {
        // Subcommand groups carry nested options instead of a value.
        let Some(value) = option.value else {
            continue;
        };
        let value = option_value(option.option_type, value).ok_or_else(|| {
            EnvelopeError::Malformed(format!("unsupported value for option `{}`", option.name))
        })?;

        if args.values.insert(option.name.clone(), value).is_some() {
            return Err(EnvelopeError::Malformed(format!("duplicate option `{}`", option.name)));
        }
    }

    Ok(args)
}

fn option_value(option_type: Option<u64>, value: Value) -> Option<OptionValue> {
    match (option_type, value) {
        (Some(OPTION_TYPE_USER), Value::String(id)) => Some(OptionValue::User(id)),
        (_, Value::String(text)) => Some(OptionValue::String(text)),
        (_, Value::Bool(flag)) => Some(OptionValue::Boolean(flag)),
        (_, Value::Number(number)) => match number.as_i64() {
            Some(integer) => Some(OptionValue::Integer(integer)),
            None => number.as_f64().map(OptionValue::Number),
        },
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct RawOption {
    name: String,
    #[serde(rename = "type")]
    option_type: Option<u64>,
    value: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::{parse_interaction, CommandArgs, EnvelopeError, InteractionKind, OptionValue};

    fn command(body: &str) -> super::CommandInvocation {
        match parse_interaction(body.as_bytes()).expect("parse").kind {
            InteractionKind::CommandInvocation(invocation) => invocation,
            other => panic!("expected command invocation, got {other:?}"),
        }
    }

    #[test]
    fn classifies_liveness_check() {
        let envelope = parse_interaction(br#"{"type":1,"id":"1","token":"x"}"#).expect("parse");
        assert_eq!(envelope.kind, InteractionKind::LivenessCheck);
    }

    #[test]
    fn classifies_unknown_types_as_other() {
        let envelope = parse_interaction(br#"{"type":3,"data":{"custom_id":"b"}}"#).expect("parse");
        assert_eq!(envelope.kind, InteractionKind::Other { interaction_type: 3 });
    }

    #[test]
    fn options_list_is_indexed_by_name() {
        let invocation =
            command(r#"{"type":2,"data":{"name":"hello","options":[{"name":"user","value":"123"}]}}"#);

        assert_eq!(invocation.name, "hello");
        assert_eq!(invocation.args, CommandArgs::new().with("user", "123"));
    }

    #[test]
    fn missing_options_field_is_an_empty_mapping() {
        let invocation = command(r#"{"type":2,"data":{"name":"hello"}}"#);
        assert!(invocation.args.is_empty());
    }

    #[test]
    fn typed_option_values_are_preserved() {
        let invocation = command(
            r#"{"type":2,"data":{"name":"task","options":[
                {"name":"assignee","type":6,"value":"42"},
                {"name":"count","type":4,"value":3},
                {"name":"ratio","type":10,"value":0.5},
                {"name":"urgent","type":5,"value":true},
                {"name":"content","type":3,"value":"write docs"}
            ]}}"#,
        );

        assert_eq!(invocation.args.get("assignee"), Some(&OptionValue::User("42".to_owned())));
        assert_eq!(invocation.args.get("count"), Some(&OptionValue::Integer(3)));
        assert_eq!(invocation.args.get("ratio"), Some(&OptionValue::Number(0.5)));
        assert_eq!(invocation.args.get("urgent"), Some(&OptionValue::Boolean(true)));
        assert_eq!(invocation.args.text("content").as_deref(), Some("write docs"));
        assert_eq!(invocation.args.text("count").as_deref(), Some("3"));
        assert_eq!(invocation.args.len(), 5);
    }

    #[test]
    fn blank_text_options_read_as_absent() {
        let invocation = command(
            r#"{"type":2,"data":{"name":"task","options":[{"name":"status","value":"  "}]}}"#,
        );
        assert_eq!(invocation.args.text("status"), None);
        assert!(invocation.args.get("status").is_some());
    }

    #[test]
    fn text_options_keep_surrounding_whitespace() {
        let invocation = command(
            r#"{"type":2,"data":{"name":"task","options":[{"name":"content","value":"  indented title "}]}}"#,
        );
        assert_eq!(invocation.args.text("content").as_deref(), Some("  indented title "));
    }

    #[test]
    fn liveness_check_ignores_the_shape_of_other_fields() {
        for body in [
            r#"{"type":1,"data":"x"}"#,
            r#"{"type":1,"data":{"name":5}}"#,
            r#"{"type":1,"guild_id":123}"#,
            r#"{"type":1,"member":[],"user":false,"options":{}}"#,
        ] {
            let envelope = parse_interaction(body.as_bytes()).expect("parse");
            assert_eq!(envelope.kind, InteractionKind::LivenessCheck, "body {body}");
        }
    }

    #[test]
    fn unexpected_context_shapes_read_as_absent() {
        let invocation = command(
            r#"{"type":2,"id":9,"guild_id":123,"channel_id":null,"member":"x",
                "user":{"id":6,"username":"hanako"},"data":{"name":"hello"}}"#,
        );

        assert_eq!(invocation.name, "hello");
        assert_eq!(invocation.context.interaction_id, None);
        assert_eq!(invocation.context.guild_id, None);
        assert_eq!(invocation.context.channel_id, None);
        assert_eq!(invocation.context.user_id, None);
        assert_eq!(invocation.context.username.as_deref(), Some("hanako"));
    }

    #[test]
    fn malformed_options_list_is_malformed() {
        let error = parse_interaction(br#"{"type":2,"data":{"name":"hello","options":"user"}}"#)
            .expect_err("must fail");
        assert!(matches!(error, EnvelopeError::Malformed(ref message) if message.contains("options")));
    }

    #[test]
    fn invoker_identity_comes_from_member_or_user() {
        let guild = command(
            r#"{"type":2,"id":"9","application_id":"77","guild_id":"g","channel_id":"c",
                "data":{"name":"hello"},"member":{"user":{"id":"5","username":"taro"}}}"#,
        );
        assert_eq!(guild.context.username.as_deref(), Some("taro"));
        assert_eq!(guild.context.user_id.as_deref(), Some("5"));
        assert_eq!(guild.context.application_id.as_deref(), Some("77"));
        assert_eq!(guild.context.channel_id.as_deref(), Some("c"));

        let direct = command(r#"{"type":2,"data":{"name":"hello"},"user":{"id":"6","username":"hanako"}}"#);
        assert_eq!(direct.context.username.as_deref(), Some("hanako"));
        assert_eq!(direct.context.guild_id, None);
    }

    #[test]
    fn missing_type_is_malformed() {
        let error = parse_interaction(br#"{"data":{"name":"hello"}}"#).expect_err("must fail");
        assert!(matches!(error, EnvelopeError::Malformed(ref message) if message.contains("type")));
    }

    #[test]
    fn missing_command_name_is_malformed() {
        let error = parse_interaction(br#"{"type":2,"data":{}}"#).expect_err("must fail");
        assert!(matches!(error, EnvelopeError::Malformed(ref message) if message.contains("data.name")));

        let error = parse_interaction(br#"{"type":2}"#).expect_err("must fail");
        assert!(matches!(error, EnvelopeError::Malformed(_)));
    }

    #[test]
    fn non_json_body_is_malformed() {
        assert!(parse_interaction(b"not json").is_err());
        assert!(parse_interaction(b"").is_err());
        assert!(parse_interaction(b"[1,2]").is_err());
    }

    #[test]
    fn duplicate_option_names_are_malformed() {
        let error = parse_interaction(
            br#"{"type":2,"data":{"name":"hello","options":[{"name":"user","value":"1"},{"name":"user","value":"2"}]}}"#,
        )
        .expect_err("must fail");
        assert!(matches!(error, EnvelopeError::Malformed(ref message) if message.contains("duplicate")));
    }
}
