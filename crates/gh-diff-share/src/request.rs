//! Parsing tool calls into validated [`DeliveryRequest`]s.
//!
//! Two tools are exposed:
//!
//! - `visualize_diff_html_content` shares the diff, falling back to a local
//!   file or an inline URI
//! - `visualize_diff_output_file` always writes into the output directory
//!
//! Every check runs here, before any delivery component is touched.

use crate::error::InputError;
use crate::local::ArtifactKind;
use crate::orchestrator::DeliveryRequest;
use crate::plan::ExplicitMode;
use crate::policy::{PolicyOverrides, SecurityLevel};
use anyhow::{Context, Result};
use gh_diff_html::{Layout, RenderOptions};
use gh_diff_share_config::{OutputMode, RuntimeEnvironment, ShareConfig};
use gh_gist_client::Visibility;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

pub const MIN_EXPIRY_MINUTES: i64 = 1;
pub const MAX_EXPIRY_MINUTES: i64 = 1440;

/// A tool invocation as read from the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    VisualizeDiffHtmlContent,
    VisualizeDiffOutputFile,
}

impl FromStr for Tool {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visualize_diff_html_content" => Ok(Tool::VisualizeDiffHtmlContent),
            "visualize_diff_output_file" => Ok(Tool::VisualizeDiffOutputFile),
            other => Err(InputError::UnknownTool(other.to_string())),
        }
    }
}

/// Values used when a call leaves an argument out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDefaults {
    pub layout: Layout,
    pub security_level: SecurityLevel,
    pub auto_open: bool,
    pub output_mode: OutputMode,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            security_level: SecurityLevel::default(),
            auto_open: false,
            output_mode: OutputMode::default(),
        }
    }
}

impl RequestDefaults {
    pub fn from_settings(config: &ShareConfig, env: &RuntimeEnvironment) -> Result<Self> {
        let layout = config
            .default_layout
            .parse::<Layout>()
            .map_err(anyhow::Error::msg)
            .context("Invalid default_layout in config")?;
        let security_level = config
            .default_security_level
            .parse::<SecurityLevel>()
            .map_err(anyhow::Error::msg)
            .context("Invalid default_security_level in config")?;

        Ok(Self {
            layout,
            security_level,
            auto_open: env.default_auto_open,
            output_mode: env.default_output_mode,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderArgs {
    #[serde(default)]
    diff: Option<Value>,
    format: Option<String>,
    show_file_list: Option<bool>,
    highlight: Option<bool>,
    old_path: Option<String>,
    new_path: Option<String>,
    auto_open: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShareArgs {
    #[serde(flatten)]
    render: RenderArgs,
    expiry_minutes: Option<i64>,
    public: Option<bool>,
    security_level: Option<String>,
    compatibility_mode: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutputFileArgs {
    #[serde(flatten)]
    render: RenderArgs,
    output_type: Option<String>,
}

/// Validate a tool call and turn it into a request.
pub fn parse_call(call: &ToolCall, defaults: &RequestDefaults) -> Result<DeliveryRequest, InputError> {
    match call.tool.parse::<Tool>()? {
        Tool::VisualizeDiffHtmlContent => {
            let args: ShareArgs = arguments(&call.arguments)?;
            share_request(args, defaults)
        }
        Tool::VisualizeDiffOutputFile => {
            let args: OutputFileArgs = arguments(&call.arguments)?;
            output_file_request(args, defaults)
        }
    }
}

fn arguments<T: DeserializeOwned + Default>(value: &Value) -> Result<T, InputError> {
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value.clone()).map_err(|e| InputError::Malformed(e.to_string()))
}

fn share_request(args: ShareArgs, defaults: &RequestDefaults) -> Result<DeliveryRequest, InputError> {
    let base = base_request(&args.render, defaults, false)?;

    let ttl_minutes = args
        .expiry_minutes
        .map(|value| {
            if (MIN_EXPIRY_MINUTES..=MAX_EXPIRY_MINUTES).contains(&value) {
                u32::try_from(value).map_err(|_| expiry_out_of_range(value))
            } else {
                Err(expiry_out_of_range(value))
            }
        })
        .transpose()?;

    let security_level = match &args.security_level {
        Some(level) => parse_field("securityLevel", level)?,
        None => defaults.security_level,
    };

    Ok(DeliveryRequest {
        security_level,
        compatibility_mode: args.compatibility_mode.unwrap_or(false),
        overrides: PolicyOverrides {
            ttl_minutes,
            visibility: args.public.map(|public| {
                if public {
                    Visibility::Public
                } else {
                    Visibility::Private
                }
            }),
            access_secret: None,
        },
        ..base
    })
}

fn output_file_request(
    args: OutputFileArgs,
    defaults: &RequestDefaults,
) -> Result<DeliveryRequest, InputError> {
    let base = base_request(&args.render, defaults, defaults.auto_open)?;

    let output_mode = match &args.output_type {
        Some(kind) => parse_field::<OutputMode>("outputType", kind)?,
        None => defaults.output_mode,
    };

    Ok(DeliveryRequest {
        explicit_mode: Some(ExplicitMode::Local),
        output: ArtifactKind::from(output_mode),
        ..base
    })
}

fn base_request(
    args: &RenderArgs,
    defaults: &RequestDefaults,
    default_auto_open: bool,
) -> Result<DeliveryRequest, InputError> {
    let diff = args
        .diff
        .as_ref()
        .and_then(Value::as_str)
        .filter(|diff| !diff.trim().is_empty())
        .ok_or(InputError::MissingDiff)?;

    let layout = match &args.format {
        Some(format) => parse_field("format", format)?,
        None => defaults.layout,
    };

    Ok(DeliveryRequest {
        diff: diff.to_string(),
        old_path: args.old_path.clone(),
        new_path: args.new_path.clone(),
        render: RenderOptions {
            layout,
            show_file_list: args.show_file_list.unwrap_or(true),
            highlight: args.highlight.unwrap_or(true),
            for_image_output: false,
        },
        auto_open: args.auto_open.unwrap_or(default_auto_open),
        security_level: defaults.security_level,
        ..DeliveryRequest::default()
    })
}

fn parse_field<T>(field: &'static str, value: &str) -> Result<T, InputError>
where
    T: FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|message| InputError::InvalidValue { field, message })
}

fn expiry_out_of_range(value: i64) -> InputError {
    InputError::OutOfRange {
        field: "expiryMinutes",
        value,
        min: MIN_EXPIRY_MINUTES,
        max: MAX_EXPIRY_MINUTES,
    }
}
