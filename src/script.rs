//! Scripted viewer input for the headless driver
//!
//! A script is a comma separated list of steps, e.g.
//! `scroll:1000,jump:19,zoom-in,wait:50`.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::window::{Command, PageRasterizer, WindowManager};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("unknown step {0:?}")]
    UnknownStep(String),
    #[error("step {step:?} expects a {expected} argument, got {value:?}")]
    BadArgument {
        step: String,
        expected: &'static str,
        value: String,
    },
    #[error("step {0:?} needs an argument")]
    MissingArgument(String),
}

/// One scripted action
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Send a command to the viewer
    Command(Command),
    /// Let the queue make progress before the next step
    Wait(Duration),
}

impl FromStr for Step {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (s, None),
        };

        let step = match name {
            "scroll" => Step::Command(Command::Scroll(float_arg(name, arg)?)),
            "jump" => Step::Command(Command::JumpToPage(page_arg(name, arg)?)),
            "next" => Step::Command(Command::NextPage),
            "prev" => Step::Command(Command::PreviousPage),
            "zoom-in" => Step::Command(Command::ZoomIn),
            "zoom-out" => Step::Command(Command::ZoomOut),
            "scale" => Step::Command(Command::SetScale(float_arg(name, arg)?)),
            "pinch" => Step::Command(Command::Pinch(float_arg(name, arg)?)),
            "end-pinch" => Step::Command(Command::EndPinch),
            "width" => Step::Command(Command::SetViewerWidth(float_arg(name, arg)?)),
            "reload" => Step::Command(Command::Reload),
            "wait" => Step::Wait(Duration::from_millis(page_arg(name, arg)? as u64)),
            _ => return Err(ScriptError::UnknownStep(s.to_string())),
        };
        Ok(step)
    }
}

fn required<'a>(name: &str, arg: Option<&'a str>) -> Result<&'a str, ScriptError> {
    arg.filter(|a| !a.is_empty())
        .ok_or_else(|| ScriptError::MissingArgument(name.to_string()))
}

fn float_arg(name: &str, arg: Option<&str>) -> Result<f64, ScriptError> {
    let value = required(name, arg)?;
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ScriptError::BadArgument {
            step: name.to_string(),
            expected: "number",
            value: value.to_string(),
        })
}

fn page_arg(name: &str, arg: Option<&str>) -> Result<usize, ScriptError> {
    let value = required(name, arg)?;
    value.parse::<usize>().map_err(|_| ScriptError::BadArgument {
        step: name.to_string(),
        expected: "whole number",
        value: value.to_string(),
    })
}

/// Parse a whole script; empty input is an empty script
pub fn parse_script(script: &str) -> Result<Vec<Step>, ScriptError> {
    script
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect()
}

impl Step {
    pub fn apply<R: PageRasterizer>(&self, manager: &mut WindowManager<R>) {
        match self {
            Step::Command(cmd) => manager.apply_command(cmd.clone()),
            Step::Wait(duration) => std::thread::sleep(*duration),
        }
    }
}
