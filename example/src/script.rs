//! Gesture scripts.
//!
//! A script is a comma separated list of batches. Steps inside a batch are
//! joined with `+` and run back to back; transitions only settle between
//! batches.
//!
//! | step              | effect                                          |
//! |-------------------|-------------------------------------------------|
//! | `next`, `prev`    | page forward or back                            |
//! | `goto:<index>`    | animated move, index parsed like host input     |
//! | `jump:<index>`    | move with zero duration                         |
//! | `drag:<dx>[@ms]`  | horizontal drag, held for `ms` (default 400)    |
//! | `scroll:<dy>`     | vertical drag                                   |
//! | `tap`             | press and release without moving                |
//! | `escape`          | drag, then cancel with Escape                   |
//! | `resize:<width>`  | change the viewport width                       |

use std::time::Duration;

use anyhow::{Context, Result, bail};

const DEFAULT_HOLD: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Next,
    Prev,
    Goto(String),
    Jump(String),
    Drag { delta: f32, held: Duration },
    Scroll { delta: f32 },
    Tap,
    Escape,
    Resize(f32),
}

pub fn parse(script: &str) -> Result<Vec<Vec<Step>>> {
    script
        .split(',')
        .map(str::trim)
        .filter(|batch| !batch.is_empty())
        .map(|batch| {
            batch
                .split('+')
                .map(|step| parse_step(step.trim()))
                .collect::<Result<Vec<_>>>()
        })
        .collect()
}

fn parse_step(token: &str) -> Result<Step> {
    let (name, value) = match token.split_once(':') {
        Some((name, value)) => (name, Some(value.trim())),
        None => (token, None),
    };

    let step = match (name, value) {
        ("next", None) => Step::Next,
        ("prev", None) => Step::Prev,
        ("tap", None) => Step::Tap,
        ("escape", None) => Step::Escape,
        ("goto", Some(index)) => Step::Goto(index.to_owned()),
        ("jump", Some(index)) => Step::Jump(index.to_owned()),
        ("drag", Some(value)) => {
            let (delta, held) = match value.split_once('@') {
                Some((delta, millis)) => {
                    let millis: u64 = millis
                        .parse()
                        .with_context(|| format!("invalid hold time in \"{token}\""))?;
                    (delta, Duration::from_millis(millis))
                }
                None => (value, DEFAULT_HOLD),
            };
            Step::Drag {
                delta: number(delta, token)?,
                held,
            }
        }
        ("scroll", Some(delta)) => Step::Scroll {
            delta: number(delta, token)?,
        },
        ("resize", Some(width)) => Step::Resize(number(width, token)?),
        _ => bail!("unknown step \"{token}\""),
    };
    Ok(step)
}

fn number(value: &str, token: &str) -> Result<f32> {
    let parsed: f32 = value
        .parse()
        .with_context(|| format!("invalid number in \"{token}\""))?;
    if !parsed.is_finite() {
        bail!("non-finite number in \"{token}\"");
    }
    Ok(parsed)
}

/// Converts host input to a page index: non-numeric and non-finite input is
/// rejected, fractions truncate and negatives clamp to zero.
pub fn host_index(raw: &str) -> Option<usize> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(value.max(0.0).trunc() as usize)
}
