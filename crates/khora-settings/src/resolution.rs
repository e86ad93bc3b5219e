// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The display resolution setting and its literal encoding.
//!
//! Resolutions are stored as strings of the form `"<width>x<height>:<refresh>"`,
//! e.g. `"1920x1080:60"`. [`Resolution::from_str`] and the [`Display`](fmt::Display)
//! implementation are exact inverses for every canonical string.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An error produced when parsing a resolution string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionParseError {
    /// The string is not of the form `<width>x<height>:<refresh>`.
    #[error("'{0}' is not of the form <width>x<height>:<refresh>")]
    Layout(String),
    /// One of the numeric components is not a valid unsigned integer.
    #[error("invalid {component} in '{input}'")]
    Component {
        /// Which component failed (`width`, `height`, `refresh rate`).
        component: &'static str,
        /// The full input string.
        input: String,
    },
    /// Width, height, or refresh rate is zero.
    #[error("'{0}' has a zero component")]
    Zero(String),
}

/// A display mode resolution with its refresh rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Resolution {
    /// Horizontal size in pixels.
    pub width: u32,
    /// Vertical size in pixels.
    pub height: u32,
    /// Refresh rate in hertz.
    pub refresh_rate: u32,
}

impl Resolution {
    /// Creates a new resolution.
    pub const fn new(width: u32, height: u32, refresh_rate: u32) -> Self {
        Self {
            width,
            height,
            refresh_rate,
        }
    }

    /// A human-readable caption, e.g. `"1920 x 1080 @ 60 Hz"`.
    pub fn caption(&self) -> String {
        format!("{} x {} @ {} Hz", self.width, self.height, self.refresh_rate)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(1280, 720, 60)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}:{}", self.width, self.height, self.refresh_rate)
    }
}

fn parse_component(
    text: &str,
    component: &'static str,
    input: &str,
) -> Result<u32, ResolutionParseError> {
    // Reject signs, whitespace and leading zeros so that formatting the
    // parsed value gives back the exact input.
    let padded = text.len() > 1 && text.starts_with('0');
    if text.is_empty() || padded || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ResolutionParseError::Component {
            component,
            input: input.to_string(),
        });
    }
    text.parse().map_err(|_| ResolutionParseError::Component {
        component,
        input: input.to_string(),
    })
}

impl FromStr for Resolution {
    type Err = ResolutionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (size, refresh) = s
            .split_once(':')
            .ok_or_else(|| ResolutionParseError::Layout(s.to_string()))?;
        let (width, height) = size
            .split_once('x')
            .ok_or_else(|| ResolutionParseError::Layout(s.to_string()))?;

        let resolution = Resolution {
            width: parse_component(width, "width", s)?,
            height: parse_component(height, "height", s)?,
            refresh_rate: parse_component(refresh, "refresh rate", s)?,
        };
        if resolution.width == 0 || resolution.height == 0 || resolution.refresh_rate == 0 {
            return Err(ResolutionParseError::Zero(s.to_string()));
        }
        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format_are_inverse() {
        let parsed: Resolution = "1920x1080:60".parse().unwrap();
        assert_eq!(parsed, Resolution::new(1920, 1080, 60));
        assert_eq!(parsed.to_string(), "1920x1080:60");

        for text in ["1280x720:60", "2560x1440:144", "3840x2160:30", "800x600:75"] {
            let resolution: Resolution = text.parse().unwrap();
            assert_eq!(resolution.to_string(), text);
        }
    }

    #[test]
    fn test_rejects_malformed_layouts() {
        assert!(matches!(
            "1920x1080".parse::<Resolution>(),
            Err(ResolutionParseError::Layout(_))
        ));
        assert!(matches!(
            "1920*1080:60".parse::<Resolution>(),
            Err(ResolutionParseError::Layout(_))
        ));
        assert!(matches!(
            "1920x:60".parse::<Resolution>(),
            Err(ResolutionParseError::Component { component: "height", .. })
        ));
        assert!(matches!(
            "+1920x1080:60".parse::<Resolution>(),
            Err(ResolutionParseError::Component { component: "width", .. })
        ));
        assert!(matches!(
            "1920x1080: 60".parse::<Resolution>(),
            Err(ResolutionParseError::Component { .. })
        ));
        assert!(matches!(
            "01920x1080:60".parse::<Resolution>(),
            Err(ResolutionParseError::Component { component: "width", .. })
        ));
        assert!(matches!(
            "1920x1080:060".parse::<Resolution>(),
            Err(ResolutionParseError::Component { component: "refresh rate", .. })
        ));
        assert!(matches!(
            "0x1080:60".parse::<Resolution>(),
            Err(ResolutionParseError::Zero(_))
        ));
    }

    #[test]
    fn test_caption() {
        assert_eq!(Resolution::new(1280, 720, 60).caption(), "1280 x 720 @ 60 Hz");
    }
}
