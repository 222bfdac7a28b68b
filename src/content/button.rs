//! Button directive attributes.
//!
//! Button directives are `div[data-type="button"]` blocks written by the
//! editor. Their presentation attributes are read into a typed struct, with
//! defaults for anything missing or unrecognized.

use std::str::FromStr;

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

const DEFAULT_TEXT: &str = "Click here";
const DEFAULT_URL: &str = "#";
const DEFAULT_COLOR: &str = "primary";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ButtonVariant {
    #[default]
    Solid,
    Outline,
    Ghost,
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ButtonSize {
    Sm,
    #[default]
    Md,
    Lg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ButtonRadius {
    None,
    Sm,
    #[default]
    Md,
    Lg,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ButtonAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Presentation attributes of a button directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonAttrs {
    pub text: String,
    pub url: String,
    pub variant: ButtonVariant,
    /// Theme color name (`primary`, `secondary`, ...) or `custom`
    pub color: String,
    /// Used by the renderer when `color` is `custom`
    pub custom_color: Option<String>,
    pub size: ButtonSize,
    pub radius: ButtonRadius,
    pub align: ButtonAlign,
}

impl Default for ButtonAttrs {
    fn default() -> Self {
        ButtonAttrs {
            text: DEFAULT_TEXT.to_string(),
            url: DEFAULT_URL.to_string(),
            variant: ButtonVariant::default(),
            color: DEFAULT_COLOR.to_string(),
            custom_color: None,
            size: ButtonSize::default(),
            radius: ButtonRadius::default(),
            align: ButtonAlign::default(),
        }
    }
}

impl ButtonAttrs {
    /// Builds typed attributes from a key-value attribute lookup.
    ///
    /// Keys are the logical names (`text`, `url`, `variant`, `color`,
    /// `customColor`, `size`, `radius`, `align`). Missing or blank values take
    /// the defaults; values that don't name a known option are logged and
    /// replaced by the default as well.
    pub fn from_lookup<'a, F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        ButtonAttrs {
            text: get("text").unwrap_or(DEFAULT_TEXT).to_string(),
            url: get("url").unwrap_or(DEFAULT_URL).to_string(),
            variant: parse_or_default(get("variant"), "variant"),
            color: get("color").unwrap_or(DEFAULT_COLOR).to_string(),
            custom_color: get("customColor").map(str::to_string),
            size: parse_or_default(get("size"), "size"),
            radius: parse_or_default(get("radius"), "radius"),
            align: parse_or_default(get("align"), "align"),
        }
    }

    /// Reads the attributes from a button directive element's `data-*` attributes.
    pub fn from_element(element: &scraper::node::Element) -> Self {
        Self::from_lookup(|key| element.attr(&data_attribute_name(key)))
    }
}

/// Maps a logical attribute name to its `data-*` attribute (`customColor` -> `data-custom-color`).
fn data_attribute_name(key: &str) -> String {
    let mut name = String::from("data-");
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            name.push('-');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

fn parse_or_default<T>(value: Option<&str>, field: &str) -> T
where
    T: FromStr + Default,
{
    match value {
        None => T::default(),
        Some(raw) => T::from_str(&raw.to_ascii_lowercase()).unwrap_or_else(|_| {
            log::debug!("Unknown button {} '{}', using default", field, raw);
            T::default()
        }),
    }
}
