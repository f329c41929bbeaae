//! Filename style definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How downloaded files are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilenameStyle {
    /// `{title} --- {post_id}{ext}` (default).
    #[default]
    Basic,
    /// `{title}{ext}`. Lossy: posts sharing a title collide.
    Pretty,
    /// `{title}-{post_id}-{url_hash}{ext}`.
    Advanced,
    /// Any unrecognized style keeps the URL's own basename.
    #[serde(other)]
    Original,
}

impl fmt::Display for FilenameStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilenameStyle::Basic => write!(f, "basic"),
            FilenameStyle::Pretty => write!(f, "pretty"),
            FilenameStyle::Advanced => write!(f, "advanced"),
            FilenameStyle::Original => write!(f, "original"),
        }
    }
}

impl FromStr for FilenameStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(FilenameStyle::Basic),
            "pretty" => Ok(FilenameStyle::Pretty),
            "advanced" => Ok(FilenameStyle::Advanced),
            "original" => Ok(FilenameStyle::Original),
            _ => Err(format!("Unknown filename style: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        style: FilenameStyle,
    }

    #[test]
    fn test_parse_known_styles() {
        assert_eq!("basic".parse::<FilenameStyle>().unwrap(), FilenameStyle::Basic);
        assert_eq!("Pretty".parse::<FilenameStyle>().unwrap(), FilenameStyle::Pretty);
        assert_eq!("ADVANCED".parse::<FilenameStyle>().unwrap(), FilenameStyle::Advanced);
        assert!("fancy".parse::<FilenameStyle>().is_err());
    }

    #[test]
    fn test_unknown_style_in_config_falls_back_to_original() {
        let parsed: Wrapper = toml::from_str(r#"style = "fancy""#).unwrap();
        assert_eq!(parsed.style, FilenameStyle::Original);

        let parsed: Wrapper = toml::from_str(r#"style = "advanced""#).unwrap();
        assert_eq!(parsed.style, FilenameStyle::Advanced);
    }
}
