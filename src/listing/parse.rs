//! Listing parsing.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::media::Post;

/// Turn a listing document into posts.
///
/// Accepts either a bare array of `{ "data": Post }` wrappers or an object
/// holding that array at `data.children`. Any other top-level shape is a
/// fatal input error. Individual wrappers that cannot be decoded are skipped
/// with a warning.
pub fn parse_listing(document: Value) -> Result<Vec<Post>> {
    let children = match document {
        Value::Array(children) => children,
        Value::Object(mut object) => match object
            .remove("data")
            .and_then(|mut data| data.get_mut("children").map(Value::take))
        {
            Some(Value::Array(children)) => children,
            Some(_) => {
                return Err(Error::Listing("'data.children' is not a list".to_string()));
            }
            None => {
                return Err(Error::Listing(
                    "object listing has no 'data.children'".to_string(),
                ));
            }
        },
        other => {
            return Err(Error::Listing(format!(
                "expected a list or an object, found {}",
                json_kind(&other)
            )));
        }
    };

    let total = children.len();
    let posts: Vec<Post> = children
        .into_iter()
        .enumerate()
        .filter_map(|(index, child)| decode_child(index, child))
        .collect();

    if posts.len() < total {
        tracing::warn!("Skipped {} undecodable listing entries", total - posts.len());
    }

    Ok(posts)
}

/// Parse listing text.
pub fn parse_listing_str(content: &str) -> Result<Vec<Post>> {
    let document: Value = serde_json::from_str(content)
        .map_err(|e| Error::Listing(format!("not valid JSON: {}", e)))?;
    parse_listing(document)
}

fn decode_child(index: usize, mut child: Value) -> Option<Post> {
    let data = match child.get_mut("data") {
        Some(data) => data.take(),
        None => {
            tracing::debug!("Listing entry {} has no 'data', skipping", index);
            return None;
        }
    };

    let post: Post = match serde_json::from_value(data) {
        Ok(post) => post,
        Err(e) => {
            tracing::warn!("Listing entry {} could not be decoded: {}", index, e);
            return None;
        }
    };

    if post.id.is_empty() {
        tracing::warn!("Listing entry {} has no post id, skipping", index);
        return None;
    }

    Some(post)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_listing() {
        let posts = parse_listing(json!({
            "data": {"children": [
                {"data": {"id": "abc", "title": "Cat Pic", "url_overridden_by_dest": "https://i.example/cat.jpg"}}
            ]}
        }))
        .unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "abc");
        assert_eq!(posts[0].title, "Cat Pic");
    }

    #[test]
    fn test_bare_list_listing() {
        let posts = parse_listing(json!([
            {"kind": "t3", "data": {"id": "a"}},
            {"kind": "t3", "data": {"id": "b"}}
        ]))
        .unwrap();

        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_malformed_shapes_are_fatal() {
        assert!(matches!(parse_listing(json!("nope")), Err(Error::Listing(_))));
        assert!(matches!(parse_listing(json!(42)), Err(Error::Listing(_))));
        assert!(matches!(
            parse_listing(json!({"kind": "Listing"})),
            Err(Error::Listing(_))
        ));
        assert!(matches!(
            parse_listing(json!({"data": {"after": null}})),
            Err(Error::Listing(_))
        ));
        assert!(matches!(
            parse_listing(json!({"data": {"children": {}}})),
            Err(Error::Listing(_))
        ));
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let posts = parse_listing(json!([
            {"kind": "more"},
            {"data": {"id": "ok"}},
            {"data": {"id": "bad", "is_video": "yes"}},
            {"data": {"title": "no id"}}
        ]))
        .unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "ok");
    }

    #[test]
    fn test_invalid_json_text() {
        assert!(matches!(parse_listing_str("{oops"), Err(Error::Listing(_))));
        assert_eq!(parse_listing_str("[]").unwrap().len(), 0);
    }
}
