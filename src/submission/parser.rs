use std::collections::HashMap;

use bytes::Bytes;

use crate::models::RawSubmission;

const FIELDS: [&str; 3] = ["name", "email", "message"];

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("request body is empty")]
    EmptyBody,
    #[error("unsupported content type, expected a form submission")]
    UnsupportedContentType,
    #[error("malformed form body: {0}")]
    Malformed(String),
    #[error("missing form fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// Decode a form body into raw submission fields.
///
/// Accepts `application/x-www-form-urlencoded` and `multipart/form-data`.
/// Unknown fields are ignored; the first occurrence of a repeated field wins.
pub async fn parse_form(content_type: Option<&str>, body: Bytes) -> Result<RawSubmission, ParseError> {
    if body.is_empty() {
        return Err(ParseError::EmptyBody);
    }

    let ct = content_type.ok_or(ParseError::UnsupportedContentType)?;
    // media types compare case-insensitively, parameters excluded
    let essence = ct.split(';').next().unwrap_or_default().trim();

    let mut fields = if essence.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
        parse_form_urlencoded(&body)?
    } else if essence.eq_ignore_ascii_case("multipart/form-data") {
        parse_multipart(ct, body).await?
    } else {
        return Err(ParseError::UnsupportedContentType);
    };

    let missing: Vec<&'static str> = FIELDS
        .into_iter()
        .filter(|f| !fields.contains_key(*f))
        .collect();
    if !missing.is_empty() {
        return Err(ParseError::MissingFields(missing));
    }

    Ok(RawSubmission {
        name: fields.remove("name"),
        email: fields.remove("email"),
        message: fields.remove("message"),
    })
}

fn parse_form_urlencoded(body: &[u8]) -> Result<HashMap<String, String>, ParseError> {
    let body_str =
        std::str::from_utf8(body).map_err(|e| ParseError::Malformed(format!("invalid UTF-8: {e}")))?;

    let mut map = HashMap::new();
    for (k, v) in form_urlencoded::parse(body_str.as_bytes()) {
        map.entry(k.into_owned()).or_insert_with(|| v.into_owned());
    }
    Ok(map)
}

async fn parse_multipart(content_type: &str, body: Bytes) -> Result<HashMap<String, String>, ParseError> {
    let boundary = multer::parse_boundary(content_type)
        .map_err(|_| ParseError::Malformed("missing multipart boundary".to_string()))?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut map = HashMap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ParseError::Malformed(format!("multipart error: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|e| ParseError::Malformed(format!("field read error: {e}")))?;
        map.entry(name).or_insert(value);
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URLENCODED: &str = "application/x-www-form-urlencoded";

    #[tokio::test]
    async fn urlencoded_body_is_decoded() {
        let body = Bytes::from_static(
            b"name=Jane%20Doe&email=jane%40example.com&message=Hello%2C+I+am+interested.",
        );

        let raw = parse_form(Some(URLENCODED), body).await.unwrap();

        assert_eq!(raw.name.as_deref(), Some("Jane Doe"));
        assert_eq!(raw.email.as_deref(), Some("jane@example.com"));
        assert_eq!(raw.message.as_deref(), Some("Hello, I am interested."));
    }

    #[tokio::test]
    async fn content_type_parameters_are_tolerated() {
        let body = Bytes::from_static(b"name=a&email=b&message=c");
        let ct = "application/x-www-form-urlencoded; charset=UTF-8";

        assert!(parse_form(Some(ct), body).await.is_ok());
    }

    #[tokio::test]
    async fn content_type_is_matched_case_insensitively() {
        let body = Bytes::from_static(b"name=Jane&email=jane%40example.com&message=Hello+there");

        let raw = parse_form(Some("Application/X-WWW-Form-Urlencoded"), body)
            .await
            .unwrap();
        assert_eq!(raw.name.as_deref(), Some("Jane"));
    }

    #[tokio::test]
    async fn lookalike_content_type_is_rejected() {
        let body = Bytes::from_static(b"name=a&email=b&message=c");
        let err = parse_form(Some("text/application/x-www-form-urlencoded-ish"), body)
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedContentType));
    }

    #[tokio::test]
    async fn multipart_body_is_decoded() {
        let body = "--XBOUNDARY\r\n\
            Content-Disposition: form-data; name=\"name\"\r\n\r\n\
            Jane Doe\r\n\
            --XBOUNDARY\r\n\
            Content-Disposition: form-data; name=\"email\"\r\n\r\n\
            jane@example.com\r\n\
            --XBOUNDARY\r\n\
            Content-Disposition: form-data; name=\"message\"\r\n\r\n\
            Hello, I am interested.\r\n\
            --XBOUNDARY--\r\n";

        let raw = parse_form(
            Some("multipart/form-data; boundary=XBOUNDARY"),
            Bytes::from(body),
        )
        .await
        .unwrap();

        assert_eq!(raw.name.as_deref(), Some("Jane Doe"));
        assert_eq!(raw.message.as_deref(), Some("Hello, I am interested."));
    }

    #[tokio::test]
    async fn empty_body_is_rejected() {
        let err = parse_form(Some(URLENCODED), Bytes::new()).await.unwrap_err();
        assert!(matches!(err, ParseError::EmptyBody));
    }

    #[tokio::test]
    async fn json_body_is_not_a_form() {
        let body = Bytes::from_static(br#"{"name":"Jane"}"#);
        let err = parse_form(Some("application/json"), body).await.unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedContentType));
    }

    #[tokio::test]
    async fn missing_fields_are_listed() {
        let body = Bytes::from_static(b"name=Jane");
        let err = parse_form(Some(URLENCODED), body).await.unwrap_err();

        assert_eq!(err.to_string(), "missing form fields: email, message");
    }

    #[tokio::test]
    async fn present_but_empty_fields_are_left_to_validation() {
        let body = Bytes::from_static(b"name=&email=jane%40example.com&message=Hello+there");
        let raw = parse_form(Some(URLENCODED), body).await.unwrap();

        assert_eq!(raw.name.as_deref(), Some(""));
    }
}
