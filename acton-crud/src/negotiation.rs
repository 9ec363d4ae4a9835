//! Content negotiation
//!
//! Picks the response representation from the request's `Accept` header and
//! renders item or collection payloads into it.
//!
//! JSON is the default. XML is chosen only when the client explicitly ranks an
//! XML-accepting range ahead of every JSON-accepting one; the catch-all `*/*`
//! never selects anything on its own.
//!
//! # Example
//!
//! ```rust
//! use acton_crud::negotiation::{negotiate_header, Representation};
//!
//! assert_eq!(negotiate_header(None), Representation::Json);
//! assert_eq!(negotiate_header(Some("*/*")), Representation::Json);
//! assert_eq!(
//!     negotiate_header(Some("text/html, application/xml;q=0.9, */*;q=0.8")),
//!     Representation::Xml
//! );
//! ```

use std::fmt;

use serde::Serialize;

/// `application/json`
pub const APPLICATION_JSON: &str = "application/json";

/// `application/xml`
pub const APPLICATION_XML: &str = "application/xml";

/// One entry of an `Accept` header
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    main_type: String,
    sub_type: String,
    quality: f32,
}

impl MediaRange {
    /// Parse a single range such as `application/xml;q=0.5`
    ///
    /// Returns `None` for entries without a `type/subtype` pair or with an
    /// unparsable quality value.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(';');
        let (main_type, sub_type) = parts.next()?.trim().split_once('/')?;
        let (main_type, sub_type) = (main_type.trim(), sub_type.trim());
        if main_type.is_empty() || sub_type.is_empty() {
            return None;
        }

        let mut quality = 1.0_f32;
        for param in parts {
            if let Some((name, value)) = param.split_once('=') {
                if name.trim().eq_ignore_ascii_case("q") {
                    quality = value.trim().parse::<f32>().ok()?.clamp(0.0, 1.0);
                }
            }
        }

        Some(Self {
            main_type: main_type.to_ascii_lowercase(),
            sub_type: sub_type.to_ascii_lowercase(),
            quality,
        })
    }

    /// Quality weight in `0.0..=1.0`
    #[must_use]
    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// True for `*/*`
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        self.main_type == "*" && self.sub_type == "*"
    }

    /// Check whether this range covers a concrete `type/subtype`
    #[must_use]
    pub fn accepts(&self, media_type: &str) -> bool {
        let Some((main_type, sub_type)) = media_type.split_once('/') else {
            return false;
        };
        (self.main_type == "*" || self.main_type.eq_ignore_ascii_case(main_type))
            && (self.sub_type == "*" || self.sub_type.eq_ignore_ascii_case(sub_type))
    }
}

impl fmt::Display for MediaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.sub_type)?;
        if self.quality < 1.0 {
            write!(f, ";q={}", self.quality)?;
        }
        Ok(())
    }
}

/// Parse an `Accept` header into ranges, best first
///
/// Ranges with `q=0` are refused by the client and dropped. Ranges with equal
/// quality keep their header order.
pub fn accepted_ranges(header: Option<&str>) -> Vec<MediaRange> {
    let Some(header) = header else {
        return Vec::new();
    };

    let mut ranges: Vec<MediaRange> = header
        .split(',')
        .filter_map(MediaRange::parse)
        .filter(|range| range.quality > 0.0)
        .collect();

    ranges.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    ranges
}

/// Response representation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Representation {
    /// `application/json`
    #[default]
    Json,
    /// `application/xml`
    Xml,
}

impl Representation {
    /// Content type sent with this representation
    #[must_use]
    pub const fn media_type(&self) -> &'static str {
        match self {
            Self::Json => APPLICATION_JSON,
            Self::Xml => APPLICATION_XML,
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.media_type())
    }
}

/// Pick a representation from ranges ordered best first
pub fn negotiate(ranges: &[MediaRange]) -> Representation {
    for range in ranges.iter().filter(|range| !range.is_catch_all()) {
        if range.accepts(APPLICATION_JSON) {
            return Representation::Json;
        }
        if range.accepts(APPLICATION_XML) {
            return Representation::Xml;
        }
    }
    Representation::Json
}

/// Parse the raw `Accept` header and pick a representation
pub fn negotiate_header(header: Option<&str>) -> Representation {
    negotiate(&accepted_ranges(header))
}

/// Shape of the data being rendered
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a, D> {
    /// A single DTO
    Item(&'a D),
    /// A list of DTOs
    Collection(&'a [D]),
}

/// XML rendering hooks for one DTO type
pub trait XmlRenderer<D> {
    /// Render a single DTO
    fn render_item(&self, dto: &D) -> String;

    /// Render a list of DTOs
    fn render_collection(&self, dtos: &[D]) -> String;
}

/// A rendered response body and its content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBody {
    /// Value for the `Content-Type` header
    pub content_type: &'static str,
    /// Encoded body
    pub bytes: Vec<u8>,
}

/// Render `payload` in `representation`
///
/// JSON goes through `serde_json`; XML is delegated to `xml` according to the
/// payload shape.
pub fn render<D, X>(
    representation: Representation,
    payload: Payload<'_, D>,
    xml: &X,
) -> Result<RenderedBody, serde_json::Error>
where
    D: Serialize,
    X: XmlRenderer<D> + ?Sized,
{
    let bytes = match (representation, payload) {
        (Representation::Json, Payload::Item(dto)) => serde_json::to_vec(dto)?,
        (Representation::Json, Payload::Collection(dtos)) => serde_json::to_vec(dtos)?,
        (Representation::Xml, Payload::Item(dto)) => xml.render_item(dto).into_bytes(),
        (Representation::Xml, Payload::Collection(dtos)) => {
            xml.render_collection(dtos).into_bytes()
        }
    };

    Ok(RenderedBody {
        content_type: representation.media_type(),
        bytes,
    })
}
