//! Media content descriptors.

/// Descriptor of a piece of remote media content.
///
/// Built from a content URL by the SDK; opaque to the core apart from the
/// URL it was created from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaSource {
    url: String,
}

impl MediaSource {
    /// Create a media source from a content URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Content URL this source refers to.
    pub fn url(&self) -> &str {
        &self.url
    }
}
