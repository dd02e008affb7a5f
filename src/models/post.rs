//! Rich post bodies: an ordered sequence of typed segments.

use std::ops::{Add, AddAssign, Deref};

use mime_guess::mime;
use url::Url;

use crate::error::{Error, Result};
use crate::models::markup::{Element, RenderOptions};

/// MIME type of paragraph segments.
pub const PARAGRAPH_MIME_TYPE: &str = "text/html";

/// MIME type of files whose type cannot be guessed.
pub const DEFAULT_FILE_MIME_TYPE: &str = "application/octet-stream";

/// Discriminant of a [`Segment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Paragraph,
    Image,
    Video,
    File,
}

/// One unit of a post body.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Paragraph(Paragraph),
    Image(Image),
    Video(Video),
    File(File),
}

impl Segment {
    pub fn kind(&self) -> SegmentKind {
        match self {
            Segment::Paragraph(_) => SegmentKind::Paragraph,
            Segment::Image(_) => SegmentKind::Image,
            Segment::Video(_) => SegmentKind::Video,
            Segment::File(_) => SegmentKind::File,
        }
    }

    /// The markup element representing this segment.
    pub fn to_element(&self) -> Element {
        match self {
            Segment::Paragraph(p) => p.to_element(),
            Segment::Image(i) => i.to_element(),
            Segment::Video(v) => v.to_element(),
            Segment::File(f) => f.to_element(),
        }
    }

    pub fn mime_type(&self) -> &str {
        match self {
            Segment::Paragraph(p) => p.mime_type(),
            Segment::Image(i) => i.mime_type(),
            Segment::Video(v) => v.mime_type(),
            Segment::File(f) => f.mime_type(),
        }
    }
}

impl From<Paragraph> for Segment {
    fn from(p: Paragraph) -> Self {
        Segment::Paragraph(p)
    }
}

impl From<Image> for Segment {
    fn from(i: Image) -> Self {
        Segment::Image(i)
    }
}

impl From<Video> for Segment {
    fn from(v: Video) -> Self {
        Segment::Video(v)
    }
}

impl From<File> for Segment {
    fn from(f: File) -> Self {
        Segment::File(f)
    }
}

/// A pre-built block of rich text, e.g. `<p>` or `<h2>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    element: Element,
}

impl Paragraph {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    /// A `<p>` holding plain text.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(Element::new("p").text(text))
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn mime_type(&self) -> &str {
        PARAGRAPH_MIME_TYPE
    }

    pub fn to_element(&self) -> Element {
        self.element.clone()
    }
}

/// An image referenced by URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    id: String,
    url: Url,
    name: String,
    thumbnail: Option<Url>,
    mime_type: String,
}

impl Image {
    /// Create an image segment. Fails unless `name` has an image extension.
    pub fn new(
        id: impl Into<String>,
        url: &str,
        name: impl Into<String>,
        thumbnail: Option<&str>,
    ) -> Result<Self> {
        let name = name.into();
        let mime_type = guess_mime_type(&name).ok_or_else(|| {
            Error::Validation(format!("Cannot determine the MIME type of {}.", name))
        })?;
        if mime_type.type_() != mime::IMAGE {
            return Err(Error::Validation(format!(
                "The image segment must be initialized with an image MIME type (got {} for {}).",
                mime_type, name
            )));
        }

        Ok(Self {
            id: id.into(),
            url: Url::parse(url)?,
            name,
            thumbnail: thumbnail.map(Url::parse).transpose()?,
            mime_type: mime_type.to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn thumbnail(&self) -> Option<&Url> {
        self.thumbnail.as_ref()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn to_element(&self) -> Element {
        Element::new("img")
            .attr("src", self.url.as_str())
            .attr("id", &self.id)
            .attr("alt", &self.name)
    }
}

/// A video referenced by URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    id: String,
    url: Url,
    name: String,
    mime_type: String,
}

impl Video {
    /// Create a video segment. Fails unless `name` has a video extension.
    pub fn new(id: impl Into<String>, url: &str, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let mime_type = guess_mime_type(&name).ok_or_else(|| {
            Error::Validation(format!("Cannot determine the MIME type of {}.", name))
        })?;
        if mime_type.type_() != mime::VIDEO {
            return Err(Error::Validation(format!(
                "The video segment must be initialized with a video MIME type (got {} for {}).",
                mime_type, name
            )));
        }

        Ok(Self {
            id: id.into(),
            url: Url::parse(url)?,
            name,
            mime_type: mime_type.to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn to_element(&self) -> Element {
        Element::new("video")
            .attr("id", &self.id)
            .attr("controls", "controls")
            .child(
                Element::new("source")
                    .attr("src", self.url.as_str())
                    .attr("type", &self.mime_type),
            )
    }
}

/// An arbitrary downloadable file.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    id: String,
    url: Url,
    name: String,
    size: Option<u64>,
    mime_type: String,
}

impl File {
    pub fn new(
        id: impl Into<String>,
        url: &str,
        name: impl Into<String>,
        size: Option<u64>,
    ) -> Result<Self> {
        let name = name.into();
        let mime_type = guess_mime_type(&name)
            .map(|m| m.to_string())
            .unwrap_or_else(|| DEFAULT_FILE_MIME_TYPE.to_string());

        Ok(Self {
            id: id.into(),
            url: Url::parse(url)?,
            name,
            size,
            mime_type,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes, when known.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn to_element(&self) -> Element {
        Element::new("a")
            .attr("href", self.url.as_str())
            .attr("id", &self.id)
            .text(&self.name)
    }
}

fn guess_mime_type(name: &str) -> Option<mime::Mime> {
    mime_guess::from_path(name).first()
}

/// An ordered document made of segments, in reading order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostBody {
    segments: Vec<Segment>,
}

impl PostBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one segment at the end.
    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.segments.push(segment.into());
    }

    /// Append every segment of another body.
    pub fn append(&mut self, other: &PostBody) {
        self.segments.extend(other.segments.iter().cloned());
    }

    /// An independent deep copy.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    /// Render the body as a pretty-printed `<body>` document.
    pub fn render(&self) -> String {
        self.render_with(RenderOptions::default())
    }

    pub fn render_with(&self, options: RenderOptions) -> String {
        Element::new("body")
            .children(self.segments.iter().map(Segment::to_element))
            .render(options)
    }

    pub fn images(&self) -> Vec<&Image> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Image(image) => Some(image),
                _ => None,
            })
            .collect()
    }

    pub fn videos(&self) -> Vec<&Video> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Video(video) => Some(video),
                _ => None,
            })
            .collect()
    }

    pub fn files(&self) -> Vec<&File> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::File(file) => Some(file),
                _ => None,
            })
            .collect()
    }

    /// Segments of one kind, in order.
    pub fn of_kind(&self, kind: SegmentKind) -> Vec<&Segment> {
        self.segments.iter().filter(|s| s.kind() == kind).collect()
    }
}

impl Deref for PostBody {
    type Target = [Segment];

    fn deref(&self) -> &Self::Target {
        &self.segments
    }
}

impl From<Segment> for PostBody {
    fn from(segment: Segment) -> Self {
        Self {
            segments: vec![segment],
        }
    }
}

impl From<Vec<Segment>> for PostBody {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

impl FromIterator<Segment> for PostBody {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl Extend<Segment> for PostBody {
    fn extend<I: IntoIterator<Item = Segment>>(&mut self, iter: I) {
        self.segments.extend(iter);
    }
}

impl IntoIterator for PostBody {
    type Item = Segment;
    type IntoIter = std::vec::IntoIter<Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.into_iter()
    }
}

impl<'a> IntoIterator for &'a PostBody {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

impl Add for PostBody {
    type Output = PostBody;

    fn add(mut self, rhs: PostBody) -> PostBody {
        self.segments.extend(rhs.segments);
        self
    }
}

impl Add<&PostBody> for &PostBody {
    type Output = PostBody;

    fn add(self, rhs: &PostBody) -> PostBody {
        let mut result = self.copy();
        result.append(rhs);
        result
    }
}

impl Add<Segment> for PostBody {
    type Output = PostBody;

    fn add(mut self, rhs: Segment) -> PostBody {
        self.segments.push(rhs);
        self
    }
}

impl AddAssign for PostBody {
    fn add_assign(&mut self, rhs: PostBody) {
        self.segments.extend(rhs.segments);
    }
}

impl AddAssign<&PostBody> for PostBody {
    fn add_assign(&mut self, rhs: &PostBody) {
        self.append(rhs);
    }
}

impl AddAssign<Segment> for PostBody {
    fn add_assign(&mut self, rhs: Segment) {
        self.segments.push(rhs);
    }
}

impl AddAssign<Vec<Segment>> for PostBody {
    fn add_assign(&mut self, rhs: Vec<Segment>) {
        self.segments.extend(rhs);
    }
}
