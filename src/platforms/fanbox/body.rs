//! Build [`PostBody`] values from FANBOX post payloads.
//!
//! The payload shape depends on the post `type`:
//!
//! - `article`: a list of blocks with side tables for images, files and URL
//!   embeds
//! - `image`: images followed by a caption
//! - `file`: files followed by a caption
//! - `text`: a caption only
//!
//! Blocks and post types that cannot be represented are skipped with a
//! warning rather than failing the whole post.

use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::models::markup::{Element, Node};
use crate::models::post::{File, Image, Paragraph, PostBody, Segment};
use crate::platforms::fanbox::types::{
    ArticleBody, FileBody, ImageBody, RawBlock, RawFile, RawImage, RawStyle, TextBody,
};

/// Build the body of a post of type `kind`. A missing payload (restricted
/// post) gives an empty body.
pub fn build_body(kind: &str, payload: Option<serde_json::Value>) -> Result<PostBody> {
    let Some(payload) = payload.filter(|p| !p.is_null()) else {
        return Ok(PostBody::new());
    };

    match kind {
        "article" => Ok(build_article_body(&parse(payload)?)),
        "image" => Ok(build_image_body(&parse(payload)?)),
        "file" => Ok(build_file_body(&parse(payload)?)),
        "text" => Ok(build_text_body(&parse(payload)?)),
        other => {
            tracing::warn!("Unknown post type '{}', leaving the body empty", other);
            Ok(PostBody::new())
        }
    }
}

fn parse<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T> {
    Ok(serde_json::from_value(payload)?)
}

pub fn build_article_body(article: &ArticleBody) -> PostBody {
    let mut body = PostBody::new();

    for block in &article.blocks {
        match block_segment(article, block) {
            Some(segment) => body.push(segment),
            None => tracing::warn!("Skipping unsupported '{}' block", block.kind),
        }
    }

    body
}

fn block_segment(article: &ArticleBody, block: &RawBlock) -> Option<Segment> {
    match block.kind.as_str() {
        "p" => Some(Paragraph::new(styled_paragraph(&block.text, &block.styles)).into()),
        "header" => Some(Paragraph::new(Element::new("h2").text(&block.text)).into()),
        "url_embed" => {
            let embed = article.url_embed_map.get(block.url_embed_id.as_deref()?)?;
            let (url, host) = (embed.url.as_deref()?, embed.host.as_deref()?);
            Some(Paragraph::new(Element::new("a").attr("href", url).text(host)).into())
        }
        "image" => {
            let image = article.image_map.get(block.image_id.as_deref()?)?;
            image_segment(image)
        }
        "file" => {
            let file = article.file_map.get(block.file_id.as_deref()?)?;
            file_segment(file)
        }
        _ => None,
    }
}

pub fn build_image_body(payload: &ImageBody) -> PostBody {
    let mut body: PostBody = payload.images.iter().filter_map(image_segment).collect();
    body += caption(payload.text.as_deref());
    body
}

pub fn build_file_body(payload: &FileBody) -> PostBody {
    let mut body: PostBody = payload.files.iter().filter_map(file_segment).collect();
    body += caption(payload.text.as_deref());
    body
}

pub fn build_text_body(payload: &TextBody) -> PostBody {
    caption(payload.text.as_deref()).into()
}

/// One `<p>` paragraph per line.
fn caption(text: Option<&str>) -> Vec<Segment> {
    text.unwrap_or_default()
        .lines()
        .map(|line| Paragraph::plain(line).into())
        .collect()
}

fn image_segment(image: &RawImage) -> Option<Segment> {
    let name = format!("{}.{}", image.id, image.extension);
    match Image::new(
        &image.id,
        &image.original_url,
        name,
        image.thumbnail_url.as_deref(),
    ) {
        Ok(image) => Some(image.into()),
        Err(e) => {
            tracing::warn!("Skipping image {}: {}", image.id, e);
            None
        }
    }
}

fn file_segment(file: &RawFile) -> Option<Segment> {
    let name = format!("{}.{}", file.name, file.extension);
    match File::new(&file.id, &file.url, name, file.size) {
        Ok(file) => Some(file.into()),
        Err(e) => {
            tracing::warn!("Skipping file {}: {}", file.id, e);
            None
        }
    }
}

/// Split `text` into plain and styled fragments.
///
/// Offsets are absolute character positions. Spans are applied in offset
/// order; parts overlapping an earlier span or running past the end of the
/// text are clamped away.
pub fn styled_paragraph(text: &str, styles: &[RawStyle]) -> Element {
    let chars: Vec<char> = text.chars().collect();
    let fragment = |start: usize, end: usize| chars[start..end].iter().collect::<String>();

    let mut styles: Vec<&RawStyle> = styles.iter().collect();
    styles.sort_by_key(|style| style.offset);

    let mut paragraph = Element::new("p");
    let mut cursor = 0;
    for style in styles {
        let start = style.offset.clamp(cursor, chars.len());
        let end = style.offset.saturating_add(style.length).clamp(start, chars.len());

        paragraph.push(Node::Text(fragment(cursor, start)));
        if start < end {
            let styled = fragment(start, end);
            match style.kind.as_str() {
                "bold" => paragraph.push(Node::Element(Element::new("b").text(styled))),
                _ => paragraph.push(Node::Text(styled)),
            }
        }
        cursor = end;
    }
    paragraph.push(Node::Text(fragment(cursor, chars.len())));

    paragraph
}
