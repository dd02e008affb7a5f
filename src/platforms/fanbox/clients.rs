//! FANBOX sub-clients, borrowed from a connected [`FanboxClient`].

use futures::future::{self, try_join_all};
use futures::stream::{self, Stream, TryStreamExt};
use serde::de::DeserializeOwned;

use crate::client::Session;
use crate::error::{Error, Result};
use crate::models::{Creator, DirectMessage, Membership, Post};
use crate::platforms::fanbox::types::{
    ApiResponse, RawCreator, RawNewsletter, RawPlan, RawPost, RawPostPage,
};
use crate::platforms::fanbox::FanboxClient;

/// Posts requested per listing page.
const POSTS_PER_PAGE: &str = "10";

impl FanboxClient {
    pub fn creators(&self) -> Result<Creators<'_>> {
        Ok(Creators {
            session: self.session()?,
        })
    }

    pub fn posts(&self) -> Result<Posts<'_>> {
        Ok(Posts {
            session: self.session()?,
        })
    }

    pub fn plans(&self) -> Result<Plans<'_>> {
        Ok(Plans {
            session: self.session()?,
        })
    }

    pub fn newsletters(&self) -> Result<Newsletters<'_>> {
        Ok(Newsletters {
            session: self.session()?,
        })
    }
}

/// GET an endpoint and unwrap its `body`.
async fn fetch_body<T: DeserializeOwned>(
    session: &Session,
    target: &str,
    query: &[(&str, &str)],
) -> Result<T> {
    let response = session.get(target, query).await?;
    let payload: ApiResponse<T> = response.json()?;
    Ok(payload.body)
}

/// Map a not-found failure to `None`.
fn not_found_as_none<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// How to look a creator up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatorRef {
    /// The `@name` handle, without the `@`.
    CreatorId(String),
    /// The numeric pixiv user ID.
    UserId(String),
}

impl From<&str> for CreatorRef {
    fn from(creator_id: &str) -> Self {
        CreatorRef::CreatorId(creator_id.to_string())
    }
}

impl From<String> for CreatorRef {
    fn from(creator_id: String) -> Self {
        CreatorRef::CreatorId(creator_id)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Creators<'a> {
    session: &'a Session,
}

impl<'a> Creators<'a> {
    /// Get a creator, or `None` if there is no such creator.
    pub async fn get(&self, creator: impl Into<CreatorRef>) -> Result<Option<Creator>> {
        let creator = creator.into();
        let query = match &creator {
            CreatorRef::CreatorId(id) => [("creatorId", id.as_str())],
            CreatorRef::UserId(id) => [("userId", id.as_str())],
        };

        let raw: Option<RawCreator> =
            not_found_as_none(fetch_body(self.session, "creator.get", &query).await)?;
        raw.map(RawCreator::into_creator).transpose()
    }

    /// Same as [`Plans::list_by_creator`].
    pub async fn list_plans(&self, creator_id: &str) -> Result<Vec<Membership>> {
        Plans {
            session: self.session,
        }
        .list_by_creator(creator_id)
        .await
    }

    /// Received newsletters sent by one creator.
    pub fn iterate_newsletters(
        &self,
        creator_id: &str,
    ) -> impl Stream<Item = Result<DirectMessage>> + 'a {
        let creator_id = creator_id.to_string();
        Newsletters {
            session: self.session,
        }
        .iterate_received()
        .try_filter(move |message| future::ready(message.creator == creator_id))
    }
}

enum PageCursor {
    First(String),
    Next(String),
}

#[derive(Debug, Clone, Copy)]
pub struct Posts<'a> {
    session: &'a Session,
}

impl<'a> Posts<'a> {
    /// Get a post with its body, or `None` if there is no such post.
    pub async fn get(&self, post_id: &str) -> Result<Option<Post>> {
        let raw: Option<RawPost> = not_found_as_none(
            fetch_body(self.session, "post.info", &[("postId", post_id)]).await,
        )?;
        raw.map(RawPost::into_post).transpose()
    }

    /// Every post of a creator, newest first, following `nextUrl` page by
    /// page. Listing entries usually carry no body.
    pub fn iterate_by_creator(&self, creator_id: &str) -> impl Stream<Item = Result<Post>> + 'a {
        let session = self.session;
        let first = PageCursor::First(creator_id.to_string());

        stream::try_unfold(Some(first), move |cursor| async move {
            let Some(cursor) = cursor else {
                return Ok::<_, Error>(None);
            };

            let page: RawPostPage = match cursor {
                PageCursor::First(creator_id) => {
                    fetch_body(
                        session,
                        "post.listCreator",
                        &[("creatorId", creator_id.as_str()), ("limit", POSTS_PER_PAGE)],
                    )
                    .await?
                }
                PageCursor::Next(url) => fetch_body(session, &url, &[]).await?,
            };
            tracing::debug!("Fetched a page of {} posts", page.items.len());

            let posts = page
                .items
                .into_iter()
                .map(RawPost::into_post)
                .collect::<Result<Vec<_>>>()?;
            let next = page.next_url.filter(|url| !url.is_empty()).map(PageCursor::Next);

            Ok(Some((stream::iter(posts.into_iter().map(Ok)), next)))
        })
        .try_flatten()
    }

    /// Every post of a creator with its full body.
    ///
    /// Bodies are fetched concurrently once the listing is complete; any
    /// failure fails the whole call. Posts deleted in between are left out.
    pub async fn list_by_creator_with_body(&self, creator_id: &str) -> Result<Vec<Post>> {
        let listed: Vec<Post> = self.iterate_by_creator(creator_id).try_collect().await?;
        let fetched = try_join_all(listed.iter().map(|post| self.get(&post.id))).await?;
        Ok(fetched.into_iter().flatten().collect())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Plans<'a> {
    session: &'a Session,
}

impl<'a> Plans<'a> {
    /// Plans offered by a creator. Fails with [`Error::NotFound`] if the
    /// creator does not exist.
    pub async fn list_by_creator(&self, creator_id: &str) -> Result<Vec<Membership>> {
        let plans: Option<Vec<RawPlan>> = not_found_as_none(
            fetch_body(self.session, "plan.listCreator", &[("creatorId", creator_id)]).await,
        )?;
        let plans =
            plans.ok_or_else(|| Error::NotFound(format!("Creator {} not found.", creator_id)))?;

        plans.into_iter().map(RawPlan::into_membership).collect()
    }

    /// Plans the current user supports.
    pub fn iterate_supporting(&self) -> impl Stream<Item = Result<Membership>> + 'a {
        let session = self.session;
        stream::once(async move {
            let plans: Vec<RawPlan> = fetch_body(session, "plan.listSupporting", &[]).await?;
            Ok::<_, Error>(stream::iter(plans.into_iter().map(RawPlan::into_membership)))
        })
        .try_flatten()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Newsletters<'a> {
    session: &'a Session,
}

impl<'a> Newsletters<'a> {
    /// Get a newsletter, or `None` if there is no such newsletter.
    pub async fn get(&self, newsletter_id: &str) -> Result<Option<DirectMessage>> {
        let raw: Option<RawNewsletter> = not_found_as_none(
            fetch_body(self.session, "newsletter.get", &[("id", newsletter_id)]).await,
        )?;
        Ok(raw.map(RawNewsletter::into_message))
    }

    /// Newsletters received by the current user.
    pub fn iterate_received(&self) -> impl Stream<Item = Result<DirectMessage>> + 'a {
        let session = self.session;
        stream::once(async move {
            let newsletters: Vec<RawNewsletter> =
                fetch_body(session, "newsletter.list", &[]).await?;
            Ok::<_, Error>(stream::iter(
                newsletters
                    .into_iter()
                    .map(|raw| Ok::<_, Error>(raw.into_message())),
            ))
        })
        .try_flatten()
    }
}
